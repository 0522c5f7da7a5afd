mod file_finder;

pub use file_finder::{FileFinder, ManifestFile, MANIFEST_FILE_NAME};

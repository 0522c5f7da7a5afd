use crate::config::Config;
use ignore::WalkBuilder;
use miette::{miette, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub const MANIFEST_FILE_NAME: &str = "AndroidManifest.xml";

/// A discovered `AndroidManifest.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub path: PathBuf,

    /// Gradle source set (`main`, `debug`, ...) when the path follows `src/<set>/`
    pub source_set: Option<String>,
}

impl ManifestFile {
    pub fn new(path: PathBuf) -> Self {
        let source_set = source_set_of(&path);
        Self { path, source_set }
    }

    pub fn read_contents(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| miette!("Failed to read {}: {}", self.path.display(), e))
    }
}

fn source_set_of(path: &Path) -> Option<String> {
    let components: Vec<_> = path
        .parent()?
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    match components.as_slice() {
        [.., src, set] if src == "src" => Some(set.clone()),
        _ => None,
    }
}

/// Finds manifests under a project root
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// A manifest file is returned as-is; a directory is searched recursively
    pub fn find_manifests(&self, root: &Path) -> Result<Vec<ManifestFile>> {
        if root.is_file() {
            return Ok(vec![ManifestFile::new(root.to_path_buf())]);
        }
        if !root.exists() {
            return Err(miette!("Path does not exist: {}", root.display()));
        }

        debug!("Scanning for manifests in: {}", root.display());

        let walker = WalkBuilder::new(root)
            .hidden(true)           // Skip hidden files
            .git_ignore(true)       // Respect .gitignore
            .git_global(true)       // Respect global gitignore
            .git_exclude(true)      // Respect .git/info/exclude
            .ignore(true)           // Respect .ignore files
            .parents(true)          // Check parent directories for ignore files
            .follow_links(false)    // Don't follow symlinks
            .build();

        let mut manifests: Vec<ManifestFile> = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter(|entry| entry.file_name() == MANIFEST_FILE_NAME)
            .filter_map(|entry| {
                let path = entry.path();
                if self.config.should_exclude(path) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }

                trace!("Found manifest: {}", path.display());
                Some(ManifestFile::new(path.to_path_buf()))
            })
            .collect();

        manifests.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Found {} manifests", manifests.len());
        Ok(manifests)
    }
}

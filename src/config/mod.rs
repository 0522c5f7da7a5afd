mod loader;

pub use loader::{Config, ParseConfig, ReportConfig, ResourcesConfig};

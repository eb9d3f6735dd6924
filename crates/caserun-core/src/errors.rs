use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("unsupported config version {found} (supported: {supported})")]
    Version { found: u32, supported: u32 },

    #[error("invalid case '{case}': {reason}")]
    Case { case: String, reason: String },
}

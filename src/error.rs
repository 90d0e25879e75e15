//! Error types for routerus.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterusError {
    #[error("Unknown route format: {0}")]
    UnknownFormat(String),

    #[error("Failed to read domain list {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(String),
}

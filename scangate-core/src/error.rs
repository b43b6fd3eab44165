use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Unknown profile '{name}'. Available profiles: {}", known.join(", "))]
    UnknownProfile { name: String, known: Vec<String> },

    #[error("Unknown base profile '{name}' in extends. Available profiles: {}", known.join(", "))]
    UnknownBaseProfile { name: String, known: Vec<String> },

    #[error("failed to read profile override {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid profile override {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ProfileError>;

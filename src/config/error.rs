// Csputil — Configuration error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot load key {path}: {message}")]
    Key { path: PathBuf, message: String },

    #[error("Key generation failed: {0}")]
    KeyGeneration(#[from] rsa::Error),

    #[error("Container '{0}' is configured twice in the same key store")]
    DuplicateContainer(String),

    #[error("The {0} backend is not available in this build")]
    BackendUnavailable(&'static str),
}

// Csputil — Top-level error types
//
// Aggregates errors from the blob, provider, session, signer and config
// modules into a single error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all csputil operations.
#[derive(Debug, Error)]
pub enum CsputilError {
    #[error("Blob error: {0}")]
    Blob(#[from] crate::blob::BlobError),

    #[error("Provider error: {0}")]
    Provider(#[from] crate::provider::ProviderError),

    #[error("Session error: {0}")]
    Session(#[from] crate::session::SessionError),

    #[error("Signing error: {0}")]
    Sign(#[from] crate::signer::SignError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CsputilError>;

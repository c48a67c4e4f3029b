// Csputil — Session error types

use thiserror::Error;

use super::KeyIndex;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No container is selected")]
    NoContainer,

    #[error("The {0} has not been exported")]
    NotExported(KeyIndex),

    #[error("{index}: {reason}")]
    KeyUnavailable { index: KeyIndex, reason: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Failed to save the key: {0}")]
    Save(#[from] crate::blob::BlobError),
}

// Csputil — Signing error types

use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("CryptCreateHash failed - {:08x}", .0.code)]
    CreateHash(#[source] ProviderError),

    /// The digest could not be resolved from the input, or was rejected by
    /// the hash object (wrong size).
    #[error("Invalid hash value")]
    InvalidHashValue(#[source] Option<ProviderError>),

    #[error("Failed to generate a signature - {:08x}", .0.code)]
    Signing(#[source] ProviderError),

    #[error("Invalid format selected")]
    InvalidFormat,

    #[error("Failed to get keys - {:08x}", .0.code)]
    GetKey(#[source] ProviderError),

    #[error("Select exactly one of the exchange and signature keys")]
    KeySelection,

    #[error("Invalid signature value")]
    InvalidSignature,

    #[error("Signature does not match")]
    SignatureMismatch,

    #[error("Failed to verify the signature - {:08x}", .0.code)]
    Verification(#[source] ProviderError),
}

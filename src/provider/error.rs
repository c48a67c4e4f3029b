// Csputil — Provider error types
//
// Every provider-boundary call fails with a (kind, native code) pair. The
// kind says which stage failed; the code is what the provider reported.

use thiserror::Error;

use super::codes;

/// The stage of a provider interaction that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ContextAcquisition,
    /// The requested key slot is empty. Not a hard failure.
    KeyNotFound,
    KeyRetrieval,
    KeyExport,
    HashCreation,
    Hashing,
    HashSizeMismatch,
    Signing,
    Verification,
    Enumeration,
    InvalidHandle,
}

impl ErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::ContextAcquisition => "Failed to acquire the container",
            ErrorKind::KeyNotFound => "No key",
            ErrorKind::KeyRetrieval => "Failed to get keys",
            ErrorKind::KeyExport => "Failed to export the key",
            ErrorKind::HashCreation => "Failed to create the hash",
            ErrorKind::Hashing => "Failed to hash the data",
            ErrorKind::HashSizeMismatch => "Hash size does not match",
            ErrorKind::Signing => "Failed to generate a signature",
            ErrorKind::Verification => "Failed to verify the signature",
            ErrorKind::Enumeration => "Failed to enumerate",
            ErrorKind::InvalidHandle => "Invalid provider handle",
        }
    }
}

/// A failed provider call: what failed, and the provider's native code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{} - {:08x}", .kind.message(), .code)]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub code: u32,
}

impl ProviderError {
    pub fn new(kind: ErrorKind, code: u32) -> Self {
        Self { kind, code }
    }

    /// Build an error from a native code, recognising the empty-slot code
    /// regardless of which call reported it.
    pub fn from_code(kind: ErrorKind, code: u32) -> Self {
        if code == codes::NTE_NO_KEY {
            Self::new(ErrorKind::KeyNotFound, code)
        } else {
            Self::new(kind, code)
        }
    }

    /// True when the key slot is simply empty.
    pub fn is_no_key(&self) -> bool {
        self.kind == ErrorKind::KeyNotFound
    }
}

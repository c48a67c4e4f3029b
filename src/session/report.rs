// Csputil — Container inspection results

use std::fmt;

use crate::provider::{BlobKind, ErrorKind, KeySpec, ProviderError};

/// Position of an exported key blob in the session's key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIndex {
    SignaturePublic,
    SignaturePrivate,
    ExchangePublic,
    ExchangePrivate,
}

impl KeyIndex {
    pub const ALL: [KeyIndex; 4] = [
        KeyIndex::SignaturePublic,
        KeyIndex::SignaturePrivate,
        KeyIndex::ExchangePublic,
        KeyIndex::ExchangePrivate,
    ];

    pub fn new(spec: KeySpec, kind: BlobKind) -> Self {
        match (spec, kind) {
            (KeySpec::Signature, BlobKind::Public) => KeyIndex::SignaturePublic,
            (KeySpec::Signature, BlobKind::Private) => KeyIndex::SignaturePrivate,
            (KeySpec::Exchange, BlobKind::Public) => KeyIndex::ExchangePublic,
            (KeySpec::Exchange, BlobKind::Private) => KeyIndex::ExchangePrivate,
        }
    }

    pub fn spec(&self) -> KeySpec {
        match self {
            KeyIndex::SignaturePublic | KeyIndex::SignaturePrivate => KeySpec::Signature,
            KeyIndex::ExchangePublic | KeyIndex::ExchangePrivate => KeySpec::Exchange,
        }
    }

    pub fn kind(&self) -> BlobKind {
        match self {
            KeyIndex::SignaturePublic | KeyIndex::ExchangePublic => BlobKind::Public,
            KeyIndex::SignaturePrivate | KeyIndex::ExchangePrivate => BlobKind::Private,
        }
    }

    /// File name suggested when saving this blob.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            KeyIndex::SignaturePublic => "sig_pub",
            KeyIndex::SignaturePrivate => "sig_pri",
            KeyIndex::ExchangePublic => "exchg_pub",
            KeyIndex::ExchangePrivate => "exchg_pri",
        }
    }

    pub(crate) fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for KeyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind() {
            BlobKind::Public => "public",
            BlobKind::Private => "private",
        };
        write!(f, "{} {} key", self.spec(), kind)
    }
}

/// What became of one key slot when a container was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySlotReport {
    /// The key exists; each blob kind was exported or failed on its own.
    Exported {
        public: Result<(), ProviderError>,
        private: Result<(), ProviderError>,
    },
    /// The slot is empty.
    NoKey,
    /// Retrieving the key failed.
    Failed(ProviderError),
}

impl KeySlotReport {
    /// Display text for one blob of this slot.
    ///
    /// `dump` renders the blob when it was exported.
    pub fn describe(&self, kind: BlobKind, dump: impl FnOnce() -> String) -> String {
        match self {
            KeySlotReport::Exported { public, private } => {
                let outcome = match kind {
                    BlobKind::Public => public,
                    BlobKind::Private => private,
                };
                match outcome {
                    Ok(()) => dump(),
                    Err(e) => failure_text(ErrorKind::KeyExport, e),
                }
            }
            KeySlotReport::NoKey => "No key".to_string(),
            KeySlotReport::Failed(e) => match kind {
                BlobKind::Public => failure_text(ErrorKind::KeyRetrieval, e),
                BlobKind::Private => String::new(),
            },
        }
    }
}

/// Outcome of opening a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerReport {
    Opened {
        exchange: KeySlotReport,
        signature: KeySlotReport,
    },
    AcquireFailed(ProviderError),
}

impl ContainerReport {
    pub fn slot(&self, spec: KeySpec) -> Option<&KeySlotReport> {
        match self {
            ContainerReport::Opened { exchange, .. } if spec == KeySpec::Exchange => Some(exchange),
            ContainerReport::Opened { signature, .. } => Some(signature),
            ContainerReport::AcquireFailed(_) => None,
        }
    }

    pub fn is_opened(&self) -> bool {
        matches!(self, ContainerReport::Opened { .. })
    }
}

/// "<message> - <code>" with the message fixed by the stage being reported.
pub(crate) fn failure_text(stage: ErrorKind, error: &ProviderError) -> String {
    format!("{} - {:08x}", stage.message(), error.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::codes;

    #[test]
    fn test_default_file_names_follow_slot() {
        assert_eq!(KeyIndex::ExchangePublic.default_file_name(), "exchg_pub");
        assert_eq!(KeyIndex::ExchangePrivate.default_file_name(), "exchg_pri");
        assert_eq!(KeyIndex::SignaturePublic.default_file_name(), "sig_pub");
        assert_eq!(KeyIndex::SignaturePrivate.default_file_name(), "sig_pri");
    }

    #[test]
    fn test_index_round_trip() {
        for index in KeyIndex::ALL {
            assert_eq!(KeyIndex::new(index.spec(), index.kind()), index);
        }
        assert_eq!(KeyIndex::ExchangePrivate.to_string(), "exchange private key");
    }

    #[test]
    fn test_failed_retrieval_text() {
        let report = KeySlotReport::Failed(ProviderError::new(
            ErrorKind::KeyRetrieval,
            codes::NTE_BAD_KEYSET,
        ));
        assert_eq!(
            report.describe(BlobKind::Public, String::new),
            "Failed to get keys - 80090016"
        );
        assert_eq!(report.describe(BlobKind::Private, String::new), "");
    }

    #[test]
    fn test_export_failure_text() {
        let report = KeySlotReport::Exported {
            public: Ok(()),
            private: Err(ProviderError::new(ErrorKind::KeyExport, codes::NTE_BAD_KEY_STATE)),
        };
        assert_eq!(report.describe(BlobKind::Public, || "dump".to_string()), "dump");
        assert_eq!(
            report.describe(BlobKind::Private, || "dump".to_string()),
            "Failed to export the key - 8009000b"
        );
    }

    #[test]
    fn test_no_key_text() {
        assert_eq!(KeySlotReport::NoKey.describe(BlobKind::Private, String::new), "No key");
    }
}

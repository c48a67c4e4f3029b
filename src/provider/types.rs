// Csputil — Provider vocabulary
//
// Handle ids, key slots, blob kinds, hash algorithms and acquisition flags,
// with their CryptoAPI numeric values.

use std::fmt;

/// Provider type id of "RSA Full (Signature and Key Exchange)".
pub const PROV_RSA_FULL: u32 = 1;
/// Provider type id of "RSA Full and AES". Preferred default selection.
pub const PROV_RSA_AES: u32 = 24;

/// Open a context with no container, for hashing and enumeration only.
pub const CRYPT_VERIFYCONTEXT: u32 = 0xF000_0000;
/// Use the local machine key store instead of the current user's.
pub const CRYPT_MACHINE_KEYSET: u32 = 0x0000_0020;

macro_rules! handle_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(usize);

        impl $name {
            pub fn from_raw(raw: usize) -> Self {
                Self(raw)
            }

            pub fn as_raw(&self) -> usize {
                self.0
            }
        }
    };
}

handle_id!(
    /// Opaque provider context handle.
    ContextId
);
handle_id!(
    /// Opaque key handle.
    KeyId
);
handle_id!(
    /// Opaque hash object handle.
    HashId
);

/// Which of the two key slots of a container to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySpec {
    Exchange,
    Signature,
}

impl KeySpec {
    pub const ALL: [KeySpec; 2] = [KeySpec::Exchange, KeySpec::Signature];

    /// AT_KEYEXCHANGE / AT_SIGNATURE.
    pub fn as_raw(&self) -> u32 {
        match self {
            KeySpec::Exchange => 1,
            KeySpec::Signature => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KeySpec::Exchange => "exchange",
            KeySpec::Signature => "signature",
        }
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wire representation requested when exporting a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum BlobKind {
    Public,
    Private,
}

impl BlobKind {
    /// PUBLICKEYBLOB / PRIVATEKEYBLOB.
    pub fn as_raw(&self) -> u32 {
        match self {
            BlobKind::Public => 0x06,
            BlobKind::Private => 0x07,
        }
    }
}

/// Hash algorithms offered for signing, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
    ];

    /// Index into [`HashAlgorithm::ALL`] selected when nothing else is chosen.
    pub const DEFAULT_INDEX: usize = 2;

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// CryptoAPI ALG_ID.
    pub fn alg_id(&self) -> u32 {
        match self {
            HashAlgorithm::Md5 => 0x8003,
            HashAlgorithm::Sha1 => 0x8004,
            HashAlgorithm::Sha256 => 0x800c,
        }
    }

    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key store a container lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    User,
    Machine,
}

impl Scope {
    /// Acquisition flags selecting this key store.
    pub fn flags(&self) -> u32 {
        match self {
            Scope::User => 0,
            Scope::Machine => CRYPT_MACHINE_KEYSET,
        }
    }

    pub fn from_flags(flags: u32) -> Self {
        if flags & CRYPT_MACHINE_KEYSET != 0 {
            Scope::Machine
        } else {
            Scope::User
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::User => f.write_str("user"),
            Scope::Machine => f.write_str("machine"),
        }
    }
}

/// Position of a container enumeration request (CRYPT_FIRST / CRYPT_NEXT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCursor {
    First,
    Next,
}

impl EnumCursor {
    pub fn as_raw(&self) -> u32 {
        match self {
            EnumCursor::First => 1,
            EnumCursor::Next => 2,
        }
    }
}

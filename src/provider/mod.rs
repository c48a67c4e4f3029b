// Csputil — Provider Module
//
// The narrow capability interface the rest of the crate uses to reach a
// crypto provider, plus its implementations:
//   - `SoftProvider`: in-process RSA provider, used on every platform and in tests
//   - `CapiProvider`: the Windows CryptoAPI (advapi32) backend, `capi` feature only
//
// Handles returned by a provider are opaque ids; ownership and release are
// managed by the RAII wrappers in `crate::csp`.

mod backend;
#[cfg(all(windows, feature = "capi"))]
mod capi;
pub mod codes;
mod error;
mod keyblob;
mod soft;
mod types;

pub use backend::CryptoProvider;
#[cfg(all(windows, feature = "capi"))]
pub use capi::CapiProvider;
pub use error::{ErrorKind, ProviderError};
pub use soft::{
    SoftContainer, SoftKey, SoftProvider, BASE_PROVIDER_NAME, ENHANCED_PROVIDER_NAME,
};
pub use types::{
    BlobKind, ContextId, EnumCursor, HashAlgorithm, HashId, KeyId, KeySpec, Scope,
    CRYPT_MACHINE_KEYSET, CRYPT_VERIFYCONTEXT, PROV_RSA_AES, PROV_RSA_FULL,
};

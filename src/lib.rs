// Csputil — Library root
//
// Inspects key containers held by a crypto provider, exports key blobs and
// signs digests with provider-held keys. Re-exports the blob, provider, csp,
// enumerator, session, signer, config and CLI modules.

pub mod blob;
pub mod cli;
pub mod config;
pub mod csp;
pub mod enumerator;
pub mod error;
pub mod provider;
pub mod session;
pub mod signer;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CsputilError, Result};

// Csputil — Hash object owner
//
// A hash is fed exactly one way before it is read or signed: either data is
// accumulated with `add_data`, or a precomputed digest is injected with
// `set_digest`. Mixing the two is rejected.

use crate::blob::Blob;
use crate::provider::{
    codes, CryptoProvider, ErrorKind, HashAlgorithm, HashId, KeySpec, ProviderError,
};

use super::{CryptoContext, KeyHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    Empty,
    Accumulated,
    Injected,
}

/// A live hash computation bound to one context and algorithm.
pub struct HashHandle<'c> {
    provider: &'c dyn CryptoProvider,
    id: HashId,
    algorithm: HashAlgorithm,
    feed: Feed,
}

impl<'c> HashHandle<'c> {
    pub fn create(context: &'c CryptoContext<'_>, algorithm: HashAlgorithm) -> Result<Self, ProviderError> {
        let handle = context.require(ErrorKind::HashCreation)?;
        let provider = context.provider();
        let id = provider.create_hash(handle, algorithm).map_err(|e| {
            tracing::warn!("CryptCreateHash({}) failed - {:08x}", algorithm, e.code);
            e
        })?;
        Ok(Self {
            provider,
            id,
            algorithm,
            feed: Feed::Empty,
        })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Feed more bytes into the running digest.
    pub fn add_data(&mut self, data: &[u8]) -> Result<(), ProviderError> {
        if self.feed == Feed::Injected {
            return Err(ProviderError::new(ErrorKind::Hashing, codes::NTE_BAD_HASH_STATE));
        }
        self.provider.hash_data(self.id, data).map_err(|e| {
            tracing::warn!("CryptHashData failed - {:08x}", e.code);
            e
        })?;
        self.feed = Feed::Accumulated;
        Ok(())
    }

    /// Replace the digest with a precomputed value of exactly the
    /// algorithm's digest size.
    pub fn set_digest(&mut self, digest: &[u8]) -> Result<(), ProviderError> {
        if self.feed == Feed::Accumulated {
            return Err(ProviderError::new(ErrorKind::Hashing, codes::NTE_BAD_HASH_STATE));
        }
        let expected = self.provider.hash_size(self.id).map_err(|e| {
            tracing::warn!("CryptGetHashParam failed - {:08x}", e.code);
            e
        })?;
        if digest.len() != expected {
            tracing::warn!(
                "Hash size does not match: got {} bytes, {} expects {}",
                digest.len(),
                self.algorithm,
                expected
            );
            return Err(ProviderError::new(
                ErrorKind::HashSizeMismatch,
                codes::ERROR_INVALID_DATA,
            ));
        }
        self.provider.set_hash_value(self.id, digest).map_err(|e| {
            tracing::warn!("CryptSetHashParam failed - {:08x}", e.code);
            e
        })?;
        self.feed = Feed::Injected;
        Ok(())
    }

    /// The current digest value.
    pub fn digest(&mut self) -> Result<Blob, ProviderError> {
        let value = self.provider.hash_value(self.id).map_err(|e| {
            tracing::warn!("CryptGetHashParam failed - {:08x}", e.code);
            e
        })?;
        Ok(Blob::from(value))
    }

    /// Sign the digest with the key in `spec`'s slot of the owning context.
    pub fn sign(&mut self, spec: KeySpec) -> Result<Blob, ProviderError> {
        let signature = self.provider.sign_hash(self.id, spec).map_err(|e| {
            tracing::warn!("CryptSignHash failed - {:08x}", e.code);
            e
        })?;
        Ok(Blob::from(signature))
    }

    /// Check `signature` against the digest currently held.
    pub fn verify(&mut self, signature: &[u8], public_key: &KeyHandle<'_>) -> Result<bool, ProviderError> {
        let valid = self
            .provider
            .verify_signature(self.id, signature, public_key.id())
            .map_err(|e| {
                tracing::warn!("CryptVerifySignature failed - {:08x}", e.code);
                e
            })?;
        if !valid {
            tracing::debug!("Signature does not match the {} digest", self.algorithm);
        }
        Ok(valid)
    }
}

impl Drop for HashHandle<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.provider.destroy_hash(self.id) {
            tracing::error!("CryptDestroyHash failed - {:08x}", e.code);
        }
    }
}

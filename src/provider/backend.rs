// Csputil — Crypto provider capability
//
// The operations the core needs from a platform crypto provider. Methods map
// one-to-one onto the CryptoAPI calls of the same purpose; variable-length
// results are returned as owned byte vectors so implementations hide the
// probe-size-then-fill protocol.

use super::{
    BlobKind, ContextId, EnumCursor, HashAlgorithm, HashId, KeyId, KeySpec, ProviderError,
};

/// Abstraction over a crypto provider, enabling the Windows CryptoAPI backend
/// and the in-process software provider used on other platforms and in tests.
pub trait CryptoProvider {
    /// Open `container` (or the scope's default container when `None`) under
    /// the named provider. With `CRYPT_VERIFYCONTEXT` no container is opened.
    fn acquire_context(
        &self,
        container: Option<&str>,
        provider: Option<&str>,
        provider_type: u32,
        flags: u32,
    ) -> Result<ContextId, ProviderError>;

    fn release_context(&self, context: ContextId) -> Result<(), ProviderError>;

    /// Fails with [`super::ErrorKind::KeyNotFound`] when the slot is empty.
    fn get_user_key(&self, context: ContextId, spec: KeySpec) -> Result<KeyId, ProviderError>;

    fn destroy_key(&self, key: KeyId) -> Result<(), ProviderError>;

    fn export_key(&self, key: KeyId, kind: BlobKind) -> Result<Vec<u8>, ProviderError>;

    fn create_hash(
        &self,
        context: ContextId,
        algorithm: HashAlgorithm,
    ) -> Result<HashId, ProviderError>;

    fn destroy_hash(&self, hash: HashId) -> Result<(), ProviderError>;

    fn hash_data(&self, hash: HashId, data: &[u8]) -> Result<(), ProviderError>;

    /// Digest size in bytes for the hash's algorithm (HP_HASHSIZE).
    fn hash_size(&self, hash: HashId) -> Result<usize, ProviderError>;

    /// Current digest value (HP_HASHVAL). Finalizes an accumulating hash.
    fn hash_value(&self, hash: HashId) -> Result<Vec<u8>, ProviderError>;

    /// Replace the digest with a precomputed value (HP_HASHVAL).
    fn set_hash_value(&self, hash: HashId, value: &[u8]) -> Result<(), ProviderError>;

    /// Sign the hash with the given key slot of the hash's context.
    fn sign_hash(&self, hash: HashId, spec: KeySpec) -> Result<Vec<u8>, ProviderError>;

    /// `Ok(false)` when the signature does not match the digest.
    fn verify_signature(
        &self,
        hash: HashId,
        signature: &[u8],
        key: KeyId,
    ) -> Result<bool, ProviderError>;

    /// Registered provider type at `index`, `None` once exhausted.
    fn enum_provider_types(&self, index: u32) -> Result<Option<(u32, String)>, ProviderError>;

    /// Registered provider at `index` as (type, name), `None` once exhausted.
    fn enum_providers(&self, index: u32) -> Result<Option<(u32, String)>, ProviderError>;

    /// Next container name visible to `context`, `None` once exhausted.
    fn enum_containers(
        &self,
        context: ContextId,
        cursor: EnumCursor,
    ) -> Result<Option<String>, ProviderError>;
}

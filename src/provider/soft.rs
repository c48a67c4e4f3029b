// Csputil — Software Crypto Provider
//
// An in-process provider with CryptoAPI semantics: registered provider types
// and names, user/machine key stores holding named containers with an
// exchange and a signature slot, MD5/SHA1/SHA256 hash objects and RSA
// PKCS#1 v1.5 signatures emitted little-endian. Containers live for the
// lifetime of the provider only.
//
// All state sits behind one mutex so the provider is Send + Sync; handles are
// plain integers into that state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use md5::Md5;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha1::Sha1;
use sha2::digest::DynDigest;
use sha2::Sha256;

use super::{
    codes, keyblob, BlobKind, ContextId, CryptoProvider, EnumCursor, ErrorKind, HashAlgorithm,
    HashId, KeyId, KeySpec, ProviderError, Scope, CRYPT_MACHINE_KEYSET, CRYPT_VERIFYCONTEXT,
    PROV_RSA_AES, PROV_RSA_FULL,
};

// ─── Constants ───────────────────────────────────────────────────────────────

pub const BASE_PROVIDER_NAME: &str = "Csputil Base Software Provider";
pub const ENHANCED_PROVIDER_NAME: &str = "Csputil Enhanced RSA and AES Software Provider";

/// Provider type used when the caller passes type 0.
const DEFAULT_PROVIDER_TYPE: u32 = PROV_RSA_AES;

// ─── Containers ──────────────────────────────────────────────────────────────

/// A key held in one slot of a container.
#[derive(Clone)]
pub struct SoftKey {
    key: Arc<RsaPrivateKey>,
    exportable: bool,
}

impl SoftKey {
    pub fn new(key: RsaPrivateKey, exportable: bool) -> Self {
        Self {
            key: Arc::new(key),
            exportable,
        }
    }
}

/// A named keyset in the user or machine key store.
#[derive(Clone)]
pub struct SoftContainer {
    name: String,
    scope: Scope,
    exchange: Option<SoftKey>,
    signature: Option<SoftKey>,
    default: bool,
}

impl SoftContainer {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
            exchange: None,
            signature: None,
            default: false,
        }
    }

    /// Place `key` in the given slot.
    pub fn with_key(mut self, spec: KeySpec, key: SoftKey) -> Self {
        match spec {
            KeySpec::Exchange => self.exchange = Some(key),
            KeySpec::Signature => self.signature = Some(key),
        }
        self
    }

    /// Mark this container as the one opened when no name is given.
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    fn slot(&self, spec: KeySpec) -> Option<&SoftKey> {
        match spec {
            KeySpec::Exchange => self.exchange.as_ref(),
            KeySpec::Signature => self.signature.as_ref(),
        }
    }
}

// ─── Handle state ────────────────────────────────────────────────────────────

struct ContextEntry {
    scope: Scope,
    /// Index into `State::containers`; `None` for verify-only contexts.
    container: Option<usize>,
    enum_pos: usize,
}

struct KeyEntry {
    spec: KeySpec,
    key: SoftKey,
}

enum HashState {
    Open(Box<dyn DynDigest + Send>),
    Final(Vec<u8>),
}

struct HashEntry {
    context: usize,
    algorithm: HashAlgorithm,
    state: HashState,
}

impl HashEntry {
    /// The digest, finalizing the hash if it is still accumulating.
    fn finish(&mut self) -> Vec<u8> {
        let value = match std::mem::replace(&mut self.state, HashState::Final(Vec::new())) {
            HashState::Open(digest) => digest.finalize().into_vec(),
            HashState::Final(value) => value,
        };
        self.state = HashState::Final(value.clone());
        value
    }
}

#[derive(Default)]
struct State {
    next_handle: usize,
    containers: Vec<SoftContainer>,
    contexts: HashMap<usize, ContextEntry>,
    keys: HashMap<usize, KeyEntry>,
    hashes: HashMap<usize, HashEntry>,
}

impl State {
    fn allocate_handle(&mut self) -> usize {
        self.next_handle += 1;
        self.next_handle
    }

    fn find_container(&self, scope: Scope, name: Option<&str>) -> Option<usize> {
        self.containers.iter().position(|c| {
            c.scope == scope
                && match name {
                    Some(name) => c.name == name,
                    None => c.default,
                }
        })
    }

    fn context_entry(&mut self, id: usize, kind: ErrorKind) -> Result<&mut ContextEntry, ProviderError> {
        self.contexts
            .get_mut(&id)
            .ok_or(ProviderError::new(kind, codes::NTE_BAD_UID))
    }

    fn hash_entry(&mut self, id: usize, kind: ErrorKind) -> Result<&mut HashEntry, ProviderError> {
        self.hashes
            .get_mut(&id)
            .ok_or(ProviderError::new(kind, codes::NTE_BAD_HASH))
    }
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// In-process provider with CryptoAPI semantics.
pub struct SoftProvider {
    provider_types: Vec<(u32, String)>,
    providers: Vec<(u32, String)>,
    state: Mutex<State>,
}

impl SoftProvider {
    /// A provider with the standard registrations and an empty key store.
    pub fn new() -> Self {
        Self {
            provider_types: vec![
                (PROV_RSA_FULL, "RSA Full (Signature and Key Exchange)".to_string()),
                (PROV_RSA_AES, "RSA Full and AES".to_string()),
            ],
            providers: vec![
                (PROV_RSA_FULL, BASE_PROVIDER_NAME.to_string()),
                (PROV_RSA_AES, ENHANCED_PROVIDER_NAME.to_string()),
            ],
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_container(self, container: SoftContainer) -> Self {
        self.add_container(container);
        self
    }

    /// Add a container to the key store, replacing one with the same name and scope.
    pub fn add_container(&self, container: SoftContainer) {
        let mut state = self.state();
        tracing::debug!(
            "Registering container '{}' in the {} key store",
            container.name,
            container.scope
        );
        match state.find_container(container.scope, Some(&container.name)) {
            Some(index) => state.containers[index] = container,
            None => state.containers.push(container),
        }
    }

    /// Number of live handles of every kind. Zero once all RAII owners dropped.
    pub fn open_handles(&self) -> usize {
        let state = self.state();
        state.contexts.len() + state.keys.len() + state.hashes.len()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve (name, type) to a registered provider, CryptoAPI style: type 0
    /// means the default type, a missing name the first provider of that type.
    fn resolve_provider(&self, name: Option<&str>, provider_type: u32) -> Result<&str, ProviderError> {
        let wanted_type = if provider_type == 0 {
            DEFAULT_PROVIDER_TYPE
        } else {
            provider_type
        };
        match name {
            Some(name) => {
                let (registered_type, name) = self
                    .providers
                    .iter()
                    .find(|(_, n)| n == name)
                    .ok_or(ProviderError::new(
                        ErrorKind::ContextAcquisition,
                        codes::NTE_KEYSET_NOT_DEF,
                    ))?;
                if provider_type != 0 && *registered_type != provider_type {
                    return Err(ProviderError::new(
                        ErrorKind::ContextAcquisition,
                        codes::NTE_PROV_TYPE_NO_MATCH,
                    ));
                }
                Ok(name)
            }
            None => self
                .providers
                .iter()
                .find(|(t, _)| *t == wanted_type)
                .map(|(_, n)| n.as_str())
                .ok_or(ProviderError::new(
                    ErrorKind::ContextAcquisition,
                    codes::NTE_PROV_TYPE_NOT_DEF,
                )),
        }
    }
}

impl Default for SoftProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn new_digest(algorithm: HashAlgorithm) -> Box<dyn DynDigest + Send> {
    match algorithm {
        HashAlgorithm::Md5 => Box::new(Md5::default()),
        HashAlgorithm::Sha1 => Box::new(Sha1::default()),
        HashAlgorithm::Sha256 => Box::new(Sha256::default()),
    }
}

fn pkcs1_scheme(algorithm: HashAlgorithm) -> Pkcs1v15Sign {
    match algorithm {
        HashAlgorithm::Md5 => Pkcs1v15Sign::new::<Md5>(),
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
    }
}

impl CryptoProvider for SoftProvider {
    fn acquire_context(
        &self,
        container: Option<&str>,
        provider: Option<&str>,
        provider_type: u32,
        flags: u32,
    ) -> Result<ContextId, ProviderError> {
        if flags & !(CRYPT_VERIFYCONTEXT | CRYPT_MACHINE_KEYSET) != 0 {
            return Err(ProviderError::new(ErrorKind::ContextAcquisition, codes::NTE_BAD_FLAGS));
        }
        let provider_name = self.resolve_provider(provider, provider_type)?;
        let verify_only = flags & CRYPT_VERIFYCONTEXT == CRYPT_VERIFYCONTEXT;
        let scope = Scope::from_flags(flags);

        let mut state = self.state();
        let container = if verify_only {
            if container.is_some() {
                return Err(ProviderError::new(ErrorKind::ContextAcquisition, codes::NTE_BAD_FLAGS));
            }
            None
        } else {
            let index = state.find_container(scope, container).ok_or(ProviderError::new(
                ErrorKind::ContextAcquisition,
                codes::NTE_BAD_KEYSET,
            ))?;
            Some(index)
        };

        let handle = state.allocate_handle();
        state.contexts.insert(
            handle,
            ContextEntry {
                scope,
                container,
                enum_pos: 0,
            },
        );
        tracing::debug!(
            "Acquired context {} on '{}' ({} store, container: {:?})",
            handle,
            provider_name,
            scope,
            container.map(|i| state.containers[i].name.clone())
        );
        Ok(ContextId::from_raw(handle))
    }

    fn release_context(&self, context: ContextId) -> Result<(), ProviderError> {
        self.state()
            .contexts
            .remove(&context.as_raw())
            .map(|_| ())
            .ok_or(ProviderError::new(ErrorKind::InvalidHandle, codes::NTE_BAD_UID))
    }

    fn get_user_key(&self, context: ContextId, spec: KeySpec) -> Result<KeyId, ProviderError> {
        let mut state = self.state();
        let container = state
            .context_entry(context.as_raw(), ErrorKind::KeyRetrieval)?
            .container
            .ok_or(ProviderError::new(ErrorKind::KeyRetrieval, codes::NTE_BAD_KEYSET))?;
        let key = state.containers[container]
            .slot(spec)
            .cloned()
            .ok_or(ProviderError::new(ErrorKind::KeyNotFound, codes::NTE_NO_KEY))?;

        let handle = state.allocate_handle();
        state.keys.insert(handle, KeyEntry { spec, key });
        Ok(KeyId::from_raw(handle))
    }

    fn destroy_key(&self, key: KeyId) -> Result<(), ProviderError> {
        self.state()
            .keys
            .remove(&key.as_raw())
            .map(|_| ())
            .ok_or(ProviderError::new(ErrorKind::InvalidHandle, codes::NTE_BAD_KEY))
    }

    fn export_key(&self, key: KeyId, kind: BlobKind) -> Result<Vec<u8>, ProviderError> {
        let state = self.state();
        let entry = state
            .keys
            .get(&key.as_raw())
            .ok_or(ProviderError::new(ErrorKind::KeyExport, codes::NTE_BAD_KEY))?;
        if kind == BlobKind::Private && !entry.key.exportable {
            return Err(ProviderError::new(ErrorKind::KeyExport, codes::NTE_BAD_KEY_STATE));
        }
        keyblob::encode(&entry.key.key, entry.spec, kind)
    }

    fn create_hash(
        &self,
        context: ContextId,
        algorithm: HashAlgorithm,
    ) -> Result<HashId, ProviderError> {
        let mut state = self.state();
        state.context_entry(context.as_raw(), ErrorKind::HashCreation)?;
        let handle = state.allocate_handle();
        state.hashes.insert(
            handle,
            HashEntry {
                context: context.as_raw(),
                algorithm,
                state: HashState::Open(new_digest(algorithm)),
            },
        );
        Ok(HashId::from_raw(handle))
    }

    fn destroy_hash(&self, hash: HashId) -> Result<(), ProviderError> {
        self.state()
            .hashes
            .remove(&hash.as_raw())
            .map(|_| ())
            .ok_or(ProviderError::new(ErrorKind::InvalidHandle, codes::NTE_BAD_HASH))
    }

    fn hash_data(&self, hash: HashId, data: &[u8]) -> Result<(), ProviderError> {
        let mut state = self.state();
        match &mut state.hash_entry(hash.as_raw(), ErrorKind::Hashing)?.state {
            HashState::Open(digest) => {
                digest.update(data);
                Ok(())
            }
            HashState::Final(_) => Err(ProviderError::new(
                ErrorKind::Hashing,
                codes::NTE_BAD_HASH_STATE,
            )),
        }
    }

    fn hash_size(&self, hash: HashId) -> Result<usize, ProviderError> {
        let mut state = self.state();
        Ok(state.hash_entry(hash.as_raw(), ErrorKind::Hashing)?.algorithm.digest_len())
    }

    fn hash_value(&self, hash: HashId) -> Result<Vec<u8>, ProviderError> {
        let mut state = self.state();
        Ok(state.hash_entry(hash.as_raw(), ErrorKind::Hashing)?.finish())
    }

    fn set_hash_value(&self, hash: HashId, value: &[u8]) -> Result<(), ProviderError> {
        let mut state = self.state();
        let entry = state.hash_entry(hash.as_raw(), ErrorKind::Hashing)?;
        if value.len() != entry.algorithm.digest_len() {
            return Err(ProviderError::new(ErrorKind::HashSizeMismatch, codes::NTE_BAD_DATA));
        }
        entry.state = HashState::Final(value.to_vec());
        Ok(())
    }

    fn sign_hash(&self, hash: HashId, spec: KeySpec) -> Result<Vec<u8>, ProviderError> {
        let mut state = self.state();
        let context = state.hash_entry(hash.as_raw(), ErrorKind::Signing)?.context;
        let container = state
            .context_entry(context, ErrorKind::Signing)?
            .container
            .ok_or(ProviderError::new(ErrorKind::Signing, codes::NTE_BAD_KEYSET))?;
        let key = state.containers[container]
            .slot(spec)
            .map(|k| Arc::clone(&k.key))
            .ok_or(ProviderError::new(ErrorKind::KeyNotFound, codes::NTE_NO_KEY))?;

        let entry = state.hash_entry(hash.as_raw(), ErrorKind::Signing)?;
        let digest = entry.finish();
        let mut signature = key.sign(pkcs1_scheme(entry.algorithm), &digest).map_err(|e| {
            tracing::warn!("RSA signing failed: {}", e);
            ProviderError::new(ErrorKind::Signing, codes::NTE_BAD_DATA)
        })?;
        // CryptoAPI emits signatures least significant byte first.
        signature.reverse();
        Ok(signature)
    }

    fn verify_signature(
        &self,
        hash: HashId,
        signature: &[u8],
        key: KeyId,
    ) -> Result<bool, ProviderError> {
        let mut state = self.state();
        let public = state
            .keys
            .get(&key.as_raw())
            .map(|k| k.key.key.to_public_key())
            .ok_or(ProviderError::new(ErrorKind::Verification, codes::NTE_BAD_KEY))?;

        let entry = state.hash_entry(hash.as_raw(), ErrorKind::Verification)?;
        let digest = entry.finish();
        let big_endian: Vec<u8> = signature.iter().rev().copied().collect();
        match public.verify(pkcs1_scheme(entry.algorithm), &digest, &big_endian) {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::debug!("Signature rejected: {}", e);
                Ok(false)
            }
        }
    }

    fn enum_provider_types(&self, index: u32) -> Result<Option<(u32, String)>, ProviderError> {
        Ok(self.provider_types.get(index as usize).cloned())
    }

    fn enum_providers(&self, index: u32) -> Result<Option<(u32, String)>, ProviderError> {
        Ok(self.providers.get(index as usize).cloned())
    }

    fn enum_containers(
        &self,
        context: ContextId,
        cursor: EnumCursor,
    ) -> Result<Option<String>, ProviderError> {
        let mut state = self.state();
        let entry = state.context_entry(context.as_raw(), ErrorKind::Enumeration)?;
        if cursor == EnumCursor::First {
            entry.enum_pos = 0;
        }
        let (scope, skip) = (entry.scope, entry.enum_pos);
        entry.enum_pos += 1;

        Ok(state
            .containers
            .iter()
            .filter(|c| c.scope == scope)
            .nth(skip)
            .map(|c| c.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn verify_context(provider: &SoftProvider, flags: u32) -> ContextId {
        provider
            .acquire_context(None, None, PROV_RSA_AES, CRYPT_VERIFYCONTEXT | flags)
            .unwrap()
    }

    #[test]
    fn test_registrations_enumerate_in_order() {
        let provider = SoftProvider::new();
        assert_eq!(provider.enum_provider_types(0).unwrap().unwrap().0, PROV_RSA_FULL);
        assert_eq!(provider.enum_provider_types(1).unwrap().unwrap().0, PROV_RSA_AES);
        assert!(provider.enum_provider_types(2).unwrap().is_none());
        assert_eq!(
            provider.enum_providers(1).unwrap(),
            Some((PROV_RSA_AES, ENHANCED_PROVIDER_NAME.to_string()))
        );
    }

    #[test]
    fn test_acquire_unknown_container_fails() {
        let provider = testing::soft_provider();
        let err = provider
            .acquire_context(Some("missing"), None, PROV_RSA_AES, 0)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ContextAcquisition);
        assert_eq!(err.code, codes::NTE_BAD_KEYSET);
    }

    #[test]
    fn test_acquire_respects_scope() {
        let provider = testing::soft_provider();
        assert!(provider
            .acquire_context(Some(testing::MACHINE_CONTAINER), None, 0, 0)
            .is_err());
        assert!(provider
            .acquire_context(Some(testing::MACHINE_CONTAINER), None, 0, CRYPT_MACHINE_KEYSET)
            .is_ok());
    }

    #[test]
    fn test_acquire_rejects_provider_type_mismatch() {
        let provider = testing::soft_provider();
        let err = provider
            .acquire_context(None, Some(BASE_PROVIDER_NAME), PROV_RSA_AES, CRYPT_VERIFYCONTEXT)
            .unwrap_err();
        assert_eq!(err.code, codes::NTE_PROV_TYPE_NO_MATCH);

        let err = provider
            .acquire_context(None, Some("No Such Provider"), 0, CRYPT_VERIFYCONTEXT)
            .unwrap_err();
        assert_eq!(err.code, codes::NTE_KEYSET_NOT_DEF);
    }

    #[test]
    fn test_default_container_is_used_without_name() {
        let provider = testing::soft_provider();
        let ctx = provider.acquire_context(None, None, 0, 0).unwrap();
        assert!(provider.get_user_key(ctx, KeySpec::Signature).is_ok());
    }

    #[test]
    fn test_verify_context_has_no_keys() {
        let provider = testing::soft_provider();
        let ctx = verify_context(&provider, 0);
        let err = provider.get_user_key(ctx, KeySpec::Exchange).unwrap_err();
        assert!(!err.is_no_key());
        assert_eq!(err.code, codes::NTE_BAD_KEYSET);
    }

    #[test]
    fn test_empty_slot_reports_no_key() {
        let provider = testing::soft_provider();
        let ctx = provider
            .acquire_context(Some(testing::SIGNATURE_ONLY_CONTAINER), None, 0, 0)
            .unwrap();
        let err = provider.get_user_key(ctx, KeySpec::Exchange).unwrap_err();
        assert!(err.is_no_key());
        assert_eq!(err.code, codes::NTE_NO_KEY);
    }

    #[test]
    fn test_container_enumeration_until_exhausted() {
        let provider = testing::soft_provider();
        let ctx = verify_context(&provider, 0);

        let mut names = Vec::new();
        let mut cursor = EnumCursor::First;
        while let Some(name) = provider.enum_containers(ctx, cursor).unwrap() {
            names.push(name);
            cursor = EnumCursor::Next;
        }
        assert_eq!(names.len(), 3);
        assert!(!names.contains(&testing::MACHINE_CONTAINER.to_string()));

        // CRYPT_FIRST restarts the walk.
        assert!(provider.enum_containers(ctx, EnumCursor::First).unwrap().is_some());
    }

    #[test]
    fn test_hash_known_answers() {
        let provider = SoftProvider::new();
        let ctx = verify_context(&provider, 0);
        for (algorithm, expected) in [
            (HashAlgorithm::Md5, "5d41402abc4b2a76b9719d911017c592"),
            (HashAlgorithm::Sha1, "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"),
            (
                HashAlgorithm::Sha256,
                "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            ),
        ] {
            let hash = provider.create_hash(ctx, algorithm).unwrap();
            provider.hash_data(hash, b"hel").unwrap();
            provider.hash_data(hash, b"lo").unwrap();
            assert_eq!(hex::encode(provider.hash_value(hash).unwrap()), expected);
        }
    }

    #[test]
    fn test_hash_data_after_finalize_fails() {
        let provider = SoftProvider::new();
        let ctx = verify_context(&provider, 0);
        let hash = provider.create_hash(ctx, HashAlgorithm::Sha1).unwrap();
        provider.hash_value(hash).unwrap();
        let err = provider.hash_data(hash, b"late").unwrap_err();
        assert_eq!(err.code, codes::NTE_BAD_HASH_STATE);
    }

    #[test]
    fn test_sign_matches_reference_vector() {
        let provider = testing::soft_provider();
        let ctx = provider
            .acquire_context(Some(testing::FULL_CONTAINER), None, 0, 0)
            .unwrap();
        let hash = provider.create_hash(ctx, HashAlgorithm::Sha256).unwrap();
        provider.hash_data(hash, b"hello").unwrap();

        let mut signature = provider.sign_hash(hash, KeySpec::Signature).unwrap();
        signature.reverse();
        assert_eq!(hex::encode(signature), testing::HELLO_SHA256_SIGNATURE_BE);
    }

    #[test]
    fn test_released_context_rejects_key_and_sign() {
        let provider = testing::soft_provider();
        let ctx = provider
            .acquire_context(Some(testing::FULL_CONTAINER), None, 0, 0)
            .unwrap();
        let hash = provider.create_hash(ctx, HashAlgorithm::Sha256).unwrap();
        provider.hash_data(hash, b"hello").unwrap();
        provider.release_context(ctx).unwrap();

        let err = provider.get_user_key(ctx, KeySpec::Signature).unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyRetrieval);
        assert_eq!(err.code, codes::NTE_BAD_UID);

        let err = provider.sign_hash(hash, KeySpec::Signature).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signing);
        assert_eq!(err.code, codes::NTE_BAD_UID);
    }

    #[test]
    fn test_sign_then_verify() {
        let provider = testing::soft_provider();
        let ctx = provider
            .acquire_context(Some(testing::FULL_CONTAINER), None, 0, 0)
            .unwrap();
        let key = provider.get_user_key(ctx, KeySpec::Exchange).unwrap();

        let hash = provider.create_hash(ctx, HashAlgorithm::Sha1).unwrap();
        provider.hash_data(hash, b"payload").unwrap();
        let signature = provider.sign_hash(hash, KeySpec::Exchange).unwrap();
        assert!(provider.verify_signature(hash, &signature, key).unwrap());

        let mut tampered = signature.clone();
        tampered[0] ^= 0x01;
        assert!(!provider.verify_signature(hash, &tampered, key).unwrap());
    }

    #[test]
    fn test_set_hash_value_checks_size() {
        let provider = SoftProvider::new();
        let ctx = verify_context(&provider, 0);
        let hash = provider.create_hash(ctx, HashAlgorithm::Sha256).unwrap();
        let err = provider.set_hash_value(hash, &[0u8; 20]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::HashSizeMismatch);
        provider.set_hash_value(hash, &[0u8; 32]).unwrap();
        assert_eq!(provider.hash_value(hash).unwrap(), vec![0u8; 32]);
    }

    #[test]
    fn test_private_export_requires_exportable_key() {
        let provider = testing::soft_provider();
        let ctx = provider
            .acquire_context(Some(testing::SIGNATURE_ONLY_CONTAINER), None, 0, 0)
            .unwrap();
        let key = provider.get_user_key(ctx, KeySpec::Signature).unwrap();

        assert!(provider.export_key(key, BlobKind::Public).is_ok());
        let err = provider.export_key(key, BlobKind::Private).unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyExport);
        assert_eq!(err.code, codes::NTE_BAD_KEY_STATE);
    }

    #[test]
    fn test_release_unknown_context_fails() {
        let provider = SoftProvider::new();
        let ctx = verify_context(&provider, 0);
        provider.release_context(ctx).unwrap();
        assert!(provider.release_context(ctx).is_err());
        assert_eq!(provider.open_handles(), 0);
    }
}

// Csputil — Windows CryptoAPI backend
//
// Thin wrapper over the advapi32 Crypt* functions. Handles are passed through
// as opaque ids; release is driven by the RAII wrappers in `crate::csp`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Security::Cryptography;

use super::{
    codes, BlobKind, ContextId, CryptoProvider, EnumCursor, ErrorKind, HashAlgorithm, HashId,
    KeyId, KeySpec, ProviderError,
};

const HP_HASHVAL: u32 = 0x0002;
const HP_HASHSIZE: u32 = 0x0004;
const PP_ENUMCONTAINERS: u32 = 0x0002;

/// The platform CryptoAPI.
#[derive(Debug, Default)]
pub struct CapiProvider {
    /// Longest container name per enumerating context, probed on CRYPT_FIRST.
    name_sizes: Mutex<HashMap<usize, u32>>,
}

impl CapiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_sizes(&self) -> MutexGuard<'_, HashMap<usize, u32>> {
        self.name_sizes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Size in bytes of the largest container name visible to `context`.
    #[allow(unsafe_code)]
    fn probe_name_size(&self, context: ContextId) -> Result<u32, ProviderError> {
        let mut size = 0u32;
        // SAFETY: a null buffer with CRYPT_FIRST asks for the longest name.
        unsafe {
            Cryptography::CryptGetProvParam(
                context.as_raw(),
                PP_ENUMCONTAINERS,
                None,
                &mut size,
                EnumCursor::First.as_raw(),
            )
        }
        .map_err(|e| fail(ErrorKind::Enumeration, e))?;
        self.name_sizes().insert(context.as_raw(), size);
        Ok(size)
    }
}

/// Native code carried by a failed call. Win32 errors wrapped as HRESULTs are
/// unwrapped so that e.g. ERROR_NO_MORE_ITEMS compares equal to its constant.
fn native_code(error: &windows::core::Error) -> u32 {
    let code = error.code().0 as u32;
    if code & 0xFFFF_0000 == 0x8007_0000 {
        code & 0xFFFF
    } else {
        code
    }
}

fn fail(kind: ErrorKind, error: windows::core::Error) -> ProviderError {
    ProviderError::from_code(kind, native_code(&error))
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn from_wide(buffer: &[u16]) -> String {
    let end = buffer.iter().position(|c| *c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..end])
}

type EnumFn = unsafe fn(u32, Option<*const u32>, u32, *mut u32, PWSTR, *mut u32) -> windows::core::Result<()>;

/// Probe the name size of registration `index`, then fetch it.
#[allow(unsafe_code)]
fn enum_registration(enumerate: EnumFn, index: u32) -> Result<Option<(u32, String)>, ProviderError> {
    let mut provider_type = 0u32;
    let mut size = 0u32;
    // SAFETY: a null name buffer asks for the required size in bytes.
    let probe = unsafe {
        enumerate(index, None, 0, &mut provider_type, PWSTR::null(), &mut size)
    };
    match probe {
        Ok(()) => {}
        Err(e) if native_code(&e) == codes::ERROR_NO_MORE_ITEMS => return Ok(None),
        Err(e) => return Err(fail(ErrorKind::Enumeration, e)),
    }

    let mut name = vec![0u16; (size as usize).div_ceil(2)];
    // SAFETY: `name` holds `size` bytes.
    unsafe {
        enumerate(
            index,
            None,
            0,
            &mut provider_type,
            PWSTR::from_raw(name.as_mut_ptr()),
            &mut size,
        )
    }
    .map_err(|e| fail(ErrorKind::Enumeration, e))?;
    Ok(Some((provider_type, from_wide(&name))))
}

impl CryptoProvider for CapiProvider {
    #[allow(unsafe_code)]
    fn acquire_context(
        &self,
        container: Option<&str>,
        provider: Option<&str>,
        provider_type: u32,
        flags: u32,
    ) -> Result<ContextId, ProviderError> {
        let container = container.map(wide);
        let provider = provider.map(wide);
        let as_pcwstr = |s: &Option<Vec<u16>>| match s {
            Some(s) => PCWSTR::from_raw(s.as_ptr()),
            None => PCWSTR::null(),
        };

        let mut handle = 0usize;
        // SAFETY: both strings outlive the call and are NUL-terminated.
        unsafe {
            Cryptography::CryptAcquireContextW(
                &mut handle,
                as_pcwstr(&container),
                as_pcwstr(&provider),
                provider_type,
                flags,
            )
        }
        .map_err(|e| fail(ErrorKind::ContextAcquisition, e))?;
        Ok(ContextId::from_raw(handle))
    }

    #[allow(unsafe_code)]
    fn release_context(&self, context: ContextId) -> Result<(), ProviderError> {
        self.name_sizes().remove(&context.as_raw());
        // SAFETY: the handle came from CryptAcquireContextW and is released once.
        unsafe { Cryptography::CryptReleaseContext(context.as_raw(), 0) }
            .map_err(|e| fail(ErrorKind::InvalidHandle, e))
    }

    #[allow(unsafe_code)]
    fn get_user_key(&self, context: ContextId, spec: KeySpec) -> Result<KeyId, ProviderError> {
        let mut key = 0usize;
        // SAFETY: `context` is a live provider handle.
        unsafe { Cryptography::CryptGetUserKey(context.as_raw(), spec.as_raw(), &mut key) }
            .map_err(|e| fail(ErrorKind::KeyRetrieval, e))?;
        Ok(KeyId::from_raw(key))
    }

    #[allow(unsafe_code)]
    fn destroy_key(&self, key: KeyId) -> Result<(), ProviderError> {
        // SAFETY: the key handle is destroyed once.
        unsafe { Cryptography::CryptDestroyKey(key.as_raw()) }
            .map_err(|e| fail(ErrorKind::InvalidHandle, e))
    }

    #[allow(unsafe_code)]
    fn export_key(&self, key: KeyId, kind: BlobKind) -> Result<Vec<u8>, ProviderError> {
        let flags = Cryptography::CRYPT_KEY_FLAGS(0);
        let mut size = 0u32;
        // SAFETY: a null buffer asks for the blob size.
        unsafe { Cryptography::CryptExportKey(key.as_raw(), 0, kind.as_raw(), flags, None, &mut size) }
            .map_err(|e| fail(ErrorKind::KeyExport, e))?;

        let mut blob = vec![0u8; size as usize];
        // SAFETY: `blob` holds `size` bytes.
        unsafe {
            Cryptography::CryptExportKey(
                key.as_raw(),
                0,
                kind.as_raw(),
                flags,
                Some(blob.as_mut_ptr()),
                &mut size,
            )
        }
        .map_err(|e| fail(ErrorKind::KeyExport, e))?;
        blob.truncate(size as usize);
        Ok(blob)
    }

    #[allow(unsafe_code)]
    fn create_hash(
        &self,
        context: ContextId,
        algorithm: HashAlgorithm,
    ) -> Result<HashId, ProviderError> {
        let mut hash = 0usize;
        // SAFETY: `context` is a live provider handle.
        unsafe { Cryptography::CryptCreateHash(context.as_raw(), algorithm.alg_id(), 0, 0, &mut hash) }
            .map_err(|e| fail(ErrorKind::HashCreation, e))?;
        Ok(HashId::from_raw(hash))
    }

    #[allow(unsafe_code)]
    fn destroy_hash(&self, hash: HashId) -> Result<(), ProviderError> {
        // SAFETY: the hash handle is destroyed once.
        unsafe { Cryptography::CryptDestroyHash(hash.as_raw()) }
            .map_err(|e| fail(ErrorKind::InvalidHandle, e))
    }

    #[allow(unsafe_code)]
    fn hash_data(&self, hash: HashId, data: &[u8]) -> Result<(), ProviderError> {
        // SAFETY: `hash` is a live hash handle.
        unsafe { Cryptography::CryptHashData(hash.as_raw(), data, 0) }
            .map_err(|e| fail(ErrorKind::Hashing, e))
    }

    #[allow(unsafe_code)]
    fn hash_size(&self, hash: HashId) -> Result<usize, ProviderError> {
        let mut value = 0u32;
        let mut size = std::mem::size_of::<u32>() as u32;
        // SAFETY: HP_HASHSIZE writes one DWORD.
        unsafe {
            Cryptography::CryptGetHashParam(
                hash.as_raw(),
                HP_HASHSIZE,
                Some(&mut value as *mut u32 as *mut u8),
                &mut size,
                0,
            )
        }
        .map_err(|e| fail(ErrorKind::Hashing, e))?;
        Ok(value as usize)
    }

    #[allow(unsafe_code)]
    fn hash_value(&self, hash: HashId) -> Result<Vec<u8>, ProviderError> {
        let mut digest = vec![0u8; self.hash_size(hash)?];
        let mut size = digest.len() as u32;
        // SAFETY: `digest` holds HP_HASHSIZE bytes.
        unsafe {
            Cryptography::CryptGetHashParam(
                hash.as_raw(),
                HP_HASHVAL,
                Some(digest.as_mut_ptr()),
                &mut size,
                0,
            )
        }
        .map_err(|e| fail(ErrorKind::Hashing, e))?;
        digest.truncate(size as usize);
        Ok(digest)
    }

    #[allow(unsafe_code)]
    fn set_hash_value(&self, hash: HashId, value: &[u8]) -> Result<(), ProviderError> {
        let expected = self.hash_size(hash)?;
        if value.len() != expected {
            return Err(ProviderError::new(
                ErrorKind::HashSizeMismatch,
                codes::ERROR_INVALID_DATA,
            ));
        }
        // SAFETY: HP_HASHVAL reads exactly HP_HASHSIZE bytes, checked above.
        unsafe {
            Cryptography::CryptSetHashParam(
                hash.as_raw(),
                Cryptography::CRYPT_SET_HASH_PARAM(HP_HASHVAL),
                value.as_ptr(),
                0,
            )
        }
        .map_err(|e| fail(ErrorKind::Hashing, e))
    }

    #[allow(unsafe_code)]
    fn sign_hash(&self, hash: HashId, spec: KeySpec) -> Result<Vec<u8>, ProviderError> {
        let mut size = 0u32;
        // SAFETY: a null buffer asks for the signature size.
        unsafe {
            Cryptography::CryptSignHashW(hash.as_raw(), spec.as_raw(), PCWSTR::null(), 0, None, &mut size)
        }
        .map_err(|e| fail(ErrorKind::Signing, e))?;

        let mut signature = vec![0u8; size as usize];
        // SAFETY: `signature` holds `size` bytes.
        unsafe {
            Cryptography::CryptSignHashW(
                hash.as_raw(),
                spec.as_raw(),
                PCWSTR::null(),
                0,
                Some(signature.as_mut_ptr()),
                &mut size,
            )
        }
        .map_err(|e| fail(ErrorKind::Signing, e))?;
        signature.truncate(size as usize);
        Ok(signature)
    }

    #[allow(unsafe_code)]
    fn verify_signature(
        &self,
        hash: HashId,
        signature: &[u8],
        key: KeyId,
    ) -> Result<bool, ProviderError> {
        // SAFETY: `hash` and `key` are live handles of the same context.
        let result = unsafe {
            Cryptography::CryptVerifySignatureW(hash.as_raw(), signature, key.as_raw(), PCWSTR::null(), 0)
        };
        match result {
            Ok(()) => Ok(true),
            Err(e) if native_code(&e) == codes::NTE_BAD_SIGNATURE => Ok(false),
            Err(e) => Err(fail(ErrorKind::Verification, e)),
        }
    }

    fn enum_provider_types(&self, index: u32) -> Result<Option<(u32, String)>, ProviderError> {
        enum_registration(Cryptography::CryptEnumProviderTypesW, index)
    }

    fn enum_providers(&self, index: u32) -> Result<Option<(u32, String)>, ProviderError> {
        enum_registration(Cryptography::CryptEnumProvidersW, index)
    }

    #[allow(unsafe_code)]
    fn enum_containers(
        &self,
        context: ContextId,
        cursor: EnumCursor,
    ) -> Result<Option<String>, ProviderError> {
        let probed = match cursor {
            EnumCursor::First => None,
            EnumCursor::Next => self.name_sizes().get(&context.as_raw()).copied(),
        };
        let capacity = match probed {
            Some(size) => size,
            None => match self.probe_name_size(context) {
                Ok(size) => size,
                Err(e) if e.code == codes::ERROR_NO_MORE_ITEMS => return Ok(None),
                Err(e) => return Err(e),
            },
        };

        let mut name = vec![0u8; capacity as usize];
        let mut size = capacity;
        // SAFETY: `name` holds `size` bytes; PP_ENUMCONTAINERS writes an ANSI string.
        let result = unsafe {
            Cryptography::CryptGetProvParam(
                context.as_raw(),
                PP_ENUMCONTAINERS,
                Some(name.as_mut_ptr()),
                &mut size,
                cursor.as_raw(),
            )
        };
        match result {
            Ok(()) => {
                let end = name.iter().position(|b| *b == 0).unwrap_or(size as usize);
                Ok(Some(String::from_utf8_lossy(&name[..end]).into_owned()))
            }
            Err(e) if native_code(&e) == codes::ERROR_NO_MORE_ITEMS => Ok(None),
            Err(e) => Err(fail(ErrorKind::Enumeration, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::CryptoContext;
    use crate::enumerator::ContainerNames;
    use crate::provider::{CRYPT_VERIFYCONTEXT, PROV_RSA_AES};

    #[test]
    fn test_native_code_unwraps_win32_errors() {
        let wrapped = windows::core::Error::from(windows::core::HRESULT(0x8007_0103_u32 as i32));
        assert_eq!(native_code(&wrapped), codes::ERROR_NO_MORE_ITEMS);

        let nte = windows::core::Error::from(windows::core::HRESULT(codes::NTE_BAD_KEYSET as i32));
        assert_eq!(native_code(&nte), codes::NTE_BAD_KEYSET);
    }

    #[test]
    fn test_container_enumeration_reuses_probed_size() {
        let provider = CapiProvider::new();
        let context =
            CryptoContext::open(&provider, None, None, PROV_RSA_AES, CRYPT_VERIFYCONTEXT).unwrap();
        let handle = context.handle().unwrap();

        let names = ContainerNames::new(&context).collect::<Result<Vec<_>, _>>().unwrap();
        assert!(names.iter().all(|name| !name.is_empty()));
        if !names.is_empty() {
            assert!(provider.name_sizes().contains_key(&handle.as_raw()));
        }

        drop(context);
        assert!(!provider.name_sizes().contains_key(&handle.as_raw()));
    }
}

// Csputil — Provider context owner

use crate::provider::{
    codes, ContextId, CryptoProvider, ErrorKind, HashAlgorithm, KeySpec, ProviderError,
};

use super::{HashHandle, KeyHandle};

/// A live provider session, released on drop.
pub struct CryptoContext<'p> {
    provider: &'p dyn CryptoProvider,
    handle: Option<ContextId>,
}

impl<'p> CryptoContext<'p> {
    /// A context that holds nothing yet.
    pub fn new(provider: &'p dyn CryptoProvider) -> Self {
        Self {
            provider,
            handle: None,
        }
    }

    /// Acquire a new context in one step.
    pub fn open(
        provider: &'p dyn CryptoProvider,
        container: Option<&str>,
        provider_name: Option<&str>,
        provider_type: u32,
        flags: u32,
    ) -> Result<Self, ProviderError> {
        let mut context = Self::new(provider);
        context.acquire(container, provider_name, provider_type, flags)?;
        Ok(context)
    }

    /// Release whatever is held, then open `container` (the scope default
    /// when `None`) under the given provider.
    pub fn acquire(
        &mut self,
        container: Option<&str>,
        provider_name: Option<&str>,
        provider_type: u32,
        flags: u32,
    ) -> Result<(), ProviderError> {
        self.release();
        match self
            .provider
            .acquire_context(container, provider_name, provider_type, flags)
        {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("CryptAcquireContext({:08x}) failed - {:08x}", flags, e.code);
                Err(e)
            }
        }
    }

    /// Take ownership of an already acquired handle, releasing the current one.
    pub fn attach(&mut self, handle: ContextId) {
        self.release();
        self.handle = Some(handle);
    }

    pub fn is_acquired(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<ContextId> {
        self.handle
    }

    pub fn provider(&self) -> &'p dyn CryptoProvider {
        self.provider
    }

    /// The key in `spec`'s slot. An empty slot is reported as
    /// [`ErrorKind::KeyNotFound`].
    pub fn user_key(&self, spec: KeySpec) -> Result<KeyHandle<'_>, ProviderError> {
        let handle = self.require(ErrorKind::KeyRetrieval)?;
        match self.provider.get_user_key(handle, spec) {
            Ok(key) => Ok(KeyHandle::new(self.provider, key, spec)),
            Err(e) => {
                if e.is_no_key() {
                    tracing::debug!("No {} key in this container", spec);
                } else {
                    tracing::warn!("CryptGetUserKey() failed - {:08x}", e.code);
                }
                Err(e)
            }
        }
    }

    /// Create a hash object bound to this context.
    pub fn create_hash(&self, algorithm: HashAlgorithm) -> Result<HashHandle<'_>, ProviderError> {
        HashHandle::create(self, algorithm)
    }

    pub(crate) fn require(&self, kind: ErrorKind) -> Result<ContextId, ProviderError> {
        self.handle
            .ok_or(ProviderError::new(kind, codes::NTE_BAD_UID))
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.provider.release_context(handle) {
                tracing::error!("CryptReleaseContext failed - {:08x}", e.code);
            }
        }
    }
}

impl Drop for CryptoContext<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

// Csputil — Key handle owner

use crate::blob::Blob;
use crate::provider::{BlobKind, CryptoProvider, KeyId, KeySpec, ProviderError};

/// A live handle to one key slot of a context, destroyed on drop.
///
/// Exporting copies the key material out; the returned [`Blob`] is
/// independent of the handle.
pub struct KeyHandle<'c> {
    provider: &'c dyn CryptoProvider,
    id: KeyId,
    spec: KeySpec,
}

impl<'c> KeyHandle<'c> {
    pub(crate) fn new(provider: &'c dyn CryptoProvider, id: KeyId, spec: KeySpec) -> Self {
        Self { provider, id, spec }
    }

    pub fn spec(&self) -> KeySpec {
        self.spec
    }

    pub(crate) fn id(&self) -> KeyId {
        self.id
    }

    /// Export the key as a public or private key blob.
    pub fn export(&self, kind: BlobKind) -> Result<Blob, ProviderError> {
        let bytes = self.provider.export_key(self.id, kind).map_err(|e| {
            tracing::warn!("CryptExportKey failed - {:08x}", e.code);
            e
        })?;
        tracing::debug!("Exported {:?} {} key blob ({} bytes)", kind, self.spec, bytes.len());
        Ok(Blob::from(bytes))
    }
}

impl Drop for KeyHandle<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.provider.destroy_key(self.id) {
            tracing::error!("CryptDestroyKey failed - {:08x}", e.code);
        }
    }
}

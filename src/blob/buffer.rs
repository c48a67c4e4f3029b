// Csputil — Blob storage
//
// `Blob` exclusively owns its bytes. It is deliberately not `Clone`: a blob
// moves from the operation that produced it to whoever displays or saves it,
// and the last holder wipes it on drop.

use std::fmt;
use std::path::Path;

use zeroize::{Zeroize, Zeroizing};

use super::BlobError;

/// Owned, resizable byte storage. An empty blob has no backing storage.
#[derive(Default)]
pub struct Blob {
    data: Zeroizing<Vec<u8>>,
}

impl Blob {
    /// An empty blob.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a zero-filled blob of `size` bytes.
    ///
    /// `allocate(0)` yields an empty blob. On failure no partially sized
    /// blob is returned.
    pub fn allocate(size: usize) -> Result<Self, BlobError> {
        let mut blob = Self::new();
        blob.grow_to(size)?;
        Ok(blob)
    }

    /// Resize to `new_size` bytes, zero-filling any new tail.
    ///
    /// If the storage cannot be grown the blob keeps its previous length and
    /// contents.
    pub fn grow_to(&mut self, new_size: usize) -> Result<(), BlobError> {
        let len = self.data.len();
        if new_size <= len {
            self.data[new_size..].zeroize();
            self.data.truncate(new_size);
            return Ok(());
        }

        if new_size <= self.data.capacity() {
            self.data.resize(new_size, 0);
            return Ok(());
        }

        // Fresh storage; the old allocation is wiped when it is replaced.
        let mut grown = Zeroizing::new(Vec::new());
        if let Err(e) = grown.try_reserve_exact(new_size) {
            tracing::error!("Blob allocation of {} bytes failed: {}", new_size, e);
            return Err(BlobError::Allocation {
                requested: new_size,
            });
        }
        grown.extend_from_slice(&self.data);
        grown.resize(new_size, 0);
        self.data = grown;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reverse the byte order in place.
    pub fn reverse(&mut self) {
        self.data.reverse();
    }

    /// Write the raw bytes to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), BlobError> {
        std::fs::write(path, self.as_bytes()).map_err(|source| {
            tracing::warn!("Writing {} bytes to {} failed: {}", self.len(), path.display(), source);
            BlobError::Io {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            data: Zeroizing::new(bytes),
        }
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq<[u8]> for Blob {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for Blob {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.as_bytes() == other.as_slice()
    }
}

/// Never prints the contents; blobs routinely hold private key material.
impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_zero_is_empty() {
        let blob = Blob::allocate(0).unwrap();
        assert!(blob.is_empty());
        assert_eq!(blob.len(), 0);
    }

    #[test]
    fn test_allocate_is_zero_filled() {
        let blob = Blob::allocate(16).unwrap();
        assert_eq!(blob.len(), 16);
        assert!(blob.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_grow_preserves_existing_bytes() {
        let mut blob = Blob::from(vec![1, 2, 3]);
        blob.grow_to(5).unwrap();
        assert_eq!(blob, [1, 2, 3, 0, 0]);
    }

    #[test]
    fn test_grow_within_capacity_stays_in_place() {
        let mut bytes = Vec::with_capacity(8);
        bytes.extend_from_slice(&[7, 8]);
        let mut blob = Blob::from(bytes);
        let before = blob.as_bytes().as_ptr();

        blob.grow_to(6).unwrap();
        assert_eq!(blob.as_bytes().as_ptr(), before);
        assert_eq!(blob, [7, 8, 0, 0, 0, 0]);
    }

    #[test]
    fn test_grow_past_capacity_moves_to_fresh_storage() {
        let mut blob = Blob::from(vec![0xaa; 3]);
        blob.grow_to(4096).unwrap();
        assert!(blob.data.capacity() >= 4096);
        assert_eq!(&blob.as_bytes()[..4], &[0xaa, 0xaa, 0xaa, 0x00]);
        assert!(blob.as_bytes()[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_failed_grow_keeps_contents() {
        let mut blob = Blob::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let err = blob.grow_to(usize::MAX).unwrap_err();
        assert!(matches!(err, BlobError::Allocation { requested } if requested == usize::MAX));
        assert_eq!(blob, [0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_shrink_truncates() {
        let mut blob = Blob::from(vec![1, 2, 3, 4]);
        blob.grow_to(2).unwrap();
        assert_eq!(blob, [1, 2]);
    }

    #[test]
    fn test_reverse_twice_is_identity() {
        let original: Vec<u8> = (0u8..=200).collect();
        let mut blob = Blob::from(original.clone());
        blob.reverse();
        assert_eq!(blob.as_bytes()[0], 200);
        blob.reverse();
        assert_eq!(blob.as_bytes(), original.as_slice());
    }

    #[test]
    fn test_reverse_empty_is_noop() {
        let mut blob = Blob::new();
        blob.reverse();
        assert!(blob.is_empty());
    }

    #[test]
    fn test_save_writes_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig_pub");
        let blob = Blob::from(vec![0x06, 0x02, 0x00, 0x00]);

        blob.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x06, 0x02, 0x00, 0x00]);
    }

    #[test]
    fn test_save_to_inaccessible_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("exchg_pri");
        let blob = Blob::from(vec![1, 2, 3]);

        let err = blob.save(&path).unwrap_err();
        assert!(matches!(err, BlobError::Io { .. }));
    }

    #[test]
    fn test_debug_does_not_leak_contents() {
        let blob = Blob::from(vec![0x41; 4]);
        let rendered = format!("{:?}", blob);
        assert_eq!(rendered, "Blob { len: 4 }");
    }
}

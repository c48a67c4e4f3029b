// Csputil — Blob Module
//
// Owned, move-only byte buffer used for every piece of material that crosses
// the provider boundary: exported key blobs, digests and signatures. Backing
// storage is wiped on drop.

mod buffer;
mod codec;
mod dump;
mod error;

pub use buffer::Blob;
pub use dump::DumpLayout;
pub use error::BlobError;

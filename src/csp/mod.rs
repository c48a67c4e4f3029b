// Csputil — CSP Handle Module
//
// Move-only owners for the provider's context, key and hash resources. Each
// wrapper releases its handle exactly once when dropped; reacquiring a
// context releases the previous handle first. Keys and hashes borrow the
// context they came from, so they can never outlive it.

mod context;
mod hash;
mod key;

pub use context::CryptoContext;
pub use hash::HashHandle;
pub use key::KeyHandle;

// Csputil — Native provider status codes
//
// HRESULT-style codes as reported by CryptoAPI through GetLastError(). The
// software provider reports the same codes so that messages and the "No key"
// distinction look identical on every backend.

pub const ERROR_INVALID_DATA: u32 = 0x0000_000D;
pub const ERROR_NO_MORE_ITEMS: u32 = 0x0000_0103;

pub const NTE_BAD_UID: u32 = 0x8009_0001;
pub const NTE_BAD_HASH: u32 = 0x8009_0002;
pub const NTE_BAD_KEY: u32 = 0x8009_0003;
pub const NTE_BAD_DATA: u32 = 0x8009_0005;
pub const NTE_BAD_SIGNATURE: u32 = 0x8009_0006;
pub const NTE_BAD_FLAGS: u32 = 0x8009_0009;
pub const NTE_BAD_KEY_STATE: u32 = 0x8009_000B;
pub const NTE_BAD_HASH_STATE: u32 = 0x8009_000C;
pub const NTE_NO_KEY: u32 = 0x8009_000D;
pub const NTE_BAD_KEYSET: u32 = 0x8009_0016;
pub const NTE_PROV_TYPE_NOT_DEF: u32 = 0x8009_0017;
pub const NTE_KEYSET_NOT_DEF: u32 = 0x8009_0019;
pub const NTE_PROV_TYPE_NO_MATCH: u32 = 0x8009_001B;

// Csputil — Blob text codecs
//
// Hex, Base64 and UTF-8 conversions. The Base64 output reproduces the legacy
// CRYPT_STRING_BASE64 framing: a CRLF after every 64 characters, including a
// final one.

use base64::{engine::general_purpose::STANDARD, Engine};

use super::{Blob, BlobError};

/// Characters per Base64 output line.
const BASE64_LINE_LEN: usize = 64;

const LINE_BREAK: &str = "\r\n";

impl Blob {
    /// Decode hex digits, skipping every character that is not `[0-9A-Fa-f]`.
    ///
    /// Digits pair up in encounter order, the first of each pair being the
    /// high nibble. A trailing unpaired digit is dropped.
    pub fn from_hex(text: &str) -> Result<Self, BlobError> {
        let digits = text.chars().filter(char::is_ascii_hexdigit).count();
        let mut blob = Blob::allocate(digits / 2)?;

        let out = blob.as_bytes_mut();
        let mut pending: Option<u8> = None;
        let mut pos = 0;
        for nibble in text.chars().filter_map(|c| c.to_digit(16)) {
            let nibble = nibble as u8;
            match pending.take() {
                None => pending = Some(nibble),
                Some(high) => {
                    out[pos] = high << 4 | nibble;
                    pos += 1;
                }
            }
        }
        Ok(blob)
    }

    /// Decode standard Base64. Line breaks and other whitespace are ignored.
    pub fn from_base64(text: &str) -> Result<Self, BlobError> {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(compact.as_bytes()).map_err(|e| {
            tracing::debug!("Base64 decode failed: {}", e);
            BlobError::Base64(e)
        })?;
        Ok(Blob::from(bytes))
    }

    /// The UTF-8 encoding of `text`.
    pub fn from_utf8(text: &str) -> Result<Self, BlobError> {
        let mut blob = Blob::allocate(text.len())?;
        blob.as_bytes_mut().copy_from_slice(text.as_bytes());
        Ok(blob)
    }

    /// Lowercase hex digits with no separators.
    pub fn to_hex_digits(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Standard Base64 with a CRLF after every 64 characters and at the end.
    pub fn to_base64(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let encoded = STANDARD.encode(self.as_bytes());
        let lines = encoded.len().div_ceil(BASE64_LINE_LEN);
        let mut framed = String::with_capacity(encoded.len() + lines * LINE_BREAK.len());
        // Base64 output is ASCII, so byte chunks are always valid str slices.
        for line in encoded.as_bytes().chunks(BASE64_LINE_LEN) {
            framed.push_str(std::str::from_utf8(line).unwrap_or_default());
            framed.push_str(LINE_BREAK);
        }
        framed
    }
}

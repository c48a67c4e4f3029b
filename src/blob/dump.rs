// Csputil — Blob hex dump
//
// Diagnostic rendering used for key blobs and signatures:
//
//   Total: 42 (=0x2a) bytes
//   0000: 00 01 02 03 04 05 06 07  08 09 0a 0b
//   000c: ...
//
// Rows are CRLF-separated. A full row ends with CRLF, a partial last row does
// not. Output past `ellipsis` bytes is replaced by a " ..." marker.

use std::fmt::{self, Write};

use super::Blob;

/// Bytes per visual group within a row.
const GROUP_LEN: usize = 8;

/// Row width and truncation threshold for [`Blob::dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpLayout {
    pub width: usize,
    pub ellipsis: usize,
}

impl DumpLayout {
    /// Layout used when displaying exported key blobs.
    pub const KEY: DumpLayout = DumpLayout {
        width: 8,
        ellipsis: 100,
    };

    /// Layout used for signatures: wide rows, effectively never truncated.
    pub const SIGNATURE: DumpLayout = DumpLayout {
        width: 16,
        ellipsis: 4096,
    };
}

impl Blob {
    /// Render a hex dump of at most `ellipsis` bytes, `width` bytes per row.
    ///
    /// An empty blob renders as an empty string.
    pub fn dump(&self, width: usize, ellipsis: usize) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_dump(&mut out, width, ellipsis);
        out
    }

    /// [`Blob::dump`] with a [`DumpLayout`].
    pub fn dump_with(&self, layout: DumpLayout) -> String {
        self.dump(layout.width, layout.ellipsis)
    }

    /// Stream the hex dump into any formatter sink.
    pub fn write_dump<W: Write>(&self, out: &mut W, width: usize, ellipsis: usize) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let width = width.max(1);
        let total = self.len();

        write!(out, "Total: {} (=0x{:x}) bytes\r\n", total, total)?;

        let shown = &self.as_bytes()[..total.min(ellipsis)];
        for (row, chunk) in shown.chunks(width).enumerate() {
            write!(out, "{:04x}:", row * width)?;
            for (i, byte) in chunk.iter().enumerate() {
                if i > 0 && i % GROUP_LEN == 0 {
                    write!(out, "  {:02x}", byte)?;
                } else {
                    write!(out, " {:02x}", byte)?;
                }
            }
            if chunk.len() == width {
                out.write_str("\r\n")?;
            }
        }

        if total > ellipsis {
            out.write_str(" ...\r\n")?;
        }
        Ok(())
    }
}

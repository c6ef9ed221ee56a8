use crate::error::{Result, TempArchiveError};
use encoding_rs::WINDOWS_1252;
use std::io::{ErrorKind, Read, Write};

/// Transfer block size for streaming copies (64 KiB)
pub const BLOCK_SIZE: usize = 0x10000;

/// Upper bound on a declared entry-name length, including the terminator.
/// Real archives stay far below this; anything larger is treated as garbage.
pub const MAX_NAME_LENGTH: i64 = 4096;

/// How the 4-byte entry count at the start of an archive is assembled.
///
/// The tool this format comes from reassembled the count with a shift of 32
/// on the fourth byte, which the host language masked down to a shift of 0,
/// so the top byte was *added raw* instead of landing in bits 24-31. The two
/// readings agree whenever byte 3 is zero, which holds for every archive
/// small enough to exist in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountFormat {
    /// Conventional little-endian 32-bit read (default)
    #[default]
    LittleEndian,
    /// Bit-exact reproduction of the legacy arithmetic:
    /// `b0 + (b1 << 8) + (b2 << 16) + b3`
    Legacy,
}

/// Stateful forward-only cursor over one archive's byte stream.
///
/// Exposes the primitive values the container format is built from: the
/// fixed-width entry count, the sign-aware compact index, length-prefixed
/// Windows-1252 strings, and raw byte runs that are either copied to a sink
/// or discarded. Strictly sequential; there is no seeking backward.
pub struct Decoder<R> {
    stream: R,
    offset: u64,
    count_format: CountFormat,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder over a stream positioned at offset 0
    pub fn new(stream: R) -> Self {
        Self {
            stream,
            offset: 0,
            count_format: CountFormat::default(),
        }
    }

    /// Select the entry-count arithmetic (see [`CountFormat`])
    pub fn with_count_format(mut self, format: CountFormat) -> Self {
        self.count_format = format;
        self
    }

    /// Number of bytes consumed from the stream so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the 4-byte entry count at the start of an archive.
    ///
    /// Fails with [`TempArchiveError::HeaderRead`] if the stream ends before
    /// all 4 bytes arrive.
    pub fn read_fixed_count(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf).map_err(|err| match err {
            TempArchiveError::Truncated { .. } => TempArchiveError::HeaderRead,
            other => other,
        })?;

        let count = match self.count_format {
            CountFormat::LittleEndian => u32::from_le_bytes(buf),
            CountFormat::Legacy => {
                // Fourth byte added unshifted, as the original arithmetic did
                u32::from(buf[0])
                    + (u32::from(buf[1]) << 8)
                    + (u32::from(buf[2]) << 16)
                    + u32::from(buf[3])
            }
        };
        tracing::trace!(count, format = ?self.count_format, "read entry count");
        Ok(count)
    }

    /// Decode one sign-aware compact index (1 to 5 bytes).
    ///
    /// Byte 0 carries the sign (bit 7), a continuation flag (bit 6) and the
    /// low 6 magnitude bits; bytes 1-3 each carry a continuation flag (bit 7)
    /// and 7 magnitude bits; byte 4, when present, is a raw 8-bit chunk and
    /// ends the encoding. Chunks assemble most-significant first.
    pub fn read_compact_index(&mut self) -> Result<i64> {
        let b0 = self.read_byte()?;
        let mut value: i64 = 0;
        if b0 & 0x40 != 0 {
            let b1 = self.read_byte()?;
            if b1 & 0x80 != 0 {
                let b2 = self.read_byte()?;
                if b2 & 0x80 != 0 {
                    let b3 = self.read_byte()?;
                    if b3 & 0x80 != 0 {
                        let b4 = self.read_byte()?;
                        value = i64::from(b4);
                    }
                    value = (value << 7) + i64::from(b3 & 0x7F);
                }
                value = (value << 7) + i64::from(b2 & 0x7F);
            }
            value = (value << 7) + i64::from(b1 & 0x7F);
        }
        value = (value << 6) + i64::from(b0 & 0x3F);
        if b0 & 0x80 != 0 {
            value = -value;
        }
        Ok(value)
    }

    /// Read a length-prefixed Windows-1252 string.
    ///
    /// The declared length includes a trailing terminator byte that is part
    /// of the on-disk form and is stripped from the result, so a valid string
    /// is never empty.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.offset;
        let declared = self.read_compact_index()?;
        if declared <= 1 || declared > MAX_NAME_LENGTH {
            return Err(TempArchiveError::MalformedEntry {
                offset: start,
                reason: format!("invalid string length {declared}"),
            });
        }

        let len = declared as usize;
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;

        // Last byte is the terminator; everything before it is content
        let (text, _, _) = WINDOWS_1252.decode(&buf[..len - 1]);
        Ok(text.into_owned())
    }

    /// Advance the cursor past `count` bytes without transferring them
    pub fn skip(&mut self, count: u64) -> Result<()> {
        let mut scratch = vec![0u8; BLOCK_SIZE.min(count as usize).max(1)];
        let mut remaining = count;
        while remaining > 0 {
            let want = scratch.len().min(remaining as usize);
            let got = self.read_some(&mut scratch[..want])?;
            if got == 0 {
                return Err(TempArchiveError::Truncated {
                    offset: self.offset,
                    expected: count,
                    got: count - remaining,
                });
            }
            remaining -= got as u64;
        }
        Ok(())
    }

    /// Transfer exactly `count` bytes from the cursor to `sink`.
    ///
    /// Loops on short reads from the underlying stream; a fixed 64 KiB block
    /// bounds memory regardless of payload size. Fails with
    /// [`TempArchiveError::Truncated`] if the source ends early and
    /// [`TempArchiveError::SinkWrite`] if the destination rejects a write.
    pub fn copy_to<W: Write>(&mut self, count: u64, sink: &mut W) -> Result<()> {
        let mut block = vec![0u8; BLOCK_SIZE];
        let mut remaining = count;
        while remaining > 0 {
            let want = block.len().min(remaining as usize);
            let got = self.read_some(&mut block[..want])?;
            if got == 0 {
                return Err(TempArchiveError::Truncated {
                    offset: self.offset,
                    expected: count,
                    got: count - remaining,
                });
            }
            sink.write_all(&block[..got])
                .map_err(TempArchiveError::SinkWrite)?;
            remaining -= got as u64;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    /// One `read` call on the stream, retrying on interruption
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.stream.read(buf) {
                Ok(n) => {
                    self.offset += n as u64;
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TempArchiveError::Io(err)),
            }
        }
    }

    /// Fill `buf` completely or fail with `Truncated`
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let total = buf.len();
        let mut filled = 0;
        while filled < total {
            let got = self.read_some(&mut buf[filled..])?;
            if got == 0 {
                return Err(TempArchiveError::Truncated {
                    offset: self.offset,
                    expected: total as u64,
                    got: filled as u64,
                });
            }
            filled += got;
        }
        Ok(())
    }
}

/// Encode one integer with the compact-index scheme (inverse of
/// [`Decoder::read_compact_index`]). Used by diagnostics and tests; writing
/// whole archives is out of scope.
///
/// # Panics
///
/// Panics if the magnitude exceeds the 5-byte encoding's 35-bit capacity.
pub fn encode_compact_index(value: i64) -> Vec<u8> {
    let magnitude = value.unsigned_abs();
    assert!(
        magnitude < (1u64 << 35),
        "magnitude {magnitude} exceeds compact-index capacity"
    );

    let mut b0 = (magnitude & 0x3F) as u8;
    if value < 0 {
        b0 |= 0x80;
    }
    let mut rest = magnitude >> 6;
    if rest != 0 {
        b0 |= 0x40;
    }

    let mut out = vec![b0];
    if rest == 0 {
        return out;
    }
    for _ in 0..3 {
        let mut b = (rest & 0x7F) as u8;
        rest >>= 7;
        if rest != 0 {
            b |= 0x80;
        }
        out.push(b);
        if rest == 0 {
            return out;
        }
    }
    // Final chunk: all 8 bits, no continuation possible
    out.push(rest as u8);
    out
}

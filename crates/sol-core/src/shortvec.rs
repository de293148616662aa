//! Compact-u16 ("shortvec") length prefixes.
//!
//! Every variable-length array in the wire format is prefixed with its
//! length encoded 7 bits at a time, least significant group first, with the
//! high bit of each byte flagging a continuation:
//!
//! - Values 0..0x7f       -> 1 byte
//! - Values 0x80..0x3fff  -> 2 bytes
//! - Values 0x4000..      -> 3 bytes

use crate::error::SolError;

/// Maximum number of bytes a compact-u16 may occupy.
pub const MAX_ENCODING_LENGTH: usize = 3;

/// Encode a `u16` value in compact-u16 format.
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(MAX_ENCODING_LENGTH);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Append the compact-u16 encoding of `len` to `buf`.
///
/// Fails when `len` does not fit in a `u16`.
pub fn write_len(buf: &mut Vec<u8>, len: usize) -> Result<(), SolError> {
    let value = u16::try_from(len).map_err(|_| {
        SolError::SerializationError(format!("length {len} exceeds compact-u16 range"))
    })?;
    buf.extend_from_slice(&encode_compact_u16(value));
    Ok(())
}

/// Decode a compact-u16 value from the front of `data`.
///
/// Returns `(value, bytes_consumed)`. Rejects truncated input, values above
/// `u16::MAX` and non-canonical encodings (a zero continuation byte).
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;

    for nth in 0..MAX_ENCODING_LENGTH {
        let byte = *data.get(nth).ok_or_else(|| {
            SolError::SerializationError(
                "unexpected end of data while decoding compact-u16".into(),
            )
        })?;
        let done = byte & 0x80 == 0;

        if nth > 0 && byte == 0 {
            return Err(SolError::SerializationError(
                "non-canonical compact-u16 encoding".into(),
            ));
        }
        if nth == MAX_ENCODING_LENGTH - 1 && !done {
            return Err(SolError::SerializationError(
                "compact-u16 longer than 3 bytes".into(),
            ));
        }

        value |= ((byte & 0x7f) as u32) << (nth * 7);
        if value > u16::MAX as u32 {
            return Err(SolError::SerializationError(
                "compact-u16 value overflow".into(),
            ));
        }

        if done {
            return Ok((value as u16, nth + 1));
        }
    }

    unreachable!("loop returns on the third byte")
}

/// Bounds-checked cursor over wire-format bytes.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, SolError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub(crate) fn read_len(&mut self) -> Result<usize, SolError> {
        let (value, consumed) = decode_compact_u16(self.remaining())?;
        self.pos += consumed;
        Ok(value as usize)
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], SolError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                SolError::SerializationError(format!(
                    "unexpected end of data: need {len} bytes at offset {}",
                    self.pos
                ))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub(crate) fn finish(&self) -> Result<(), SolError> {
        if self.pos != self.data.len() {
            return Err(SolError::SerializationError(format!(
                "{} trailing bytes after offset {}",
                self.data.len() - self.pos,
                self.pos
            )));
        }
        Ok(())
    }
}

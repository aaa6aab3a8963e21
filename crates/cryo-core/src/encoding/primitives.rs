//! Primitive I/O helpers: size-classed length prefixes, the minimal-width
//! integer writer, and the bounds-checked input cursor.
//!
//! All multi-byte scalars are big-endian.

use super::tags;
use crate::error::{FreezeError, ThawError};

/// Largest length that fits the small (1-byte unsigned) prefix.
pub(crate) const SM_MAX: usize = 127;
/// Largest length that fits the medium (2-byte signed) prefix.
pub(crate) const MD_MAX: usize = 32767;
/// Largest length that fits the large (4-byte signed) prefix.
pub(crate) const LG_MAX: usize = i32::MAX as usize;

/// The four tags of a size-classed family.
pub(crate) struct SizeTags {
    pub empty: u8,
    pub sm: u8,
    pub md: u8,
    pub lg: u8,
}

pub(crate) const VEC_TAGS: SizeTags =
    SizeTags { empty: tags::VEC_0, sm: tags::VEC_SM, md: tags::VEC_MD, lg: tags::VEC_LG };
pub(crate) const LIST_TAGS: SizeTags =
    SizeTags { empty: tags::LIST_0, sm: tags::LIST_SM, md: tags::LIST_MD, lg: tags::LIST_LG };
pub(crate) const SEQ_TAGS: SizeTags =
    SizeTags { empty: tags::SEQ_0, sm: tags::SEQ_SM, md: tags::SEQ_MD, lg: tags::SEQ_LG };
pub(crate) const SET_TAGS: SizeTags =
    SizeTags { empty: tags::SET_0, sm: tags::SET_SM, md: tags::SET_MD, lg: tags::SET_LG };
pub(crate) const MAP_TAGS: SizeTags =
    SizeTags { empty: tags::MAP_0, sm: tags::MAP_SM, md: tags::MAP_MD, lg: tags::MAP_LG };
pub(crate) const BYTES_TAGS: SizeTags =
    SizeTags { empty: tags::BYTES_0, sm: tags::BYTES_SM, md: tags::BYTES_MD, lg: tags::BYTES_LG };
pub(crate) const STR_TAGS: SizeTags =
    SizeTags { empty: tags::STR_0, sm: tags::STR_SM, md: tags::STR_MD, lg: tags::STR_LG };

/// Writes the tag and length prefix for a counted family, choosing the
/// smallest class that fits `len`.
pub(crate) fn write_prefix(
    out: &mut Vec<u8>,
    len: usize,
    family: &SizeTags,
) -> Result<(), FreezeError> {
    if len == 0 {
        out.push(family.empty);
    } else if len <= SM_MAX {
        out.push(family.sm);
        out.push(len as u8);
    } else if len <= MD_MAX {
        out.push(family.md);
        out.extend_from_slice(&(len as i16).to_be_bytes());
    } else if len <= LG_MAX {
        out.push(family.lg);
        out.extend_from_slice(&(len as i32).to_be_bytes());
    } else {
        return Err(FreezeError::TooLong { len });
    }
    Ok(())
}

/// Writes a size-classed byte payload: tag, length prefix, bytes.
pub(crate) fn write_bytes_classed(
    out: &mut Vec<u8>,
    bytes: &[u8],
    family: &SizeTags,
) -> Result<(), FreezeError> {
    write_prefix(out, bytes.len(), family)?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// Writes a name-like string under a two-class (`sm`/`md`) tag pair.
///
/// Keywords, symbols, record type names, and serialized-object type names
/// never need the large class; a name longer than the medium prefix is an
/// encoding error.
pub(crate) fn write_name(
    out: &mut Vec<u8>,
    name: &str,
    sm_tag: u8,
    md_tag: u8,
) -> Result<(), FreezeError> {
    let bytes = name.as_bytes();
    if bytes.len() <= SM_MAX {
        out.push(sm_tag);
        out.push(bytes.len() as u8);
    } else if bytes.len() <= MD_MAX {
        out.push(md_tag);
        out.extend_from_slice(&(bytes.len() as i16).to_be_bytes());
    } else {
        return Err(FreezeError::TooLong { len: bytes.len() });
    }
    out.extend_from_slice(bytes);
    Ok(())
}

/// Writes a 4-byte length prefix and the payload, no tag.
pub(crate) fn write_bytes_lg(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), FreezeError> {
    let len =
        i32::try_from(bytes.len()).map_err(|_| FreezeError::TooLong { len: bytes.len() })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

/// Writes a 1-byte length prefix and the payload, no tag. Callers
/// guarantee `bytes.len() <= 127`.
pub(crate) fn write_bytes_sm(out: &mut Vec<u8>, bytes: &[u8]) {
    debug_assert!(bytes.len() <= SM_MAX);
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
}

/// Writes an integer at the narrowest width that faithfully holds it.
///
/// Purely a space optimization; readers widen back to `i64` on load.
pub(crate) fn write_long(out: &mut Vec<u8>, n: i64) {
    if n == 0 {
        out.push(tags::LONG_ZERO);
    } else if let Ok(b) = i8::try_from(n) {
        out.push(tags::LONG_SM);
        out.extend_from_slice(&b.to_be_bytes());
    } else if let Ok(s) = i16::try_from(n) {
        out.push(tags::LONG_MD);
        out.extend_from_slice(&s.to_be_bytes());
    } else if let Ok(i) = i32::try_from(n) {
        out.push(tags::LONG_LG);
        out.extend_from_slice(&i.to_be_bytes());
    } else {
        out.push(tags::LONG_XL);
        out.extend_from_slice(&n.to_be_bytes());
    }
}

/// A bounds-checked cursor over an input slice.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Wraps an input slice.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True when the input is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn need(&self, n: usize) -> Result<(), ThawError> {
        if self.remaining() < n {
            Err(ThawError::Truncated { needed: n, remaining: self.remaining() })
        } else {
            Ok(())
        }
    }

    /// Consumes `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ThawError> {
        self.need(n)?;
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consumes one byte.
    pub fn read_u8(&mut self) -> Result<u8, ThawError> {
        self.need(1)?;
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Consumes one signed byte.
    pub fn read_i8(&mut self) -> Result<i8, ThawError> {
        Ok(self.read_u8()? as i8)
    }

    /// Consumes a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, ThawError> {
        let bytes: [u8; 2] = self.take(2)?.try_into().map_err(|_| ThawError::Truncated {
            needed: 2,
            remaining: self.remaining(),
        })?;
        Ok(u16::from_be_bytes(bytes))
    }

    /// Consumes a big-endian `i16`.
    pub fn read_i16(&mut self) -> Result<i16, ThawError> {
        Ok(self.read_u16()? as i16)
    }

    /// Consumes a big-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, ThawError> {
        let bytes: [u8; 4] = self.take(4)?.try_into().map_err(|_| ThawError::Truncated {
            needed: 4,
            remaining: self.remaining(),
        })?;
        Ok(i32::from_be_bytes(bytes))
    }

    /// Consumes a big-endian `i64`.
    pub fn read_i64(&mut self) -> Result<i64, ThawError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().map_err(|_| ThawError::Truncated {
            needed: 8,
            remaining: self.remaining(),
        })?;
        Ok(i64::from_be_bytes(bytes))
    }

    /// Consumes a big-endian `f32`.
    pub fn read_f32(&mut self) -> Result<f32, ThawError> {
        Ok(f32::from_bits(self.read_i32()? as u32))
    }

    /// Consumes a big-endian `f64`.
    pub fn read_f64(&mut self) -> Result<f64, ThawError> {
        Ok(f64::from_bits(self.read_i64()? as u64))
    }

    /// Reads a small (1-byte unsigned) length prefix.
    pub fn read_len_sm(&mut self) -> Result<usize, ThawError> {
        Ok(usize::from(self.read_u8()?))
    }

    /// Reads a medium (2-byte signed) length prefix, rejecting negatives.
    pub fn read_len_md(&mut self) -> Result<usize, ThawError> {
        let len = self.read_i16()?;
        usize::try_from(len).map_err(|_| ThawError::InvalidLength { len: i64::from(len) })
    }

    /// Reads a large (4-byte signed) length prefix, rejecting negatives.
    pub fn read_len_lg(&mut self) -> Result<usize, ThawError> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| ThawError::InvalidLength { len: i64::from(len) })
    }
}

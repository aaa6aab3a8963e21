//! Encoding and decoding traits for serialization.

use super::primitives::ByteReader;
use super::{reader, writer};
use crate::error::{FreezeError, ThawError};
use crate::ext::CodecContext;
use crate::types::Value;

/// Initial capacity of the top-level scratch buffer.
const SCRATCH_CAPACITY: usize = 64;

/// A trait for types that can be encoded to bytes.
pub trait Encoder: Sized {
    /// Encode this value to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode(&self) -> Result<Vec<u8>, FreezeError>;

    /// Encode this value into a pre-allocated buffer.
    ///
    /// This method appends the encoded bytes to the provided buffer,
    /// which can be more efficient when encoding multiple values.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), FreezeError>;
}

/// A trait for types that can be decoded from bytes.
pub trait Decoder: Sized {
    /// Decode a value from bytes. Trailing bytes are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails (e.g., invalid data, truncated
    /// input).
    fn decode(bytes: &[u8]) -> Result<Self, ThawError>;
}

impl Encoder for Value {
    fn encode(&self) -> Result<Vec<u8>, FreezeError> {
        let mut buf = Vec::with_capacity(SCRATCH_CAPACITY);
        self.encode_to(&mut buf)?;
        Ok(buf)
    }

    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), FreezeError> {
        writer::freeze_value(self, buf, CodecContext::global())
    }
}

impl Decoder for Value {
    fn decode(bytes: &[u8]) -> Result<Self, ThawError> {
        let mut input = ByteReader::new(bytes);
        reader::thaw_value(&mut input, CodecContext::global())
    }
}

//! Pluggable compression behind a stable-identifier seam.
//!
//! Compressors are opaque byte-array → byte-array transformers; the header
//! records only their [`CompressorId`]. Standard implementations cover the
//! ids the header table knows; anything else travels as
//! [`CompressorId::Custom`] and must be supplied out-of-band on read.

use std::io::Read;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Stable compressor identity recorded in the stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressorId {
    /// Snappy raw block format.
    Snappy,
    /// LZ4 block format with a prepended size.
    Lz4,
    /// LZMA2 (xz container).
    Lzma2,
    /// A caller-supplied implementation the header cannot name.
    Custom,
}

impl CompressorId {
    /// The id's display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Snappy => "snappy",
            Self::Lz4 => "lz4",
            Self::Lzma2 => "lzma2",
            Self::Custom => "custom",
        }
    }
}

/// An opaque byte-array → byte-array compressor.
pub trait Compressor: Send + Sync {
    /// The stable identifier recorded in the stream header.
    fn id(&self) -> CompressorId;

    /// Compresses `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Compression`] when the implementation fails.
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>>;

    /// Decompresses `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decompression`] when the input is not valid for
    /// this algorithm.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// LZ4 block compression. The fastest option and the `auto` default for
/// large payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4;

impl Compressor for Lz4 {
    fn id(&self) -> CompressorId {
        CompressorId::Lz4
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        Ok(lz4_flex::compress_prepend_size(raw))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        lz4_flex::decompress_size_prepended(data)
            .map_err(|e| Error::Decompression { alg: "lz4", source: Box::new(e) })
    }
}

/// Snappy raw-block compression. The v1 default, kept for compatibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snappy;

impl Compressor for Snappy {
    fn id(&self) -> CompressorId {
        CompressorId::Snappy
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Encoder::new()
            .compress_vec(raw)
            .map_err(|e| Error::Compression { alg: "snappy", source: Box::new(e) })
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Decoder::new()
            .decompress_vec(data)
            .map_err(|e| Error::Decompression { alg: "snappy", source: Box::new(e) })
    }
}

/// LZMA2 compression. Slow but dense; suited to cold storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lzma2;

const LZMA2_PRESET: u32 = 6;

impl Compressor for Lzma2 {
    fn id(&self) -> CompressorId {
        CompressorId::Lzma2
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        xz2::read::XzEncoder::new(raw, LZMA2_PRESET)
            .read_to_end(&mut out)
            .map_err(|e| Error::Compression { alg: "lzma2", source: Box::new(e) })?;
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        xz2::read::XzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| Error::Decompression { alg: "lzma2", source: Box::new(e) })?;
        Ok(out)
    }
}

/// The standard implementation for a header id, when one exists.
pub(crate) fn standard(id: CompressorId) -> Option<Arc<dyn Compressor>> {
    match id {
        CompressorId::Snappy => Some(Arc::new(Snappy)),
        CompressorId::Lz4 => Some(Arc::new(Lz4)),
        CompressorId::Lzma2 => Some(Arc::new(Lzma2)),
        CompressorId::Custom => None,
    }
}

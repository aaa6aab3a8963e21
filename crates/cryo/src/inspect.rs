//! Diagnostics over a frozen blob.

use crate::compress::CompressorId;
use crate::crypto::EncryptorId;
use crate::header::{self, HeaderProbe, HEADER_LEN};
use crate::options::ThawOptions;
use crate::pipeline::thaw;

/// Decoded header metadata, as names rather than ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    /// The raw metadata byte.
    pub meta: u8,
    /// Declared compressor name (`"none"` when absent).
    pub compressor: &'static str,
    /// Declared encryptor name (`"none"` when absent).
    pub encryptor: &'static str,
}

/// What [`inspect`] found in a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    /// Total input length.
    pub len: usize,
    /// The recognized header, if one is present.
    pub header: Option<HeaderInfo>,
    /// Set when header magic is present but the metadata byte is unknown.
    pub unrecognized_meta: Option<u8>,
    /// True when the payload itself starts with header magic — usually a
    /// frozen blob that was frozen again.
    pub nested_frozen: bool,
    /// Offset of the payload within the input.
    pub payload_offset: usize,
    /// Length of the payload.
    pub payload_len: usize,
    /// Whether a full thaw with the supplied options succeeds.
    pub thaws: bool,
}

/// Reports header presence, decoded header metadata, payload geometry,
/// and whether thaw succeeds under `opts`.
#[must_use]
pub fn inspect(bytes: &[u8], opts: &ThawOptions) -> InspectReport {
    let (header, unrecognized_meta, payload_offset) = match header::probe(bytes) {
        HeaderProbe::Present(h) => (
            Some(HeaderInfo {
                meta: h.meta,
                compressor: h.compressor.map_or("none", CompressorId::name),
                encryptor: h.encryptor.map_or("none", EncryptorId::name),
            }),
            None,
            HEADER_LEN,
        ),
        HeaderProbe::Unrecognized(meta) => (None, Some(meta), HEADER_LEN),
        HeaderProbe::Absent => (None, None, 0),
    };
    let payload = &bytes[payload_offset..];
    InspectReport {
        len: bytes.len(),
        header,
        unrecognized_meta,
        nested_frozen: !matches!(header::probe(payload), HeaderProbe::Absent),
        payload_offset,
        payload_len: payload.len(),
        thaws: thaw(bytes, opts).is_ok(),
    }
}

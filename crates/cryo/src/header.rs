//! The optional 4-byte stream header.
//!
//! # Format
//!
//! - Bytes 0..3: the ASCII magic `"NPY"`.
//! - Byte 3: a compact metadata id selecting the
//!   (compressor, encryptor) pair from a closed table:
//!
//! | Byte | Compressor | Encryptor |
//! |------|------------|-----------|
//! | 0 | none | none |
//! | 1 | snappy | none |
//! | 2 | none | aes128-sha512 |
//! | 3 | snappy | aes128-sha512 |
//! | 4 | none | custom |
//! | 5 | custom | none |
//! | 6 | custom | custom |
//! | 7 | snappy | custom |
//! | 8 | lz4 | none |
//! | 9 | lz4 | aes128-sha512 |
//! | 10 | lz4 | custom |
//! | 11 | lzma2 | none |
//! | 12 | lzma2 | aes128-sha512 |
//! | 13 | lzma2 | custom |
//!
//! The table is closed: an unknown metadata byte means the data comes from
//! a newer format, and the reader reports it rather than guessing.

use crate::compress::CompressorId;
use crate::crypto::EncryptorId;

/// The header magic.
pub(crate) const MAGIC: [u8; 3] = *b"NPY";

/// Total header length in bytes.
pub(crate) const HEADER_LEN: usize = 4;

/// A parsed, recognized header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// The raw metadata byte.
    pub meta: u8,
    /// The compressor the stream declares, if any.
    pub compressor: Option<CompressorId>,
    /// The encryptor the stream declares, if any.
    pub encryptor: Option<EncryptorId>,
}

/// What probing the first four bytes found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderProbe {
    /// No magic; the input is a bare payload.
    Absent,
    /// Magic present but the metadata byte is not in the table.
    Unrecognized(u8),
    /// A recognized header.
    Present(Header),
}

const META_TABLE: [(Option<CompressorId>, Option<EncryptorId>); 14] = [
    (None, None),
    (Some(CompressorId::Snappy), None),
    (None, Some(EncryptorId::Aes128Sha512)),
    (Some(CompressorId::Snappy), Some(EncryptorId::Aes128Sha512)),
    (None, Some(EncryptorId::Custom)),
    (Some(CompressorId::Custom), None),
    (Some(CompressorId::Custom), Some(EncryptorId::Custom)),
    (Some(CompressorId::Snappy), Some(EncryptorId::Custom)),
    (Some(CompressorId::Lz4), None),
    (Some(CompressorId::Lz4), Some(EncryptorId::Aes128Sha512)),
    (Some(CompressorId::Lz4), Some(EncryptorId::Custom)),
    (Some(CompressorId::Lzma2), None),
    (Some(CompressorId::Lzma2), Some(EncryptorId::Aes128Sha512)),
    (Some(CompressorId::Lzma2), Some(EncryptorId::Custom)),
];

/// The metadata byte for a (compressor, encryptor) pair, if the closed
/// table has one.
pub(crate) fn meta_byte(
    compressor: Option<CompressorId>,
    encryptor: Option<EncryptorId>,
) -> Option<u8> {
    META_TABLE.iter().position(|&pair| pair == (compressor, encryptor)).map(|i| i as u8)
}

/// Probes the start of `bytes` for a header.
pub(crate) fn probe(bytes: &[u8]) -> HeaderProbe {
    if bytes.len() < HEADER_LEN || bytes[..3] != MAGIC {
        return HeaderProbe::Absent;
    }
    let meta = bytes[3];
    match META_TABLE.get(usize::from(meta)) {
        Some(&(compressor, encryptor)) => {
            HeaderProbe::Present(Header { meta, compressor, encryptor })
        }
        None => HeaderProbe::Unrecognized(meta),
    }
}

/// Prepends the header to a finished payload.
pub(crate) fn prepend(meta: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&MAGIC);
    out.push(meta);
    out.extend_from_slice(payload);
    out
}

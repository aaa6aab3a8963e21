//! Error types for the framing layer.

use cryo_core::FreezeError;
use thiserror::Error;

/// A specialized result type for framing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the top-level freeze/thaw pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The serialization engine rejected the value.
    #[error(transparent)]
    Freeze(#[from] FreezeError),

    /// Thawing failed; carries the pipeline breadcrumbs.
    #[error("thaw failed (compressor {compressor}, encryptor {encryptor}, v1-compat {v1_compat})")]
    ThawFailed {
        /// Compressor in force when the failure occurred.
        compressor: &'static str,
        /// Encryptor in force when the failure occurred.
        encryptor: &'static str,
        /// Whether legacy decoding paths were enabled.
        v1_compat: bool,
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Header framing present but the metadata byte is unknown; the data
    /// likely comes from a newer format than this reader understands.
    #[error("unrecognized header metadata byte {meta}")]
    UnrecognizedHeader {
        /// The unknown metadata byte.
        meta: u8,
    },

    /// The header names an encryptor but no password was supplied.
    #[error("stream is encrypted ({encryptor}) but no password was supplied")]
    PasswordRequired {
        /// The encryptor named by the header.
        encryptor: &'static str,
    },

    /// The header names a custom compressor; the caller must supply one.
    #[error("header names a custom compressor; supply an implementation in the options")]
    MissingCompressor,

    /// The header names a custom encryptor; the caller must supply one.
    #[error("header names a custom encryptor; supply an implementation in the options")]
    MissingEncryptor,

    /// No header metadata id exists for this compressor/encryptor pair.
    #[error("the header table has no id for compressor {compressor} with encryptor {encryptor}; freeze with no_header")]
    UnsupportedHeaderCombination {
        /// The selected compressor.
        compressor: &'static str,
        /// The selected encryptor.
        encryptor: &'static str,
    },

    /// A compressor failed to produce output.
    #[error("{alg} compression failed")]
    Compression {
        /// The compressor name.
        alg: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A compressor rejected its input.
    #[error("{alg} decompression failed")]
    Decompression {
        /// The compressor name.
        alg: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An authenticated encryption primitive failed. On decrypt this
    /// usually means a wrong password or tampered data.
    #[error("authenticated {op} failed")]
    Crypto {
        /// Which operation failed.
        op: &'static str,
    },
}

impl Error {
    pub(crate) fn thaw_failed(
        compressor: &'static str,
        encryptor: &'static str,
        v1_compat: bool,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ThawFailed { compressor, encryptor, v1_compat, source: source.into() }
    }
}

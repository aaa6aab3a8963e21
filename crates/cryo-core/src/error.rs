//! Error types for the codec engine.

use thiserror::Error;

/// Maximum length for value representations embedded in error messages.
const MAX_REPR_LEN: usize = 100;

/// Errors raised while freezing a value to bytes.
#[derive(Debug, Error)]
pub enum FreezeError {
    /// No encoder exists for the value and the fallback policy declined it.
    #[error("no encoder for value of type {type_name}: {repr}")]
    Unfreezable {
        /// Name of the offending type.
        type_name: String,
        /// Best-effort textual representation, truncated for display.
        repr: String,
    },

    /// The value graph nests deeper than the codec is willing to follow.
    ///
    /// Shared or cyclic structures are not representable in the format;
    /// this error fires before the stack does.
    #[error("value nesting exceeds {max} levels; the format does not support cyclic values")]
    DepthExceeded {
        /// The depth limit that was exceeded.
        max: usize,
    },

    /// A `char` outside the basic multilingual plane cannot be written as
    /// one UTF-16 code unit.
    #[error("char U+{codepoint:04X} does not fit in one UTF-16 code unit")]
    UnencodableChar {
        /// The offending code point.
        codepoint: u32,
    },

    /// A string, byte array, or collection is too long for the largest
    /// size class.
    #[error("length {len} exceeds the large size class")]
    TooLong {
        /// The offending length.
        len: usize,
    },
}

impl FreezeError {
    /// Creates an [`FreezeError::Unfreezable`] with the representation
    /// truncated to a displayable length.
    #[must_use]
    pub fn unfreezable(type_name: impl Into<String>, repr: impl Into<String>) -> Self {
        Self::Unfreezable { type_name: type_name.into(), repr: truncate_repr(repr.into()) }
    }
}

/// Errors raised while thawing bytes back into a value.
#[derive(Debug, Error)]
pub enum ThawError {
    /// The tag byte is not in the type-ID registry.
    #[error("unknown type tag {tag:#04x}")]
    UnknownTag {
        /// The unrecognized tag byte.
        tag: u8,
    },

    /// The input ended before the payload did.
    #[error("unexpected end of input: needed {needed} more bytes, {remaining} available")]
    Truncated {
        /// Bytes the decoder still needed.
        needed: usize,
        /// Bytes actually remaining.
        remaining: usize,
    },

    /// A length-prefixed string payload was not valid UTF-8.
    #[error("invalid UTF-8 in {what}")]
    InvalidUtf8 {
        /// What was being decoded.
        what: &'static str,
    },

    /// A signed length prefix was negative.
    #[error("negative length prefix {len}")]
    InvalidLength {
        /// The decoded length.
        len: i64,
    },

    /// A structurally invalid payload (zero denominator, record body that
    /// is not a map, unpaired surrogate, and the like).
    #[error("malformed payload: {what}")]
    Malformed {
        /// What was wrong.
        what: &'static str,
    },

    /// The input nests deeper than the codec is willing to follow.
    #[error("input nesting exceeds {max} levels")]
    DepthExceeded {
        /// The depth limit that was exceeded.
        max: usize,
    },

    /// A custom tag or hash with no registered reader.
    #[error("no reader registered for custom type id {id}")]
    UnknownCustomType {
        /// The unified wire id (negated byte id, or named-id hash).
        id: i16,
    },

    /// A payload decode failed; carries the offending tag as a breadcrumb.
    #[error("decoding value tagged {tag:#04x} failed")]
    Failed {
        /// The tag whose payload failed to decode.
        tag: u8,
        /// The underlying failure.
        #[source]
        source: Box<ThawError>,
    },
}

impl ThawError {
    /// Wraps `source` with the offending tag, unless it already names one.
    #[must_use]
    pub(crate) fn failed(tag: u8, source: ThawError) -> Self {
        match source {
            e @ (Self::UnknownTag { .. }
            | Self::UnknownCustomType { .. }
            | Self::DepthExceeded { .. }) => e,
            e => Self::Failed { tag, source: Box::new(e) },
        }
    }
}

/// Errors raised while registering custom-type handlers.
#[derive(Debug, Error)]
pub enum ExtError {
    /// Byte ids must fall in `1..=128`.
    #[error("custom byte id {id} outside the permitted range 1..=128")]
    ByteIdRange {
        /// The rejected id.
        id: u16,
    },

    /// The named id hashes into the band reserved for byte ids.
    #[error("custom id {name} hashes to {hash}, inside the reserved band [-128, -1]; pick another name")]
    ReservedHash {
        /// The rejected name.
        name: String,
        /// Its 16-bit hash.
        hash: i16,
    },
}

fn truncate_repr(mut repr: String) -> String {
    if repr.len() > MAX_REPR_LEN {
        let mut cut = MAX_REPR_LEN;
        while !repr.is_char_boundary(cut) {
            cut -= 1;
        }
        repr.truncate(cut);
        repr.push_str("...");
    }
    repr
}

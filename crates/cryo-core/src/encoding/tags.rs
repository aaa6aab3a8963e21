//! The type-ID registry: the fixed mapping from tag bytes to variants.
//!
//! Tags are historical wire constants and must never be renumbered; new
//! variants take previously unused byte values. Size-class suffixes:
//! `_0` empty, `_SM` length fits 1 unsigned byte (≤127), `_MD` fits a
//! 2-byte signed big-endian prefix (≤32767), `_LG` fits a 4-byte signed
//! big-endian prefix, `_XL` full 8-byte payload (integers only).
//!
//! Built-in tags occupy `0..=127`. Tags `0x80..=0xFF` are the negated
//! byte ids of unprefixed custom types (user id 1 ⇒ tag 0xFF, id 128 ⇒
//! tag 0x80). Named custom types are written as [`PREFIXED_CUSTOM`]
//! followed by a 16-bit hash.
//!
//! Tags marked *deprecated* are decode-only: readers accept them, writers
//! never emit them.

/// Never written; reading it is always an error.
pub const RESERVED: u8 = 0;

pub const NIL: u8 = 1;
pub const TRUE: u8 = 2;
pub const FALSE: u8 = 3;
/// One big-endian UTF-16 code unit.
pub const CHAR: u8 = 4;
/// Deprecated legacy boolean: one payload byte, non-zero is true.
pub const BOOL_DEPR: u8 = 5;

pub const LONG_ZERO: u8 = 6;
pub const LONG_SM: u8 = 7;
pub const LONG_MD: u8 = 8;
pub const LONG_LG: u8 = 9;
pub const LONG_XL: u8 = 10;
pub const FLOAT: u8 = 11;
pub const DOUBLE: u8 = 12;

/// Two's-complement big-endian magnitude, 1-byte length.
pub const BIGINT_SM: u8 = 13;
/// Two's-complement big-endian magnitude, 4-byte length.
pub const BIGINT_LG: u8 = 14;
/// 4-byte scale, then a `BIGINT_LG`-style unscaled value.
pub const BIGDEC: u8 = 15;
/// Numerator then denominator, each `BIGINT_LG`-style.
pub const RATIO: u8 = 16;

pub const VEC_0: u8 = 17;
/// Two elements, no length prefix.
pub const VEC_2: u8 = 18;
/// Three elements, no length prefix.
pub const VEC_3: u8 = 19;
pub const VEC_SM: u8 = 20;
pub const VEC_MD: u8 = 21;
pub const VEC_LG: u8 = 22;
/// Deprecated large-vector encoding: 4-byte count.
pub const VEC_DEPR: u8 = 23;

pub const LIST_0: u8 = 24;
pub const LIST_SM: u8 = 25;
pub const LIST_MD: u8 = 26;
pub const LIST_LG: u8 = 27;

pub const SEQ_0: u8 = 28;
pub const SEQ_SM: u8 = 29;
pub const SEQ_MD: u8 = 30;
pub const SEQ_LG: u8 = 31;

pub const SET_0: u8 = 32;
pub const SET_SM: u8 = 33;
pub const SET_MD: u8 = 34;
pub const SET_LG: u8 = 35;
/// Deprecated large-set encoding: 4-byte count.
pub const SET_DEPR: u8 = 36;

/// 4-byte count; elements arrive in comparator order.
pub const SORTED_SET: u8 = 37;
/// 4-byte count.
pub const QUEUE: u8 = 38;

/// 8-byte signed milliseconds since epoch.
pub const DATE: u8 = 40;
/// Two big-endian 64-bit halves.
pub const UUID: u8 = 41;
/// Pattern source as a 4-byte-length UTF-8 string.
pub const REGEX: u8 = 42;

/// Metadata prefix: the annotation map, then the annotated value.
pub const META: u8 = 44;

/// Host-native serialized object; type name length fits one byte.
pub const SZ_SM: u8 = 46;
/// Host-native serialized object; type name length fits two bytes.
pub const SZ_MD: u8 = 47;

/// Textual fallback representation, small.
pub const READER_SM: u8 = 48;
/// Textual fallback representation, medium.
pub const READER_MD: u8 = 49;
/// Textual fallback representation, large.
pub const READER_LG: u8 = 50;

/// Record; type name length fits one byte. Body is an ordinary map value.
pub const REC_SM: u8 = 52;
/// Record; type name length fits two bytes.
pub const REC_MD: u8 = 53;

/// Named custom type: a 16-bit hash follows, then the registered payload.
pub const PREFIXED_CUSTOM: u8 = 82;

pub const KW_SM: u8 = 90;
pub const KW_MD: u8 = 91;
pub const SYM_SM: u8 = 93;
pub const SYM_MD: u8 = 94;

pub const BYTES_0: u8 = 96;
pub const BYTES_SM: u8 = 97;
pub const BYTES_MD: u8 = 98;
pub const BYTES_LG: u8 = 99;

pub const STR_0: u8 = 104;
pub const STR_SM: u8 = 105;
pub const STR_MD: u8 = 106;
pub const STR_LG: u8 = 107;
/// Deprecated legacy UTF writer: 2-byte unsigned length, then UTF-8.
pub const STR_DEPR: u8 = 108;

pub const MAP_0: u8 = 111;
pub const MAP_SM: u8 = 112;
pub const MAP_MD: u8 = 113;
pub const MAP_LG: u8 = 114;
/// Deprecated map encoding: the 4-byte count is TWICE the entry count.
pub const MAP_DEPR2: u8 = 115;
/// 4-byte entry count; entries arrive in comparator order.
pub const SORTED_MAP: u8 = 116;

/// True for tag bytes in the unprefixed-custom range.
#[must_use]
pub const fn is_custom(tag: u8) -> bool {
    tag >= 0x80
}

/// A human-readable name for a tag, for error breadcrumbs.
#[must_use]
pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        RESERVED => "reserved",
        NIL => "nil",
        TRUE => "true",
        FALSE => "false",
        CHAR => "char",
        BOOL_DEPR => "bool-depr",
        LONG_ZERO => "long-zero",
        LONG_SM => "long-sm",
        LONG_MD => "long-md",
        LONG_LG => "long-lg",
        LONG_XL => "long-xl",
        FLOAT => "float",
        DOUBLE => "double",
        BIGINT_SM => "bigint-sm",
        BIGINT_LG => "bigint-lg",
        BIGDEC => "bigdec",
        RATIO => "ratio",
        VEC_0 => "vec-0",
        VEC_2 => "vec-2",
        VEC_3 => "vec-3",
        VEC_SM => "vec-sm",
        VEC_MD => "vec-md",
        VEC_LG => "vec-lg",
        VEC_DEPR => "vec-depr",
        LIST_0 => "list-0",
        LIST_SM => "list-sm",
        LIST_MD => "list-md",
        LIST_LG => "list-lg",
        SEQ_0 => "seq-0",
        SEQ_SM => "seq-sm",
        SEQ_MD => "seq-md",
        SEQ_LG => "seq-lg",
        SET_0 => "set-0",
        SET_SM => "set-sm",
        SET_MD => "set-md",
        SET_LG => "set-lg",
        SET_DEPR => "set-depr",
        SORTED_SET => "sorted-set",
        QUEUE => "queue",
        DATE => "date",
        UUID => "uuid",
        REGEX => "regex",
        META => "meta",
        SZ_SM => "serializable-sm",
        SZ_MD => "serializable-md",
        READER_SM => "reader-sm",
        READER_MD => "reader-md",
        READER_LG => "reader-lg",
        REC_SM => "record-sm",
        REC_MD => "record-md",
        PREFIXED_CUSTOM => "prefixed-custom",
        KW_SM => "kw-sm",
        KW_MD => "kw-md",
        SYM_SM => "sym-sm",
        SYM_MD => "sym-md",
        BYTES_0 => "bytes-0",
        BYTES_SM => "bytes-sm",
        BYTES_MD => "bytes-md",
        BYTES_LG => "bytes-lg",
        STR_0 => "str-0",
        STR_SM => "str-sm",
        STR_MD => "str-md",
        STR_LG => "str-lg",
        STR_DEPR => "str-depr",
        MAP_0 => "map-0",
        MAP_SM => "map-sm",
        MAP_MD => "map-md",
        MAP_LG => "map-lg",
        MAP_DEPR2 => "map-depr2",
        SORTED_MAP => "sorted-map",
        t if is_custom(t) => "custom",
        _ => "unknown",
    }
}

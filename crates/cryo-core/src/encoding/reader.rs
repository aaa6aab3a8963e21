//! The polymorphic reader: reads a tag byte and decodes the payload back
//! into a [`Value`].
//!
//! Decode failures are fatal and carry the offending tag. The exceptions
//! are payloads that decode structurally but cannot re-materialize (a
//! host-native object graph, a textual form with no reader, a pattern
//! that no longer compiles): those come back inline as
//! [`Value::Unthawable`] sentinels so the surrounding document survives.

use std::collections::{BTreeMap, BTreeSet};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use regex::Regex;

use super::primitives::ByteReader;
use super::{tags, MAX_DEPTH};
use crate::error::ThawError;
use crate::ext::CodecContext;
use crate::types::{BigDecimal, Keyword, Record, Symbol, Unthawable, UnthawableKind, Value};

/// Max elements preallocated from a wire length prefix; a hostile prefix
/// cannot force a huge up-front allocation.
const MAX_PREALLOC: usize = 4096;

/// Reads one value from `input`.
///
/// Trailing bytes are left unconsumed.
///
/// # Errors
///
/// Returns [`ThawError`] for unknown tags, truncated or malformed
/// payloads, and custom ids with no registered reader.
pub fn thaw_value(input: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Value, ThawError> {
    thaw_at(input, ctx, 0)
}

fn thaw_at(
    input: &mut ByteReader<'_>,
    ctx: &CodecContext,
    depth: usize,
) -> Result<Value, ThawError> {
    if depth >= MAX_DEPTH {
        return Err(ThawError::DepthExceeded { max: MAX_DEPTH });
    }
    let tag = input.read_u8()?;
    decode_tagged(tag, input, ctx, depth).map_err(|e| ThawError::failed(tag, e))
}

#[allow(clippy::too_many_lines)]
fn decode_tagged(
    tag: u8,
    input: &mut ByteReader<'_>,
    ctx: &CodecContext,
    depth: usize,
) -> Result<Value, ThawError> {
    if tags::is_custom(tag) {
        return decode_custom(i16::from(tag as i8), input, ctx);
    }
    match tag {
        tags::NIL => Ok(Value::Nil),
        tags::TRUE => Ok(Value::Bool(true)),
        tags::FALSE => Ok(Value::Bool(false)),
        tags::BOOL_DEPR => Ok(Value::Bool(input.read_u8()? != 0)),
        tags::CHAR => {
            let unit = input.read_u16()?;
            char::from_u32(u32::from(unit))
                .map(Value::Char)
                .ok_or(ThawError::Malformed { what: "unpaired surrogate code unit" })
        }
        tags::LONG_ZERO => Ok(Value::Long(0)),
        tags::LONG_SM => Ok(Value::Long(i64::from(input.read_i8()?))),
        tags::LONG_MD => Ok(Value::Long(i64::from(input.read_i16()?))),
        tags::LONG_LG => Ok(Value::Long(i64::from(input.read_i32()?))),
        tags::LONG_XL => Ok(Value::Long(input.read_i64()?)),
        tags::FLOAT => Ok(Value::Float(input.read_f32()?)),
        tags::DOUBLE => Ok(Value::Double(input.read_f64()?)),
        tags::BIGINT_SM => {
            let len = input.read_len_sm()?;
            Ok(Value::BigInt(BigInt::from_signed_bytes_be(input.take(len)?)))
        }
        tags::BIGINT_LG => Ok(Value::BigInt(read_bigint_lg(input)?)),
        tags::BIGDEC => {
            let scale = input.read_i32()?;
            let unscaled = read_bigint_lg(input)?;
            Ok(Value::BigDecimal(BigDecimal { unscaled, scale }))
        }
        tags::RATIO => {
            let numer = read_bigint_lg(input)?;
            let denom = read_bigint_lg(input)?;
            if denom.is_zero() {
                return Err(ThawError::Malformed { what: "zero ratio denominator" });
            }
            Ok(Value::Ratio(BigRational::new(numer, denom)))
        }
        tags::STR_0 => Ok(Value::Str(String::new())),
        tags::STR_SM => {
            let len = input.read_len_sm()?;
            Ok(Value::Str(read_string(input, len, "string")?))
        }
        tags::STR_MD => {
            let len = input.read_len_md()?;
            Ok(Value::Str(read_string(input, len, "string")?))
        }
        tags::STR_LG => {
            let len = input.read_len_lg()?;
            Ok(Value::Str(read_string(input, len, "string")?))
        }
        tags::STR_DEPR => {
            // Legacy UTF writer: unsigned 2-byte length.
            let len = usize::from(input.read_u16()?);
            Ok(Value::Str(read_string(input, len, "string")?))
        }
        tags::KW_SM => {
            let len = input.read_len_sm()?;
            Ok(Value::Keyword(Keyword::from_qualified(&read_string(input, len, "keyword")?)))
        }
        tags::KW_MD => {
            let len = input.read_len_md()?;
            Ok(Value::Keyword(Keyword::from_qualified(&read_string(input, len, "keyword")?)))
        }
        tags::SYM_SM => {
            let len = input.read_len_sm()?;
            Ok(Value::Symbol(Symbol::from_qualified(&read_string(input, len, "symbol")?)))
        }
        tags::SYM_MD => {
            let len = input.read_len_md()?;
            Ok(Value::Symbol(Symbol::from_qualified(&read_string(input, len, "symbol")?)))
        }
        tags::REGEX => {
            let len = input.read_len_lg()?;
            let pattern = read_string(input, len, "regex pattern")?;
            Ok(match Regex::new(&pattern) {
                Ok(re) => Value::Regex(re),
                Err(e) => sentinel(
                    UnthawableKind::Regex,
                    None,
                    e.to_string(),
                    pattern.into_bytes(),
                ),
            })
        }
        tags::BYTES_0 => Ok(Value::Bytes(Vec::new())),
        tags::BYTES_SM => {
            let len = input.read_len_sm()?;
            Ok(Value::Bytes(input.take(len)?.to_vec()))
        }
        tags::BYTES_MD => {
            let len = input.read_len_md()?;
            Ok(Value::Bytes(input.take(len)?.to_vec()))
        }
        tags::BYTES_LG => {
            let len = input.read_len_lg()?;
            Ok(Value::Bytes(input.take(len)?.to_vec()))
        }
        tags::VEC_0 => Ok(Value::Vector(Vec::new())),
        tags::VEC_2 => Ok(Value::Vector(read_items(input, ctx, depth, 2)?)),
        tags::VEC_3 => Ok(Value::Vector(read_items(input, ctx, depth, 3)?)),
        tags::VEC_SM => {
            let count = input.read_len_sm()?;
            Ok(Value::Vector(read_items(input, ctx, depth, count)?))
        }
        tags::VEC_MD => {
            let count = input.read_len_md()?;
            Ok(Value::Vector(read_items(input, ctx, depth, count)?))
        }
        tags::VEC_LG | tags::VEC_DEPR => {
            let count = input.read_len_lg()?;
            Ok(Value::Vector(read_items(input, ctx, depth, count)?))
        }
        tags::LIST_0 => Ok(Value::List(Vec::new())),
        tags::LIST_SM => {
            let count = input.read_len_sm()?;
            Ok(Value::List(read_items(input, ctx, depth, count)?))
        }
        tags::LIST_MD => {
            let count = input.read_len_md()?;
            Ok(Value::List(read_items(input, ctx, depth, count)?))
        }
        tags::LIST_LG => {
            let count = input.read_len_lg()?;
            Ok(Value::List(read_items(input, ctx, depth, count)?))
        }
        tags::SEQ_0 => Ok(Value::Seq(Vec::new())),
        tags::SEQ_SM => {
            let count = input.read_len_sm()?;
            Ok(Value::Seq(read_items(input, ctx, depth, count)?))
        }
        tags::SEQ_MD => {
            let count = input.read_len_md()?;
            Ok(Value::Seq(read_items(input, ctx, depth, count)?))
        }
        tags::SEQ_LG => {
            let count = input.read_len_lg()?;
            Ok(Value::Seq(read_items(input, ctx, depth, count)?))
        }
        tags::SET_0 => Ok(Value::Set(BTreeSet::new())),
        tags::SET_SM => {
            let count = input.read_len_sm()?;
            Ok(Value::Set(read_set(input, ctx, depth, count)?))
        }
        tags::SET_MD => {
            let count = input.read_len_md()?;
            Ok(Value::Set(read_set(input, ctx, depth, count)?))
        }
        tags::SET_LG | tags::SET_DEPR => {
            let count = input.read_len_lg()?;
            Ok(Value::Set(read_set(input, ctx, depth, count)?))
        }
        tags::SORTED_SET => {
            let count = input.read_len_lg()?;
            Ok(Value::SortedSet(read_set(input, ctx, depth, count)?))
        }
        tags::QUEUE => {
            let count = input.read_len_lg()?;
            Ok(Value::Queue(read_items(input, ctx, depth, count)?.into_iter().collect()))
        }
        tags::MAP_0 => Ok(Value::Map(BTreeMap::new())),
        tags::MAP_SM => {
            let count = input.read_len_sm()?;
            Ok(Value::Map(read_entries(input, ctx, depth, count)?))
        }
        tags::MAP_MD => {
            let count = input.read_len_md()?;
            Ok(Value::Map(read_entries(input, ctx, depth, count)?))
        }
        tags::MAP_LG => {
            let count = input.read_len_lg()?;
            Ok(Value::Map(read_entries(input, ctx, depth, count)?))
        }
        tags::MAP_DEPR2 => {
            // Historical format: the count is twice the entry count.
            let doubled = input.read_len_lg()?;
            if doubled % 2 != 0 {
                return Err(ThawError::Malformed { what: "odd doubled map count" });
            }
            Ok(Value::Map(read_entries(input, ctx, depth, doubled / 2)?))
        }
        tags::SORTED_MAP => {
            let count = input.read_len_lg()?;
            Ok(Value::SortedMap(read_entries(input, ctx, depth, count)?))
        }
        tags::DATE => Ok(Value::Date(input.read_i64()?)),
        tags::UUID => {
            let bytes: [u8; 16] = input.take(16)?.try_into().map_err(|_| {
                ThawError::Truncated { needed: 16, remaining: input.remaining() }
            })?;
            Ok(Value::Uuid(uuid::Uuid::from_u128(u128::from_be_bytes(bytes))))
        }
        tags::REC_SM | tags::REC_MD => {
            let len = if tag == tags::REC_SM {
                input.read_len_sm()?
            } else {
                input.read_len_md()?
            };
            let name = read_string(input, len, "record type name")?;
            match thaw_at(input, ctx, depth + 1)? {
                Value::Map(fields) | Value::SortedMap(fields) => {
                    Ok(Value::Record(Record { name, fields }))
                }
                _ => Err(ThawError::Malformed { what: "record body is not a map" }),
            }
        }
        tags::META => {
            let meta = thaw_at(input, ctx, depth + 1)?;
            let value = thaw_at(input, ctx, depth + 1)?;
            Ok(Value::with_meta(meta, value))
        }
        tags::SZ_SM | tags::SZ_MD => {
            let len = if tag == tags::SZ_SM {
                input.read_len_sm()?
            } else {
                input.read_len_md()?
            };
            let name = read_string(input, len, "serialized type name")?;
            let payload_len = input.read_len_lg()?;
            let raw = input.take(payload_len)?.to_vec();
            Ok(sentinel(
                UnthawableKind::Serializable,
                Some(name),
                "host-native object deserialization is not supported".to_owned(),
                raw,
            ))
        }
        tags::READER_SM | tags::READER_MD | tags::READER_LG => {
            let len = match tag {
                tags::READER_SM => input.read_len_sm()?,
                tags::READER_MD => input.read_len_md()?,
                _ => input.read_len_lg()?,
            };
            let text = read_string(input, len, "readable payload")?;
            Ok(sentinel(
                UnthawableKind::Readable,
                None,
                "no textual reader installed".to_owned(),
                text.into_bytes(),
            ))
        }
        tags::PREFIXED_CUSTOM => {
            let hash = input.read_i16()?;
            decode_custom(hash, input, ctx)
        }
        _ => Err(ThawError::UnknownTag { tag }),
    }
}

fn decode_custom(
    id: i16,
    input: &mut ByteReader<'_>,
    ctx: &CodecContext,
) -> Result<Value, ThawError> {
    match ctx.ext_reader(id) {
        Some(reader) => reader.decode(input, ctx),
        None => Err(ThawError::UnknownCustomType { id }),
    }
}

fn read_string(
    input: &mut ByteReader<'_>,
    len: usize,
    what: &'static str,
) -> Result<String, ThawError> {
    let bytes = input.take(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| ThawError::InvalidUtf8 { what })
}

fn read_bigint_lg(input: &mut ByteReader<'_>) -> Result<BigInt, ThawError> {
    let len = input.read_len_lg()?;
    Ok(BigInt::from_signed_bytes_be(input.take(len)?))
}

fn read_items(
    input: &mut ByteReader<'_>,
    ctx: &CodecContext,
    depth: usize,
    count: usize,
) -> Result<Vec<Value>, ThawError> {
    let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        items.push(thaw_at(input, ctx, depth + 1)?);
    }
    Ok(items)
}

fn read_set(
    input: &mut ByteReader<'_>,
    ctx: &CodecContext,
    depth: usize,
    count: usize,
) -> Result<BTreeSet<Value>, ThawError> {
    let mut set = BTreeSet::new();
    for _ in 0..count {
        set.insert(thaw_at(input, ctx, depth + 1)?);
    }
    Ok(set)
}

fn read_entries(
    input: &mut ByteReader<'_>,
    ctx: &CodecContext,
    depth: usize,
    count: usize,
) -> Result<BTreeMap<Value, Value>, ThawError> {
    let mut entries = BTreeMap::new();
    for _ in 0..count {
        let key = thaw_at(input, ctx, depth + 1)?;
        let value = thaw_at(input, ctx, depth + 1)?;
        entries.insert(key, value);
    }
    Ok(entries)
}

fn sentinel(kind: UnthawableKind, type_name: Option<String>, cause: String, raw: Vec<u8>) -> Value {
    Value::Unthawable(Box::new(Unthawable { kind, type_name, cause, raw_content: raw }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::encoding::writer::freeze_value;

    fn roundtrip(value: &Value) -> Value {
        let mut out = Vec::with_capacity(64);
        freeze_value(value, &mut out, CodecContext::global()).unwrap();
        let mut r = ByteReader::new(&out);
        let thawed = thaw_value(&mut r, CodecContext::global()).unwrap();
        assert!(r.is_empty(), "trailing bytes after {value:?}");
        thawed
    }

    #[test]
    fn scalars_roundtrip() {
        for v in [
            Value::Nil,
            Value::Bool(true),
            Value::Bool(false),
            Value::Char('é'),
            Value::Long(-42),
            Value::Long(i64::MIN),
            Value::Float(1.25),
            Value::Double(-0.0),
            Value::Date(1_700_000_000_000),
            Value::Uuid(uuid::Uuid::from_u128(0x0123_4567_89AB_CDEF_0123_4567_89AB_CDEF)),
        ] {
            assert_eq!(roundtrip(&v), v);
        }
    }

    #[test]
    fn numeric_tower_roundtrips() {
        let big = BigInt::parse_bytes(b"-123456789012345678901234567890", 10).unwrap();
        assert_eq!(roundtrip(&Value::BigInt(big.clone())), Value::BigInt(big.clone()));
        let dec = Value::BigDecimal(BigDecimal::new(big.clone(), -7));
        assert_eq!(roundtrip(&dec), dec);
        let ratio = Value::Ratio(BigRational::new(big, BigInt::from(7)));
        assert_eq!(roundtrip(&ratio), ratio);
    }

    #[test]
    fn symbolic_names_roundtrip() {
        let kw = Value::Keyword(Keyword::namespaced("user", "id"));
        assert_eq!(roundtrip(&kw), kw);
        let sym = Value::Symbol(Symbol::new("frobnicate"));
        assert_eq!(roundtrip(&sym), sym);
    }

    #[test]
    fn collections_roundtrip() {
        let v = Value::Vector(vec![Value::Long(1), Value::Str("two".into()), Value::Nil]);
        assert_eq!(roundtrip(&v), v);
        let q = Value::Queue(VecDeque::from(vec![Value::Long(1), Value::Long(2)]));
        assert_eq!(roundtrip(&q), q);
        let s = Value::SortedSet([Value::Long(3), Value::Long(1)].into_iter().collect());
        assert_eq!(roundtrip(&s), s);
    }

    #[test]
    fn record_roundtrips() {
        let mut fields = BTreeMap::new();
        fields.insert(Value::Keyword(Keyword::new("x")), Value::Long(1));
        let rec = Value::Record(Record::new("geo.Point", fields));
        assert_eq!(roundtrip(&rec), rec);
    }

    #[test]
    fn metadata_is_reattached() {
        let mut meta = BTreeMap::new();
        meta.insert(Value::Keyword(Keyword::new("source")), Value::Str("import".into()));
        let v = Value::with_meta(Value::Map(meta), Value::Long(9));
        assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn deprecated_boolean_still_decodes() {
        let mut r = ByteReader::new(&[tags::BOOL_DEPR, 1]);
        assert_eq!(thaw_value(&mut r, CodecContext::global()).unwrap(), Value::Bool(true));
    }

    #[test]
    fn deprecated_utf_writer_still_decodes() {
        let mut buf = vec![tags::STR_DEPR, 0, 5];
        buf.extend_from_slice(b"hello");
        let mut r = ByteReader::new(&buf);
        assert_eq!(
            thaw_value(&mut r, CodecContext::global()).unwrap(),
            Value::Str("hello".into())
        );
    }

    #[test]
    fn deprecated_doubled_map_count_decodes() {
        // Two entries, historical count of 4.
        let mut buf = vec![tags::MAP_DEPR2, 0, 0, 0, 4];
        buf.extend_from_slice(&[tags::LONG_SM, 1, tags::TRUE]);
        buf.extend_from_slice(&[tags::LONG_SM, 2, tags::FALSE]);
        let mut r = ByteReader::new(&buf);
        let m = thaw_value(&mut r, CodecContext::global()).unwrap();
        assert_eq!(m.as_map().unwrap().len(), 2);
    }

    #[test]
    fn odd_doubled_map_count_is_malformed() {
        let buf = vec![tags::MAP_DEPR2, 0, 0, 0, 3];
        let mut r = ByteReader::new(&buf);
        let err = thaw_value(&mut r, CodecContext::global()).unwrap_err();
        assert!(matches!(err, ThawError::Failed { tag: tags::MAP_DEPR2, .. }));
    }

    #[test]
    fn deprecated_large_vector_decodes() {
        let buf = vec![tags::VEC_DEPR, 0, 0, 0, 2, tags::NIL, tags::NIL];
        let mut r = ByteReader::new(&buf);
        assert_eq!(
            thaw_value(&mut r, CodecContext::global()).unwrap(),
            Value::Vector(vec![Value::Nil, Value::Nil])
        );
    }

    #[test]
    fn unknown_tag_is_an_error_not_a_guess() {
        for tag in [tags::RESERVED, 39, 120] {
            let buf = [tag];
            let mut r = ByteReader::new(&buf);
            let err = thaw_value(&mut r, CodecContext::global()).unwrap_err();
            assert!(matches!(err, ThawError::UnknownTag { .. }), "tag {tag}");
        }
    }

    #[test]
    fn truncation_carries_the_offending_tag() {
        let mut r = ByteReader::new(&[tags::LONG_XL, 0, 1]);
        let err = thaw_value(&mut r, CodecContext::global()).unwrap_err();
        match err {
            ThawError::Failed { tag, source } => {
                assert_eq!(tag, tags::LONG_XL);
                assert!(matches!(*source, ThawError::Truncated { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn surrogate_char_is_malformed() {
        let mut r = ByteReader::new(&[tags::CHAR, 0xD8, 0x00]);
        let err = thaw_value(&mut r, CodecContext::global()).unwrap_err();
        assert!(matches!(err, ThawError::Failed { tag: tags::CHAR, .. }));
    }

    #[test]
    fn serialized_object_comes_back_as_a_sentinel() {
        let mut buf = vec![tags::SZ_SM, 7];
        buf.extend_from_slice(b"a.b.Cls");
        buf.extend_from_slice(&4i32.to_be_bytes());
        buf.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let mut r = ByteReader::new(&buf);
        match thaw_value(&mut r, CodecContext::global()).unwrap() {
            Value::Unthawable(u) => {
                assert_eq!(u.kind, UnthawableKind::Serializable);
                assert_eq!(u.type_name.as_deref(), Some("a.b.Cls"));
                assert_eq!(u.raw_content, vec![0xDE, 0xAD, 0xBE, 0xEF]);
            }
            other => panic!("expected sentinel, got {other:?}"),
        }
    }

    #[test]
    fn bad_regex_pattern_comes_back_as_a_sentinel() {
        let mut buf = vec![tags::REGEX];
        buf.extend_from_slice(&2i32.to_be_bytes());
        buf.extend_from_slice(b"([");
        let mut r = ByteReader::new(&buf);
        match thaw_value(&mut r, CodecContext::global()).unwrap() {
            Value::Unthawable(u) => {
                assert_eq!(u.kind, UnthawableKind::Regex);
                assert_eq!(u.raw_text(), Some("(["));
            }
            other => panic!("expected sentinel, got {other:?}"),
        }
    }

    #[test]
    fn unregistered_custom_id_is_an_error() {
        let mut r = ByteReader::new(&[0xFF]);
        let err = thaw_value(&mut r, CodecContext::global()).unwrap_err();
        assert!(matches!(err, ThawError::UnknownCustomType { id: -1 }));
    }
}

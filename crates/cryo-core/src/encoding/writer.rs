//! The polymorphic writer: dispatches on a value's variant and appends its
//! tagged encoding to a byte sink.

use num_bigint::BigInt;

use super::primitives::{
    write_bytes_classed, write_bytes_lg, write_bytes_sm, write_long, write_name, write_prefix,
    BYTES_TAGS, LIST_TAGS, MAP_TAGS, MD_MAX, LG_MAX, SEQ_TAGS, SET_TAGS, SM_MAX, STR_TAGS,
    VEC_TAGS,
};
use super::{tags, MAX_DEPTH};
use crate::error::FreezeError;
use crate::ext::{CodecContext, FreezeFallback, WireId};
use crate::types::{CustomValue, Unthawable, UnthawableKind, Value};

/// Appends the encoding of `value` to `out`.
///
/// # Errors
///
/// Returns [`FreezeError`] when the value (or a nested part of it) has no
/// encoding and the fallback policy declines it, or when it exceeds a size
/// or depth limit.
pub fn freeze_value(
    value: &Value,
    out: &mut Vec<u8>,
    ctx: &CodecContext,
) -> Result<(), FreezeError> {
    freeze_at(value, out, ctx, 0)
}

fn freeze_at(
    value: &Value,
    out: &mut Vec<u8>,
    ctx: &CodecContext,
    depth: usize,
) -> Result<(), FreezeError> {
    if depth >= MAX_DEPTH {
        return Err(FreezeError::DepthExceeded { max: MAX_DEPTH });
    }
    match value {
        // Metadata is a prefix on the value, not a wrapper node; the
        // reader pops both. Empty annotation maps are dropped.
        Value::WithMeta { meta, value: inner } => {
            let empty =
                matches!(&**meta, Value::Map(m) | Value::SortedMap(m) if m.is_empty());
            if !empty {
                out.push(tags::META);
                freeze_at(meta, out, ctx, depth + 1)?;
            }
            freeze_at(inner, out, ctx, depth + 1)
        }
        Value::Nil => {
            out.push(tags::NIL);
            Ok(())
        }
        Value::Bool(b) => {
            out.push(if *b { tags::TRUE } else { tags::FALSE });
            Ok(())
        }
        Value::Char(c) => {
            let codepoint = u32::from(*c);
            let unit = u16::try_from(codepoint)
                .map_err(|_| FreezeError::UnencodableChar { codepoint })?;
            out.push(tags::CHAR);
            out.extend_from_slice(&unit.to_be_bytes());
            Ok(())
        }
        Value::Long(n) => {
            write_long(out, *n);
            Ok(())
        }
        Value::Float(f) => {
            out.push(tags::FLOAT);
            out.extend_from_slice(&f.to_be_bytes());
            Ok(())
        }
        Value::Double(f) => {
            out.push(tags::DOUBLE);
            out.extend_from_slice(&f.to_be_bytes());
            Ok(())
        }
        Value::BigInt(n) => write_bigint(out, n),
        Value::BigDecimal(d) => {
            out.push(tags::BIGDEC);
            out.extend_from_slice(&d.scale.to_be_bytes());
            write_bytes_lg(out, &d.unscaled.to_signed_bytes_be())
        }
        Value::Ratio(r) => {
            out.push(tags::RATIO);
            write_bytes_lg(out, &r.numer().to_signed_bytes_be())?;
            write_bytes_lg(out, &r.denom().to_signed_bytes_be())
        }
        Value::Str(s) => write_bytes_classed(out, s.as_bytes(), &STR_TAGS),
        Value::Keyword(k) => write_name(out, &k.qualified(), tags::KW_SM, tags::KW_MD),
        Value::Symbol(s) => write_name(out, &s.qualified(), tags::SYM_SM, tags::SYM_MD),
        Value::Regex(re) => {
            out.push(tags::REGEX);
            write_bytes_lg(out, re.as_str().as_bytes())
        }
        Value::Bytes(b) => write_bytes_classed(out, b, &BYTES_TAGS),
        Value::Vector(items) => match items.len() {
            2 => {
                out.push(tags::VEC_2);
                freeze_items(items.iter(), out, ctx, depth)
            }
            3 => {
                out.push(tags::VEC_3);
                freeze_items(items.iter(), out, ctx, depth)
            }
            len => {
                write_prefix(out, len, &VEC_TAGS)?;
                freeze_items(items.iter(), out, ctx, depth)
            }
        },
        Value::List(items) => {
            write_prefix(out, items.len(), &LIST_TAGS)?;
            freeze_items(items.iter(), out, ctx, depth)
        }
        Value::Seq(items) => {
            write_prefix(out, items.len(), &SEQ_TAGS)?;
            freeze_items(items.iter(), out, ctx, depth)
        }
        Value::Set(items) => {
            write_prefix(out, items.len(), &SET_TAGS)?;
            freeze_items(items.iter(), out, ctx, depth)
        }
        Value::SortedSet(items) => {
            out.push(tags::SORTED_SET);
            write_count_lg(out, items.len())?;
            freeze_items(items.iter(), out, ctx, depth)
        }
        Value::Queue(items) => {
            out.push(tags::QUEUE);
            write_count_lg(out, items.len())?;
            freeze_items(items.iter(), out, ctx, depth)
        }
        Value::Map(entries) => {
            write_prefix(out, entries.len(), &MAP_TAGS)?;
            freeze_entries(entries, out, ctx, depth)
        }
        Value::SortedMap(entries) => {
            out.push(tags::SORTED_MAP);
            write_count_lg(out, entries.len())?;
            freeze_entries(entries, out, ctx, depth)
        }
        Value::Date(ms) => {
            out.push(tags::DATE);
            out.extend_from_slice(&ms.to_be_bytes());
            Ok(())
        }
        Value::Uuid(u) => {
            out.push(tags::UUID);
            out.extend_from_slice(&u.as_u128().to_be_bytes());
            Ok(())
        }
        Value::Record(rec) => {
            write_name(out, &rec.name, tags::REC_SM, tags::REC_MD)?;
            write_prefix(out, rec.fields.len(), &MAP_TAGS)?;
            freeze_entries(&rec.fields, out, ctx, depth)
        }
        Value::Custom(cv) => {
            let payload = cv.payload();
            match ctx.ext_writer(payload.as_any().type_id()) {
                Some(writer) => {
                    match writer.wire_id {
                        WireId::Byte(id) => out.push(id.wrapping_neg()),
                        WireId::Named(hash) => {
                            out.push(tags::PREFIXED_CUSTOM);
                            out.extend_from_slice(&hash.to_be_bytes());
                        }
                    }
                    writer.encode(out, payload, ctx)
                }
                None => write_fallback(value, cv, out, ctx),
            }
        }
        Value::Unthawable(u) => {
            // Re-freezing a damaged payload keeps what is known about it.
            write_marker_map(out, sentinel_type_name(u), &sentinel_text(u))
        }
    }
}

fn freeze_items<'a>(
    items: impl Iterator<Item = &'a Value>,
    out: &mut Vec<u8>,
    ctx: &CodecContext,
    depth: usize,
) -> Result<(), FreezeError> {
    for item in items {
        freeze_at(item, out, ctx, depth + 1)?;
    }
    Ok(())
}

fn freeze_entries(
    entries: &std::collections::BTreeMap<Value, Value>,
    out: &mut Vec<u8>,
    ctx: &CodecContext,
    depth: usize,
) -> Result<(), FreezeError> {
    for (k, v) in entries {
        freeze_at(k, out, ctx, depth + 1)?;
        freeze_at(v, out, ctx, depth + 1)?;
    }
    Ok(())
}

fn write_count_lg(out: &mut Vec<u8>, len: usize) -> Result<(), FreezeError> {
    let count = i32::try_from(len).map_err(|_| FreezeError::TooLong { len })?;
    out.extend_from_slice(&count.to_be_bytes());
    Ok(())
}

fn write_bigint(out: &mut Vec<u8>, n: &BigInt) -> Result<(), FreezeError> {
    let bytes = n.to_signed_bytes_be();
    if bytes.len() <= SM_MAX {
        out.push(tags::BIGINT_SM);
        write_bytes_sm(out, &bytes);
        Ok(())
    } else {
        out.push(tags::BIGINT_LG);
        write_bytes_lg(out, &bytes)
    }
}

fn write_reader_text(out: &mut Vec<u8>, text: &str) -> Result<(), FreezeError> {
    let bytes = text.as_bytes();
    if bytes.len() <= SM_MAX {
        out.push(tags::READER_SM);
        out.push(bytes.len() as u8);
    } else if bytes.len() <= MD_MAX {
        out.push(tags::READER_MD);
        out.extend_from_slice(&(bytes.len() as i16).to_be_bytes());
    } else if bytes.len() <= LG_MAX {
        out.push(tags::READER_LG);
        out.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
    } else {
        return Err(FreezeError::TooLong { len: bytes.len() });
    }
    out.extend_from_slice(bytes);
    Ok(())
}

// The marker map the permissive policy writes: {:type <n> :unfreezable <t>}.
// Keys are emitted in keyword order so a decoded-and-refrozen marker is
// byte-identical.
fn write_marker_map(out: &mut Vec<u8>, type_name: &str, text: &str) -> Result<(), FreezeError> {
    out.push(tags::MAP_SM);
    out.push(2);
    write_name(out, "type", tags::KW_SM, tags::KW_MD)?;
    write_bytes_classed(out, type_name.as_bytes(), &STR_TAGS)?;
    write_name(out, "unfreezable", tags::KW_SM, tags::KW_MD)?;
    write_bytes_classed(out, text.as_bytes(), &STR_TAGS)
}

fn sentinel_type_name(u: &Unthawable) -> &str {
    u.type_name.as_deref().unwrap_or("unknown")
}

fn sentinel_text(u: &Unthawable) -> String {
    match u.kind {
        UnthawableKind::Readable | UnthawableKind::Regex => {
            String::from_utf8_lossy(&u.raw_content).into_owned()
        }
        UnthawableKind::Serializable => u.cause.clone(),
    }
}

fn write_fallback(
    value: &Value,
    cv: &CustomValue,
    out: &mut Vec<u8>,
    ctx: &CodecContext,
) -> Result<(), FreezeError> {
    let policy = ctx.freeze_fallback();
    if let FreezeFallback::Custom(handler) = &policy {
        return handler(out, value, ctx);
    }
    let payload = cv.payload();
    if let Some(bytes) = payload.fallback_bytes() {
        write_name(out, payload.type_name(), tags::SZ_SM, tags::SZ_MD)?;
        return write_bytes_lg(out, &bytes);
    }
    if let Some(text) = payload.fallback_repr() {
        return write_reader_text(out, &text);
    }
    match policy {
        FreezeFallback::WriteUnfreezable => {
            write_marker_map(out, payload.type_name(), &format!("{payload:?}"))
        }
        _ => Err(FreezeError::unfreezable(payload.type_name(), format!("{payload:?}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::any::Any;
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::{CustomPayload, Keyword};

    fn freeze(value: &Value) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        freeze_value(value, &mut out, CodecContext::global()).unwrap();
        out
    }

    #[test]
    fn string_encodes_small_class() {
        assert_eq!(freeze(&Value::from("hello")), b"\x69\x05hello".to_vec());
    }

    #[test]
    fn empty_vector_is_a_single_tag() {
        assert_eq!(freeze(&Value::Vector(vec![])), vec![tags::VEC_0]);
    }

    #[test]
    fn pair_and_triple_vectors_omit_the_length() {
        let pair = Value::Vector(vec![Value::Long(1), Value::Long(2)]);
        assert_eq!(freeze(&pair), vec![tags::VEC_2, tags::LONG_SM, 1, tags::LONG_SM, 2]);
        let triple = Value::Vector(vec![Value::Nil, Value::Nil, Value::Nil]);
        assert_eq!(freeze(&triple), vec![tags::VEC_3, tags::NIL, tags::NIL, tags::NIL]);
    }

    #[test]
    fn small_map_with_keyword_keys() {
        let mut m = BTreeMap::new();
        m.insert(Value::from(Keyword::new("a")), Value::Long(1));
        m.insert(Value::from(Keyword::new("b")), Value::Long(2));
        assert_eq!(
            freeze(&Value::Map(m)),
            vec![
                tags::MAP_SM,
                2,
                tags::KW_SM,
                1,
                b'a',
                tags::LONG_SM,
                1,
                tags::KW_SM,
                1,
                b'b',
                tags::LONG_SM,
                2,
            ]
        );
    }

    #[test]
    fn metadata_is_a_prefix() {
        let mut meta = BTreeMap::new();
        meta.insert(Value::from(Keyword::new("k")), Value::Bool(true));
        let v = Value::with_meta(Value::Map(meta), Value::from("x"));
        let bytes = freeze(&v);
        assert_eq!(bytes[0], tags::META);
        assert_eq!(bytes[1], tags::MAP_SM);
        assert_eq!(*bytes.last().unwrap(), b'x');
    }

    #[test]
    fn empty_metadata_is_dropped() {
        let v = Value::with_meta(Value::Map(BTreeMap::new()), Value::Long(0));
        assert_eq!(freeze(&v), vec![tags::LONG_ZERO]);
    }

    #[test]
    fn non_bmp_char_is_unfreezable() {
        let mut out = Vec::new();
        let err =
            freeze_value(&Value::Char('🦀'), &mut out, CodecContext::global()).unwrap_err();
        assert!(matches!(err, FreezeError::UnencodableChar { .. }));
    }

    #[test]
    fn runaway_nesting_is_caught() {
        let mut v = Value::Long(0);
        for _ in 0..2 * MAX_DEPTH {
            v = Value::Vector(vec![v]);
        }
        let mut out = Vec::new();
        let err = freeze_value(&v, &mut out, CodecContext::global()).unwrap_err();
        assert!(matches!(err, FreezeError::DepthExceeded { .. }));
    }

    #[derive(Debug)]
    struct Opaque;

    impl CustomPayload for Opaque {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Texty;

    impl CustomPayload for Texty {
        fn fallback_repr(&self) -> Option<String> {
            Some("texty".to_owned())
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn strict_policy_raises_for_unregistered_payloads() {
        let ctx = CodecContext::new();
        let mut out = Vec::new();
        let err =
            freeze_value(&Value::Custom(CustomValue::new(Opaque)), &mut out, &ctx).unwrap_err();
        assert!(matches!(err, FreezeError::Unfreezable { .. }));
    }

    #[test]
    fn permissive_policy_writes_the_marker_map() {
        let ctx = CodecContext::new();
        ctx.set_freeze_fallback(FreezeFallback::WriteUnfreezable);
        let mut out = Vec::new();
        freeze_value(&Value::Custom(CustomValue::new(Opaque)), &mut out, &ctx).unwrap();
        assert_eq!(out[0], tags::MAP_SM);
        assert_eq!(out[1], 2);
    }

    #[test]
    fn textual_fallback_prefers_the_reader_encoding() {
        let ctx = CodecContext::new();
        let mut out = Vec::new();
        freeze_value(&Value::Custom(CustomValue::new(Texty)), &mut out, &ctx).unwrap();
        assert_eq!(out[0], tags::READER_SM);
        assert_eq!(&out[2..], b"texty");
    }

    #[test]
    fn custom_callback_replaces_the_chain() {
        let ctx = CodecContext::new();
        ctx.set_freeze_fallback(FreezeFallback::Custom(std::sync::Arc::new(
            |out, _value, _ctx| {
                out.push(tags::NIL);
                Ok(())
            },
        )));
        let mut out = Vec::new();
        freeze_value(&Value::Custom(CustomValue::new(Opaque)), &mut out, &ctx).unwrap();
        assert_eq!(out, vec![tags::NIL]);
    }
}

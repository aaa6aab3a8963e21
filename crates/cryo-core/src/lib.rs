//! Cryo core: the value model and binary codec engine.
//!
//! This crate owns the serialization engine behind the `cryo` facade: the
//! [`Value`] union, the type-ID registry, the size-classed primitive I/O
//! helpers, the polymorphic writer and reader, the runtime-extensible
//! custom-type registry, and the fallback chain for values with no direct
//! encoding. Stream framing (headers, compression, encryption) lives in
//! the `cryo` crate.
//!
//! # Overview
//!
//! A frozen value is a self-describing byte stream: each value is a 1-byte
//! tag followed by a variant-specific payload. Common cases are kept
//! compact with per-length-class tags (empty, ≤127, ≤32767, larger) and a
//! minimal-width integer encoding; readers widen on load.
//!
//! # Example
//!
//! ```
//! use cryo_core::{Decoder, Encoder, Keyword, Value};
//! use std::collections::BTreeMap;
//!
//! let mut m = BTreeMap::new();
//! m.insert(Value::from(Keyword::new("name")), Value::from("Alice"));
//! let value = Value::Map(m);
//!
//! let bytes = value.encode()?;
//! let back = Value::decode(&bytes)?;
//! assert_eq!(back, value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Custom types
//!
//! User types enter the model through [`CustomValue`] and are wired to the
//! codec with [`extend_freeze`] / [`extend_thaw`], either on the
//! process-wide default registry or on an explicit [`CodecContext`].
//! Values with no registered encoder go through the configurable fallback
//! chain ([`FreezeFallback`]).
//!
//! # Modules
//!
//! - [`types`] - The [`Value`] union and its payload types
//! - [`encoding`] - Tag registry, primitive I/O, writer, reader
//! - [`ext`] - Custom-type registry, fallback policy, codec context
//! - [`error`] - Error types

pub mod encoding;
pub mod error;
pub mod ext;
pub mod types;

pub use encoding::{freeze_value, thaw_value, ByteReader, Decoder, Encoder};
pub use error::{ExtError, FreezeError, ThawError};
pub use ext::{
    extend_freeze, extend_thaw, named_hash, set_freeze_fallback, CodecContext, ExtId,
    FreezeFallback, WireId,
};
pub use types::{
    BigDecimal, CustomPayload, CustomValue, Keyword, Record, Symbol, Unthawable, UnthawableKind,
    Value,
};

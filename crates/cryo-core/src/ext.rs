//! The custom-type registry, the fallback policy, and the codec context.
//!
//! Both registries and the policy are readable concurrently while another
//! thread mutates them: every mutation clones the backing map and swaps
//! the [`Arc`] in place, so readers never observe a torn table.
//!
//! A process-wide default context backs the ergonomic top-level API;
//! explicit [`CodecContext`] values support testing and multi-tenant use.
//!
//! # Wire ids
//!
//! Custom types are identified on the wire in one of two ways:
//!
//! - **Byte ids** `1..=128`: the negated id occupies the tag slot itself
//!   (`0x80..=0xFF`), costing no prefix. Cheap, but the id space is shared
//!   with every other embedder.
//! - **Named ids**: the qualified keyword hashes to a 16-bit value written
//!   after a `PREFIXED_CUSTOM` tag. The band `[-128, -1]` is reserved for
//!   byte ids; a name hashing into it is refused at registration.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::warn;

use crate::encoding::ByteReader;
use crate::error::{ExtError, FreezeError, ThawError};
use crate::types::{CustomPayload, Keyword, Value};

/// A custom-type identifier chosen by the embedding program.
#[derive(Debug, Clone)]
pub enum ExtId {
    /// A byte id in `1..=128`.
    Byte(u8),
    /// A namespaced keyword id, hashed onto the wire.
    Named(Keyword),
}

/// The resolved on-wire identity of a custom type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireId {
    /// Unprefixed: the negated id is the tag byte.
    Byte(u8),
    /// Prefixed: a 16-bit hash after `PREFIXED_CUSTOM`.
    Named(i16),
}

impl WireId {
    /// The unified reader-registry key: byte id `n` maps to `-n`, named
    /// ids keep their hash. The two ranges are disjoint by construction.
    #[must_use]
    pub fn key(self) -> i16 {
        match self {
            Self::Byte(n) => -i16::from(n),
            Self::Named(h) => h,
        }
    }
}

impl ExtId {
    pub(crate) fn resolve(&self) -> Result<WireId, ExtError> {
        match self {
            Self::Byte(n) => {
                if (1..=128).contains(n) {
                    Ok(WireId::Byte(*n))
                } else {
                    Err(ExtError::ByteIdRange { id: u16::from(*n) })
                }
            }
            Self::Named(kw) => {
                let name = kw.qualified();
                let hash = named_hash(&name);
                if (-128..=-1).contains(&hash) {
                    Err(ExtError::ReservedHash { name, hash })
                } else {
                    Ok(WireId::Named(hash))
                }
            }
        }
    }
}

/// Hashes a qualified custom-type name to its 16-bit wire id.
///
/// FNV-1a over the UTF-8 bytes, xor-folded to 16 bits. The result ranges
/// over `[-32768, 32767]`; values in the reserved band `[-128, -1]` are
/// rejected at registration, not remapped.
#[must_use]
pub fn named_hash(name: &str) -> i16 {
    let mut h: u32 = 0x811c_9dc5;
    for b in name.as_bytes() {
        h ^= u32::from(*b);
        h = h.wrapping_mul(0x0100_0193);
    }
    (((h >> 16) ^ h) & 0xFFFF) as u16 as i16
}

type EncodeFn =
    dyn Fn(&mut Vec<u8>, &dyn CustomPayload, &CodecContext) -> Result<(), FreezeError>
        + Send
        + Sync;
type DecodeFn =
    dyn Fn(&mut ByteReader<'_>, &CodecContext) -> Result<Value, ThawError> + Send + Sync;
type FallbackFn =
    dyn Fn(&mut Vec<u8>, &Value, &CodecContext) -> Result<(), FreezeError> + Send + Sync;

/// A registered encoder for one payload type.
#[derive(Clone)]
pub(crate) struct ExtWriter {
    pub(crate) wire_id: WireId,
    pub(crate) type_name: &'static str,
    encode: Arc<EncodeFn>,
}

impl ExtWriter {
    pub(crate) fn encode(
        &self,
        out: &mut Vec<u8>,
        payload: &dyn CustomPayload,
        ctx: &CodecContext,
    ) -> Result<(), FreezeError> {
        (self.encode)(out, payload, ctx)
    }
}

/// A registered decoder for one wire id.
#[derive(Clone)]
pub(crate) struct ExtReader(Arc<DecodeFn>);

impl ExtReader {
    pub(crate) fn decode(
        &self,
        input: &mut ByteReader<'_>,
        ctx: &CodecContext,
    ) -> Result<Value, ThawError> {
        (self.0)(input, ctx)
    }
}

/// What the writer does with a value it has no encoder for.
#[derive(Clone, Default)]
pub enum FreezeFallback {
    /// Try the payload's host-native bytes, then its textual
    /// representation, then raise `Unfreezable`.
    #[default]
    Strict,
    /// As [`Self::Strict`], but the terminal step writes a marker map
    /// `{:type <name> :unfreezable <text>}` instead of raising.
    WriteUnfreezable,
    /// A caller-installed handler that replaces the whole chain.
    Custom(Arc<FallbackFn>),
}

impl fmt::Debug for FreezeFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("Strict"),
            Self::WriteUnfreezable => f.write_str("WriteUnfreezable"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// The injectable state a freeze/thaw invocation consults: custom-type
/// registries and the fallback policy.
#[derive(Default)]
pub struct CodecContext {
    writers: RwLock<Arc<HashMap<TypeId, ExtWriter>>>,
    readers: RwLock<Arc<HashMap<i16, ExtReader>>>,
    fallback: RwLock<FreezeFallback>,
}

static GLOBAL: Lazy<CodecContext> = Lazy::new(CodecContext::default);

impl CodecContext {
    /// Creates an empty context with the strict fallback policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default context.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers an encoder for payloads of type `T`.
    ///
    /// The encoder appends the payload body to the sink; the tag (or
    /// `PREFIXED_CUSTOM` + hash) is written by the engine. Re-registering
    /// a type replaces the previous encoder and logs a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ExtError`] when the id is out of range or its hash falls
    /// in the reserved band.
    pub fn extend_freeze<T, F>(&self, id: &ExtId, encode: F) -> Result<(), ExtError>
    where
        T: CustomPayload,
        F: Fn(&mut Vec<u8>, &T, &CodecContext) -> Result<(), FreezeError>
            + Send
            + Sync
            + 'static,
    {
        let wire_id = id.resolve()?;
        let type_name = std::any::type_name::<T>();
        let writer = ExtWriter {
            wire_id,
            type_name,
            encode: Arc::new(move |out, payload, ctx| {
                let concrete = payload.as_any().downcast_ref::<T>().ok_or_else(|| {
                    FreezeError::unfreezable(payload.type_name(), format!("{payload:?}"))
                })?;
                encode(out, concrete, ctx)
            }),
        };
        let replaced = swap_in(&self.writers, TypeId::of::<T>(), writer);
        if replaced {
            warn!(payload_type = type_name, "replacing existing freeze handler");
        }
        Ok(())
    }

    /// Registers a decoder for a custom wire id.
    ///
    /// The decoder receives the input positioned after the tag (and hash,
    /// for named ids). Re-registering an id replaces the previous decoder
    /// and logs a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ExtError`] when the id is out of range or its hash falls
    /// in the reserved band.
    pub fn extend_thaw<F>(&self, id: &ExtId, decode: F) -> Result<(), ExtError>
    where
        F: Fn(&mut ByteReader<'_>, &CodecContext) -> Result<Value, ThawError>
            + Send
            + Sync
            + 'static,
    {
        let key = id.resolve()?.key();
        let replaced = swap_in(&self.readers, key, ExtReader(Arc::new(decode)));
        if replaced {
            warn!(wire_id = key, "replacing existing thaw handler");
        }
        Ok(())
    }

    /// Sets the fallback policy for values with no encoder.
    pub fn set_freeze_fallback(&self, policy: FreezeFallback) {
        let mut guard = self.fallback.write().unwrap_or_else(PoisonError::into_inner);
        *guard = policy;
    }

    pub(crate) fn freeze_fallback(&self) -> FreezeFallback {
        self.fallback.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn ext_writer(&self, type_id: TypeId) -> Option<ExtWriter> {
        read_snapshot(&self.writers).get(&type_id).cloned()
    }

    pub(crate) fn ext_reader(&self, key: i16) -> Option<ExtReader> {
        read_snapshot(&self.readers).get(&key).cloned()
    }
}

fn read_snapshot<K, V>(lock: &RwLock<Arc<HashMap<K, V>>>) -> Arc<HashMap<K, V>> {
    match lock.read() {
        Ok(guard) => Arc::clone(&guard),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}

fn swap_in<K, V>(lock: &RwLock<Arc<HashMap<K, V>>>, key: K, value: V) -> bool
where
    K: Eq + std::hash::Hash + Clone,
    V: Clone,
{
    let mut guard = lock.write().unwrap_or_else(PoisonError::into_inner);
    let mut next = (**guard).clone();
    let replaced = next.insert(key, value).is_some();
    *guard = Arc::new(next);
    replaced
}

/// Registers an encoder on the process-wide default context.
///
/// # Errors
///
/// See [`CodecContext::extend_freeze`].
pub fn extend_freeze<T, F>(id: &ExtId, encode: F) -> Result<(), ExtError>
where
    T: CustomPayload,
    F: Fn(&mut Vec<u8>, &T, &CodecContext) -> Result<(), FreezeError> + Send + Sync + 'static,
{
    CodecContext::global().extend_freeze::<T, F>(id, encode)
}

/// Registers a decoder on the process-wide default context.
///
/// # Errors
///
/// See [`CodecContext::extend_thaw`].
pub fn extend_thaw<F>(id: &ExtId, decode: F) -> Result<(), ExtError>
where
    F: Fn(&mut ByteReader<'_>, &CodecContext) -> Result<Value, ThawError>
        + Send
        + Sync
        + 'static,
{
    CodecContext::global().extend_thaw(id, decode)
}

/// Sets the fallback policy on the process-wide default context.
pub fn set_freeze_fallback(policy: FreezeFallback) {
    CodecContext::global().set_freeze_fallback(policy);
}

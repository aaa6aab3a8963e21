//! User-defined payloads carried through the codec.
//!
//! The value model is a closed enum; user types enter it through
//! [`CustomValue`], a shared handle to a [`CustomPayload`] trait object.
//! Encoders and decoders for custom payloads are registered at runtime
//! (see the crate-level `extend_freeze` / `extend_thaw`); payloads with no
//! registration go through the fallback chain.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A user-defined value the codec can carry.
///
/// Implementors normally pair this with a registered encoder/decoder. The
/// two `fallback_*` hooks feed the fallback chain for payloads that reach
/// the writer unregistered; both opt out by default, so an unregistered
/// payload is unfreezable under the strict policy.
pub trait CustomPayload: Any + fmt::Debug + Send + Sync {
    /// Concrete type name, used in diagnostics and fallback encodings.
    fn type_name(&self) -> &'static str {
        std::any::type_name_of_val(self)
    }

    /// Host-native byte encoding of last resort.
    ///
    /// Returning `Some` lets the writer emit a named serialized-object
    /// payload. Readers reconstruct it as an
    /// [`Unthawable`](crate::types::Unthawable) sentinel carrying the raw
    /// bytes.
    fn fallback_bytes(&self) -> Option<Vec<u8>> {
        None
    }

    /// Textual representation of last resort.
    fn fallback_repr(&self) -> Option<String> {
        None
    }

    /// Upcast used by registered encoders to downcast to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a [`CustomPayload`].
#[derive(Clone, Debug)]
pub struct CustomValue(Arc<dyn CustomPayload>);

impl CustomValue {
    /// Wraps a payload.
    #[must_use]
    pub fn new<T: CustomPayload>(payload: T) -> Self {
        Self(Arc::new(payload))
    }

    /// Borrows the payload as a trait object.
    #[must_use]
    pub fn payload(&self) -> &dyn CustomPayload {
        &*self.0
    }

    /// Downcasts to a concrete payload type.
    #[must_use]
    pub fn downcast_ref<T: CustomPayload>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

// Equality and ordering exist so custom values can live inside maps and
// sets. Payloads are opaque, so both are defined over (type name, Debug
// rendering); two payloads of the same type that print alike are equal.
impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.order_key() == other.order_key()
    }
}

impl Eq for CustomValue {}

impl PartialOrd for CustomValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CustomValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for CustomValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (name, repr) = self.order_key();
        name.hash(state);
        repr.hash(state);
    }
}

impl CustomValue {
    fn order_key(&self) -> (&'static str, String) {
        (self.0.type_name(), format!("{:?}", self.0))
    }
}

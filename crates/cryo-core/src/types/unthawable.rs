//! The partial-failure sentinel.
//!
//! Some payloads cannot be fully re-materialized on the reading side: a
//! host-native object graph the reader cannot reconstruct, a textual
//! representation with no installed reader, a regex pattern that no longer
//! compiles. Rather than failing the whole document, the reader returns an
//! [`Unthawable`] sentinel inline so the surrounding data survives and a
//! downstream program can inspect the damage.

/// What kind of payload failed to re-materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnthawableKind {
    /// A host-native serialized object graph.
    Serializable,
    /// A textual representation of last resort.
    Readable,
    /// A regex pattern that failed to compile.
    Regex,
}

/// Sentinel value returned in place of a payload that failed to
/// re-materialize.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Unthawable {
    /// The payload kind.
    pub kind: UnthawableKind,
    /// Name of the original type, when the wire form carried one.
    pub type_name: Option<String>,
    /// Why re-materialization failed.
    pub cause: String,
    /// The raw payload, preserved byte-for-byte.
    pub raw_content: Vec<u8>,
}

impl Unthawable {
    /// The raw payload as text, where it is text.
    #[must_use]
    pub fn raw_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.raw_content).ok()
    }
}

//! The serialization engine: tag registry, primitive I/O, and the
//! polymorphic writer and reader.
//!
//! # Wire shape
//!
//! A frozen value is a sequence of `[tag byte][variant-specific payload]`.
//! Multi-byte scalars are big-endian; strings are UTF-8. Families with
//! variable length carry a size-classed prefix — see [`tags`] for the
//! full registry and the class layout.
//!
//! # Entry points
//!
//! - [`freeze_value`] / [`thaw_value`] — context-taking low-level calls.
//! - [`Encoder`] / [`Decoder`] on [`Value`](crate::Value) — ergonomic
//!   variants bound to the process-wide default context.

pub mod tags;

mod primitives;
mod reader;
mod traits;
mod writer;


pub use primitives::ByteReader;
pub use reader::thaw_value;
pub use traits::{Decoder, Encoder};
pub use writer::freeze_value;

/// Nesting depth at which freeze and thaw give up.
///
/// The format does not support shared or cyclic graphs; the limit turns a
/// runaway recursion into an error instead of a stack overflow.
pub(crate) const MAX_DEPTH: usize = 1024;

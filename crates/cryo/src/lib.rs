//! Cryo - fast, compact binary serialization with optional framing.
//!
//! Cryo freezes richly-typed values — scalars, strings, collections,
//! records, user-registered custom types — into a self-describing byte
//! stream and thaws them back, with pluggable compression and
//! authenticated encryption around the body.
//!
//! # Quick Start
//!
//! ```
//! use cryo::{freeze, thaw, FreezeOptions, ThawOptions, Value};
//!
//! let value = Value::from("hello");
//! let bytes = freeze(&value, &FreezeOptions::new())?;
//! assert_eq!(thaw(&bytes, &ThawOptions::new())?, value);
//! # Ok::<(), cryo::Error>(())
//! ```
//!
//! ## Compression
//!
//! By default (`auto`) bodies over 8 KiB are LZ4-compressed; the header
//! records the choice so `thaw` needs no options. Snappy and LZMA2 are
//! available behind the same [`Compressor`] seam:
//!
//! ```
//! use cryo::{compress, freeze, thaw, CompressorChoice, FreezeOptions, ThawOptions, Value};
//! use std::sync::Arc;
//!
//! let value = Value::Bytes(vec![0; 100_000]);
//! let opts = FreezeOptions::new()
//!     .compressor(CompressorChoice::Use(Arc::new(compress::Lzma2)));
//! let bytes = freeze(&value, &opts)?;
//! assert_eq!(thaw(&bytes, &ThawOptions::new())?, value);
//! # Ok::<(), cryo::Error>(())
//! ```
//!
//! ## Encryption
//!
//! Supplying a password encrypts the (possibly compressed) body with
//! AES-128-GCM under a SHA-512-derived key. Thawing with the wrong
//! password fails authentication:
//!
//! ```
//! use cryo::{freeze, thaw, FreezeOptions, ThawOptions, Value};
//!
//! let bytes = freeze(&Value::from("secret"), &FreezeOptions::new().password("pw"))?;
//! assert!(thaw(&bytes, &ThawOptions::new().password("nope")).is_err());
//! assert_eq!(thaw(&bytes, &ThawOptions::new().password("pw"))?, Value::from("secret"));
//! # Ok::<(), cryo::Error>(())
//! ```
//!
//! ## Custom types
//!
//! ```ignore
//! use cryo::{extend_freeze, extend_thaw, ExtId, Keyword};
//!
//! extend_freeze::<MyType, _>(&ExtId::Named(Keyword::namespaced("my", "t")), |out, t, _ctx| {
//!     // append MyType's body to `out`
//!     Ok(())
//! })?;
//! extend_thaw(&ExtId::Named(Keyword::namespaced("my", "t")), |input, _ctx| {
//!     // read the body back and return a Value
//! })?;
//! ```
//!
//! # Modules
//!
//! - [`compress`] - The [`Compressor`] seam and the LZ4/Snappy/LZMA2
//!   implementations
//! - [`crypto`] - The [`Encryptor`] seam and the standard AES-128-GCM
//!   implementation
//! - [`error`] - Error types
//!
//! The value model and codec engine live in [`cryo_core`] and are
//! re-exported here.

pub mod compress;
pub mod crypto;
pub mod error;

mod header;
mod inspect;
mod options;
mod pipeline;

pub use compress::{Compressor, CompressorId};
pub use crypto::{Encryptor, EncryptorId};
pub use error::{Error, Result};
pub use inspect::{inspect, HeaderInfo, InspectReport};
pub use options::{CompressorChoice, EncryptorChoice, FreezeOptions, ThawOptions};
pub use pipeline::{
    freeze, freeze_with, set_auto_compressor, thaw, thaw_with, AutoCompressorFn,
    AUTO_COMPRESS_MIN,
};

// The engine's surface, re-exported so most programs depend on this crate
// alone.
pub use cryo_core::{
    extend_freeze, extend_thaw, freeze_value, named_hash, set_freeze_fallback, thaw_value,
    BigDecimal, ByteReader, CodecContext, CustomPayload, CustomValue, Decoder, Encoder,
    ExtError, ExtId, FreezeError, FreezeFallback, Keyword, Record, Symbol, ThawError,
    Unthawable, UnthawableKind, Value, WireId,
};

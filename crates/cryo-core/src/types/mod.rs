//! Core data types: the [`Value`] union and its payload types.

mod custom;
mod numeric;
mod symbolic;
mod unthawable;
mod value;

pub use custom::{CustomPayload, CustomValue};
pub use numeric::BigDecimal;
pub use symbolic::{Keyword, Symbol};
pub use unthawable::{Unthawable, UnthawableKind};
pub use value::{Record, Value};

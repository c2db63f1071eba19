//! Provenance-tracked values.
//!
//! Every scalar an adapter pulls out of a document is wrapped in a
//! [`Value`] carrying [`Metadata`]: the source [`Range`] it was read from and
//! its logical path. Attributes that are absent still produce a value, with
//! the enclosing block's metadata marked as a default, so "never set" stays
//! observable in rules and tests.

mod metadata;
mod range;
mod value;

pub use metadata::{HasMetadata, Metadata};
pub use range::Range;
pub use value::{BoolValue, IntValue, StringListValue, StringValue, Value};

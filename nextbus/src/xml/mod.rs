//! XML parsing and normalization.
//!
//! The feed is parsed into a plain [`Element`] tree first, then projected
//! into a [`Node`] tree whose attribute values have been coerced to typed
//! scalars. The projection is lossless apart from typing: element order,
//! nesting and text are preserved exactly.

mod element;
mod normalize;

pub use element::{Element, XmlError, parse_document};
pub use normalize::{Node, Value, coerce, normalize};

//! XML serialization.
//!
//! This module renders a subtree back to indented XML text. Text and
//! attribute values are escaped, so serialized output always re-parses to
//! the same tree.

pub mod xml;

pub use xml::{serialize, serialize_document, serialize_with_options, SerializeOptions};

//! # xmlnav
//!
//! An XML document model with a chainable navigation API. Documents are
//! parsed (or built by hand) into an arena-backed element tree, navigated
//! by tag name and index without checking the document's shape first, and
//! serialized back to indented markup.
//!
//! Navigation steps never fail on their own. A missing child or an index
//! out of range turns the query into a "not found" value that remembers
//! where it went wrong; the failure is reported through the document's
//! [`Diagnostics`](diagnostics::Diagnostics) only when a concrete node or
//! value is requested.
//!
//! ## Quick Start
//!
//! ```
//! use xmlnav::{Document, TextSource};
//!
//! let doc = Document::parse_str("<a><b>1</b><b>2</b></a>").unwrap();
//! let root = doc.root().unwrap();
//!
//! assert_eq!(root.child("b").index(1).to_i32(), 2);
//! assert_eq!(root.chain("b.1").string(), "2");
//!
//! let missing = root.child("b").index(5);
//! assert_eq!(missing.error(), Some(r#"["b"]: index 5 out of bounds: [0, 2)"#));
//! assert_eq!(missing.to_i32(), 0);
//! ```

pub mod convert;
pub mod diagnostics;
pub mod encoding;
pub mod error;
pub mod parser;
pub mod query;
pub mod sax;
pub mod serial;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use convert::{RawValue, TextSource};
pub use diagnostics::{Diagnostics, XmlLogger};
pub use error::{ConversionError, ParseError, QueryError};
pub use query::{AttributeLookup, Chained, Query, QueryResult};
pub use tree::{Attribute, Document, NodeId, NodeRef};

//! Building a [`Document`] from markup.
//!
//! Tokenizing is done by [`crate::sax::parse_sax`]; this module supplies the
//! handler that turns its events into a tree. [`TreeBuilder`] keeps one
//! piece of state besides the document: the innermost open element, which
//! receives new children and text.
//!
//! Text handling is deliberately simple. Each piece of character data is
//! trimmed, and non-empty text replaces the current element's value. In
//! mixed content such as `<p>a <b>b</b> c</p>` the element keeps the last
//! non-blank piece (`"c"`).
//!
//! The free functions here and the equivalent `Document::parse_*`
//! constructors are all-or-nothing: they return the finished tree or the
//! first error.

use std::path::Path;

use tracing::{debug, instrument};

use crate::encoding;
use crate::error::{ParseError, SourceLocation};
use crate::sax::{self, SaxHandler};
use crate::tree::{Document, NodeId};

/// A [`SaxHandler`] that builds an element tree.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    doc: Document,
    root: Option<NodeId>,
    current: Option<NodeId>,
    error: Option<ParseError>,
}

impl TreeBuilder {
    /// Creates a builder with an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the builder, returning the document or the first error.
    ///
    /// `outcome` is the tokenizer's result; a tokenizer failure takes
    /// precedence over whatever was built.
    ///
    /// # Errors
    ///
    /// Returns the first recorded error, the tokenizer's error, or a syntax
    /// error if no root element was seen.
    pub fn finish(self, outcome: Result<(), ParseError>) -> Result<Document, ParseError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        outcome?;
        let Some(root) = self.root else {
            return Err(ParseError::syntax(
                "document has no root element",
                SourceLocation::default(),
            ));
        };
        let mut doc = self.doc;
        doc.set_root_element(root);
        Ok(doc)
    }
}

impl SaxHandler for TreeBuilder {
    fn start_element(&mut self, name: &str, attributes: &[(String, String)]) {
        let node = self.doc.create_element(name);
        self.doc
            .add_attributes(node, attributes.iter().map(|(k, v)| (k, v)));
        match self.current {
            // A fresh node is never an ancestor of `parent`.
            Some(parent) => self.doc.append_child(parent, node),
            None if self.root.is_none() => self.root = Some(node),
            // A second top-level element. The tokenizer rejects this, so
            // the node is simply left detached.
            None => {}
        }
        self.current = Some(node);
    }

    fn end_element(&mut self, _name: &str) {
        self.current = self.current.and_then(|id| self.doc.parent(id));
    }

    fn characters(&mut self, content: &str) {
        let text = content.trim();
        if text.is_empty() {
            return;
        }
        if let Some(current) = self.current {
            self.doc.set_value(current, Some(text.to_string()));
        }
    }

    fn error(&mut self, message: &str, location: SourceLocation) {
        if self.error.is_none() {
            self.error = Some(ParseError::syntax(message, location));
        }
    }
}

/// Parses a document from a string.
///
/// A leading byte order mark character is ignored.
///
/// # Errors
///
/// Returns a syntax [`ParseError`] if the input is not a well-formed
/// document.
#[instrument(skip(input), fields(len = input.len()))]
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    debug!("building tree");

    let mut builder = TreeBuilder::new();
    let outcome = sax::parse_sax(input, &mut builder);
    let result = builder.finish(outcome);
    match &result {
        Ok(doc) => debug!(nodes = doc.node_count(), "tree built"),
        Err(err) => debug!(%err, "parse failed"),
    }
    result
}

/// Parses a document from bytes, detecting the encoding from a byte order
/// mark or the XML declaration and defaulting to UTF-8.
///
/// # Errors
///
/// Returns an encoding [`ParseError`] if the bytes cannot be decoded, or a
/// syntax error if the decoded text is not well-formed.
pub fn parse_bytes(bytes: &[u8]) -> Result<Document, ParseError> {
    let text = encoding::decode_to_utf8(bytes)?;
    parse_str(&text)
}

/// Parses a document from bytes in the encoding named by `label`.
///
/// # Errors
///
/// Returns an encoding [`ParseError`] if the label is unknown or the bytes
/// are malformed for it, or a syntax error for malformed markup.
pub fn parse_bytes_with_encoding(bytes: &[u8], label: &str) -> Result<Document, ParseError> {
    let text = encoding::transcode(bytes, label)?;
    parse_str(&text)
}

/// Reads and parses a file.
///
/// The whole file is read before parsing starts; nothing is returned on a
/// partial read.
///
/// # Errors
///
/// Returns an I/O [`ParseError`] if the file cannot be read, otherwise as
/// [`parse_bytes`].
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document, ParseError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|err| ParseError::io(format!("{}: {err}", path.display())))?;
    debug!(bytes = bytes.len(), "file read");
    parse_bytes(&bytes)
}

impl Document {
    /// Parses a document from a string. See [`parse_str`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for malformed input.
    pub fn parse_str(input: &str) -> Result<Self, ParseError> {
        parse_str(input)
    }

    /// Parses a document from bytes with encoding detection. See
    /// [`parse_bytes`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for undecodable or malformed input.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        parse_bytes(bytes)
    }

    /// Parses a document from bytes in a known encoding. See
    /// [`parse_bytes_with_encoding`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for undecodable or malformed input.
    pub fn parse_bytes_with_encoding(bytes: &[u8], label: &str) -> Result<Self, ParseError> {
        parse_bytes_with_encoding(bytes, label)
    }

    /// Reads and parses a file. See [`parse_file`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the file cannot be read or parsed.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        parse_file(path)
    }
}

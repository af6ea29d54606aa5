//! SAX-style event interface over the `quick-xml` tokenizer.
//!
//! [`parse_sax`] pulls events from a `quick_xml::Reader` and replays them
//! as callbacks on a [`SaxHandler`]. Only the events the element tree needs
//! are forwarded: element starts and ends, and character data (with
//! entities expanded, CDATA passed through as text). Comments, processing
//! instructions, the XML declaration and DOCTYPE are skipped.
//!
//! On top of what the tokenizer checks, the adapter enforces document
//! structure: exactly one root element, no text outside it, and every
//! element closed at end of input.
//!
//! # Examples
//!
//! ```
//! use xmlnav::sax::{parse_sax, SaxHandler};
//!
//! struct Counter {
//!     elements: usize,
//! }
//!
//! impl SaxHandler for Counter {
//!     fn start_element(&mut self, _name: &str, _attributes: &[(String, String)]) {
//!         self.elements += 1;
//!     }
//! }
//!
//! let mut counter = Counter { elements: 0 };
//! parse_sax("<root><a/><b/><c/></root>", &mut counter).unwrap();
//! assert_eq!(counter.elements, 4);
//! ```

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ParseError, SourceLocation};

/// Callbacks fired while tokenizing a document.
///
/// Every method has a no-op default, so handlers implement only what they
/// need.
#[allow(unused_variables)]
pub trait SaxHandler {
    /// Called once before any other event.
    fn start_document(&mut self) {}

    /// Called once after the root element has been closed.
    fn end_document(&mut self) {}

    /// Called for each start tag (and for each empty-element tag, followed
    /// immediately by [`end_element`](Self::end_element)).
    ///
    /// `attributes` holds `(name, value)` pairs in source order with
    /// entities expanded.
    fn start_element(&mut self, name: &str, attributes: &[(String, String)]) {}

    /// Called for each end tag.
    fn end_element(&mut self, name: &str) {}

    /// Called for character data inside the root element. Text may arrive
    /// in several pieces.
    fn characters(&mut self, content: &str) {}

    /// Called once when parsing stops on an error, before `parse_sax`
    /// returns it.
    fn error(&mut self, message: &str, location: SourceLocation) {}
}

/// A handler that ignores every event.
pub struct DefaultHandler;

impl SaxHandler for DefaultHandler {}

/// Tokenizes `input`, firing events on `handler`.
///
/// # Errors
///
/// Returns a syntax [`ParseError`] if the input is not a well-formed
/// document. The same message is first passed to
/// [`SaxHandler::error`].
pub fn parse_sax(input: &str, handler: &mut dyn SaxHandler) -> Result<(), ParseError> {
    let mut driver = Driver {
        input,
        handler,
        open: Vec::new(),
        seen_root: false,
    };
    driver.run().map_err(|err| {
        driver.handler.error(&err.message, err.location);
        err
    })
}

struct Driver<'a, 'h> {
    input: &'a str,
    handler: &'h mut dyn SaxHandler,
    /// Names of the currently open elements, innermost last.
    open: Vec<String>,
    seen_root: bool,
}

impl Driver<'_, '_> {
    fn run(&mut self) -> Result<(), ParseError> {
        let mut reader = Reader::from_str(self.input);
        reader.config_mut().check_end_names = true;

        self.handler.start_document();
        loop {
            let event = reader
                .read_event()
                .map_err(|err| self.fail(&reader, err.to_string()))?;
            match event {
                Event::Start(start) => {
                    let name = self.start(&reader, &start)?;
                    self.open.push(name);
                }
                Event::Empty(start) => {
                    let name = self.start(&reader, &start)?;
                    self.handler.end_element(&name);
                }
                Event::End(end) => {
                    let name = self.utf8(&reader, end.name().into_inner())?;
                    self.open.pop();
                    self.handler.end_element(&name);
                }
                Event::Text(text) => {
                    let content = text
                        .unescape()
                        .map_err(|err| self.fail(&reader, err.to_string()))?;
                    self.text(&reader, &content)?;
                }
                Event::CData(cdata) => {
                    let content = self.utf8(&reader, &cdata.into_inner())?.into_owned();
                    self.text(&reader, &content)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(name) = self.open.last() {
            return Err(self.fail(&reader, format!("unclosed element <{name}>")));
        }
        if !self.seen_root {
            return Err(self.fail(&reader, "document has no root element".to_string()));
        }
        self.handler.end_document();
        Ok(())
    }

    /// Validates placement, decodes a start tag and fires `start_element`.
    fn start(
        &mut self,
        reader: &Reader<&[u8]>,
        start: &BytesStart<'_>,
    ) -> Result<String, ParseError> {
        if self.open.is_empty() {
            if self.seen_root {
                return Err(self.fail(reader, "content after document element".to_string()));
            }
            self.seen_root = true;
        }

        let name = self.utf8(reader, start.name().into_inner())?.into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| self.fail(reader, err.to_string()))?;
            let key = self.utf8(reader, attr.key.as_ref())?.into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| self.fail(reader, err.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        self.handler.start_element(&name, &attributes);
        Ok(name)
    }

    fn text(&mut self, reader: &Reader<&[u8]>, content: &str) -> Result<(), ParseError> {
        if !self.open.is_empty() {
            self.handler.characters(content);
        } else if !content.trim().is_empty() {
            let message = if self.seen_root {
                "content after document element"
            } else {
                "text before document element"
            };
            return Err(self.fail(reader, message.to_string()));
        }
        Ok(())
    }

    fn utf8<'b>(
        &self,
        reader: &Reader<&[u8]>,
        bytes: &'b [u8],
    ) -> Result<Cow<'b, str>, ParseError> {
        std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|err| self.fail(reader, format!("invalid UTF-8: {err}")))
    }

    fn fail(&self, reader: &Reader<&[u8]>, message: String) -> ParseError {
        let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
        ParseError::syntax(message, SourceLocation::from_offset(self.input, offset))
    }
}

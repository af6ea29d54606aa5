//! Indented XML writer.
//!
//! One element per line. An element without children is written on a
//! single line, either self-closing or with its text inline; an element
//! with children gets an opening line (carrying its text, if any), one
//! line per descendant, and a closing line.

use crate::tree::{Document, NodeId};

/// Options controlling serialization output.
///
/// # Examples
///
/// ```
/// use xmlnav::Document;
/// use xmlnav::serial::{serialize_with_options, SerializeOptions};
///
/// let doc = Document::parse_str("<root><child>Hello</child></root>").unwrap();
/// let root = doc.root_element().unwrap();
/// let xml = serialize_with_options(&doc, root, &SerializeOptions::default().indent_str("  "));
/// assert_eq!(xml, "<root>\n  <child>Hello</child>\n</root>\n");
/// ```
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// The string written once per nesting level. Defaults to a tab.
    pub indent_str: String,
    /// Whether to start the output with an XML declaration. Defaults to
    /// `false`.
    pub declaration: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent_str: "\t".to_string(),
            declaration: false,
        }
    }
}

impl SerializeOptions {
    /// Sets the indentation string used for each nesting level.
    #[must_use]
    pub fn indent_str(mut self, s: &str) -> Self {
        self.indent_str = s.to_string();
        self
    }

    /// Enables or disables the leading `<?xml version="1.0" encoding="UTF-8"?>`
    /// line.
    #[must_use]
    pub fn declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}

/// Serializes the subtree rooted at `id` with default options.
///
/// # Examples
///
/// ```
/// use xmlnav::Document;
/// use xmlnav::serial::serialize;
///
/// let mut doc = Document::with_root("store");
/// let store = doc.root_element().unwrap();
/// let product = doc.new_node("product", [("weight", 0.453)], None);
/// doc.add_child(store, product);
/// assert_eq!(serialize(&doc, store), "<store>\n\t<product weight=\"0.453\"/>\n</store>\n");
/// ```
#[must_use]
pub fn serialize(doc: &Document, id: NodeId) -> String {
    serialize_with_options(doc, id, &SerializeOptions::default())
}

/// Serializes the subtree rooted at `id` with the given options.
#[must_use]
pub fn serialize_with_options(doc: &Document, id: NodeId, options: &SerializeOptions) -> String {
    let mut output = String::new();
    if options.declaration {
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }
    write_tree(&mut output, doc, id, options);
    output
}

/// Serializes the document's root element, or returns an empty string if
/// there is none.
#[must_use]
pub fn serialize_document(doc: &Document) -> String {
    doc.root_element()
        .map(|root| serialize(doc, root))
        .unwrap_or_default()
}

/// A pending unit of output while walking the tree.
enum Visit {
    /// Write the element's start tag, or the whole element if it is a leaf.
    Open(NodeId, usize),
    /// Write the end tag of an element with children.
    Close(NodeId, usize),
}

/// Writes the subtree rooted at `id`, using an explicit stack instead of
/// recursion so nesting depth is bounded only by memory.
fn write_tree(out: &mut String, doc: &Document, id: NodeId, options: &SerializeOptions) {
    let mut stack = vec![Visit::Open(id, 0)];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Open(node, depth) => {
                if write_start(out, doc, node, depth, options) {
                    stack.push(Visit::Close(node, depth));
                    // Pushed last to first so the first child is written first.
                    let mut child = doc.last_child(node);
                    while let Some(c) = child {
                        stack.push(Visit::Open(c, depth + 1));
                        child = doc.prev_sibling(c);
                    }
                }
            }
            Visit::Close(node, depth) => {
                write_indent(out, depth, options);
                write_end_tag(out, doc.name(node));
            }
        }
    }
}

/// Writes one element line. Returns `true` if the element has children and
/// still needs its end tag.
fn write_start(
    out: &mut String,
    doc: &Document,
    id: NodeId,
    depth: usize,
    options: &SerializeOptions,
) -> bool {
    write_indent(out, depth, options);
    let name = doc.name(id);
    out.push('<');
    out.push_str(name);
    for attr in doc.attributes(id) {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        write_escaped_attr(out, &attr.value);
        out.push('"');
    }

    let value = doc.value(id);
    if doc.first_child(id).is_none() {
        match value {
            Some(text) => {
                out.push('>');
                write_escaped_text(out, text);
                write_end_tag(out, name);
            }
            None => out.push_str("/>\n"),
        }
        return false;
    }

    out.push('>');
    if let Some(text) = value {
        write_escaped_text(out, text);
    }
    out.push('\n');
    true
}

fn write_indent(out: &mut String, depth: usize, options: &SerializeOptions) {
    for _ in 0..depth {
        out.push_str(&options.indent_str);
    }
}

fn write_end_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

/// Escapes text content.
fn write_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}

/// Escapes an attribute value for a double-quoted attribute. Whitespace
/// other than spaces is written as character references so attribute value
/// normalization does not alter it on re-parse.
fn write_escaped_attr(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}

impl Document {
    /// Serializes the subtree rooted at `id`. See [`serialize`].
    #[must_use]
    pub fn to_xml_string(&self, id: NodeId) -> String {
        serialize(self, id)
    }
}

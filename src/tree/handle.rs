//! Borrowed node handles.

use std::fmt;

use super::{Attribute, Document, NodeId};
use crate::query::{Chained, Query};
use crate::serial;

/// A node paired with the document that owns it.
///
/// `NodeRef` is `Copy` and exposes the read side of [`Document`] without
/// threading the document through every call. It is also the entry point
/// for queries: [`child`](Self::child), [`chain`](Self::chain) and
/// [`query`](Self::query).
///
/// Its `Display` implementation serializes the subtree.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    /// The node's id.
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The owning document.
    pub fn document(self) -> &'a Document {
        self.doc
    }

    /// The tag name.
    pub fn name(self) -> &'a str {
        self.doc.name(self.id)
    }

    /// The element text, if any.
    pub fn value(self) -> Option<&'a str> {
        self.doc.value(self.id)
    }

    /// Attributes in insertion order.
    pub fn attributes(self) -> &'a [Attribute] {
        self.doc.attributes(self.id)
    }

    /// The value of one attribute.
    pub fn attribute(self, name: &str) -> Option<&'a str> {
        self.doc.attribute(self.id, name)
    }

    /// The parent element.
    pub fn parent(self) -> Option<Self> {
        self.doc.parent(self.id).map(|id| Self::new(self.doc, id))
    }

    /// The children in document order.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.children(self.id).map(move |id| NodeRef::new(doc, id))
    }

    /// The `index`-th child, regardless of name.
    pub fn child_at(self, index: usize) -> Option<Self> {
        self.doc.child_at(self.id, index).map(|id| Self::new(self.doc, id))
    }

    /// Starts a query at this node (a single match with an empty path).
    pub fn query(self) -> Query<'a> {
        Query::from_node(self.doc, self.id)
    }

    /// Children named `name`. Shorthand for `self.query().child(name)`.
    pub fn child(self, name: &str) -> Query<'a> {
        self.query().child(name)
    }

    /// Evaluates a dotted chain expression starting at this node.
    ///
    /// See [`crate::query::chain`] for the syntax.
    pub fn chain(self, expr: &str) -> Chained<'a> {
        self.query().chain(expr)
    }

    /// Serializes the subtree rooted at this node.
    pub fn to_xml_string(self) -> String {
        serial::serialize(self.doc, self.id)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::Document;

    #[test]
    fn test_handle_accessors() {
        let doc = Document::parse_str(r#"<a id="1"><b>x</b><c/></a>"#).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.attribute("id"), Some("1"));
        assert_eq!(root.value(), None);

        let names: Vec<&str> = root.children().map(|c| c.name()).collect();
        assert_eq!(names, vec!["b", "c"]);

        let b = root.child_at(0).unwrap();
        assert_eq!(b.value(), Some("x"));
        assert_eq!(b.parent(), Some(root));
        assert!(root.child_at(2).is_none());
    }

    #[test]
    fn test_handle_equality_is_per_document() {
        let one = Document::parse_str("<a/>").unwrap();
        let two = Document::parse_str("<a/>").unwrap();
        assert_eq!(one.root().unwrap(), one.root().unwrap());
        assert_ne!(one.root().unwrap(), two.root().unwrap());
    }

    #[test]
    fn test_display_serializes_subtree() {
        let doc = Document::parse_str("<a><b>x</b></a>").unwrap();
        let b = doc.root().unwrap().child_at(0).unwrap();
        assert_eq!(b.to_string(), "<b>x</b>\n");
    }
}

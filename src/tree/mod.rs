//! Arena-based element tree.
//!
//! All elements live in a `Vec<NodeData>` owned by a [`Document`] and are
//! referenced by [`NodeId`], a newtype over `NonZeroU32`. Parent, child and
//! sibling links are indices into that arena, so there are no reference
//! counts and no cycles to leak: dropping the `Document` frees every node.
//!
//! Nodes are created detached. [`Document::add_child`] links them into a
//! tree; the root element is whichever node the parser (or the caller via
//! [`Document::set_root_element`]) designates.

mod handle;
mod node;

pub use handle::NodeRef;
pub use node::{Attribute, NodeData};

use std::fmt::Display;
use std::num::NonZeroU32;

use crate::diagnostics::Diagnostics;

/// A typed index into a document's node arena.
///
/// `Option<NodeId>` has the same size as `NodeId` (niche optimization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    #[allow(clippy::expect_used)]
    fn from_index(index: usize) -> Self {
        u32::try_from(index + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .expect("node arena exceeds u32::MAX entries")
    }

    fn as_index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// An XML document: the node arena, the root element, and the diagnostic
/// configuration used by queries over it.
///
/// # Examples
///
/// ```
/// use xmlnav::Document;
///
/// let mut doc = Document::new();
/// let store = doc.create_element("store");
/// doc.add_attribute(store, "description", "Ball Store");
/// let product = doc.create_element("product");
/// doc.add_attribute(product, "weight", 0.453);
/// doc.add_child(store, product);
/// doc.set_root_element(store);
///
/// assert_eq!(doc.attribute(product, "weight"), Some("0.453"));
/// assert_eq!(doc.parent(product), Some(store));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
    diagnostics: Diagnostics,
}

impl Document {
    /// Creates an empty document with no root element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document whose root element is a fresh node named `name`.
    #[must_use]
    pub fn with_root(name: impl Into<String>) -> Self {
        let mut doc = Self::new();
        let root = doc.create_element(name);
        doc.root = Some(root);
        doc
    }

    /// Returns the root element, if one has been set.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.root
    }

    /// Designates `id` as the root element.
    ///
    /// # Panics
    ///
    /// Panics if `id` is attached to a parent.
    pub fn set_root_element(&mut self, id: NodeId) {
        assert!(
            self.node(id).parent.is_none(),
            "the root element can not have a parent"
        );
        self.root = Some(id);
    }

    /// Returns the diagnostic configuration used by queries on this document.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Replaces the diagnostic configuration.
    pub fn set_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.diagnostics = diagnostics;
    }

    /// Returns the storage for a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    /// Returns a borrowed handle to a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    /// Returns a handle to the root element, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|id| self.get(id))
    }

    /// Returns the total number of nodes in the arena, attached or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // --- Element data ---

    /// Returns the tag name of a node.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    /// Returns the text of a node, if it has any.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.node(id).value.as_deref()
    }

    /// Sets or clears the text of a node.
    pub fn set_value(&mut self, id: NodeId, value: Option<String>) {
        self.node_mut(id).value = value;
    }

    /// Returns the attributes of a node in insertion order.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        &self.node(id).attributes
    }

    /// Returns the value of an attribute by name.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attribute(name)
    }

    // --- Construction ---

    /// Allocates a detached element with no attributes and no text.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeData::new(name.into()));
        id
    }

    /// Allocates a detached element with attributes and optional text.
    ///
    /// Attribute values are stored in their `Display` form.
    pub fn new_node<I, K, V>(
        &mut self,
        name: impl Into<String>,
        attributes: I,
        value: Option<String>,
    ) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        let id = self.create_element(name);
        self.add_attributes(id, attributes);
        self.node_mut(id).value = value;
        id
    }

    /// Sets an attribute to the textual form of `value`, overwriting any
    /// previous value for `name`.
    pub fn add_attribute(&mut self, id: NodeId, name: &str, value: impl Display) {
        self.node_mut(id).set_attribute(name, value.to_string());
    }

    /// Applies [`add_attribute`](Self::add_attribute) for each entry. On
    /// duplicate names the last entry wins.
    pub fn add_attributes<I, K, V>(&mut self, id: NodeId, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        for (name, value) in attributes {
            self.add_attribute(id, name.as_ref(), value);
        }
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// A child that is already attached elsewhere is moved.
    ///
    /// # Panics
    ///
    /// Panics if `child` is `parent` itself or one of its ancestors; either
    /// would make the tree cyclic.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        assert_ne!(parent, child, "can not add a node to its own children");
        assert!(
            !self.ancestors(parent).any(|id| id == child),
            "can not add an ancestor of a node to its children"
        );
        if self.root == Some(child) {
            self.root = None;
        }
        self.detach(child);
        self.append_child(parent, child);
    }

    /// Links a detached node as the last child of `parent` without the
    /// cycle checks of [`add_child`](Self::add_child). Callers guarantee
    /// that `child` is freshly created, or otherwise detached and not an
    /// ancestor of `parent`.
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
        } else {
            self.node_mut(parent).first_child = Some(child);
        }
        self.node_mut(parent).last_child = Some(child);
    }

    /// Applies [`add_child`](Self::add_child) for each node in order.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as `add_child`.
    pub fn add_children(&mut self, parent: NodeId, children: impl IntoIterator<Item = NodeId>) {
        for child in children {
            self.add_child(parent, child);
        }
    }

    /// Detaches a node from its parent. The node stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Copies the subtree rooted at `id` into new, detached nodes of this
    /// document and returns the copy's root.
    ///
    /// Works with an explicit stack, so arbitrarily deep subtrees are fine.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let copy = self.copy_node(id);
        let mut pending = vec![(id, copy)];
        while let Some((source, target)) = pending.pop() {
            let mut next = self.first_child(source);
            while let Some(child) = next {
                let child_copy = self.copy_node(child);
                self.append_child(target, child_copy);
                pending.push((child, child_copy));
                next = self.next_sibling(child);
            }
        }
        copy
    }

    /// Allocates a detached node with the name, attributes and text of `id`.
    fn copy_node(&mut self, id: NodeId) -> NodeId {
        let source = self.node(id);
        let (name, attributes, value) = (
            source.name.clone(),
            source.attributes.clone(),
            source.value.clone(),
        );
        let copy = self.create_element(name);
        let data = self.node_mut(copy);
        data.attributes = attributes;
        data.value = value;
        copy
    }

    // --- Navigation ---

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over the children of a node in document order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// Returns the children of a node named `name`, in document order.
    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id).filter(move |&child| self.name(child) == name)
    }

    /// Returns the `index`-th child of a node, regardless of name.
    #[must_use]
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    /// Returns an iterator over a node and its ancestors, walking upwards.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: Some(id),
        }
    }

    /// Returns a depth-first iterator over a node and all its descendants.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: Some(id),
        }
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Depth-first, pre-order iterator over a subtree.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        if let Some(child) = self.doc.first_child(current) {
            self.next = Some(child);
            return Some(current);
        }

        // Climb until a node with an unvisited sibling, stopping at the root.
        let mut cursor = current;
        self.next = loop {
            if cursor == self.root {
                break None;
            }
            if let Some(sibling) = self.doc.next_sibling(cursor) {
                break Some(sibling);
            }
            match self.doc.parent(cursor) {
                Some(parent) => cursor = parent,
                None => break None,
            }
        };
        Some(current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names(doc: &Document, ids: impl Iterator<Item = NodeId>) -> Vec<String> {
        ids.map(|id| doc.name(id).to_string()).collect()
    }

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.root_element().is_none());
        assert_eq!(doc.node_count(), 0);
    }

    #[test]
    fn test_with_root() {
        let doc = Document::with_root("catalog");
        let root = doc.root_element().unwrap();
        assert_eq!(doc.name(root), "catalog");
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_new_node_with_attributes_and_value() {
        let mut doc = Document::new();
        let id = doc.new_node("end", [("sdf", 109)], Some("my text".to_string()));
        assert_eq!(doc.name(id), "end");
        assert_eq!(doc.attribute(id, "sdf"), Some("109"));
        assert_eq!(doc.value(id), Some("my text"));
    }

    #[test]
    fn test_add_attribute_coerces_and_overwrites() {
        let mut doc = Document::new();
        let id = doc.create_element("product");
        doc.add_attribute(id, "weight", 0.654);
        doc.add_attribute(id, "count", 3_u8);
        doc.add_attribute(id, "weight", "light");
        assert_eq!(doc.attribute(id, "weight"), Some("light"));
        assert_eq!(doc.attributes(id)[0].name, "weight");
        assert_eq!(doc.attribute(id, "count"), Some("3"));
    }

    #[test]
    fn test_add_attributes_last_write_wins() {
        let mut doc = Document::new();
        let id = doc.create_element("a");
        doc.add_attributes(id, vec![("k", "1"), ("k", "2"), ("j", "3")]);
        assert_eq!(doc.attribute(id, "k"), Some("2"));
        assert_eq!(doc.attributes(id).len(), 2);
    }

    #[test]
    fn test_empty_value_is_distinct_from_absent() {
        let mut doc = Document::new();
        let id = doc.create_element("a");
        assert_eq!(doc.value(id), None);
        doc.set_value(id, Some(String::new()));
        assert_eq!(doc.value(id), Some(""));
        doc.set_value(id, None);
        assert_eq!(doc.value(id), None);
    }

    #[test]
    fn test_add_child_links_parent_and_siblings() {
        let mut doc = Document::with_root("hello");
        let root = doc.root_element().unwrap();
        let a = doc.create_element("world");
        let b = doc.create_element("world");
        doc.add_children(root, [a, b]);

        assert_eq!(doc.parent(a), Some(root));
        assert_eq!(doc.first_child(root), Some(a));
        assert_eq!(doc.last_child(root), Some(b));
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.prev_sibling(b), Some(a));
        assert_eq!(doc.children(root).count(), 2);
    }

    #[test]
    #[should_panic(expected = "can not add a node to its own children")]
    fn test_add_self_as_child_panics() {
        let mut doc = Document::new();
        let id = doc.create_element("a");
        doc.add_child(id, id);
    }

    #[test]
    #[should_panic(expected = "can not add an ancestor")]
    fn test_add_ancestor_as_child_panics() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.add_child(a, b);
        doc.add_child(b, a);
    }

    #[test]
    fn test_add_child_moves_attached_node() {
        let mut doc = Document::new();
        let first = doc.create_element("first");
        let second = doc.create_element("second");
        let child = doc.create_element("child");
        doc.add_child(first, child);
        doc.add_child(second, child);

        assert_eq!(doc.children(first).count(), 0);
        assert_eq!(doc.first_child(first), None);
        assert_eq!(doc.parent(child), Some(second));
    }

    #[test]
    fn test_adding_root_as_child_clears_root() {
        let mut doc = Document::with_root("old");
        let old = doc.root_element().unwrap();
        let new = doc.create_element("new");
        doc.add_child(new, old);
        doc.set_root_element(new);
        assert_eq!(doc.root_element(), Some(new));
    }

    #[test]
    fn test_detach_middle_child() {
        let mut doc = Document::new();
        let parent = doc.create_element("p");
        let ids: Vec<NodeId> = ["a", "b", "c"]
            .iter()
            .map(|n| doc.create_element(*n))
            .collect();
        doc.add_children(parent, ids.iter().copied());
        doc.detach(ids[1]);

        assert_eq!(names(&doc, doc.children(parent)), vec!["a", "c"]);
        assert_eq!(doc.prev_sibling(ids[2]), Some(ids[0]));
        assert_eq!(doc.parent(ids[1]), None);
    }

    #[test]
    fn test_children_named_and_child_at() {
        let doc = crate::Document::parse_str("<a><b>1</b><c/><b>2</b></a>").unwrap();
        let root = doc.root_element().unwrap();
        let bs: Vec<_> = doc.children_named(root, "b").collect();
        assert_eq!(bs.len(), 2);
        assert_eq!(doc.value(bs[1]), Some("2"));
        assert_eq!(doc.child_at(root, 1).map(|id| doc.name(id)), Some("c"));
        assert_eq!(doc.child_at(root, 3), None);
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let doc = crate::Document::parse_str("<a><b><c/></b><d/></a>").unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(names(&doc, doc.descendants(root)), vec!["a", "b", "c", "d"]);

        let c = doc.descendants(root).nth(2).unwrap();
        assert_eq!(names(&doc, doc.ancestors(c)), vec!["c", "b", "a"]);

        let b = doc.first_child(root).unwrap();
        assert_eq!(names(&doc, doc.descendants(b)), vec!["b", "c"]);
    }

    #[test]
    fn test_deep_copy_is_detached_and_independent() {
        let mut doc = crate::Document::parse_str(r#"<a x="1"><b>t</b><c/></a>"#).unwrap();
        let root = doc.root_element().unwrap();
        let copy = doc.deep_copy(root);

        assert_ne!(copy, root);
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.attribute(copy, "x"), Some("1"));
        assert_eq!(names(&doc, doc.children(copy)), vec!["b", "c"]);

        let copied_b = doc.first_child(copy).unwrap();
        doc.set_value(copied_b, Some("changed".to_string()));
        let original_b = doc.first_child(root).unwrap();
        assert_eq!(doc.value(original_b), Some("t"));
    }

    #[test]
    fn test_deep_copy_of_deep_chain() {
        let depth = 50_000;
        let xml = format!("{}leaf{}", "<n>".repeat(depth), "</n>".repeat(depth));
        let mut doc = crate::Document::parse_str(&xml).unwrap();
        let root = doc.root_element().unwrap();
        let copy = doc.deep_copy(root);

        assert_eq!(doc.node_count(), 2 * depth);
        let deepest = doc.descendants(copy).last().unwrap();
        assert_eq!(doc.value(deepest), Some("leaf"));
        assert_eq!(doc.ancestors(deepest).count(), depth);
    }
}

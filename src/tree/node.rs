//! Per-node storage.

use super::NodeId;

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The attribute value, with entity references already expanded.
    pub value: String,
}

impl Attribute {
    /// Creates an attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Storage for a single element in the document arena.
///
/// Navigation links are arena indices. The parent link is only followed
/// upwards and never keeps anything alive; the `Document` owns every node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// The element's tag name.
    pub name: String,
    /// Attributes in insertion order. Names are unique.
    pub attributes: Vec<Attribute>,
    /// The element's text. `None` means no text, which is distinct from
    /// `Some("")`.
    pub value: Option<String>,
    /// Parent element, if attached.
    pub parent: Option<NodeId>,
    /// First child element.
    pub first_child: Option<NodeId>,
    /// Last child element (for O(1) append).
    pub last_child: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            value: None,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }

    /// Sets `name` to `value`, replacing an existing value in place so the
    /// attribute keeps its original position.
    pub(crate) fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Returns the value of the attribute called `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attribute_overwrites_in_place() {
        let mut data = NodeData::new("item".to_string());
        data.set_attribute("a", "1".to_string());
        data.set_attribute("b", "2".to_string());
        data.set_attribute("a", "3".to_string());
        assert_eq!(
            data.attributes,
            vec![Attribute::new("a", "3"), Attribute::new("b", "2")]
        );
        assert_eq!(data.attribute("a"), Some("3"));
        assert_eq!(data.attribute("missing"), None);
    }
}

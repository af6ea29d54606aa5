//! Dotted chain expressions.
//!
//! A chain expression is a shorthand for a sequence of navigation steps,
//! written as segments separated by `.`:
//!
//! - an integer segment (`1`) is an index step,
//! - a segment starting with `@` (`@description`) reads an attribute and
//!   must be the last segment,
//! - anything else (`catalog_item`) is a tag-name step.
//!
//! A leading `#` is accepted and ignored, so `#product.size.1` and
//! `product.size.1` are the same expression.
//!
//! ```
//! use xmlnav::Document;
//!
//! let doc = Document::parse_str(
//!     r#"<catalog><product><size description="Medium"/><size description="Large"/></product></catalog>"#,
//! )
//! .unwrap();
//! let root = doc.root().unwrap();
//!
//! let large = root.chain("product.size.1.@description");
//! assert_eq!(large.value(), Some("Large"));
//! assert_eq!(
//!     large.path(),
//!     Some(r#"["product"][0]["size"][1]["@description"]"#)
//! );
//! ```

use super::{AttributeLookup, Query, QueryResult};
use crate::tree::{Document, NodeId, NodeRef};

/// Marks an attribute segment.
pub const ATTRIBUTE_SIGIL: char = '@';

/// Optional marker at the start of an expression.
const CHAIN_PREFIX: char = '#';

/// One parsed segment of a chain expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Descend to children with this tag name.
    Child(String),
    /// Select one node of a multiple match. Negative indices are kept so
    /// they can be reported as out of bounds.
    Index(i64),
    /// Read an attribute. Always the final step.
    Attribute(String),
}

/// Splits a chain expression into steps.
///
/// # Errors
///
/// Returns a message describing the problem if the expression is empty,
/// contains an empty segment or an attribute segment without a name, or
/// has an attribute segment anywhere but last.
pub fn parse_chain(expr: &str) -> Result<Vec<Step>, String> {
    let body = expr.strip_prefix(CHAIN_PREFIX).unwrap_or(expr);
    if body.is_empty() {
        return Err(format!("invalid chain {expr:?}: expression is empty"));
    }

    let segments: Vec<&str> = body.split('.').collect();
    let last = segments.len() - 1;
    let mut steps = Vec::with_capacity(segments.len());
    for (position, segment) in segments.into_iter().enumerate() {
        if segment.is_empty() {
            return Err(format!(
                "invalid chain {expr:?}: segment {position} is empty"
            ));
        }
        let step = if let Some(name) = segment.strip_prefix(ATTRIBUTE_SIGIL) {
            if name.is_empty() {
                return Err(format!(
                    "invalid chain {expr:?}: segment {position} names no attribute"
                ));
            }
            if position != last {
                return Err(format!(
                    "invalid chain {expr:?}: attribute {segment:?} must be the last segment"
                ));
            }
            Step::Attribute(name.to_string())
        } else if let Ok(index) = segment.parse::<i64>() {
            Step::Index(index)
        } else {
            Step::Child(segment.to_string())
        };
        steps.push(step);
    }
    Ok(steps)
}

/// What a chain expression resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Chained<'a> {
    /// The expression ended on a node step.
    Nodes(Query<'a>),
    /// The expression ended on an attribute read.
    Attribute(AttributeLookup<'a>),
}

impl<'a> Chained<'a> {
    /// The node query, if the expression did not end on an attribute.
    pub fn as_query(&self) -> Option<&Query<'a>> {
        match self {
            Self::Nodes(query) => Some(query),
            Self::Attribute(_) => None,
        }
    }

    /// The attribute lookup, if the expression ended on one.
    pub fn as_attribute(&self) -> Option<&AttributeLookup<'a>> {
        match self {
            Self::Nodes(_) => None,
            Self::Attribute(lookup) => Some(lookup),
        }
    }

    /// The resolved node. `None` (and logged) on failure; `None` without
    /// logging for an attribute result.
    pub fn node(&self) -> Option<NodeRef<'a>> {
        self.as_query().and_then(Query::node)
    }

    /// The resolved text: the attribute value, or the text of the resolved
    /// node. Failures are logged.
    pub fn value(&self) -> Option<&'a str> {
        match self {
            Self::Nodes(query) => query.node().and_then(NodeRef::value),
            Self::Attribute(lookup) => lookup.value(),
        }
    }

    /// The traversal path, or `None` on failure.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Nodes(query) => query.path(),
            Self::Attribute(lookup) => lookup.path(),
        }
    }

    /// The failure message, without logging it.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Nodes(query) => query.error(),
            Self::Attribute(lookup) => lookup.error(),
        }
    }

    /// Returns `true` unless the expression failed.
    pub fn is_found(&self) -> bool {
        match self {
            Self::Nodes(query) => query.is_found(),
            Self::Attribute(lookup) => lookup.is_found(),
        }
    }
}

pub(super) fn evaluate<'a>(start: Query<'a>, expr: &str) -> Chained<'a> {
    let doc = start.document();
    let steps = match parse_chain(expr) {
        Ok(steps) => steps,
        Err(message) => {
            return Chained::Nodes(Query::new(doc, QueryResult::NotFound { message }));
        }
    };

    let mut current = start;
    for step in steps {
        current = match step {
            Step::Child(name) => current.child(&name),
            Step::Index(index) => Query::new(doc, current.result().index_signed(index)),
            Step::Attribute(name) => return Chained::Attribute(current.attribute(&name)),
        };
    }
    Chained::Nodes(current)
}

impl Document {
    /// Evaluates a chain expression starting at `id`.
    ///
    /// An invalid expression yields a failed [`Chained::Nodes`] whose
    /// message explains what is wrong with it.
    pub fn chain(&self, id: NodeId, expr: &str) -> Chained<'_> {
        Query::from_node(self, id).chain(expr)
    }
}

impl<'a> From<AttributeLookup<'a>> for Chained<'a> {
    fn from(lookup: AttributeLookup<'a>) -> Self {
        Self::Attribute(lookup)
    }
}

impl<'a> From<Query<'a>> for Chained<'a> {
    fn from(query: Query<'a>) -> Self {
        Self::Nodes(query)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PRODUCTS: &str = r#"<catalog>
    <product description="Cardigan Sweater">
        <catalog_item gender="Men's">
            <size description="Medium">
                <color_swatch image="red_cardigan.jpg">Red</color_swatch>
                <color_swatch image="burgundy_cardigan.jpg">Burgundy</color_swatch>
            </size>
            <size description="Large">
                <color_swatch image="navy_cardigan.jpg">Navy</color_swatch>
            </size>
        </catalog_item>
    </product>
</catalog>"#;

    #[test]
    fn test_parse_chain_steps() {
        assert_eq!(
            parse_chain("#product.size.-1.@image").unwrap(),
            vec![
                Step::Child("product".to_string()),
                Step::Child("size".to_string()),
                Step::Index(-1),
                Step::Attribute("image".to_string()),
            ]
        );
        assert_eq!(
            parse_chain("2x").unwrap(),
            vec![Step::Child("2x".to_string())]
        );
    }

    #[test]
    fn test_parse_chain_rejects_malformed() {
        assert!(parse_chain("").unwrap_err().contains("empty"));
        assert!(parse_chain("#").unwrap_err().contains("empty"));
        assert!(parse_chain("a..b").unwrap_err().contains("segment 1 is empty"));
        assert!(parse_chain("a.@").unwrap_err().contains("names no attribute"));
        assert!(parse_chain("a.@x.b")
            .unwrap_err()
            .contains("must be the last segment"));
    }

    #[test]
    fn test_chain_matches_explicit_navigation() {
        let doc = Document::parse_str(PRODUCTS).unwrap();
        let root = doc.root().unwrap();

        let chained = root.chain("#product.catalog_item.size.color_swatch.1");
        let explicit = root
            .child("product")
            .child("catalog_item")
            .child("size")
            .child("color_swatch")
            .index(1);
        assert_eq!(chained.as_query(), Some(&explicit));
        assert_eq!(chained.value(), Some("Burgundy"));
    }

    #[test]
    fn test_chain_attribute_on_multiple_uses_first() {
        let doc = Document::parse_str(PRODUCTS).unwrap();
        let root = doc.root().unwrap();
        let image = root.chain("product.catalog_item.size.color_swatch.@image");
        assert_eq!(image.value(), Some("red_cardigan.jpg"));
        assert!(image.as_attribute().is_some());
        assert!(image.node().is_none());
    }

    #[test]
    fn test_chain_failure_reports_first_missing_step() {
        let doc = Document::parse_str(PRODUCTS).unwrap();
        let root = doc.root_element().unwrap();
        let missing = doc.chain(root, "#product.catalog_item.wrong_size.wrong_color.1");
        assert_eq!(
            missing.error(),
            Some(r#"["product"][0]["catalog_item"][0]: no such children named "wrong_size""#)
        );
        assert!(!missing.is_found());
        assert_eq!(missing.path(), None);
    }

    #[test]
    fn test_chain_negative_index_is_out_of_bounds() {
        let doc = Document::parse_str(PRODUCTS).unwrap();
        let result = doc.root().unwrap().chain("product.-1");
        assert_eq!(
            result.error(),
            Some(r#"["product"]: index -1 out of bounds: [0, 1)"#)
        );
    }

    #[test]
    fn test_invalid_chain_is_not_found() {
        let doc = Document::parse_str(PRODUCTS).unwrap();
        let result = doc.root().unwrap().chain("product..size");
        assert!(result.as_query().is_some());
        assert!(result.error().unwrap().starts_with("invalid chain"));
    }

    #[test]
    fn test_invalid_chain_ending_in_attribute_is_a_failed_node_query() {
        let doc = Document::parse_str(PRODUCTS).unwrap();
        let result = doc.root().unwrap().chain("product..@description");
        assert!(result.as_attribute().is_none());
        assert!(result.as_query().is_some());
        assert_eq!(result.value(), None);
        assert!(result.error().unwrap().contains("segment 1 is empty"));
    }
}

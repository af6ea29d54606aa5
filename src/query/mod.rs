//! Chainable navigation with path diagnostics.
//!
//! Navigation never fails eagerly. Each step maps one [`QueryResult`] to a
//! new one, and a failed step produces [`QueryResult::NotFound`], which
//! every later step passes through unchanged. The failure is reported only
//! when a caller asks for a concrete node or value, at which point the
//! message (which records every step taken, e.g.
//! `["product"]["size"][1]: no such children named "color"`) is logged
//! through the document's [`Diagnostics`](crate::diagnostics::Diagnostics)
//! and the result degrades to `None`, an empty list, or empty text.
//!
//! ```
//! use xmlnav::Document;
//!
//! let doc = Document::parse_str("<a><b>1</b><b>2</b></a>").unwrap();
//! let root = doc.root().unwrap();
//! let second = root.child("b").index(1);
//! assert_eq!(second.node().and_then(|n| n.value()), Some("2"));
//!
//! let missing = root.child("c").index(0).child("d");
//! assert_eq!(missing.error(), Some("no such children named \"c\""));
//! ```

pub mod chain;

pub use chain::{parse_chain, Chained, Step, ATTRIBUTE_SIGIL};

use std::fmt::Write as _;

use crate::error::QueryError;
use crate::tree::{Attribute, Document, NodeId, NodeRef};

/// The outcome of a navigation step.
///
/// `Multiple` always holds at least one node; an empty match becomes
/// `NotFound` at the point of matching. Values are never mutated: every
/// navigation method returns a new `QueryResult`.
///
/// `Single` and `Multiple` are `#[non_exhaustive]`, so outside this crate
/// they can be matched but only produced by navigation:
///
/// ```compile_fail
/// use xmlnav::QueryResult;
///
/// let empty = QueryResult::Multiple {
///     nodes: Vec::new(),
///     path: String::new(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Exactly one node, reached via `path`.
    #[non_exhaustive]
    Single {
        /// The matched node.
        node: NodeId,
        /// How the node was reached, in subscript notation.
        path: String,
    },
    /// Same-named siblings in document order, reached via `path`.
    #[non_exhaustive]
    Multiple {
        /// The matched nodes. Never empty.
        nodes: Vec<NodeId>,
        /// How the nodes were reached, in subscript notation.
        path: String,
    },
    /// Navigation failed.
    NotFound {
        /// What failed, prefixed with the path up to the failing step.
        message: String,
    },
}

impl QueryResult {
    /// Wraps a node as a single match with an empty path.
    #[must_use]
    pub fn from_node(node: NodeId) -> Self {
        Self::Single {
            node,
            path: String::new(),
        }
    }

    /// Selects the `index`-th node of a multiple match.
    ///
    /// A single match can not be indexed; use [`child`](Self::child) to
    /// reach its children first.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.index_signed(i64::try_from(index).unwrap_or(i64::MAX))
    }

    pub(crate) fn index_signed(&self, index: i64) -> Self {
        match self {
            Self::NotFound { .. } => self.clone(),
            Self::Single { path, .. } => Self::NotFound {
                message: at(path, "single node can not be indexed"),
            },
            Self::Multiple { nodes, path } => {
                let picked = usize::try_from(index)
                    .ok()
                    .and_then(|i| nodes.get(i).copied());
                match picked {
                    Some(node) => Self::Single {
                        node,
                        path: format!("{path}[{index}]"),
                    },
                    None => Self::NotFound {
                        message: at(
                            path,
                            &format!("index {index} out of bounds: [0, {})", nodes.len()),
                        ),
                    },
                }
            }
        }
    }

    /// Selects the children named `name`.
    ///
    /// **On a multiple match this implicitly descends from the first node.**
    /// `q.child("x")` on `Multiple` behaves exactly like
    /// `q.index(0).child("x")`, and the path records the `[0]`. Indexing
    /// must be explicit, but descending by name picks the first match.
    #[must_use]
    pub fn child(&self, doc: &Document, name: &str) -> Self {
        match self {
            Self::NotFound { .. } => self.clone(),
            Self::Single { node, path } => {
                let nodes: Vec<NodeId> = doc.children_named(*node, name).collect();
                if nodes.is_empty() {
                    Self::NotFound {
                        message: at(path, &format!("no such children named \"{name}\"")),
                    }
                } else {
                    Self::Multiple {
                        nodes,
                        path: format!("{path}[\"{name}\"]"),
                    }
                }
            }
            Self::Multiple { .. } => self.index(0).child(doc, name),
        }
    }

    /// The node a scalar accessor resolves to: the single node, or the
    /// first of several. Does not log.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        match self {
            Self::Single { node, .. } => Some(*node),
            Self::Multiple { nodes, .. } => nodes.first().copied(),
            Self::NotFound { .. } => None,
        }
    }

    /// Every matched node in document order. Does not log.
    #[must_use]
    pub fn ids(&self) -> Vec<NodeId> {
        match self {
            Self::Single { node, .. } => vec![*node],
            Self::Multiple { nodes, .. } => nodes.clone(),
            Self::NotFound { .. } => Vec::new(),
        }
    }

    /// The traversal path, or `None` for a failed query.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Single { path, .. } | Self::Multiple { path, .. } => Some(path),
            Self::NotFound { .. } => None,
        }
    }

    /// The failure message, or `None` if something was found.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::NotFound { message } => Some(message),
            _ => None,
        }
    }

    /// Returns `true` unless this is `NotFound`.
    #[must_use]
    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }
}

/// Prefixes `message` with `path`, leaving it bare when the path is empty.
pub(crate) fn at(path: &str, message: &str) -> String {
    if path.is_empty() {
        message.to_string()
    } else {
        format!("{path}: {message}")
    }
}

/// A [`QueryResult`] bound to the document it navigates.
///
/// This is the type most callers use: it chains (`child`, `index`,
/// `chain`) and resolves (`node`, `list`, iteration, typed conversions via
/// [`TextSource`](crate::convert::TextSource)). Resolving a failed query
/// logs its message through the document's diagnostics.
#[derive(Debug, Clone)]
pub struct Query<'a> {
    doc: &'a Document,
    result: QueryResult,
}

impl<'a> Query<'a> {
    /// Binds `result` to `doc`.
    pub fn new(doc: &'a Document, result: QueryResult) -> Self {
        Self { doc, result }
    }

    /// A single match on `node` with an empty path.
    pub fn from_node(doc: &'a Document, node: NodeId) -> Self {
        Self::new(doc, QueryResult::from_node(node))
    }

    /// The document being navigated.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// The underlying result.
    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    /// Unwraps the underlying result.
    pub fn into_result(self) -> QueryResult {
        self.result
    }

    /// See [`QueryResult::child`], including its first-match rule for
    /// multiple matches.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self::new(self.doc, self.result.child(self.doc, name))
    }

    /// See [`QueryResult::index`].
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self::new(self.doc, self.result.index(index))
    }

    /// Evaluates a dotted chain expression from this result.
    ///
    /// See [`chain`] for the syntax.
    pub fn chain(&self, expr: &str) -> Chained<'a> {
        chain::evaluate(self.clone(), expr)
    }

    /// Reads an attribute of the resolved node.
    ///
    /// This is a terminal step. Like name descent, a multiple match reads
    /// from its first node.
    pub fn attribute(&self, name: &str) -> AttributeLookup<'a> {
        let outcome = match &self.result {
            QueryResult::NotFound { message } => Lookup::Missing {
                message: message.clone(),
            },
            QueryResult::Single { node, path } => attribute_of(self.doc, *node, path, name),
            QueryResult::Multiple { .. } => return self.index(0).attribute(name),
        };
        AttributeLookup {
            doc: self.doc,
            outcome,
        }
    }

    /// The resolved node: the single match or the first of several.
    /// Logs and returns `None` for a failed query.
    pub fn node(&self) -> Option<NodeRef<'a>> {
        match &self.result {
            QueryResult::NotFound { message } => {
                self.doc.diagnostics().log(message);
                None
            }
            found => found.first().map(|id| self.doc.get(id)),
        }
    }

    /// Like [`node`](Self::node), but returns the failure instead of
    /// logging it.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] carrying the path diagnostic if navigation
    /// failed.
    pub fn try_node(&self) -> Result<NodeRef<'a>, QueryError> {
        match &self.result {
            QueryResult::NotFound { message } => Err(QueryError {
                message: message.clone(),
            }),
            found => found
                .first()
                .map(|id| self.doc.get(id))
                .ok_or_else(|| QueryError {
                    message: "empty match".to_string(),
                }),
        }
    }

    /// Attributes of the resolved node; empty if unresolved.
    pub fn attributes(&self) -> &'a [Attribute] {
        self.node().map(NodeRef::attributes).unwrap_or_default()
    }

    /// Children of the resolved node; empty if unresolved.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        self.node()
            .map(|node| node.children().collect())
            .unwrap_or_default()
    }

    /// Every matched node in document order. Logs and returns an empty list
    /// for a failed query.
    pub fn list(&self) -> Vec<NodeRef<'a>> {
        if let QueryResult::NotFound { message } = &self.result {
            self.doc.diagnostics().log(message);
        }
        self.result
            .ids()
            .into_iter()
            .map(|id| self.doc.get(id))
            .collect()
    }

    /// Iterates over [`list`](Self::list). Each call starts afresh.
    pub fn iter(&self) -> Iter<'a> {
        if let QueryResult::NotFound { message } = &self.result {
            self.doc.diagnostics().log(message);
        }
        Iter {
            doc: self.doc,
            ids: self.result.ids().into_iter(),
        }
    }

    /// The traversal path, or `None` for a failed query.
    pub fn path(&self) -> Option<&str> {
        self.result.path()
    }

    /// The failure message, without logging it.
    pub fn error(&self) -> Option<&str> {
        self.result.error()
    }

    /// Returns `true` unless navigation failed.
    pub fn is_found(&self) -> bool {
        self.result.is_found()
    }

    /// Text of the resolved node for conversions, logging when the node is
    /// unresolved or has no text.
    pub(crate) fn resolved_text(&self) -> &'a str {
        let Some(node) = self.node() else {
            return "";
        };
        node.value().unwrap_or_else(|| {
            let path = self.path().unwrap_or_default();
            self.doc
                .diagnostics()
                .log(&at(path, &format!("<{}> has no text", node.name())));
            ""
        })
    }
}

impl PartialEq for Query<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.result == other.result
    }
}

impl<'a> IntoIterator for &Query<'a> {
    type Item = NodeRef<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for Query<'a> {
    type Item = NodeRef<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the nodes of a [`Query`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    doc: &'a Document,
    ids: std::vec::IntoIter<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|id| self.doc.get(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup<'a> {
    Found { value: &'a str, path: String },
    Missing { message: String },
}

fn attribute_of<'a>(doc: &'a Document, node: NodeId, path: &str, name: &str) -> Lookup<'a> {
    match doc.attribute(node, name) {
        Some(value) => {
            let mut path = path.to_string();
            let _ = write!(path, "[\"{ATTRIBUTE_SIGIL}{name}\"]");
            Lookup::Found { value, path }
        }
        None => Lookup::Missing {
            message: at(path, &format!("no such attribute named \"{name}\"")),
        },
    }
}

/// The result of reading an attribute at the end of a query.
#[derive(Debug, Clone)]
pub struct AttributeLookup<'a> {
    doc: &'a Document,
    outcome: Lookup<'a>,
}

impl<'a> AttributeLookup<'a> {
    /// The attribute value. Logs and returns `None` if it was not found.
    pub fn value(&self) -> Option<&'a str> {
        match &self.outcome {
            Lookup::Found { value, .. } => Some(value),
            Lookup::Missing { message } => {
                self.doc.diagnostics().log(message);
                None
            }
        }
    }

    /// The attribute value, or the failure without logging it.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] with the path diagnostic if the attribute
    /// or any node on the way to it is missing.
    pub fn try_value(&self) -> Result<&'a str, QueryError> {
        match &self.outcome {
            Lookup::Found { value, .. } => Ok(value),
            Lookup::Missing { message } => Err(QueryError {
                message: message.clone(),
            }),
        }
    }

    /// The path to the attribute, or `None` if it was not found.
    pub fn path(&self) -> Option<&str> {
        match &self.outcome {
            Lookup::Found { path, .. } => Some(path),
            Lookup::Missing { .. } => None,
        }
    }

    /// The failure message, without logging it.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Lookup::Found { .. } => None,
            Lookup::Missing { message } => Some(message),
        }
    }

    /// Returns `true` if the attribute was found.
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, Lookup::Found { .. })
    }
}

impl PartialEq for AttributeLookup<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.outcome == other.outcome
    }
}

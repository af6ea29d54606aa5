#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use proptest::{collection::vec, prelude::*};

use xmlnav::serial::serialize_document;
use xmlnav::{Document, NodeId, Query, QueryResult, TextSource};

/// A tree to build, generated independently of the library.
#[derive(Debug, Clone)]
struct TreeShape {
    name: String,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    children: Vec<TreeShape>,
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,5}"
}

fn attributes_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(name_strategy(), "[a-zA-Z0-9 <>&\"'\t\n]{0,8}", 0..4)
}

/// Text survives trimming on re-parse, so it never starts or ends with
/// whitespace.
fn text_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z0-9<>&\"']([a-zA-Z0-9 <>&\"']{0,10}[a-zA-Z0-9<>&\"'])?")
}

fn tree_strategy() -> impl Strategy<Value = TreeShape> {
    let leaf = (name_strategy(), attributes_strategy(), text_strategy()).prop_map(
        |(name, attributes, text)| TreeShape {
            name,
            attributes,
            text,
            children: Vec::new(),
        },
    );
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            name_strategy(),
            attributes_strategy(),
            text_strategy(),
            vec(inner, 0..4),
        )
            .prop_map(|(name, attributes, text, children)| TreeShape {
                name,
                attributes,
                text,
                children,
            })
    })
}

fn build(doc: &mut Document, shape: &TreeShape) -> NodeId {
    let id = doc.new_node(shape.name.as_str(), &shape.attributes, shape.text.clone());
    for child in &shape.children {
        let child_id = build(doc, child);
        doc.add_child(id, child_id);
    }
    id
}

fn matches_shape(doc: &Document, id: NodeId, shape: &TreeShape) -> bool {
    let attributes: BTreeMap<String, String> = doc
        .attributes(id)
        .iter()
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect();
    doc.name(id) == shape.name
        && attributes == shape.attributes
        && doc.value(id) == shape.text.as_deref()
        && doc.children(id).count() == shape.children.len()
        && doc
            .children(id)
            .zip(&shape.children)
            .all(|(child, child_shape)| matches_shape(doc, child, child_shape))
}

/// A root with the given child names, in order.
fn flat_document(names: &[String]) -> Document {
    let mut doc = Document::with_root("root");
    let root = doc.root_element().unwrap();
    for (i, name) in names.iter().enumerate() {
        let child = doc.new_node(name.as_str(), [("pos", i)], None);
        doc.add_child(root, child);
    }
    doc
}

#[derive(Debug, Clone)]
enum Step {
    Child(String),
    Index(usize),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[a-c]".prop_map(Step::Child),
        (0usize..6).prop_map(Step::Index),
    ]
}

fn apply<'a>(query: &Query<'a>, step: &Step) -> Query<'a> {
    match step {
        Step::Child(name) => query.child(name),
        Step::Index(i) => query.index(*i),
    }
}

proptest! {
    #[test]
    fn test_round_trip_preserves_tree(shape in tree_strategy()) {
        let mut doc = Document::new();
        let root = build(&mut doc, &shape);
        doc.set_root_element(root);

        let text = serialize_document(&doc);
        let reparsed = Document::parse_str(&text).unwrap();
        prop_assert!(matches_shape(&reparsed, reparsed.root_element().unwrap(), &shape), "{}", text);
    }

    #[test]
    fn test_name_filter_keeps_document_order(names in vec("[a-c]", 1..12), wanted in "[a-c]") {
        let doc = flat_document(&names);
        let query = doc.root().unwrap().child(&wanted);
        let expected: Vec<String> = names
            .iter()
            .enumerate()
            .filter(|(_, name)| **name == wanted)
            .map(|(i, _)| i.to_string())
            .collect();

        if expected.is_empty() {
            prop_assert!(query.error().is_some());
        } else {
            let is_multiple = matches!(query.result(), QueryResult::Multiple { .. });
            prop_assert!(is_multiple);
            let positions: Vec<String> = query
                .iter()
                .map(|node| node.attribute("pos").unwrap().to_string())
                .collect();
            prop_assert_eq!(positions, expected);
        }
    }

    #[test]
    fn test_index_in_and_out_of_range(len in 1usize..10, index in 0usize..20) {
        let names = vec!["item".to_string(); len];
        let doc = flat_document(&names);
        let items = doc.root().unwrap().child("item");
        let picked = items.index(index);

        if index < len {
            let expected = items.result().ids()[index];
            let is_expected = matches!(
                picked.result(),
                QueryResult::Single { node, .. } if *node == expected
            );
            prop_assert!(is_expected);
            let expected_path = format!("[\"item\"][{index}]");
            prop_assert_eq!(picked.path(), Some(expected_path.as_str()));
        } else {
            let message = picked.error().unwrap();
            let bound = format!("[0, {len})");
            prop_assert!(message.contains(&bound), "{}", message);
        }
    }

    #[test]
    fn test_not_found_absorbs_every_step(steps in vec(step_strategy(), 0..8)) {
        let doc = flat_document(&["a".to_string(), "b".to_string()]);
        let failed = doc.root().unwrap().child("missing");
        let mut query = failed.clone();
        for step in &steps {
            query = apply(&query, step);
        }
        prop_assert_eq!(query.result(), failed.result());
    }

    #[test]
    fn test_chain_equals_explicit_steps(len in 1usize..6, index in 0usize..8) {
        let names = vec!["item".to_string(); len];
        let doc = flat_document(&names);
        let root = doc.root().unwrap();

        let chained = root.chain(&format!("item.{index}.@pos"));
        let explicit = root.child("item").index(index).attribute("pos");
        prop_assert_eq!(chained.as_attribute(), Some(&explicit));
        if index < len {
            prop_assert_eq!(chained.to_usize(), index);
        }
    }

    #[test]
    fn test_lenient_integers_agree_with_strict(n in any::<i32>(), suffix in "[a-z ]{0,4}") {
        let plain = n.to_string();
        prop_assert_eq!(plain.to_i32(), n);
        prop_assert_eq!(TextSource::parse::<i32>(plain.as_str()), Ok(n));
        prop_assert_eq!(format!("{plain}{suffix}").to_i32(), n);
        prop_assert_eq!(format!("  {plain}").to_i64(), i64::from(n));
    }
}

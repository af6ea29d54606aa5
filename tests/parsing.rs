//! Integration tests for loading documents from strings, bytes and files.

#![allow(clippy::unwrap_used)]

use xmlnav::error::ParseErrorKind;
use xmlnav::sax::{parse_sax, SaxHandler};
use xmlnav::{Document, TextSource};

#[test]
fn test_unclosed_tag_is_a_parse_failure() {
    let err = Document::parse_str("<a><b>text</b>").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert!(err.to_string().starts_with("parse error at "));
}

#[test]
fn test_failures_never_produce_a_document() {
    let inputs = [
        "",
        "   ",
        "<",
        "<a",
        "<a></a><b></b>",
        "<a>&undefined;</a>",
        "<a b=\"1\" b=\"2\"/>",
        "<?xml version=\"1.0\"?>",
    ];
    for input in inputs {
        assert!(Document::parse_str(input).is_err(), "accepted {input:?}");
    }
}

#[test]
fn test_prolog_comments_and_doctype_are_skipped() {
    let doc = Document::parse_str(
        "<?xml version=\"1.0\"?>\n<!DOCTYPE note>\n<!-- a comment -->\n<note><!-- inner --><to>Tove</to></note>\n",
    )
    .unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.name(), "note");
    assert_eq!(root.children().count(), 1);
    assert_eq!(root.child("to").string(), "Tove");
}

#[test]
fn test_entities_and_cdata_become_text() {
    let doc = Document::parse_str(
        r#"<r><e>fish &amp; chips &#169;</e><c><![CDATA[<b>raw</b>]]></c><q a="&quot;x&quot;"/></r>"#,
    )
    .unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.child("e").string(), "fish & chips ©");
    assert_eq!(root.child("c").string(), "<b>raw</b>");
    assert_eq!(root.chain("q.@a").string(), "\"x\"");
}

#[test]
fn test_utf16_input_with_bom() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "<a>grüße</a>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let doc = Document::parse_bytes(&bytes).unwrap();
    assert_eq!(doc.root().unwrap().value(), Some("grüße"));
}

#[test]
fn test_invalid_utf8_is_an_encoding_error() {
    let err = Document::parse_bytes(b"<a>\xFF\xFE\xFD</a>").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Encoding);
}

#[test]
fn test_parse_fixture_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/products.xml");
    let doc = Document::parse_file(path).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.name(), "catalog");
    assert_eq!(root.chain("product.catalog_item").as_query().unwrap().list().len(), 2);
}

#[test]
fn test_custom_sax_handler_sees_tree_events() {
    #[derive(Default)]
    struct Depth {
        current: usize,
        max: usize,
        text: Vec<String>,
    }

    impl SaxHandler for Depth {
        fn start_element(&mut self, _name: &str, _attributes: &[(String, String)]) {
            self.current += 1;
            self.max = self.max.max(self.current);
        }

        fn end_element(&mut self, _name: &str) {
            self.current -= 1;
        }

        fn characters(&mut self, content: &str) {
            if !content.trim().is_empty() {
                self.text.push(content.to_string());
            }
        }
    }

    let mut handler = Depth::default();
    parse_sax("<a><b><c>deep</c></b><d/></a>", &mut handler).unwrap();
    assert_eq!(handler.max, 3);
    assert_eq!(handler.current, 0);
    assert_eq!(handler.text, vec!["deep"]);
}

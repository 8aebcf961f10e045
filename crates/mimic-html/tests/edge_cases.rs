//! Edge case and stress tests for mimic-html
//!
//! Malformed input, unusual characters and very deep documents.

use mimic_dom::{DomTree, ElementQuery};
use mimic_html::{XmlParser, outer_html, parse_xml, serialize};

fn error_of(markup: &str) -> Option<String> {
    let mut tree = DomTree::new();
    XmlParser::new()
        .parse_with_error(&mut tree, markup)
        .error
        .map(|e| e.message)
}

// ============================================================================
// EMPTY AND MINIMAL INPUT
// ============================================================================

#[test]
fn test_parse_empty_input() {
    let mut tree = DomTree::new();
    let doc = parse_xml(&mut tree, "");
    assert_eq!(error_of("").as_deref(), Some("Start tag expected, '<' not found"));
    assert_eq!(tree.get_elements_by_tag_name(doc, "parsererror").len(), 1);
}

#[test]
fn test_parse_only_whitespace() {
    assert_eq!(
        error_of("   \t\n\r\n   ").as_deref(),
        Some("Start tag expected, '<' not found")
    );
}

#[test]
fn test_parse_only_doctype() {
    let mut tree = DomTree::new();
    let outcome = XmlParser::new().parse_with_error(&mut tree, "<!DOCTYPE note>");
    assert!(outcome.error.is_some());
    assert!(tree.doctype(outcome.document).is_some());
}

#[test]
fn test_root_comment_and_cdata_are_dropped() {
    let mut tree = DomTree::new();
    let outcome = XmlParser::new().parse_with_error(&mut tree, "<!--a--><![CDATA[b]]><r/><!--c-->");
    assert_eq!(outcome.error, None);
    assert_eq!(tree.child_nodes(outcome.document).len(), 1);
}

// ============================================================================
// MALFORMED CONTENT
// ============================================================================

#[test]
fn test_declaration_after_whitespace() {
    assert_eq!(
        error_of(" <?xml version=\"1.0\"?><r/>").as_deref(),
        Some("XML declaration allowed only at the start of the document")
    );
}

#[test]
fn test_reserved_pi_target() {
    assert_eq!(
        error_of("<r><?XML x?></r>").as_deref(),
        Some("xmlParsePITarget: invalid name prefix 'XML'")
    );
}

#[test]
fn test_unbound_attribute_prefix() {
    assert_eq!(
        error_of("<r p:a=\"1\"/>").as_deref(),
        Some("Namespace prefix p for a on r is not defined")
    );
}

#[test]
fn test_close_without_open() {
    assert_eq!(error_of("</r>").as_deref(), Some("Unexpected end tag : r"));
}

#[test]
fn test_unterminated_constructs() {
    assert_eq!(error_of("<r><!-- open").as_deref(), Some("Comment not terminated"));
    assert_eq!(
        error_of("<r><![CDATA[ open").as_deref(),
        Some("CData section not finished")
    );
    assert_eq!(
        error_of("<r><c>").as_deref(),
        Some("Premature end of data in tag c line 1")
    );
}

#[test]
fn test_text_after_root() {
    assert_eq!(
        error_of("<r/>trailing").as_deref(),
        Some("Extra content at the end of the document")
    );
}

#[test]
fn test_xmlns_prefix_misuse() {
    // Reserved prefix bound to the wrong namespace
    assert!(error_of("<r xmlns:xml=\"urn:wrong\"><xml:a/></r>").is_some());
}

// ============================================================================
// CHARACTERS
// ============================================================================

#[test]
fn test_numeric_references_outside_bmp() {
    let mut tree = DomTree::new();
    let doc = parse_xml(&mut tree, "<r a=\"&#x1F600;\">&#128512;&#x41;</r>");
    let root = tree.document_element(doc).unwrap();
    assert_eq!(tree.get_attribute(root, "a").as_deref(), Some("\u{1F600}"));
    assert_eq!(tree.text_content(root).as_deref(), Some("\u{1F600}A"));
}

#[test]
fn test_unicode_names() {
    let mut tree = DomTree::new();
    let doc = parse_xml(&mut tree, "<données clé=\"v\">é</données>");
    let root = tree.document_element(doc).unwrap();
    assert_eq!(tree.local_name(root), Some("données"));
    assert_eq!(outer_html(&tree, root), "<données clé=\"v\">é</données>");
}

#[test]
fn test_crlf_normalized() {
    let mut tree = DomTree::new();
    let doc = parse_xml(&mut tree, "<r>a\r\nb\rc</r>");
    let root = tree.document_element(doc).unwrap();
    assert_eq!(tree.text_content(root).as_deref(), Some("a\nb\nc"));
}

#[test]
fn test_attribute_whitespace_normalized() {
    let mut tree = DomTree::new();
    let doc = parse_xml(&mut tree, "<r a=\"x\ty\nz\"/>");
    let root = tree.document_element(doc).unwrap();
    assert_eq!(tree.get_attribute(root, "a").as_deref(), Some("x y z"));
}

#[test]
fn test_doctype_with_internal_subset() {
    let mut tree = DomTree::new();
    let doc = parse_xml(
        &mut tree,
        "<!DOCTYPE note SYSTEM \"note.dtd\" [<!ELEMENT note (#PCDATA)>]><note/>",
    );
    let doctype = tree.doctype(doc).unwrap();
    assert_eq!(
        serialize(&tree, doctype),
        "<!DOCTYPE note SYSTEM \"note.dtd\">"
    );
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_deeply_nested_document() {
    let depth = 5000;
    let markup = format!("{}{}", "<d>".repeat(depth), "</d>".repeat(depth));
    let mut tree = DomTree::new();
    let outcome = XmlParser::new().parse_with_error(&mut tree, &markup);
    assert_eq!(outcome.error, None);
    assert_eq!(serialize(&tree, outcome.document), markup);
}

#[test]
fn test_many_siblings() {
    let markup = format!("<list>{}</list>", "<item n=\"1\">x</item>".repeat(2000));
    let mut tree = DomTree::new();
    let doc = parse_xml(&mut tree, &markup);
    let list = tree.document_element(doc).unwrap();
    assert_eq!(tree.child_element_count(list), 2000);
    assert_eq!(serialize(&tree, doc), markup);
}

#[test]
fn test_error_position_counts_crlf_once() {
    let mut tree = DomTree::new();
    let outcome = XmlParser::new().parse_with_error(&mut tree, "<r>\r\n<c>\r\n</r>");
    let error = outcome.error.unwrap();
    assert_eq!(error.message, "Opening and ending tag mismatch: c line 2 and r");
    assert_eq!((error.line, error.column), (3, 4));
}

#[test]
fn test_byte_order_mark_before_declaration() {
    let mut tree = DomTree::new();
    let outcome =
        XmlParser::new().parse_with_error(&mut tree, "\u{feff}<?xml version=\"1.0\"?><r>x</r>");
    assert_eq!(outcome.error, None);
    assert_eq!(
        serialize(&tree, outcome.document),
        "<!--?xml version=\"1.0\"?--><r>x</r>"
    );
}

// ============================================================================
// HTML5 PARSER
// ============================================================================

#[cfg(feature = "html5")]
mod html5 {
    use mimic_dom::DomTree;
    use mimic_html::{HtmlParser, inner_html};

    #[test]
    fn test_parse_null_bytes() {
        let mut tree = DomTree::new();
        let doc = HtmlParser::new().parse(&mut tree, "Hello\0World").unwrap();
        assert!(tree.body(doc).is_some());
    }

    #[test]
    fn test_parse_unclosed_and_misnested() {
        let mut tree = DomTree::new();
        let doc = HtmlParser::new()
            .parse(&mut tree, "<div><b><i>x</b></i><p>y")
            .unwrap();
        let body = tree.body(doc).unwrap();
        assert!(inner_html(&tree, body).starts_with("<div><b><i>x</i></b>"));
    }

    #[test]
    fn test_parse_keeps_whitespace_text() {
        let mut tree = DomTree::new();
        let doc = HtmlParser::new()
            .parse(&mut tree, "<body><span>a</span> <span>b</span></body>")
            .unwrap();
        let body = tree.body(doc).unwrap();
        assert_eq!(tree.child_nodes(body).len(), 3);
    }
}

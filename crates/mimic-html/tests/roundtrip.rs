//! Round-trip tests for the parser/serializer pair
//!
//! `parse(serialize(tree))` must rebuild an equal tree for elements, text,
//! comments and doctypes.

use mimic_dom::{DomTree, NodeId, namespace};
use mimic_html::{parse_xml, serialize};

fn reparse(tree: &mut DomTree, doc: NodeId) -> NodeId {
    let markup = serialize(tree, doc);
    parse_xml(tree, &markup)
}

// ============================================================================
// BUILT TREES
// ============================================================================

#[test]
fn test_built_xml_tree_round_trips() {
    let mut tree = DomTree::new();
    let doc = tree.create_document("application/xml");
    let doctype = tree.create_document_type(doc, "catalog", "", "catalog.dtd");
    tree.append_child(doc, doctype).unwrap();

    let catalog = tree.create_element(doc, "catalog").unwrap();
    tree.append_child(doc, catalog).unwrap();
    for (id, title) in [("1", "Tom & Jerry"), ("2", "<Untitled>")] {
        let book = tree.create_element(doc, "book").unwrap();
        tree.set_attribute(book, "id", id).unwrap();
        tree.set_attribute(book, "note", "say \"hi\"").unwrap();
        let text = tree.create_text_node(doc, title);
        tree.append_child(book, text).unwrap();
        let comment = tree.create_comment(doc, " reviewed ");
        tree.append_child(book, comment).unwrap();
        tree.append_child(catalog, book).unwrap();
    }

    let parsed = reparse(&mut tree, doc);
    assert!(tree.is_equal_node(doc, parsed));
}

#[test]
fn test_namespaced_tree_round_trips() {
    let mut tree = DomTree::new();
    let doc = tree.create_document("application/xhtml+xml");
    let html = tree
        .create_element_ns(doc, Some(namespace::HTML), "html")
        .unwrap();
    tree.set_attribute_ns(html, Some(namespace::XMLNS), "xmlns", namespace::HTML)
        .unwrap();
    tree.set_attribute_ns(html, Some(namespace::XMLNS), "xmlns:svg", namespace::SVG)
        .unwrap();
    tree.append_child(doc, html).unwrap();

    let body = tree.create_element_ns(doc, Some(namespace::HTML), "body").unwrap();
    tree.append_child(html, body).unwrap();
    let svg = tree
        .create_element_ns(doc, Some(namespace::SVG), "svg:svg")
        .unwrap();
    tree.set_attribute_ns(svg, Some(namespace::XLINK), "xlink:href", "#a")
        .unwrap();
    tree.append_child(body, svg).unwrap();
    let br = tree.create_element_ns(doc, Some(namespace::HTML), "br").unwrap();
    tree.append_child(body, br).unwrap();

    let parsed = reparse(&mut tree, doc);
    assert!(tree.is_equal_node(doc, parsed));
    let parsed_svg = tree
        .first_element_child(tree.first_element_child(tree.document_element(parsed).unwrap()).unwrap())
        .unwrap();
    assert_eq!(tree.namespace_uri(parsed_svg), Some(namespace::SVG));
    assert_eq!(
        tree.get_attribute_ns(parsed_svg, Some(namespace::XLINK), "href").as_deref(),
        Some("#a")
    );
}

#[test]
fn test_void_children_are_lost_on_round_trip() {
    let mut tree = DomTree::new();
    let doc = tree.create_document("application/xhtml+xml");
    let div = tree.create_element_ns(doc, Some(namespace::HTML), "div").unwrap();
    tree.set_attribute_ns(div, Some(namespace::XMLNS), "xmlns", namespace::HTML)
        .unwrap();
    tree.append_child(doc, div).unwrap();
    let img = tree.create_element_ns(doc, Some(namespace::HTML), "img").unwrap();
    let text = tree.create_text_node(doc, "alt");
    tree.append_child(img, text).unwrap();
    tree.append_child(div, img).unwrap();

    let parsed = reparse(&mut tree, doc);
    assert!(!tree.is_equal_node(doc, parsed));
    tree.remove_child(img, text).unwrap();
    assert!(tree.is_equal_node(doc, parsed));
}

// ============================================================================
// MARKUP FIXED POINTS
// ============================================================================

#[test]
fn test_canonical_markup_is_fixed_point() {
    let samples = [
        "<r></r>",
        "<r a=\"1\" b=\"&lt;&amp;&quot;\">text<!-- c --><e></e></r>",
        "<!DOCTYPE r PUBLIC \"-//X//Y//EN\" \"r.dtd\"><r><x:y xmlns:x=\"urn:x\" x:z=\"v\"></x:y></r>",
        "<html xmlns=\"http://www.w3.org/1999/xhtml\"><body><p>a<br/>b</p><template><i></i></template></body></html>",
    ];
    for sample in samples {
        let mut tree = DomTree::new();
        let doc = parse_xml(&mut tree, sample);
        assert_eq!(serialize(&tree, doc), sample);
    }
}

#[test]
fn test_processing_instructions_are_lossy() {
    let mut tree = DomTree::new();
    let doc = parse_xml(&mut tree, "<r><?pi data?></r>");
    let parsed = reparse(&mut tree, doc);
    assert!(!tree.is_equal_node(doc, parsed));
    let root = tree.document_element(parsed).unwrap();
    assert_eq!(tree.data(tree.first_child(root).unwrap()), Some("?pi data?"));
}

#[cfg(feature = "html5")]
#[test]
fn test_html_document_round_trips_through_html5ever() {
    use mimic_html::HtmlParser;

    let mut tree = DomTree::new();
    let doc = tree.create_html_document("Round trip");
    let body = tree.body(doc).unwrap();
    let form = tree.create_element(doc, "form").unwrap();
    tree.set_attribute(form, "action", "/go").unwrap();
    let input = tree.create_element(doc, "input").unwrap();
    tree.set_attribute(input, "name", "q").unwrap();
    tree.append_child(form, input).unwrap();
    let text = tree.create_text_node(doc, "a & b");
    tree.append_child(form, text).unwrap();
    tree.append_child(body, form).unwrap();

    let markup = serialize(&tree, doc);
    let parsed = HtmlParser::new().parse(&mut tree, &markup).unwrap();
    assert!(tree.is_equal_node(doc, parsed));
}

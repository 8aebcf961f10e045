//! Edge case and stress tests for mimic-dom
//!
//! Rare document shapes, deep trees and unusual node kinds.

use mimic_dom::{DomError, DomTree, ElementKind, NodeId, NodeType, namespace};

// ============================================================================
// DOCUMENT STRUCTURE RULES
// ============================================================================

#[test]
fn test_second_doctype_rejected() {
    let mut tree = DomTree::new();
    let doc = tree.create_html_document("");
    let doctype = tree.create_document_type(doc, "html", "", "");
    let err = tree.insert_before(doc, doctype, tree.first_child(doc)).unwrap_err();
    assert_eq!(err.name(), "HierarchyRequestError");
}

#[test]
fn test_fragment_with_two_elements_into_document() {
    let mut tree = DomTree::new();
    let doc = tree.create_document("application/xml");
    let fragment = tree.create_document_fragment(doc);
    for name in ["a", "b"] {
        let el = tree.create_element(doc, name).unwrap();
        tree.append_child(fragment, el).unwrap();
    }
    assert!(matches!(
        tree.append_child(doc, fragment),
        Err(DomError::HierarchyRequest(_))
    ));
    // Nothing moved
    assert_eq!(tree.child_nodes(fragment).len(), 2);
    assert!(tree.child_nodes(doc).is_empty());
}

#[test]
fn test_text_cannot_hold_children() {
    let mut tree = DomTree::new();
    let doc = tree.create_html_document("");
    let text = tree.create_text_node(doc, "a");
    let span = tree.create_element(doc, "span").unwrap();
    assert!(matches!(
        tree.append_child(text, span),
        Err(DomError::HierarchyRequest(_))
    ));
}

#[test]
fn test_attribute_cannot_be_inserted() {
    let mut tree = DomTree::new();
    let doc = tree.create_html_document("");
    let body = tree.body(doc).unwrap();
    let attr = tree.create_attribute(doc, "title").unwrap();
    assert!(tree.append_child(body, attr).is_err());
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_deep_nesting_connect_and_disconnect() {
    let mut tree = DomTree::new();
    let doc = tree.create_html_document("");
    let body = tree.body(doc).unwrap();
    let top = tree.create_element(doc, "div").unwrap();
    let mut current = top;
    for _ in 0..5000 {
        let next = tree.create_element(doc, "div").unwrap();
        tree.append_child(current, next).unwrap();
        current = next;
    }
    tree.append_child(body, top).unwrap();
    assert!(tree.is_connected(current));
    assert_eq!(tree.get_root_node(current, false), doc);

    tree.remove_child(body, top).unwrap();
    assert!(!tree.is_connected(current));
}

#[test]
fn test_wide_tree_positions() {
    let mut tree = DomTree::new();
    let doc = tree.create_html_document("");
    let body = tree.body(doc).unwrap();
    let children: Vec<NodeId> = (0..1000)
        .map(|_| {
            let li = tree.create_element(doc, "li").unwrap();
            tree.append_child(body, li).unwrap();
            li
        })
        .collect();
    assert_eq!(tree.child_element_count(body), 1000);
    assert_eq!(tree.previous_sibling(children[500]), Some(children[499]));
    assert_eq!(tree.next_element_sibling(children[999]), None);
}

// ============================================================================
// NODE KINDS
// ============================================================================

#[test]
fn test_node_names_and_types() {
    let mut tree = DomTree::new();
    let doc = tree.create_document("application/xml");
    let pi = tree.create_processing_instruction(doc, "xml-stylesheet", "href='a.css'").unwrap();
    let cdata = tree.create_cdata_section(doc, "raw <b>").unwrap();
    let comment = tree.create_comment(doc, "note");
    let fragment = tree.create_document_fragment(doc);

    assert_eq!(tree.node_type(pi), NodeType::ProcessingInstruction);
    assert_eq!(tree.node_name(pi), "xml-stylesheet");
    assert_eq!(tree.node_type(cdata) as u16, 4);
    assert_eq!(tree.node_name(cdata), "#cdata-section");
    assert_eq!(tree.node_name(comment), "#comment");
    assert_eq!(tree.node_name(fragment), "#document-fragment");
    assert_eq!(tree.node_name(doc), "#document");
    assert_eq!(tree.node_value(doc), None);
    assert_eq!(tree.text_content(doc), None);
}

#[test]
fn test_element_kinds_resolution() {
    let mut tree = DomTree::new();
    let doc = tree.create_html_document("");
    let blink = tree.create_element(doc, "blink").unwrap();
    let pending = tree.create_element(doc, "x-pending").unwrap();
    let circle = tree.create_element_ns(doc, Some(namespace::SVG), "circle").unwrap();
    assert_eq!(tree.element_kind(blink), Some(ElementKind::Unknown));
    assert_eq!(tree.element_kind(pending), Some(ElementKind::Html));
    assert_eq!(tree.element_kind(circle), Some(ElementKind::Svg));
    assert_eq!(tree.tag_name(circle).as_deref(), Some("circle"));
}

#[test]
fn test_customized_builtin_keeps_kind() {
    let mut tree = DomTree::new();
    let doc = tree.create_html_document("");
    let options = mimic_dom::CustomElementOptions {
        extends: Some("button".into()),
        ..Default::default()
    };
    tree.define_custom_element("fancy-button", options).unwrap();
    let button = tree
        .create_element_with_options(doc, "button", Some("fancy-button"))
        .unwrap();
    assert_eq!(tree.element_kind(button), Some(ElementKind::Button));
    assert!(tree.custom_element_definition(button).is_some());
}

#[test]
fn test_normalize_document_fragment() {
    let mut tree = DomTree::new();
    let doc = tree.create_html_document("");
    let fragment = tree.create_document_fragment(doc);
    for data in ["", "x", "y", ""] {
        let text = tree.create_text_node(doc, data);
        tree.append_child(fragment, text).unwrap();
    }
    tree.normalize(fragment);
    assert_eq!(tree.child_nodes(fragment).len(), 1);
    assert_eq!(tree.text_content(fragment).as_deref(), Some("xy"));
}

#[test]
fn test_adopt_attached_attribute() {
    let mut tree = DomTree::new();
    let first = tree.create_html_document("");
    let second = tree.create_html_document("");
    let div = tree.create_element(first, "div").unwrap();
    tree.set_attribute(div, "title", "t").unwrap();
    let attr = tree.get_attribute_node(div, "title").unwrap();

    tree.adopt_node(second, attr).unwrap();
    assert!(!tree.has_attribute(div, "title"));
    assert_eq!(tree.owner_document(attr), Some(second));
}

#[test]
fn test_adopt_document_fails() {
    let mut tree = DomTree::new();
    let first = tree.create_html_document("");
    let second = tree.create_html_document("");
    assert!(matches!(
        tree.adopt_node(first, second),
        Err(DomError::NotSupported(_))
    ));
}

//! HTML5 parser
//!
//! Uses html5ever's RcDom and converts the result into the [`DomTree`] arena.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use mimic_dom::{DomError, DomTree, NodeId};

/// HTML parsing failure
#[derive(Debug, thiserror::Error)]
pub enum HtmlParseError {
    /// The input pipe into html5ever failed
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    /// Converted tree violated a DOM insertion rule
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a new `text/html` document
    pub fn parse(&self, tree: &mut DomTree, html: &str) -> Result<NodeId, HtmlParseError> {
        self.parse_with_url(tree, html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(
        &self,
        tree: &mut DomTree,
        html: &str,
        url: &str,
    ) -> Result<NodeId, HtmlParseError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let document = tree.create_document_with_url("text/html", url);
        self.convert(&dom.document, tree, document)?;

        tracing::debug!("Parsed {} nodes", tree.len());
        Ok(document)
    }

    /// Copy the RcDom subtree under `root` into `tree` below `document`
    fn convert(
        &self,
        root: &Handle,
        tree: &mut DomTree,
        document: NodeId,
    ) -> Result<(), HtmlParseError> {
        let mut stack: Vec<(Handle, NodeId)> = root
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), document))
            .collect();

        while let Some((handle, parent)) = stack.pop() {
            let id = match &handle.data {
                RcNodeData::Document => continue,
                RcNodeData::Doctype {
                    name,
                    public_id,
                    system_id,
                } => tree.create_document_type(document, name, public_id, system_id),
                RcNodeData::Text { contents } => {
                    tree.create_text_node(document, &contents.borrow())
                }
                RcNodeData::Comment { contents } => tree.create_comment(document, contents),
                RcNodeData::ProcessingInstruction { target, contents } => {
                    tree.create_processing_instruction(document, target, contents)?
                }
                RcNodeData::Element {
                    name,
                    attrs,
                    template_contents,
                    ..
                } => {
                    // html5ever accepts names the DOM factories reject
                    let namespace = (!name.ns.is_empty()).then_some(&*name.ns);
                    let element = tree.create_parsed_element(
                        document,
                        namespace,
                        name.prefix.as_deref(),
                        &name.local,
                    );
                    for attr in attrs.borrow().iter() {
                        tree.set_parsed_attribute(
                            element,
                            (!attr.name.ns.is_empty()).then_some(&*attr.name.ns),
                            attr.name.prefix.as_deref(),
                            &attr.name.local,
                            &attr.value,
                        );
                    }

                    // Template children live in the content fragment
                    let contents = template_contents.borrow();
                    let child_source = contents.as_ref().unwrap_or(&handle);
                    let child_parent = tree.template_content(element).unwrap_or(element);
                    stack.extend(
                        child_source
                            .children
                            .borrow()
                            .iter()
                            .rev()
                            .map(|child| (child.clone(), child_parent)),
                    );
                    element
                }
            };
            tree.append_child(parent, id)?;
        }
        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_dom::namespace;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let mut tree = DomTree::new();
        let doc = HtmlParser::new().parse(&mut tree, html).unwrap();

        assert!(tree.is_html_document(doc));
        assert_eq!(tree.title(doc), "Test");
        let body = tree.body(doc).unwrap();
        let p = tree.first_element_child(body).unwrap();
        assert_eq!(tree.tag_name(p).as_deref(), Some("P"));
        assert_eq!(tree.text_content(p).as_deref(), Some("Hello"));
    }

    #[test]
    fn test_parse_fragmentary_input_builds_skeleton() {
        let mut tree = DomTree::new();
        let doc = HtmlParser::new().parse(&mut tree, "<p>one<p>two").unwrap();
        let body = tree.body(doc).unwrap();
        assert_eq!(tree.child_element_count(body), 2);
        assert!(tree.head(doc).is_some());
    }

    #[test]
    fn test_parse_doctype_and_attributes() {
        let mut tree = DomTree::new();
        let doc = HtmlParser::new()
            .parse(&mut tree, "<!DOCTYPE html><div id=\"main\" class=\"a b\"></div>")
            .unwrap();
        let doctype = tree.doctype(doc).unwrap();
        assert_eq!(tree.node_name(doctype), "html");
        let main = tree.get_element_by_id(doc, "main").unwrap();
        assert_eq!(tree.class_list(main), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_template_and_svg() {
        let mut tree = DomTree::new();
        let html = "<template><b>inert</b></template><svg viewBox=\"0 0 1 1\"><circle/></svg>";
        let doc = HtmlParser::new().parse(&mut tree, html).unwrap();
        let head = tree.head(doc).unwrap();
        let template = tree.first_element_child(head).unwrap();
        assert!(!tree.has_child_nodes(template));
        let content = tree.template_content(template).unwrap();
        assert_eq!(tree.text_content(content).as_deref(), Some("inert"));

        let body = tree.body(doc).unwrap();
        let svg = tree.first_element_child(body).unwrap();
        assert_eq!(tree.namespace_uri(svg), Some(namespace::SVG));
        assert_eq!(tree.get_attribute(svg, "viewBox").as_deref(), Some("0 0 1 1"));
    }

    #[test]
    fn test_framework_attribute_names_are_kept() {
        let mut tree = DomTree::new();
        let html = "<div id=\"x\" @click=\"go()\" :class=\"c\">hi</div>";
        let doc = HtmlParser::new().parse(&mut tree, html).unwrap();
        let div = tree.get_element_by_id(doc, "x").unwrap();
        assert_eq!(tree.attributes(div).len(), 3);
        assert_eq!(tree.get_attribute(div, "@click").as_deref(), Some("go()"));
        assert_eq!(tree.get_attribute(div, ":class").as_deref(), Some("c"));
        assert_eq!(tree.text_content(div).as_deref(), Some("hi"));
    }

    #[test]
    fn test_colon_tag_name_keeps_subtree() {
        let mut tree = DomTree::new();
        let doc = HtmlParser::new()
            .parse(&mut tree, "<div><a:b:c>kept text</a:b:c></div>")
            .unwrap();
        let body = tree.body(doc).unwrap();
        let div = tree.first_element_child(body).unwrap();
        let inner = tree.first_element_child(div).unwrap();
        assert_eq!(tree.local_name(inner), Some("a:b:c"));
        assert_eq!(tree.text_content(div).as_deref(), Some("kept text"));
    }
}

//! Document - factories and high-level document API
//!
//! Every factory takes the owning document explicitly; a node is bound to its
//! owner before it can ever be attached to a tree.

use crate::validation::{self, ProcessingInstructionError};
use crate::{
    AttrData, DoctypeData, DocumentData, DomError, DomResult, DomTree, ElementData, ElementKind,
    NodeData, NodeId, namespace,
};

impl DomTree {
    /// Create a new document with the given content type.
    ///
    /// Documents are always connected and are their own root node.
    pub fn create_document(&mut self, content_type: &str) -> NodeId {
        self.create_document_with_url(content_type, "about:blank")
    }

    pub fn create_document_with_url(&mut self, content_type: &str, url: &str) -> NodeId {
        let id = self.push(
            None,
            NodeData::Document(DocumentData {
                content_type: content_type.to_string(),
                url: url.to_string(),
            }),
        );
        let node = self.node_mut(id);
        node.connected = true;
        node.root_node = Some(id);
        id
    }

    /// Create an HTML document with the basic `html`/`head`/`title`/`body`
    /// structure
    pub fn create_html_document(&mut self, title: &str) -> NodeId {
        let doc = self.create_document("text/html");
        let doctype = self.create_document_type(doc, "html", "", "");
        let html = self.create_html_element(doc, "html");
        let head = self.create_html_element(doc, "head");
        let title_element = self.create_html_element(doc, "title");
        let body = self.create_html_element(doc, "body");

        self.insert_unchecked(doc, doctype, None);
        self.insert_unchecked(doc, html, None);
        self.insert_unchecked(html, head, None);
        self.insert_unchecked(head, title_element, None);
        if !title.is_empty() {
            let text = self.create_text_node(doc, title);
            self.insert_unchecked(title_element, text, None);
        }
        self.insert_unchecked(html, body, None);
        doc
    }

    fn create_html_element(&mut self, doc: NodeId, local_name: &str) -> NodeId {
        self.create_element_raw(doc, Some(namespace::HTML.into()), None, local_name.into(), None)
    }

    pub(crate) fn document_data(&self, doc: NodeId) -> Option<&DocumentData> {
        match &self.node(doc).data {
            NodeData::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn content_type(&self, doc: NodeId) -> Option<&str> {
        self.document_data(doc).map(|d| d.content_type.as_str())
    }

    /// Document URL
    pub fn url(&self, doc: NodeId) -> Option<&str> {
        self.document_data(doc).map(|d| d.url.as_str())
    }

    /// Get the document element (first element child of the document)
    pub fn document_element(&self, doc: NodeId) -> Option<NodeId> {
        self.first_element_child(doc)
    }

    pub fn doctype(&self, doc: NodeId) -> Option<NodeId> {
        self.child_nodes(doc)
            .iter()
            .copied()
            .find(|&c| matches!(self.node(c).data, NodeData::DocumentType(_)))
    }

    /// Get `<head>` element
    pub fn head(&self, doc: NodeId) -> Option<NodeId> {
        let html = self.document_element(doc).filter(|&e| self.is_html_element(e, "html"))?;
        self.children(html).into_iter().find(|&c| self.is_html_element(c, "head"))
    }

    /// Get `<body>` element
    pub fn body(&self, doc: NodeId) -> Option<NodeId> {
        let html = self.document_element(doc).filter(|&e| self.is_html_element(e, "html"))?;
        self.children(html).into_iter().find(|&c| self.is_html_element(c, "body"))
    }

    /// Get document title
    pub fn title(&self, doc: NodeId) -> String {
        let title = self
            .descendants(doc)
            .find(|&id| self.is_html_element(id, "title"));
        title
            .and_then(|t| self.text_content(t))
            .map(|t| t.split_ascii_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Node factories
    // ------------------------------------------------------------------

    pub(crate) fn create_element_raw(
        &mut self,
        doc: NodeId,
        namespace: Option<String>,
        prefix: Option<String>,
        local_name: String,
        is: Option<String>,
    ) -> NodeId {
        let kind = ElementKind::resolve(&self.registry, namespace.as_deref(), &local_name);
        let mut data = ElementData::new(namespace, prefix, local_name, kind);
        data.is_value = is;
        let id = self.push(Some(doc), NodeData::Element(data));

        if kind == ElementKind::Template {
            let content = self.push(Some(doc), NodeData::DocumentFragment);
            if let Some(element) = self.node_mut(id).as_element_mut() {
                element.template_content = Some(content);
            }
        }
        // Special kinds are their own nearest form/select/textarea
        let node = self.node_mut(id);
        match kind {
            ElementKind::Form => node.form = Some(id),
            ElementKind::Select => node.select = Some(id),
            ElementKind::Textarea => node.textarea = Some(id),
            _ => {}
        }
        id
    }

    /// `createElement`
    pub fn create_element(&mut self, doc: NodeId, local_name: &str) -> DomResult<NodeId> {
        self.create_element_with_options(doc, local_name, None)
    }

    /// `createElement(name, { is })`
    pub fn create_element_with_options(
        &mut self,
        doc: NodeId,
        local_name: &str,
        is: Option<&str>,
    ) -> DomResult<NodeId> {
        if !validation::is_valid_name(local_name) {
            return Err(DomError::InvalidCharacter(format!(
                "Failed to execute 'createElement' on 'Document': The tag name provided ('{}') is not a valid name.",
                local_name
            )));
        }
        let (html_document, content_type) = match self.document_data(doc) {
            Some(d) => (d.is_html(), d.content_type.clone()),
            None => {
                return Err(DomError::InvalidState(
                    "Failed to execute 'createElement': owner is not a document.".into(),
                ));
            }
        };
        let local_name = if html_document {
            local_name.to_ascii_lowercase()
        } else {
            local_name.to_string()
        };
        let namespace = (html_document || content_type == "application/xhtml+xml")
            .then(|| namespace::HTML.to_string());
        Ok(self.create_element_raw(doc, namespace, None, local_name, is.map(str::to_string)))
    }

    /// `createElementNS`
    pub fn create_element_ns(
        &mut self,
        doc: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> DomResult<NodeId> {
        let (namespace, prefix, local_name) =
            validation::validate_and_extract(namespace, qualified_name)?;
        Ok(self.create_element_raw(doc, namespace, prefix, local_name, None))
    }

    /// Create an element whose name came from the HTML tokenizer. HTML
    /// accepts tag names like `a:b:c` that `createElementNS` rejects.
    pub fn create_parsed_element(
        &mut self,
        doc: NodeId,
        namespace: Option<&str>,
        prefix: Option<&str>,
        local_name: &str,
    ) -> NodeId {
        self.create_element_raw(
            doc,
            namespace.map(str::to_string),
            prefix.map(str::to_string),
            local_name.to_string(),
            None,
        )
    }

    /// `createTextNode`
    pub fn create_text_node(&mut self, doc: NodeId, data: &str) -> NodeId {
        self.push(Some(doc), NodeData::Text(data.to_string()))
    }

    /// `createComment`
    pub fn create_comment(&mut self, doc: NodeId, data: &str) -> NodeId {
        self.push(Some(doc), NodeData::Comment(data.to_string()))
    }

    /// `createCDATASection`
    pub fn create_cdata_section(&mut self, doc: NodeId, data: &str) -> DomResult<NodeId> {
        if self.is_html_document(doc) {
            return Err(DomError::NotSupported(
                "Failed to execute 'createCDATASection' on 'Document': This operation is not supported for HTML documents.".into(),
            ));
        }
        if data.contains("]]>") {
            return Err(DomError::InvalidCharacter(
                "Failed to execute 'createCDATASection' on 'Document': String cannot contain ']]>' since that is the end delimiter of a CData section.".into(),
            ));
        }
        Ok(self.push(Some(doc), NodeData::CDataSection(data.to_string())))
    }

    /// `createProcessingInstruction`
    pub fn create_processing_instruction(
        &mut self,
        doc: NodeId,
        target: &str,
        data: &str,
    ) -> DomResult<NodeId> {
        match validation::validate_processing_instruction(target, data) {
            Ok(()) => {}
            Err(ProcessingInstructionError::InvalidTarget) => {
                return Err(DomError::InvalidCharacter(format!(
                    "Failed to execute 'createProcessingInstruction' on 'Document': The target provided ('{}') is not a valid name.",
                    target
                )));
            }
            Err(ProcessingInstructionError::ContainsClose) => {
                return Err(DomError::InvalidCharacter(format!(
                    "Failed to execute 'createProcessingInstruction' on 'Document': The data provided ('{}') contains '?>'.",
                    data
                )));
            }
        }
        Ok(self.push(
            Some(doc),
            NodeData::ProcessingInstruction {
                target: target.to_string(),
                data: data.to_string(),
            },
        ))
    }

    /// `createDocumentFragment`
    pub fn create_document_fragment(&mut self, doc: NodeId) -> NodeId {
        self.push(Some(doc), NodeData::DocumentFragment)
    }

    /// `createDocumentType` (via `document.implementation`)
    pub fn create_document_type(
        &mut self,
        doc: NodeId,
        name: &str,
        public_id: &str,
        system_id: &str,
    ) -> NodeId {
        self.push(
            Some(doc),
            NodeData::DocumentType(DoctypeData {
                name: name.to_string(),
                public_id: public_id.to_string(),
                system_id: system_id.to_string(),
            }),
        )
    }

    /// `createAttribute`
    pub fn create_attribute(&mut self, doc: NodeId, local_name: &str) -> DomResult<NodeId> {
        if !validation::is_valid_name(local_name) {
            return Err(DomError::InvalidCharacter(format!(
                "Failed to execute 'createAttribute' on 'Document': The localName provided ('{}') contains an invalid character.",
                local_name
            )));
        }
        let local_name = if self.is_html_document(doc) {
            local_name.to_ascii_lowercase()
        } else {
            local_name.to_string()
        };
        Ok(self.push_attr(doc, None, None, local_name, String::new()))
    }

    /// `createAttributeNS`
    pub fn create_attribute_ns(
        &mut self,
        doc: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> DomResult<NodeId> {
        let (namespace, prefix, local_name) =
            validation::validate_and_extract(namespace, qualified_name)?;
        Ok(self.push_attr(doc, namespace, prefix, local_name, String::new()))
    }

    pub(crate) fn push_attr(
        &mut self,
        doc: NodeId,
        namespace: Option<String>,
        prefix: Option<String>,
        local_name: String,
        value: String,
    ) -> NodeId {
        self.push(
            Some(doc),
            NodeData::Attr(AttrData {
                namespace,
                prefix,
                local_name,
                value,
                owner_element: None,
            }),
        )
    }

    // ------------------------------------------------------------------
    // Cross-document moves
    // ------------------------------------------------------------------

    /// `adoptNode`: detach `node` and re-bind its subtree to `doc`
    pub fn adopt_node(&mut self, doc: NodeId, node: NodeId) -> DomResult<NodeId> {
        match &self.node(node).data {
            NodeData::Document(_) => {
                return Err(DomError::NotSupported(
                    "Failed to execute 'adoptNode' on 'Document': The node provided is a document, which may not be adopted.".into(),
                ));
            }
            NodeData::ShadowRoot(_) => {
                return Err(DomError::HierarchyRequest(
                    "Failed to execute 'adoptNode' on 'Document': The node provided is a shadow root, which may not be adopted.".into(),
                ));
            }
            _ => {}
        }
        if let Some(parent) = self.parent_node(node) {
            self.remove_unchecked(parent, node);
        }
        if let Some(owner) = self.node(node).as_attr().and_then(|a| a.owner_element) {
            self.remove_attribute_node(owner, node)?;
        }
        let previous = self.node_document(node);
        if previous != doc {
            self.set_owner_document(node, doc);
        }
        Ok(node)
    }

    /// `importNode`: clone `node` into `doc`
    pub fn import_node(&mut self, doc: NodeId, node: NodeId, deep: bool) -> DomResult<NodeId> {
        if self.node(node).is_document() || self.node(node).is_shadow_root() {
            return Err(DomError::NotSupported(
                "Failed to execute 'importNode' on 'Document': The node provided is a document or shadow root, which may not be imported.".into(),
            ));
        }
        let clone = self.clone_node(node, deep)?;
        self.set_owner_document(clone, doc);
        Ok(clone)
    }

    fn set_owner_document(&mut self, node: NodeId, doc: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            self.node_mut(current).owner_document = doc;
            let current_node = self.node(current);
            stack.extend(current_node.children.iter().copied());
            if let Some(element) = current_node.as_element() {
                stack.extend(element.attributes.iter().copied());
                stack.extend(element.template_content);
                stack.extend(element.shadow_root);
            }
            self.enqueue_adopted_reaction(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_document_skeleton() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("Hello   world");

        let html = tree.document_element(doc).unwrap();
        assert!(tree.is_html_element(html, "html"));
        assert!(tree.head(doc).is_some());
        assert!(tree.body(doc).is_some());
        assert!(tree.doctype(doc).is_some());
        assert_eq!(tree.title(doc), "Hello world");
        assert!(tree.is_connected(html));
    }

    #[test]
    fn test_create_element_case_rules() {
        let mut tree = DomTree::new();
        let html = tree.create_document("text/html");
        let xml = tree.create_document("application/xml");

        let div = tree.create_element(html, "DIV").unwrap();
        assert_eq!(tree.local_name(div), Some("div"));
        assert_eq!(tree.tag_name(div).as_deref(), Some("DIV"));
        assert_eq!(tree.namespace_uri(div), Some(namespace::HTML));

        let note = tree.create_element(xml, "Note").unwrap();
        assert_eq!(tree.local_name(note), Some("Note"));
        assert_eq!(tree.namespace_uri(note), None);

        assert!(matches!(
            tree.create_element(html, "1bad"),
            Err(DomError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_processing_instruction_validation() {
        let mut tree = DomTree::new();
        let doc = tree.create_document("application/xml");
        assert!(tree.create_processing_instruction(doc, "xml-stylesheet", "href='a'").is_ok());
        let err = tree.create_processing_instruction(doc, "x", "a?>b").unwrap_err();
        assert_eq!(err.name(), "InvalidCharacterError");
        assert!(tree.create_processing_instruction(doc, "1x", "").is_err());
    }

    #[test]
    fn test_cdata_rejected_in_html() {
        let mut tree = DomTree::new();
        let html = tree.create_document("text/html");
        let xml = tree.create_document("application/xml");
        assert!(matches!(
            tree.create_cdata_section(html, "x"),
            Err(DomError::NotSupported(_))
        ));
        assert!(tree.create_cdata_section(xml, "x").is_ok());
        assert!(tree.create_cdata_section(xml, "a]]>b").is_err());
    }

    #[test]
    fn test_template_gets_content_fragment() {
        let mut tree = DomTree::new();
        let doc = tree.create_document("text/html");
        let template = tree.create_element(doc, "template").unwrap();
        let content = tree.template_content(template).unwrap();
        assert_eq!(tree.owner_document(content), Some(doc));
        assert!(!tree.is_connected(content));
    }

    #[test]
    fn test_adopt_node_rebinds_subtree() {
        let mut tree = DomTree::new();
        let first = tree.create_html_document("");
        let second = tree.create_html_document("");
        let div = tree.create_element(first, "div").unwrap();
        let span = tree.create_element(first, "span").unwrap();
        tree.append_child(div, span).unwrap();
        tree.set_attribute(span, "id", "s").unwrap();
        let body = tree.body(first).unwrap();
        tree.append_child(body, div).unwrap();

        tree.adopt_node(second, div).unwrap();
        assert_eq!(tree.parent_node(div), None);
        assert!(!tree.is_connected(span));
        assert_eq!(tree.owner_document(span), Some(second));
        let attr = tree.get_attribute_node(span, "id").unwrap();
        assert_eq!(tree.owner_document(attr), Some(second));
    }

    #[test]
    fn test_parsed_element_keeps_html_name() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("");
        let el = tree.create_parsed_element(doc, Some(namespace::HTML), None, "a:b:c");
        assert_eq!(tree.local_name(el), Some("a:b:c"));
        assert_eq!(tree.tag_name(el).as_deref(), Some("A:B:C"));
    }
}

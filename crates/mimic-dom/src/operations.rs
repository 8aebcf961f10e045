//! Node operations: cloning, structural equality, normalization and
//! content setters.

use crate::{DomError, DomResult, DomTree, NodeData, NodeId, NodeType};

impl DomTree {
    /// `cloneNode(deep)`.
    ///
    /// The clone has the same owner document and starts disconnected (clones
    /// of documents are documents, and therefore connected). Deep clones of
    /// templates also clone the content fragment.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        if self.node(id).is_shadow_root() {
            return Err(DomError::NotSupported(
                "Failed to execute 'cloneNode' on 'Node': ShadowRoot nodes are not clonable.".into(),
            ));
        }
        let doc = self.node_document(id);
        Ok(self.clone_into(id, doc, deep))
    }

    fn clone_into(&mut self, id: NodeId, doc: NodeId, deep: bool) -> NodeId {
        let root = self.clone_single(id, doc);
        if !deep {
            return root;
        }
        // (source, parent of the copy, owner document of the copy)
        let mut pending = Vec::new();
        self.queue_clone_children(id, root, doc, &mut pending);
        while let Some((source, parent, doc)) = pending.pop() {
            let clone = self.clone_single(source, doc);
            self.insert_unchecked(parent, clone, None);
            self.queue_clone_children(source, clone, doc, &mut pending);
        }
        root
    }

    fn clone_single(&mut self, id: NodeId, doc: NodeId) -> NodeId {
        match self.node(id).data.clone() {
            NodeData::Document(d) => self.create_document_with_url(&d.content_type, &d.url),
            NodeData::Element(e) => {
                let clone =
                    self.create_element_raw(doc, e.namespace, e.prefix, e.local_name, e.is_value);
                for attr in e.attributes {
                    let Some(a) = self.node(attr).as_attr().cloned() else {
                        continue;
                    };
                    let copy = self.push_attr(doc, a.namespace, a.prefix, a.local_name, a.value);
                    if let Some(attr) = self.node_mut(copy).as_attr_mut() {
                        attr.owner_element = Some(clone);
                    }
                    if let Some(element) = self.node_mut(clone).as_element_mut() {
                        element.attributes.push(copy);
                    }
                }
                clone
            }
            NodeData::Attr(mut a) => {
                a.owner_element = None;
                self.push(Some(doc), NodeData::Attr(a))
            }
            data => self.push(Some(doc), data),
        }
    }

    fn queue_clone_children(
        &self,
        source: NodeId,
        clone: NodeId,
        doc: NodeId,
        pending: &mut Vec<(NodeId, NodeId, NodeId)>,
    ) {
        // Children of a cloned document belong to the clone
        let child_doc = if self.node(clone).is_document() { clone } else { doc };
        let children = &self.node(source).children;
        pending.extend(children.iter().rev().map(|&child| (child, clone, child_doc)));
        if let (Some(content), Some(copy)) =
            (self.template_content(source), self.template_content(clone))
        {
            let children = &self.node(content).children;
            pending.extend(children.iter().rev().map(|&child| (child, copy, doc)));
        }
    }

    /// `isEqualNode`: same kind, same kind-specific fields, same attributes
    /// (in any order) and pairwise-equal children.
    pub fn is_equal_node(&self, a: NodeId, b: NodeId) -> bool {
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            if a == b {
                continue;
            }
            let (left, right) = (self.node(a), self.node(b));
            if !self.same_fields(a, b) || left.children.len() != right.children.len() {
                return false;
            }
            pending.extend(left.children.iter().copied().zip(right.children.iter().copied()));
        }
        true
    }

    fn same_fields(&self, a: NodeId, b: NodeId) -> bool {
        let (left, right) = (self.node(a), self.node(b));
        if left.node_type() != right.node_type() {
            return false;
        }
        match (&left.data, &right.data) {
            (NodeData::DocumentType(x), NodeData::DocumentType(y)) => x == y,
            (NodeData::Element(x), NodeData::Element(y)) => {
                x.namespace == y.namespace
                    && x.prefix == y.prefix
                    && x.local_name == y.local_name
                    && x.attributes.len() == y.attributes.len()
                    && x.attributes.iter().all(|&attr| {
                        self.node(attr).as_attr().is_some_and(|xa| {
                            y.attributes.iter().any(|&other| {
                                self.node(other).as_attr().is_some_and(|ya| {
                                    xa.namespace == ya.namespace
                                        && xa.local_name == ya.local_name
                                        && xa.value == ya.value
                                })
                            })
                        })
                    })
            }
            (NodeData::Attr(x), NodeData::Attr(y)) => {
                x.namespace == y.namespace && x.local_name == y.local_name && x.value == y.value
            }
            (
                NodeData::ProcessingInstruction { target: t1, data: d1 },
                NodeData::ProcessingInstruction { target: t2, data: d2 },
            ) => t1 == t2 && d1 == d2,
            (NodeData::Text(x), NodeData::Text(y))
            | (NodeData::CDataSection(x), NodeData::CDataSection(y))
            | (NodeData::Comment(x), NodeData::Comment(y)) => x == y,
            _ => true,
        }
    }

    /// `normalize()`: merge adjacent text siblings and drop empty text nodes
    /// throughout the element subtree
    pub fn normalize(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(parent) = pending.pop() {
            let mut run: Option<NodeId> = None;
            for child in self.node(parent).children.clone() {
                let Some(text) = self.node(child).as_text().map(str::to_string) else {
                    run = None;
                    if self.is_element(child) {
                        pending.push(child);
                    }
                    continue;
                };
                if text.is_empty() {
                    self.remove_unchecked(parent, child);
                    continue;
                }
                match run {
                    Some(first) => {
                        if let Some(data) = self.node_mut(first).character_data_mut() {
                            data.push_str(&text);
                        }
                        self.remove_unchecked(parent, child);
                    }
                    None => run = Some(child),
                }
            }
        }
    }

    /// `textContent` setter: replaces all children of container nodes with a
    /// single text node (none for the empty string)
    pub fn set_text_content(&mut self, id: NodeId, value: &str) {
        match self.node_type(id) {
            NodeType::Document | NodeType::DocumentType => {}
            NodeType::Attribute => self.change_attribute(id, value),
            NodeType::Element | NodeType::DocumentFragment => {
                for child in self.node(id).children.clone() {
                    self.remove_unchecked(id, child);
                }
                if !value.is_empty() {
                    let doc = self.node_document(id);
                    let text = self.create_text_node(doc, value);
                    self.insert_unchecked(id, text, None);
                }
            }
            _ => self.set_data(id, value),
        }
    }

    /// `nodeValue` setter; ignored for nodes without a value
    pub fn set_node_value(&mut self, id: NodeId, value: &str) {
        if self.node(id).as_attr().is_some() {
            self.change_attribute(id, value);
        } else {
            self.set_data(id, value);
        }
    }

    /// `CharacterData.data` setter
    pub fn set_data(&mut self, id: NodeId, value: &str) {
        if let Some(data) = self.node_mut(id).character_data_mut() {
            value.clone_into(data);
        }
    }

    /// `CharacterData.appendData`
    pub fn append_data(&mut self, id: NodeId, value: &str) {
        if let Some(data) = self.node_mut(id).character_data_mut() {
            data.push_str(value);
        }
    }
}

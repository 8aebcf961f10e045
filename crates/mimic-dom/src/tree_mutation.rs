//! Tree mutation primitives
//!
//! appendChild, insertBefore, removeChild and replaceChild, plus the
//! connection cascade that keeps connected state, root nodes and the
//! form/select/textarea back-references consistent after every move.

use crate::{DomError, DomResult, DomTree, ElementKind, NodeData, NodeId};

/// State a node derives from its parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Inherited {
    connected: bool,
    root_node: Option<NodeId>,
    form: Option<NodeId>,
    select: Option<NodeId>,
    textarea: Option<NodeId>,
}

impl DomTree {
    /// `appendChild`: move `node` to the end of `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> DomResult<NodeId> {
        self.ensure_pre_insertion_validity("appendChild", parent, node, None, None)?;
        self.insert_unchecked(parent, node, None);
        Ok(node)
    }

    /// `insertBefore`: `child == None` inserts at the end
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.ensure_pre_insertion_validity("insertBefore", parent, node, child, None)?;
        let reference = if child == Some(node) {
            self.next_sibling(node)
        } else {
            child
        };
        self.insert_unchecked(parent, node, reference);
        Ok(node)
    }

    /// Arity-checked `insertBefore` for script bindings.
    ///
    /// Both arguments must be present; an explicit `None` reference child
    /// (script `null`/`undefined`) appends.
    pub fn insert_before_with_args(
        &mut self,
        parent: NodeId,
        args: &[Option<NodeId>],
    ) -> DomResult<NodeId> {
        if args.len() < 2 {
            return Err(DomError::Type(format!(
                "Failed to execute 'insertBefore' on 'Node': 2 arguments required, but only {} present.",
                args.len()
            )));
        }
        let Some(node) = args[0] else {
            return Err(DomError::Type(
                "Failed to execute 'insertBefore' on 'Node': parameter 1 is not of type 'Node'."
                    .into(),
            ));
        };
        self.insert_before(parent, node, args[1])
    }

    /// `removeChild`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.node(child).parent != Some(parent) {
            return Err(DomError::NotFound(
                "Failed to execute 'removeChild' on 'Node': The node to be removed is not a child of this node.".into(),
            ));
        }
        self.remove_unchecked(parent, child);
        Ok(child)
    }

    /// `replaceChild`: insert `node` where `child` is, then remove `child`
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: NodeId,
    ) -> DomResult<NodeId> {
        if self.node(child).parent != Some(parent) {
            return Err(DomError::NotFound(
                "Failed to execute 'replaceChild' on 'Node': The node to be replaced is not a child of this node.".into(),
            ));
        }
        self.ensure_pre_insertion_validity("replaceChild", parent, node, Some(child), Some(child))?;
        if node == child {
            return Ok(child);
        }
        self.insert_unchecked(parent, node, Some(child));
        self.remove_unchecked(parent, child);
        Ok(child)
    }

    /// `ChildNode.remove()`
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).parent {
            self.remove_unchecked(parent, node);
        }
    }

    /// `ParentNode.append()` for a list of nodes
    pub fn append(&mut self, parent: NodeId, nodes: &[NodeId]) -> DomResult<()> {
        for &node in nodes {
            self.append_child(parent, node)?;
        }
        Ok(())
    }

    /// `ParentNode.prepend()` for a list of nodes
    pub fn prepend(&mut self, parent: NodeId, nodes: &[NodeId]) -> DomResult<()> {
        let first = self.first_child(parent);
        for &node in nodes {
            self.insert_before(parent, node, first)?;
        }
        Ok(())
    }

    /// Remove all children and replace them with `nodes`
    pub fn replace_children(&mut self, parent: NodeId, nodes: &[NodeId]) -> DomResult<()> {
        for &node in nodes {
            self.ensure_pre_insertion_validity("replaceChildren", parent, node, None, None)?;
        }
        for child in self.node(parent).children.clone() {
            self.remove_unchecked(parent, child);
        }
        for &node in nodes {
            self.insert_unchecked(parent, node, None);
        }
        Ok(())
    }

    fn hierarchy_error(&self, method: &str, message: impl std::fmt::Display) -> DomError {
        DomError::HierarchyRequest(format!(
            "Failed to execute '{}' on 'Node': {}",
            method, message
        ))
    }

    fn ensure_pre_insertion_validity(
        &self,
        method: &str,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
        replacing: Option<NodeId>,
    ) -> DomResult<()> {
        if !self.node(parent).is_container() {
            return Err(self.hierarchy_error(method, "This node type does not support this method."));
        }
        if self.is_host_including_inclusive_ancestor(node, parent) {
            return Err(self.hierarchy_error(method, "The new child element contains the parent."));
        }
        if let Some(child) = child {
            if self.node(child).parent != Some(parent) {
                return Err(DomError::NotFound(format!(
                    "Failed to execute '{}' on 'Node': The node before which the new node is to be inserted is not a child of this node.",
                    method
                )));
            }
        }

        let parent_is_document = self.node(parent).is_document();
        let misplaced = match &self.node(node).data {
            NodeData::Document(_) | NodeData::Attr(_) | NodeData::ShadowRoot(_) => true,
            NodeData::Text(_) | NodeData::CDataSection(_) => parent_is_document,
            NodeData::DocumentType(_) => !parent_is_document,
            _ => false,
        };
        if misplaced {
            return Err(self.hierarchy_error(
                method,
                format!(
                    "Nodes of type '{}' may not be inserted inside nodes of type '{}'.",
                    self.node_name(node),
                    self.node_name(parent)
                ),
            ));
        }
        if !parent_is_document {
            return Ok(());
        }

        let siblings: Vec<NodeId> = self
            .node(parent)
            .children
            .iter()
            .copied()
            .filter(|&c| Some(c) != replacing)
            .collect();
        let is_doctype = |id: NodeId| matches!(self.node(id).data, NodeData::DocumentType(_));
        let has_element = siblings.iter().any(|&c| self.is_element(c));
        let doctype_after_child = child.is_some_and(|c| {
            let start = self.index_in_parent(c).unwrap_or(0);
            self.node(parent).children[start..]
                .iter()
                .any(|&s| Some(s) != replacing && is_doctype(s))
        });
        let element_before_child = match child {
            Some(c) => {
                let end = self.index_in_parent(c).unwrap_or(0);
                self.node(parent).children[..end]
                    .iter()
                    .any(|&s| Some(s) != replacing && self.is_element(s))
            }
            None => has_element,
        };

        match &self.node(node).data {
            NodeData::DocumentFragment => {
                let fragment_children = &self.node(node).children;
                let elements = fragment_children.iter().filter(|&&c| self.is_element(c)).count();
                let has_text = fragment_children.iter().any(|&c| self.node(c).is_text());
                if elements > 1 || has_text {
                    return Err(self.hierarchy_error(method, "Only one element on document allowed."));
                }
                if elements == 1
                    && (has_element || child.is_some_and(is_doctype) || doctype_after_child)
                {
                    return Err(self.hierarchy_error(method, "Only one element on document allowed."));
                }
            }
            NodeData::Element(_) => {
                if has_element || child.is_some_and(is_doctype) || doctype_after_child {
                    return Err(self.hierarchy_error(method, "Only one element on document allowed."));
                }
            }
            NodeData::DocumentType(_) => {
                if siblings.iter().any(|&c| is_doctype(c)) {
                    return Err(self.hierarchy_error(method, "Only one doctype on document allowed."));
                }
                if element_before_child {
                    return Err(self.hierarchy_error(
                        method,
                        "Doctype can only be inserted before an element.",
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Insert without validation. Fragments are emptied into `parent`.
    pub(crate) fn insert_unchecked(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        if matches!(self.node(node).data, NodeData::DocumentFragment) {
            let children = std::mem::take(&mut self.node_mut(node).children);
            for &child in &children {
                self.node_mut(child).parent = None;
            }
            for child in children {
                self.link(parent, child, reference);
            }
            return;
        }
        if let Some(old_parent) = self.node(node).parent {
            self.remove_unchecked(old_parent, node);
        }
        self.link(parent, node, reference);
    }

    fn link(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        let children = &mut self.node_mut(parent).children;
        let index = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        children.insert(index, node);
        self.node_mut(node).parent = Some(parent);
        self.connect_to_node(node, Some(parent));
    }

    /// Unlink without validation and cascade disconnection
    pub(crate) fn remove_unchecked(&mut self, parent: NodeId, node: NodeId) {
        let children = &mut self.node_mut(parent).children;
        if let Some(index) = children.iter().position(|&c| c == node) {
            children.remove(index);
        }
        self.node_mut(node).parent = None;
        self.connect_to_node(node, None);
    }

    fn inherited_state(&self, id: NodeId, parent: Option<NodeId>) -> Inherited {
        let Some(parent) = parent else {
            return Inherited::default();
        };
        let p = self.node(parent);
        if self.node(id).is_shadow_root() {
            // Shadow roots are their own root and start a fresh form scope
            return Inherited {
                connected: p.connected,
                root_node: Some(id),
                ..Inherited::default()
            };
        }
        Inherited {
            connected: p.connected,
            root_node: if p.connected { p.root_node } else { None },
            form: p.form,
            select: p.select,
            textarea: p.textarea,
        }
    }

    /// Recompute connected state, root node and special-ancestor references
    /// of `id` from `parent` (its shadow host for shadow roots), cascading
    /// into the subtree wherever something changed.
    pub(crate) fn connect_to_node(&mut self, id: NodeId, parent: Option<NodeId>) {
        let mut work = vec![(id, parent)];
        while let Some((current, parent)) = work.pop() {
            let inherited = self.inherited_state(current, parent);
            let kind = self.element_kind(current);
            let own = |special: ElementKind, inherited: Option<NodeId>| {
                if kind == Some(special) {
                    Some(current)
                } else {
                    inherited
                }
            };
            let form = own(ElementKind::Form, inherited.form);
            let select = own(ElementKind::Select, inherited.select);
            let textarea = own(ElementKind::Textarea, inherited.textarea);

            let node = self.node_mut(current);
            let refs_changed = node.form != form
                || node.select != select
                || node.textarea != textarea
                || node.root_node != inherited.root_node;
            node.form = form;
            node.select = select;
            node.textarea = textarea;
            node.root_node = inherited.root_node;

            let connection_changed = node.connected != inherited.connected;
            if connection_changed {
                node.connected = inherited.connected;
                tracing::trace!(node = %current, connected = inherited.connected, "connection changed");
                self.enqueue_connection_reaction(current, inherited.connected);
            } else if !refs_changed {
                continue;
            }

            let node = self.node(current);
            if connection_changed {
                if let Some(shadow) = node.as_element().and_then(|e| e.shadow_root) {
                    work.push((shadow, Some(current)));
                }
            }
            work.extend(node.children.iter().rev().map(|&c| (c, Some(current))));
        }
    }
}

//! Form owner tracking
//!
//! The nearest form/select/textarea ancestors are cached on every node by the
//! connection cascade; these accessors only read the cache.

use crate::{DomTree, ElementKind, NodeId};

impl DomTree {
    /// Nearest inclusive ancestor `<form>`
    pub fn ancestor_form(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).form
    }

    /// Nearest inclusive ancestor `<select>` (the owner of an `<option>`)
    pub fn ancestor_select(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).select
    }

    /// Nearest inclusive ancestor `<textarea>`
    pub fn ancestor_textarea(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).textarea
    }

    /// Form owner of a form-associated element.
    ///
    /// An explicit `form` attribute wins and must name a form in the same
    /// tree; otherwise the nearest ancestor form is used.
    pub fn form_owner(&self, element: NodeId) -> Option<NodeId> {
        let kind = self.element_kind(element)?;
        if !kind.is_form_associated() {
            return None;
        }
        if let Some(form_id) = self.get_attribute(element, "form") {
            let root = self.tree_root(element);
            return self
                .get_element_by_id(root, &form_id)
                .filter(|&form| self.element_kind(form) == Some(ElementKind::Form));
        }
        self.node(element).form
    }

    /// `form.elements`: form-associated elements owned by `form`, in tree order
    pub fn form_controls(&self, form: NodeId) -> Vec<NodeId> {
        if self.element_kind(form) != Some(ElementKind::Form) {
            return Vec::new();
        }
        let root = self.tree_root(form);
        self.descendants(root)
            .filter(|&id| self.form_owner(id) == Some(form))
            .collect()
    }
}

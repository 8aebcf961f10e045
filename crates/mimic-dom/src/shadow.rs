//! Shadow DOM, slots and template contents

use crate::{DomError, DomResult, DomTree, ElementKind, NodeData, NodeId, ShadowRootData, namespace};

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

impl ShadowRootMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parse a `shadowrootmode` attribute value
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// `attachShadow` options
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowRootInit {
    pub mode: ShadowRootMode,
    pub delegates_focus: bool,
}

/// Local names that may host a shadow root besides custom elements
const VALID_SHADOW_HOSTS: &[&str] = &[
    "article", "aside", "blockquote", "body", "div", "footer", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "main", "nav", "p", "section", "span",
];

impl DomTree {
    /// `attachShadow`
    pub fn attach_shadow(&mut self, host: NodeId, init: ShadowRootInit) -> DomResult<NodeId> {
        let Some(element) = self.node(host).as_element() else {
            return Err(DomError::NotSupported(
                "Failed to execute 'attachShadow' on 'Element': This element does not support attachShadow".into(),
            ));
        };
        let allowed = element.namespace.as_deref() == Some(namespace::HTML)
            && (VALID_SHADOW_HOSTS.contains(&element.local_name.as_str())
                || matches!(element.kind, ElementKind::Custom { .. })
                || crate::CustomElementRegistry::is_valid_name(&element.local_name));
        if !allowed {
            return Err(DomError::NotSupported(format!(
                "Failed to execute 'attachShadow' on 'Element': This element does not support attachShadow ('{}').",
                element.local_name
            )));
        }
        if element.shadow_root.is_some() {
            return Err(DomError::NotSupported(
                "Failed to execute 'attachShadow' on 'Element': Shadow root cannot be created on a host which already hosts a shadow tree.".into(),
            ));
        }

        let shadow = self.push(
            Some(host),
            NodeData::ShadowRoot(ShadowRootData {
                host,
                mode: init.mode,
                delegates_focus: init.delegates_focus,
            }),
        );
        self.node_mut(shadow).root_node = Some(shadow);
        if let Some(element) = self.node_mut(host).as_element_mut() {
            element.shadow_root = Some(shadow);
        }
        self.connect_to_node(shadow, Some(host));
        tracing::debug!(host = %host, mode = init.mode.as_str(), "attached shadow root");
        Ok(shadow)
    }

    /// `shadowRoot`: open shadow roots only
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.attached_shadow_root(host).filter(|&shadow| {
            self.shadow_root_mode(shadow) == Some(ShadowRootMode::Open)
        })
    }

    /// Shadow root of `host` regardless of mode
    pub fn attached_shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.node(host).as_element().and_then(|e| e.shadow_root)
    }

    pub fn shadow_root_mode(&self, shadow: NodeId) -> Option<ShadowRootMode> {
        match &self.node(shadow).data {
            NodeData::ShadowRoot(s) => Some(s.mode),
            _ => None,
        }
    }

    /// Content fragment of a template element
    pub fn template_content(&self, template: NodeId) -> Option<NodeId> {
        self.node(template).as_element().and_then(|e| e.template_content)
    }

    /// Slot name used for matching (`name` attribute, empty for the default slot)
    fn slot_name(&self, slot: NodeId) -> String {
        self.get_attribute(slot, "name").unwrap_or_default()
    }

    /// Slot name a light-DOM child asks for
    fn requested_slot(&self, slottable: NodeId) -> Option<String> {
        match &self.node(slottable).data {
            NodeData::Element(_) => Some(self.get_attribute(slottable, "slot").unwrap_or_default()),
            NodeData::Text(_) => Some(String::new()),
            _ => None,
        }
    }

    /// `assignedSlot`: first slot in the host's shadow tree whose name matches
    pub fn assigned_slot(&self, slottable: NodeId) -> Option<NodeId> {
        let host = self.parent_element(slottable)?;
        let shadow = self.attached_shadow_root(host)?;
        let wanted = self.requested_slot(slottable)?;
        self.descendants(shadow).find(|&id| {
            self.element_kind(id) == Some(ElementKind::Slot) && self.slot_name(id) == wanted
        })
    }

    /// `assignedNodes()` of a slot
    pub fn slot_assigned_nodes(&self, slot: NodeId) -> Vec<NodeId> {
        if self.element_kind(slot) != Some(ElementKind::Slot) {
            return Vec::new();
        }
        let Some(host) = self.host(self.tree_root(slot)) else {
            return Vec::new();
        };
        self.child_nodes(host)
            .iter()
            .copied()
            .filter(|&child| self.assigned_slot(child) == Some(slot))
            .collect()
    }
}

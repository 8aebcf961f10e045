//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed: a node removed from every tree simply becomes
//! unreachable from its document.

use crate::custom_elements::{CustomElementRegistry, LifecycleReaction};
use crate::{ElementKind, Node, NodeData, NodeId, NodeType};

/// Arena holding the nodes of every document created through it
#[derive(Debug, Default)]
pub struct DomTree {
    nodes: Vec<Node>,
    pub(crate) registry: CustomElementRegistry,
    pub(crate) reactions: Vec<LifecycleReaction>,
}

impl DomTree {
    /// Create a new empty DOM tree
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            registry: CustomElementRegistry::new(),
            reactions: Vec::new(),
        }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // Ids are only minted by this arena, so indexing cannot go out of bounds
    // for ids that came from it.
    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Allocate a node bound to the document of `owner`; `None` makes the node
    /// its own owner (documents).
    pub(crate) fn push(&mut self, owner: Option<NodeId>, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let owner = owner.map_or(id, |o| self.node(o).owner_document);
        self.nodes.push(Node::new(owner, data));
        id
    }

    // ------------------------------------------------------------------
    // Node accessors
    // ------------------------------------------------------------------

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).node_type()
    }

    /// `nodeName` as exposed to script
    pub fn node_name(&self, id: NodeId) -> String {
        match &self.node(id).data {
            NodeData::Document(_) => "#document".into(),
            NodeData::DocumentType(d) => d.name.clone(),
            NodeData::DocumentFragment | NodeData::ShadowRoot(_) => "#document-fragment".into(),
            NodeData::Element(_) => self.tag_name(id).unwrap_or_default(),
            NodeData::Attr(a) => a.qualified_name(),
            NodeData::Text(_) => "#text".into(),
            NodeData::CDataSection(_) => "#cdata-section".into(),
            NodeData::Comment(_) => "#comment".into(),
            NodeData::ProcessingInstruction { target, .. } => target.clone(),
        }
    }

    /// Owning document; `None` for documents themselves
    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        if node.is_document() {
            None
        } else {
            Some(node.owner_document)
        }
    }

    /// Owning document, or the node itself for documents
    pub fn node_document(&self, id: NodeId) -> NodeId {
        self.node(id).owner_document
    }

    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent.filter(|&p| self.node(p).is_element())
    }

    pub fn child_nodes(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        !self.node(id).children.is_empty()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    pub(crate) fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.node(id).parent?;
        self.node(parent).children.iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).map(|i| self.node(parent).children[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let index = self.index_in_parent(id)?;
        self.node(parent).children.get(index + 1).copied()
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node(id).connected
    }

    /// `getRootNode()`: the node itself while disconnected, the cached root
    /// node otherwise, or the owning document when `composed` is requested.
    pub fn get_root_node(&self, id: NodeId, composed: bool) -> NodeId {
        let node = self.node(id);
        if !node.connected {
            return id;
        }
        if !composed {
            if let Some(root) = node.root_node {
                return root;
            }
        }
        node.owner_document
    }

    /// Inclusive descendant check
    pub fn contains(&self, id: NodeId, other: NodeId) -> bool {
        self.inclusive_ancestors(other).any(|a| a == id)
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).parent,
        }
    }

    pub fn inclusive_ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Strict descendants in tree order (pre-order)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = self.node(id).children.iter().rev().copied().collect();
        Descendants { tree: self, stack }
    }

    /// Element children (the elements-only view)
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|&c| self.node(c).is_element())
            .collect()
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.iter().copied().find(|&c| self.node(c).is_element())
    }

    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.iter().rev().copied().find(|&c| self.node(c).is_element())
    }

    pub fn child_element_count(&self, id: NodeId) -> usize {
        self.node(id).children.iter().filter(|&&c| self.node(c).is_element()).count()
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.previous_sibling(id);
        while let Some(sibling) = current {
            if self.node(sibling).is_element() {
                return Some(sibling);
            }
            current = self.previous_sibling(sibling);
        }
        None
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sibling) = current {
            if self.node(sibling).is_element() {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    // ------------------------------------------------------------------
    // Element accessors
    // ------------------------------------------------------------------

    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_element()
    }

    pub fn element_kind(&self, id: NodeId) -> Option<ElementKind> {
        self.node(id).as_element().map(|e| e.kind)
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element(e) => Some(&e.local_name),
            NodeData::Attr(a) => Some(&a.local_name),
            _ => None,
        }
    }

    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element(e) => e.namespace.as_deref(),
            NodeData::Attr(a) => a.namespace.as_deref(),
            _ => None,
        }
    }

    pub fn prefix(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element(e) => e.prefix.as_deref(),
            NodeData::Attr(a) => a.prefix.as_deref(),
            _ => None,
        }
    }

    /// `tagName`: qualified name, ASCII-uppercased for HTML elements in HTML
    /// documents
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        let element = self.node(id).as_element()?;
        let name = element.qualified_name();
        if element.is_html() && self.is_html_document(self.node(id).owner_document) {
            Some(name.to_ascii_uppercase())
        } else {
            Some(name)
        }
    }

    /// Whether the element lives in the HTML namespace with the given local name
    pub fn is_html_element(&self, id: NodeId, local_name: &str) -> bool {
        self.node(id)
            .as_element()
            .is_some_and(|e| e.is_html() && e.local_name == local_name)
    }

    pub fn is_html_document(&self, id: NodeId) -> bool {
        match &self.node(id).data {
            NodeData::Document(d) => d.is_html(),
            _ => false,
        }
    }

    /// Character data of text-like nodes
    pub fn data(&self, id: NodeId) -> Option<&str> {
        self.node(id).character_data()
    }

    /// Processing instruction target
    pub fn target(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::ProcessingInstruction { target, .. } => Some(target),
            _ => None,
        }
    }

    /// `nodeValue`
    pub fn node_value(&self, id: NodeId) -> Option<String> {
        let node = self.node(id);
        match &node.data {
            NodeData::Attr(a) => Some(a.value.clone()),
            _ => node.character_data().map(str::to_string),
        }
    }

    /// `textContent` getter
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        let node = self.node(id);
        match &node.data {
            NodeData::Document(_) | NodeData::DocumentType(_) => None,
            NodeData::Attr(a) => Some(a.value.clone()),
            NodeData::Element(_) | NodeData::DocumentFragment | NodeData::ShadowRoot(_) => {
                let mut out = String::new();
                for descendant in self.descendants(id) {
                    if let NodeData::Text(t) | NodeData::CDataSection(t) =
                        &self.node(descendant).data
                    {
                        out.push_str(t);
                    }
                }
                Some(out)
            }
            _ => node.character_data().map(str::to_string),
        }
    }

    pub fn is_same_node(&self, id: NodeId, other: NodeId) -> bool {
        id == other
    }

    /// Shadow host of a shadow root
    pub fn host(&self, id: NodeId) -> Option<NodeId> {
        match &self.node(id).data {
            NodeData::ShadowRoot(s) => Some(s.host),
            _ => None,
        }
    }

    /// Inclusive ancestor check that crosses shadow boundaries through hosts
    pub(crate) fn is_host_including_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.node(node).parent.or_else(|| self.host(node));
        }
        false
    }

    /// Top of the parent chain
    pub(crate) fn tree_root(&self, id: NodeId) -> NodeId {
        self.inclusive_ancestors(id).last().unwrap_or(id)
    }
}

/// Iterator over a node's ancestor chain
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).parent;
        Some(current)
    }
}

/// Pre-order iterator over a subtree, excluding its root
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.node(current).children.iter().rev().copied());
        Some(current)
    }
}

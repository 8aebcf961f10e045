//! DOM Node - arena entry
//!
//! Every tree member (document, element, text, comment, fragment, doctype,
//! processing instruction, attribute) is a [`Node`]. Structural fields are
//! crate-private; host code reads them through [`DomTree`](crate::DomTree)
//! accessors and changes them only through the mutation primitives.

use crate::{ElementKind, NodeId, ShadowRootMode};

/// DOM numeric node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CDataSection = 4,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
}

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Owning document; a document owns itself
    pub(crate) owner_document: NodeId,
    pub(crate) parent: Option<NodeId>,
    /// Children in insertion order
    pub(crate) children: Vec<NodeId>,
    pub(crate) connected: bool,
    /// Nearest Document or ShadowRoot, only while connected
    pub(crate) root_node: Option<NodeId>,
    /// Nearest inclusive form ancestor
    pub(crate) form: Option<NodeId>,
    /// Nearest inclusive select ancestor
    pub(crate) select: Option<NodeId>,
    /// Nearest inclusive textarea ancestor
    pub(crate) textarea: Option<NodeId>,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn new(owner_document: NodeId, data: NodeData) -> Self {
        Self {
            owner_document,
            parent: None,
            children: Vec::new(),
            connected: false,
            root_node: None,
            form: None,
            select: None,
            textarea: None,
            data,
        }
    }

    /// Node-specific payload
    #[inline]
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn node_type(&self) -> NodeType {
        match &self.data {
            NodeData::Document(_) => NodeType::Document,
            NodeData::DocumentType(_) => NodeType::DocumentType,
            NodeData::DocumentFragment | NodeData::ShadowRoot(_) => NodeType::DocumentFragment,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Attr(_) => NodeType::Attribute,
            NodeData::Text(_) => NodeType::Text,
            NodeData::CDataSection(_) => NodeType::CDataSection,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    #[inline]
    pub fn is_document(&self) -> bool {
        matches!(self.data, NodeData::Document(_))
    }

    #[inline]
    pub fn is_shadow_root(&self) -> bool {
        matches!(self.data, NodeData::ShadowRoot(_))
    }

    /// Nodes that may hold children
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(
            self.data,
            NodeData::Document(_)
                | NodeData::DocumentFragment
                | NodeData::ShadowRoot(_)
                | NodeData::Element(_)
        )
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_attr(&self) -> Option<&AttrData> {
        match &self.data {
            NodeData::Attr(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_attr_mut(&mut self) -> Option<&mut AttrData> {
        match &mut self.data {
            NodeData::Attr(a) => Some(a),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Character data of text, CDATA, comment and processing instruction nodes
    pub fn character_data(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) | NodeData::CDataSection(t) | NodeData::Comment(t) => Some(t),
            NodeData::ProcessingInstruction { data, .. } => Some(data),
            _ => None,
        }
    }

    pub(crate) fn character_data_mut(&mut self) -> Option<&mut String> {
        match &mut self.data {
            NodeData::Text(t) | NodeData::CDataSection(t) | NodeData::Comment(t) => Some(t),
            NodeData::ProcessingInstruction { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document(DocumentData),
    /// DOCTYPE
    DocumentType(DoctypeData),
    DocumentFragment,
    ShadowRoot(ShadowRootData),
    /// Element
    Element(ElementData),
    /// Attribute node
    Attr(AttrData),
    /// Text content
    Text(String),
    CDataSection(String),
    /// Comment
    Comment(String),
    /// Processing instruction
    ProcessingInstruction { target: String, data: String },
}

/// Document-specific data
#[derive(Debug, Clone)]
pub struct DocumentData {
    pub content_type: String,
    pub url: String,
}

impl DocumentData {
    /// HTML documents lowercase names and use the HTML namespace by default
    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DoctypeData {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

#[derive(Debug, Clone)]
pub struct ShadowRootData {
    pub host: NodeId,
    pub mode: ShadowRootMode,
    pub delegates_focus: bool,
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub kind: ElementKind,
    /// Attribute nodes in insertion order, unique by (namespace, local name)
    pub(crate) attributes: Vec<NodeId>,
    /// Customized built-in name given at creation
    pub(crate) is_value: Option<String>,
    pub(crate) shadow_root: Option<NodeId>,
    /// Inert content fragment of template elements
    pub(crate) template_content: Option<NodeId>,
}

impl ElementData {
    pub(crate) fn new(
        namespace: Option<String>,
        prefix: Option<String>,
        local_name: String,
        kind: ElementKind,
    ) -> Self {
        Self {
            namespace,
            prefix,
            local_name,
            kind,
            attributes: Vec::new(),
            is_value: None,
            shadow_root: None,
            template_content: None,
        }
    }

    /// Qualified name: `prefix:local` or `local`
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }

    pub fn is_html(&self) -> bool {
        self.namespace.as_deref() == Some(crate::namespace::HTML)
    }

    /// Attribute node ids in list order
    pub fn attribute_ids(&self) -> &[NodeId] {
        &self.attributes
    }

    pub fn is_value(&self) -> Option<&str> {
        self.is_value.as_deref()
    }
}

/// Attribute
#[derive(Debug, Clone)]
pub struct AttrData {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub value: String,
    pub(crate) owner_element: Option<NodeId>,
}

impl AttrData {
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }

    pub fn owner_element(&self) -> Option<NodeId> {
        self.owner_element
    }
}

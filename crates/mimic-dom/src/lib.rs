//! mimic DOM - Document Object Model
//!
//! In-memory emulation of a browser's live DOM. Every node of every document
//! lives in one [`DomTree`] arena and is addressed by a [`NodeId`]; all tree
//! mutation funnels through the primitives in this crate so that parent links,
//! connected state, root nodes and form owner back-references stay consistent.

mod attributes;
mod custom_elements;
mod document;
mod element;
mod error;
mod forms;
pub mod namespace;
mod node;
mod operations;
mod position;
mod reflect;
mod selector;
mod shadow;
mod tree;
mod tree_mutation;
pub mod validation;

pub use custom_elements::{
    CustomElementDefinition, CustomElementError, CustomElementOptions, CustomElementRegistry,
    LifecycleCallback, LifecycleReaction,
};
pub use element::{ElementKind, ElementQuery};
pub use error::{DomError, DomResult};
pub use node::{
    AttrData, DoctypeData, DocumentData, ElementData, Node, NodeData, NodeType, ShadowRootData,
};
pub use position::DocumentPosition;
pub use reflect::{ReflectedAttribute, ReflectedKind, ReflectedValue};
pub use selector::SelectorList;
pub use shadow::{ShadowRootInit, ShadowRootMode};
pub use tree::{Ancestors, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Arena slot of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

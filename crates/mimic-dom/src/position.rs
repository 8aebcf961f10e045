//! Tree order comparison (`compareDocumentPosition`)

use std::ops::BitOr;

use crate::{DomTree, NodeId};

/// Bitmask returned by [`DomTree::compare_document_position`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentPosition(u16);

impl DocumentPosition {
    pub const DISCONNECTED: Self = Self(0x01);
    pub const PRECEDING: Self = Self(0x02);
    pub const FOLLOWING: Self = Self(0x04);
    pub const CONTAINS: Self = Self(0x08);
    pub const CONTAINED_BY: Self = Self(0x10);
    pub const IMPLEMENTATION_SPECIFIC: Self = Self(0x20);

    /// Same node
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All bits of `other` are set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DocumentPosition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl DomTree {
    /// Position of `other` relative to `reference`.
    ///
    /// Attributes compare as their owner element; two attributes of the same
    /// element compare by attribute list order.
    pub fn compare_document_position(&self, reference: NodeId, other: NodeId) -> DocumentPosition {
        if reference == other {
            return DocumentPosition::empty();
        }

        let (mut node1, mut node2) = (other, reference);
        let mut attr1 = None;
        let mut attr2 = None;
        if let Some(owner) = self.node(node1).as_attr().and_then(|a| a.owner_element) {
            attr1 = Some(node1);
            node1 = owner;
        }
        if let Some(owner) = self.node(node2).as_attr().and_then(|a| a.owner_element) {
            attr2 = Some(node2);
            node2 = owner;
            if let Some(attr1) = attr1.filter(|_| node1 == node2) {
                for &attr in self.attributes(node2) {
                    if attr == attr1 {
                        return DocumentPosition::IMPLEMENTATION_SPECIFIC
                            | DocumentPosition::PRECEDING;
                    }
                    if Some(attr) == attr2 {
                        return DocumentPosition::IMPLEMENTATION_SPECIFIC
                            | DocumentPosition::FOLLOWING;
                    }
                }
            }
        }

        if self.tree_root(node1) != self.tree_root(node2) {
            return DocumentPosition::DISCONNECTED
                | DocumentPosition::IMPLEMENTATION_SPECIFIC
                | DocumentPosition::FOLLOWING;
        }

        // `other` is an ancestor of `reference`
        if (attr1.is_none() && self.contains(node1, node2)) || (node1 == node2 && attr2.is_some()) {
            return DocumentPosition::CONTAINS | DocumentPosition::PRECEDING;
        }
        // `other` is a descendant of `reference`
        if (attr2.is_none() && self.contains(node2, node1)) || (node1 == node2 && attr1.is_some()) {
            return DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING;
        }

        if self.precedes(node1, node2) {
            DocumentPosition::PRECEDING
        } else {
            DocumentPosition::FOLLOWING
        }
    }

    /// Tree order for two nodes of one tree, neither an ancestor of the other
    fn precedes(&self, a: NodeId, b: NodeId) -> bool {
        let mut chain_a: Vec<NodeId> = self.inclusive_ancestors(a).collect();
        let mut chain_b: Vec<NodeId> = self.inclusive_ancestors(b).collect();
        chain_a.reverse();
        chain_b.reverse();

        let shared = chain_a
            .iter()
            .zip(&chain_b)
            .take_while(|(x, y)| x == y)
            .count();
        let (Some(&branch_a), Some(&branch_b)) = (chain_a.get(shared), chain_b.get(shared)) else {
            return false;
        };
        let lowest_common = chain_a[shared - 1];
        let children = self.child_nodes(lowest_common);
        let index_of = |id: NodeId| children.iter().position(|&c| c == id);
        index_of(branch_a) < index_of(branch_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_siblings() {
        let mut tree = DomTree::new();
        let doc = tree.create_document("application/xml");
        let root = tree.create_element(doc, "root").unwrap();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();

        assert!(tree.compare_document_position(a, b).contains(DocumentPosition::FOLLOWING));
        assert!(tree.compare_document_position(b, a).contains(DocumentPosition::PRECEDING));
        assert!(tree.compare_document_position(a, a).is_empty());
    }

    #[test]
    fn test_ancestry() {
        let mut tree = DomTree::new();
        let doc = tree.create_document("application/xml");
        let root = tree.create_element(doc, "root").unwrap();
        let a = tree.create_element(doc, "a").unwrap();
        tree.append_child(root, a).unwrap();

        assert_eq!(
            tree.compare_document_position(root, a),
            DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING
        );
        assert_eq!(
            tree.compare_document_position(a, root),
            DocumentPosition::CONTAINS | DocumentPosition::PRECEDING
        );
    }

    #[test]
    fn test_nested_branches() {
        let mut tree = DomTree::new();
        let doc = tree.create_document("application/xml");
        let root = tree.create_element(doc, "root").unwrap();
        let left = tree.create_element(doc, "l").unwrap();
        let deep = tree.create_element(doc, "d").unwrap();
        let right = tree.create_element(doc, "r").unwrap();
        tree.append_child(root, left).unwrap();
        tree.append_child(left, deep).unwrap();
        tree.append_child(root, right).unwrap();

        assert_eq!(tree.compare_document_position(deep, right), DocumentPosition::FOLLOWING);
        assert_eq!(tree.compare_document_position(right, deep), DocumentPosition::PRECEDING);
    }

    #[test]
    fn test_disconnected() {
        let mut tree = DomTree::new();
        let doc = tree.create_document("application/xml");
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        let position = tree.compare_document_position(a, b);
        assert!(position.contains(DocumentPosition::DISCONNECTED));
        assert!(position.contains(DocumentPosition::IMPLEMENTATION_SPECIFIC));
        assert_eq!(position.bits(), 0x01 | 0x20 | 0x04);
    }

    #[test]
    fn test_attributes() {
        let mut tree = DomTree::new();
        let doc = tree.create_document("application/xml");
        let el = tree.create_element(doc, "el").unwrap();
        tree.set_attribute(el, "first", "1").unwrap();
        tree.set_attribute(el, "second", "2").unwrap();
        let first = tree.get_attribute_node(el, "first").unwrap();
        let second = tree.get_attribute_node(el, "second").unwrap();

        assert_eq!(
            tree.compare_document_position(first, second),
            DocumentPosition::IMPLEMENTATION_SPECIFIC | DocumentPosition::FOLLOWING
        );
        assert_eq!(
            tree.compare_document_position(second, first),
            DocumentPosition::IMPLEMENTATION_SPECIFIC | DocumentPosition::PRECEDING
        );
        assert_eq!(
            tree.compare_document_position(el, first),
            DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING
        );
        assert_eq!(
            tree.compare_document_position(first, el),
            DocumentPosition::CONTAINS | DocumentPosition::PRECEDING
        );
    }
}

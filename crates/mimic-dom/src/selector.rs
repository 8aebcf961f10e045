//! Selector matching
//!
//! Selectors are parsed with lightningcss and matched right to left against
//! the arena. Supported: type, universal, `#id`, `.class`, attribute
//! selectors with every operator and case flag, `:not()`, `:is()`,
//! `:where()`, the structural pseudo-classes (`:root`, `:empty`, `:scope`,
//! the `:*-child` and `:*-of-type` families) and the four tree combinators.
//! Anything else (state pseudo-classes, pseudo-elements, shadow parts) is a
//! `SyntaxError`, since no live document state backs it.

use lightningcss::selector::{Combinator, Component, Selector};
use lightningcss::stylesheet::ParserOptions;
use lightningcss::traits::ParseWithOptions;
use parcel_selectors::attr::{
    AttrSelectorOperator, NamespaceConstraint, ParsedAttrSelectorOperation, ParsedCaseSensitivity,
};

use crate::{DomError, DomResult, DomTree, NodeId};

/// Parsed comma-separated selector list, borrowing the selector text
#[derive(Debug, Clone)]
pub struct SelectorList<'i>(lightningcss::selector::SelectorList<'i>);

impl<'i> SelectorList<'i> {
    /// Parse a selector list; invalid or unsupported input is a `SyntaxError`
    pub fn parse(input: &'i str) -> DomResult<Self> {
        let invalid = || DomError::Syntax(format!("'{}' is not a valid selector.", input));
        let list = lightningcss::selector::SelectorList::parse_string_with_options(
            input,
            ParserOptions::default(),
        )
        .map_err(|e| {
            tracing::trace!(selector = input, error = ?e, "selector rejected");
            invalid()
        })?;
        if list.0.is_empty() || !list.0.iter().all(is_supported) {
            return Err(invalid());
        }
        tracing::trace!(selector = input, "parsed selector");
        Ok(Self(list))
    }

    /// Whether `element` matches any selector in the list, with `:scope`
    /// standing for the element itself
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        self.matches_in_scope(tree, element, element)
    }

    /// Whether `element` matches, resolving `:scope` to `scope`
    pub fn matches_in_scope(&self, tree: &DomTree, element: NodeId, scope: NodeId) -> bool {
        let context = MatchContext { tree, scope };
        tree.is_element(element) && context.any(&self.0.0, element)
    }
}

fn is_supported(selector: &Selector<'_>) -> bool {
    selector.iter_raw_match_order().all(|component| match component {
        Component::Combinator(combinator) => matches!(
            combinator,
            Combinator::Child
                | Combinator::Descendant
                | Combinator::NextSibling
                | Combinator::LaterSibling
        ),
        Component::Negation(list) | Component::Is(list) | Component::Where(list) => {
            list.iter().all(is_supported)
        }
        Component::NthOf(nth) => nth.selectors().iter().all(is_supported),
        Component::ExplicitAnyNamespace
        | Component::ExplicitNoNamespace
        | Component::ExplicitUniversalType
        | Component::LocalName(_)
        | Component::ID(_)
        | Component::Class(_)
        | Component::AttributeInNoNamespaceExists { .. }
        | Component::AttributeInNoNamespace { .. }
        | Component::AttributeOther(_)
        | Component::Root
        | Component::Empty
        | Component::Scope
        | Component::Nth(_) => true,
        _ => false,
    })
}

struct MatchContext<'t> {
    tree: &'t DomTree,
    scope: NodeId,
}

impl MatchContext<'_> {
    fn any(&self, selectors: &[Selector<'_>], element: NodeId) -> bool {
        selectors
            .iter()
            .any(|selector| self.complex(selector.iter_raw_match_order().as_slice(), element))
    }

    /// Match components in right-to-left order starting at the rightmost
    /// compound
    fn complex(&self, components: &[Component<'_>], element: NodeId) -> bool {
        let split = components
            .iter()
            .position(|c| matches!(c, Component::Combinator(_)))
            .unwrap_or(components.len());
        let (compound, rest) = components.split_at(split);
        if !compound.iter().all(|c| self.simple(c, element)) {
            return false;
        }
        let Some((Component::Combinator(combinator), rest)) = rest.split_first() else {
            return true;
        };

        let tree = self.tree;
        match combinator {
            Combinator::Child => tree
                .parent_element(element)
                .is_some_and(|parent| self.complex(rest, parent)),
            Combinator::Descendant => tree
                .ancestors(element)
                .take_while(|&a| tree.is_element(a))
                .any(|a| self.complex(rest, a)),
            Combinator::NextSibling => tree
                .previous_element_sibling(element)
                .is_some_and(|sibling| self.complex(rest, sibling)),
            Combinator::LaterSibling => {
                let mut current = tree.previous_element_sibling(element);
                while let Some(sibling) = current {
                    if self.complex(rest, sibling) {
                        return true;
                    }
                    current = tree.previous_element_sibling(sibling);
                }
                false
            }
            _ => false,
        }
    }

    fn simple(&self, component: &Component<'_>, element: NodeId) -> bool {
        let tree = self.tree;
        let Some(data) = tree.node(element).as_element() else {
            return false;
        };
        let html = data.is_html() && tree.is_html_document(tree.node_document(element));

        match component {
            Component::ExplicitAnyNamespace | Component::ExplicitUniversalType => true,
            Component::ExplicitNoNamespace => data.namespace.is_none(),
            Component::LocalName(name) => {
                let wanted = if html { &*name.lower_name.0 } else { &*name.name.0 };
                data.local_name == wanted
            }
            Component::ID(id) => tree.get_attribute(element, "id").as_deref() == Some(&*id.0),
            Component::Class(class) => tree.class_list(element).iter().any(|c| *c == *class.0),
            Component::AttributeInNoNamespaceExists {
                local_name,
                local_name_lower,
            } => {
                let name = if html { local_name_lower } else { local_name };
                tree.get_attribute_ns(element, None, &name.0).is_some()
            }
            Component::AttributeInNoNamespace {
                local_name,
                operator,
                value,
                case_sensitivity,
                never_matches,
            } => {
                !never_matches
                    && tree
                        .get_attribute_ns(element, None, &local_name.0)
                        .is_some_and(|actual| {
                            attribute_matches(&actual, *operator, &value.0, *case_sensitivity, html)
                        })
            }
            Component::AttributeOther(attr) => {
                if attr.never_matches {
                    return false;
                }
                let name = if html { &attr.local_name_lower } else { &attr.local_name };
                let actual = match &attr.namespace {
                    None => tree.get_attribute_ns(element, None, &name.0),
                    Some(NamespaceConstraint::Any) => tree.get_attribute(element, &name.0),
                    Some(NamespaceConstraint::Specific((_, url))) => {
                        tree.get_attribute_ns(element, Some(&**url), &name.0)
                    }
                };
                match (&attr.operation, actual) {
                    (_, None) => false,
                    (ParsedAttrSelectorOperation::Exists, Some(_)) => true,
                    (
                        ParsedAttrSelectorOperation::WithValue {
                            operator,
                            case_sensitivity,
                            expected_value,
                        },
                        Some(actual),
                    ) => attribute_matches(
                        &actual,
                        *operator,
                        &expected_value.0,
                        *case_sensitivity,
                        html,
                    ),
                }
            }
            Component::Negation(list) => !self.any(list, element),
            Component::Is(list) | Component::Where(list) => self.any(list, element),
            Component::Root => tree
                .parent_node(element)
                .is_some_and(|p| tree.node(p).is_document()),
            Component::Scope => element == self.scope,
            Component::Empty => tree.child_nodes(element).iter().all(|&child| {
                !tree.is_element(child) && tree.node(child).as_text().is_none_or(str::is_empty)
            }),
            Component::Nth(nth) => self.nth(element, nth, |_| true),
            Component::NthOf(nth) => {
                self.any(nth.selectors(), element)
                    && self.nth(element, nth.nth_data(), |sibling| {
                        self.any(nth.selectors(), sibling)
                    })
            }
            _ => false,
        }
    }

    /// `An+B` position test over element siblings accepted by `counted`
    fn nth(
        &self,
        element: NodeId,
        nth: &parcel_selectors::parser::NthSelectorData,
        counted: impl Fn(NodeId) -> bool,
    ) -> bool {
        let tree = self.tree;
        let Some(parent) = tree.parent_node(element) else {
            return false;
        };
        let local_name = tree.local_name(element);
        let namespace = tree.namespace_uri(element);
        let candidates: Vec<NodeId> = tree
            .child_nodes(parent)
            .iter()
            .copied()
            .filter(|&sibling| {
                tree.is_element(sibling)
                    && (!nth.ty.is_of_type()
                        || (tree.local_name(sibling) == local_name
                            && tree.namespace_uri(sibling) == namespace))
                    && counted(sibling)
            })
            .collect();

        if nth.ty.is_only() {
            return candidates.len() == 1;
        }
        let Some(index) = candidates.iter().position(|&c| c == element) else {
            return false;
        };
        let position = if nth.ty.is_from_end() {
            (candidates.len() - index) as i32
        } else {
            index as i32 + 1
        };
        match nth.a {
            0 => position == nth.b,
            a => {
                let offset = position - nth.b;
                offset % a == 0 && offset / a >= 0
            }
        }
    }
}

fn attribute_matches(
    actual: &str,
    operator: AttrSelectorOperator,
    expected: &str,
    case_sensitivity: ParsedCaseSensitivity,
    html: bool,
) -> bool {
    let fold = match case_sensitivity {
        ParsedCaseSensitivity::AsciiCaseInsensitive => true,
        ParsedCaseSensitivity::AsciiCaseInsensitiveIfInHtmlElementInHtmlDocument => html,
        ParsedCaseSensitivity::CaseSensitive | ParsedCaseSensitivity::ExplicitCaseSensitive => {
            false
        }
    };
    let (actual, expected) = if fold {
        (actual.to_ascii_lowercase(), expected.to_ascii_lowercase())
    } else {
        (actual.to_string(), expected.to_string())
    };

    match operator {
        AttrSelectorOperator::Equal => actual == expected,
        AttrSelectorOperator::Includes => {
            !expected.is_empty() && actual.split_ascii_whitespace().any(|v| v == expected)
        }
        AttrSelectorOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrSelectorOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
        AttrSelectorOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        AttrSelectorOperator::Substring => !expected.is_empty() && actual.contains(&expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (DomTree, NodeId, Vec<NodeId>) {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("");
        let body = tree.body(doc).unwrap();
        let list = tree.create_element(doc, "ul").unwrap();
        tree.set_attribute(list, "id", "menu").unwrap();
        tree.append_child(body, list).unwrap();
        let mut items = Vec::new();
        for (i, lang) in ["en", "en-US", "fr", "de"].iter().enumerate() {
            let item = tree.create_element(doc, "li").unwrap();
            tree.set_attribute(item, "class", if i == 1 { "item active" } else { "item" })
                .unwrap();
            tree.set_attribute(item, "lang", lang).unwrap();
            tree.append_child(list, item).unwrap();
            items.push(item);
        }
        (tree, doc, items)
    }

    fn matching(tree: &DomTree, items: &[NodeId], selector: &str) -> Vec<usize> {
        let list = SelectorList::parse(selector).unwrap();
        items
            .iter()
            .enumerate()
            .filter(|&(_, &item)| list.matches(tree, item))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "  ", "div >", ".", "#", "[x", "a,", "p:hover", "p::before", "1a", "& p"] {
            assert!(
                matches!(SelectorList::parse(bad), Err(DomError::Syntax(_))),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(SelectorList::parse("div > p.note, *[data-x='1'] ~ span").is_ok());
    }

    #[test]
    fn test_compound_and_combinators() {
        let (tree, doc, items) = fixture();
        assert_eq!(matching(&tree, &items, "#menu > li.item.active"), vec![1]);
        assert_eq!(matching(&tree, &items, "body li"), vec![0, 1, 2, 3]);
        assert_eq!(matching(&tree, &items, ".active + li"), vec![2]);
        assert_eq!(matching(&tree, &items, "li:first-child ~ li"), vec![1, 2, 3]);

        let root = SelectorList::parse(":root").unwrap();
        assert!(root.matches(&tree, tree.document_element(doc).unwrap()));
    }

    #[test]
    fn test_attribute_operators() {
        let (tree, _, items) = fixture();
        assert_eq!(matching(&tree, &items, "[lang|=en]"), vec![0, 1]);
        assert_eq!(matching(&tree, &items, "[class~=\"active\"]"), vec![1]);
        assert_eq!(matching(&tree, &items, "[lang^=f]"), vec![2]);
        assert_eq!(matching(&tree, &items, "[lang$=us i]"), vec![1]);
        assert_eq!(matching(&tree, &items, "[lang*=e]"), vec![0, 1, 3]);
    }

    #[test]
    fn test_structural_pseudo_classes() {
        let (tree, _, items) = fixture();
        assert_eq!(matching(&tree, &items, "li:nth-child(2n+1)"), vec![0, 2]);
        assert_eq!(matching(&tree, &items, "li:nth-last-child(1)"), vec![3]);
        assert_eq!(matching(&tree, &items, "li:last-of-type"), vec![3]);
        assert_eq!(matching(&tree, &items, "li:only-child"), Vec::<usize>::new());
        assert_eq!(matching(&tree, &items, "li:nth-child(-n+2)"), vec![0, 1]);
    }

    #[test]
    fn test_logical_pseudo_classes() {
        let (tree, _, items) = fixture();
        assert_eq!(matching(&tree, &items, "li:not(.active)"), vec![0, 2, 3]);
        assert_eq!(matching(&tree, &items, ":is([lang=fr], [lang=de])"), vec![2, 3]);
        assert_eq!(matching(&tree, &items, "li:where(.active)"), vec![1]);
    }

    #[test]
    fn test_scope_resolves_to_context() {
        let (tree, _, items) = fixture();
        let list = SelectorList::parse(":scope > li").unwrap();
        let menu = tree.parent_node(items[0]).unwrap();
        assert!(list.matches_in_scope(&tree, items[0], menu));
        assert!(!list.matches(&tree, items[0]));
    }

    #[test]
    fn test_type_selector_case() {
        let (tree, _, items) = fixture();
        assert!(SelectorList::parse("LI").unwrap().matches(&tree, items[0]));

        let mut tree = DomTree::new();
        let doc = tree.create_document("application/xml");
        let note = tree.create_element(doc, "Note").unwrap();
        assert!(SelectorList::parse("Note").unwrap().matches(&tree, note));
        assert!(!SelectorList::parse("note").unwrap().matches(&tree, note));
    }
}

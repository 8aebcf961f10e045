//! Element kinds and element queries
//!
//! Built-in tags map onto a closed [`ElementKind`] enum. The custom element
//! registry is consulted first, then the built-in table, and anything left
//! over in the HTML namespace becomes [`ElementKind::Unknown`].

use crate::custom_elements::CustomElementRegistry;
use crate::selector::SelectorList;
use crate::{DomResult, DomTree, NodeId, namespace};

/// Element behavior variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `<html>`
    HtmlRoot,
    Head,
    Body,
    Title,
    Meta,
    Anchor,
    Image,
    Form,
    Input,
    Button,
    Select,
    Option,
    OptGroup,
    Textarea,
    Label,
    Fieldset,
    Output,
    Template,
    Slot,
    Style,
    Link,
    Script,
    /// Known HTML tag without tag-specific behavior
    Html,
    /// Defined autonomous custom element
    Custom { form_associated: bool },
    /// HTML-namespace tag that is neither built in nor a valid custom name
    Unknown,
    Svg,
    MathMl,
    /// Element in any other namespace (or none)
    Generic,
}

/// HTML tags that have no tag-specific kind but are not unknown
const KNOWN_HTML_TAGS: &[&str] = &[
    "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "br", "canvas", "caption", "cite", "code", "col", "colgroup", "data",
    "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em", "embed",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup",
    "hr", "i", "iframe", "ins", "kbd", "legend", "li", "main", "map", "mark", "menu", "meter",
    "nav", "noscript", "object", "ol", "p", "param", "picture", "pre", "progress", "q", "rp",
    "rt", "ruby", "s", "samp", "search", "section", "small", "source", "span", "strong", "sub",
    "summary", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "time", "tr", "track",
    "u", "ul", "var", "video", "wbr",
];

impl ElementKind {
    /// Built-in HTML variant table
    pub fn from_html_tag(local_name: &str) -> Option<Self> {
        let kind = match local_name {
            "html" => Self::HtmlRoot,
            "head" => Self::Head,
            "body" => Self::Body,
            "title" => Self::Title,
            "meta" => Self::Meta,
            "a" => Self::Anchor,
            "img" => Self::Image,
            "form" => Self::Form,
            "input" => Self::Input,
            "button" => Self::Button,
            "select" => Self::Select,
            "option" => Self::Option,
            "optgroup" => Self::OptGroup,
            "textarea" => Self::Textarea,
            "label" => Self::Label,
            "fieldset" => Self::Fieldset,
            "output" => Self::Output,
            "template" => Self::Template,
            "slot" => Self::Slot,
            "style" => Self::Style,
            "link" => Self::Link,
            "script" => Self::Script,
            tag if KNOWN_HTML_TAGS.contains(&tag) => Self::Html,
            _ => return None,
        };
        Some(kind)
    }

    /// Resolve the variant for a new element: registry first, then the
    /// built-in table, then the unknown fallback.
    pub(crate) fn resolve(
        registry: &CustomElementRegistry,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Self {
        match namespace {
            Some(namespace::HTML) => {
                if let Some(definition) = registry.get(local_name) {
                    if definition.extends.is_none() {
                        return Self::Custom {
                            form_associated: definition.form_associated,
                        };
                    }
                }
                // Customized built-ins keep their base behavior
                if let Some(kind) = Self::from_html_tag(local_name) {
                    return kind;
                }
                if CustomElementRegistry::is_valid_name(local_name) {
                    // Valid but not (yet) defined: plain HTMLElement until upgraded
                    Self::Html
                } else {
                    Self::Unknown
                }
            }
            Some(namespace::SVG) => Self::Svg,
            Some(namespace::MATHML) => Self::MathMl,
            _ => Self::Generic,
        }
    }

    /// Elements that take part in form submission and track a form owner
    pub fn is_form_associated(self) -> bool {
        matches!(
            self,
            Self::Input
                | Self::Button
                | Self::Select
                | Self::Textarea
                | Self::Fieldset
                | Self::Output
                | Self::Custom {
                    form_associated: true
                }
        )
    }
}

/// Element query trait
pub trait ElementQuery {
    /// Query single element by CSS selector
    fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>>;

    /// Query all elements by CSS selector
    fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<Vec<NodeId>>;

    /// Get elements by class name
    fn get_elements_by_class_name(&self, root: NodeId, class: &str) -> Vec<NodeId>;

    /// Get elements by tag name
    fn get_elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId>;

    /// Find closest inclusive ancestor matching selector
    fn closest(&self, element: NodeId, selector: &str) -> DomResult<Option<NodeId>>;

    /// Check if element matches selector
    fn matches(&self, element: NodeId, selector: &str) -> DomResult<bool>;
}

impl ElementQuery for DomTree {
    fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(root)
            .find(|&id| list.matches_in_scope(self, id, root)))
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(root)
            .filter(|&id| list.matches_in_scope(self, id, root))
            .collect())
    }

    fn get_elements_by_class_name(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = class.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.descendants(root)
            .filter(|&id| {
                self.is_element(id) && {
                    let classes = self.class_list(id);
                    wanted.iter().all(|w| classes.iter().any(|c| c == w))
                }
            })
            .collect()
    }

    fn get_elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let html_document = self.is_html_document(self.node_document(root));
        self.descendants(root)
            .filter(|&id| match self.node(id).as_element() {
                Some(_) if tag == "*" => true,
                Some(e) if html_document && e.is_html() => {
                    e.qualified_name() == tag.to_ascii_lowercase()
                }
                Some(e) => e.qualified_name() == tag,
                None => false,
            })
            .collect()
    }

    fn closest(&self, element: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .inclusive_ancestors(element)
            .find(|&id| self.is_element(id) && list.matches(self, id)))
    }

    fn matches(&self, element: NodeId, selector: &str) -> DomResult<bool> {
        let list = SelectorList::parse(selector)?;
        Ok(self.is_element(element) && list.matches(self, element))
    }
}

impl DomTree {
    /// `id` attribute
    pub fn element_id(&self, element: NodeId) -> Option<String> {
        self.get_attribute(element, "id")
    }

    /// `className`
    pub fn class_name(&self, element: NodeId) -> String {
        self.get_attribute(element, "class").unwrap_or_default()
    }

    /// Whitespace-separated tokens of the `class` attribute
    pub fn class_list(&self, element: NodeId) -> Vec<String> {
        self.get_attribute(element, "class")
            .map(|c| c.split_ascii_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// First element in tree order under `root` with the given id
    pub fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.descendants(root)
            .find(|&n| self.is_element(n) && self.get_attribute(n, "id").as_deref() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        assert_eq!(ElementKind::from_html_tag("form"), Some(ElementKind::Form));
        assert_eq!(ElementKind::from_html_tag("div"), Some(ElementKind::Html));
        assert_eq!(ElementKind::from_html_tag("blink"), None);
    }

    #[test]
    fn test_resolve_fallbacks() {
        let registry = CustomElementRegistry::new();
        assert_eq!(
            ElementKind::resolve(&registry, Some(namespace::HTML), "blink"),
            ElementKind::Unknown
        );
        assert_eq!(
            ElementKind::resolve(&registry, Some(namespace::HTML), "my-widget"),
            ElementKind::Html
        );
        assert_eq!(
            ElementKind::resolve(&registry, Some(namespace::SVG), "circle"),
            ElementKind::Svg
        );
        assert_eq!(ElementKind::resolve(&registry, None, "note"), ElementKind::Generic);
    }

    #[test]
    fn test_form_associated() {
        assert!(ElementKind::Input.is_form_associated());
        assert!(!ElementKind::Form.is_form_associated());
        assert!(ElementKind::Custom { form_associated: true }.is_form_associated());
    }

    #[test]
    fn test_query_selector_and_tag_name() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("t");
        let body = tree.body(doc).unwrap();
        let div = tree.create_element(doc, "div").unwrap();
        tree.set_attribute(div, "class", "card big").unwrap();
        let span = tree.create_element(doc, "span").unwrap();
        tree.set_attribute(span, "id", "label").unwrap();
        tree.append_child(body, div).unwrap();
        tree.append_child(div, span).unwrap();

        assert_eq!(tree.query_selector(doc, "div.card > #label").unwrap(), Some(span));
        assert_eq!(tree.get_elements_by_tag_name(doc, "SPAN"), vec![span]);
        assert_eq!(tree.get_elements_by_class_name(doc, "big card"), vec![div]);
        assert_eq!(tree.closest(span, "div").unwrap(), Some(div));
        assert!(tree.matches(span, "span, p").unwrap());
        assert_eq!(tree.get_element_by_id(doc, "label"), Some(span));
    }
}

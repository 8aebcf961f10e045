//! Markup serializer
//!
//! Walks a subtree depth-first with an explicit work stack and writes it back
//! out as markup. Node kinds without a markup form (attributes, CDATA
//! sections) produce nothing.

use mimic_dom::{DomTree, NodeData, NodeId, namespace};

/// HTML elements that never have children or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serializer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Emit attached shadow roots as `<template shadowrootmode>` blocks
    pub include_shadow_roots: bool,
    /// Escape text and attribute values
    pub escape_entities: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            include_shadow_roots: false,
            escape_entities: true,
        }
    }
}

/// `XMLSerializer`
#[derive(Debug, Clone, Default)]
pub struct XmlSerializer {
    options: SerializerOptions,
}

enum Step {
    Node(NodeId),
    Markup(String),
}

/// Escape `&`, `<`, `>` and `"`
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Children that make up an element's content; templates use their content
/// fragment
fn content_children(tree: &DomTree, id: NodeId) -> &[NodeId] {
    match tree.template_content(id) {
        Some(content) => tree.child_nodes(content),
        None => tree.child_nodes(id),
    }
}

impl XmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SerializerOptions) -> Self {
        Self { options }
    }

    /// `serializeToString`
    pub fn serialize_to_string(&self, tree: &DomTree, root: NodeId) -> String {
        tracing::debug!("Serializing {} ({})", root, tree.node_name(root));
        let mut out = String::new();
        self.write_steps(tree, vec![Step::Node(root)], &mut out);
        out
    }

    /// Serialize only the content of `root`
    pub fn serialize_children(&self, tree: &DomTree, root: NodeId) -> String {
        let mut out = String::new();
        let steps = content_children(tree, root)
            .iter()
            .rev()
            .map(|&child| Step::Node(child))
            .collect();
        self.write_steps(tree, steps, &mut out);
        out
    }

    fn text(&self, data: &str) -> String {
        if self.options.escape_entities {
            escape(data)
        } else {
            data.to_string()
        }
    }

    fn write_steps(&self, tree: &DomTree, mut stack: Vec<Step>, out: &mut String) {
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Markup(markup) => {
                    out.push_str(&markup);
                    continue;
                }
                Step::Node(id) => id,
            };
            let Some(node) = tree.get(id) else {
                continue;
            };
            match node.data() {
                NodeData::Element(element) => {
                    let html = element.namespace.as_deref() == Some(namespace::HTML);
                    let name = if html {
                        element.qualified_name().to_ascii_lowercase()
                    } else {
                        element.qualified_name()
                    };

                    out.push('<');
                    out.push_str(&name);
                    if let Some(is) = element.is_value()
                        && !tree.has_attribute(id, "is")
                    {
                        out.push_str(&format!(" is=\"{}\"", self.text(is)));
                    }
                    for &attr in tree.attributes(id) {
                        if let Some(attr) = tree.get(attr).and_then(|n| n.as_attr()) {
                            out.push_str(&format!(
                                " {}=\"{}\"",
                                attr.qualified_name(),
                                self.text(&attr.value)
                            ));
                        }
                    }

                    if html && VOID_ELEMENTS.contains(&element.local_name.as_str()) {
                        out.push_str("/>");
                        continue;
                    }
                    out.push('>');

                    stack.push(Step::Markup(format!("</{}>", name)));
                    if self.options.include_shadow_roots
                        && let Some(shadow) = tree.attached_shadow_root(id)
                    {
                        stack.push(Step::Markup("</template>".to_string()));
                        stack.extend(tree.child_nodes(shadow).iter().rev().map(|&c| Step::Node(c)));
                        stack.push(Step::Markup(self.shadow_template_open(tree, shadow)));
                    }
                    stack.extend(content_children(tree, id).iter().rev().map(|&c| Step::Node(c)));
                }
                NodeData::Document(_) | NodeData::DocumentFragment | NodeData::ShadowRoot(_) => {
                    stack.extend(tree.child_nodes(id).iter().rev().map(|&c| Step::Node(c)));
                }
                NodeData::Comment(data) => {
                    out.push_str("<!--");
                    out.push_str(data);
                    out.push_str("-->");
                }
                // Placeholder form, not real PI syntax
                NodeData::ProcessingInstruction { target, data } => {
                    out.push_str(&format!("<!--?{} {}?-->", target, data));
                }
                NodeData::Text(data) => out.push_str(&self.text(data)),
                NodeData::DocumentType(doctype) => {
                    out.push_str("<!DOCTYPE ");
                    out.push_str(&doctype.name);
                    if !doctype.public_id.is_empty() {
                        out.push_str(&format!(" PUBLIC \"{}\"", doctype.public_id));
                        if !doctype.system_id.is_empty() {
                            out.push_str(&format!(" \"{}\"", doctype.system_id));
                        }
                    } else if !doctype.system_id.is_empty() {
                        out.push_str(&format!(" SYSTEM \"{}\"", doctype.system_id));
                    }
                    out.push('>');
                }
                NodeData::CDataSection(_) | NodeData::Attr(_) => {}
            }
        }
    }

    fn shadow_template_open(&self, tree: &DomTree, shadow: NodeId) -> String {
        let mut markup = String::from("<template shadowrootmode=\"");
        if let Some(NodeData::ShadowRoot(data)) = tree.get(shadow).map(|n| n.data()) {
            markup.push_str(data.mode.as_str());
            markup.push('"');
            if data.delegates_focus {
                markup.push_str(" shadowrootdelegatesfocus=\"\"");
            }
        } else {
            markup.push('"');
        }
        markup.push('>');
        markup
    }
}

/// Markup of the content of `node`
pub fn inner_html(tree: &DomTree, node: NodeId) -> String {
    XmlSerializer::new().serialize_children(tree, node)
}

/// Markup of `node` itself
pub fn outer_html(tree: &DomTree, node: NodeId) -> String {
    XmlSerializer::new().serialize_to_string(tree, node)
}

//! mimic HTML - markup parsing and serialization
//!
//! `XmlParser` builds documents from XML on top of xml5ever's tokenizer and
//! never fails; errors are rendered into the document. `HtmlParser` (feature
//! `html5`) runs html5ever. `XmlSerializer` turns any subtree back into
//! markup.

#[cfg(feature = "html5")]
mod html_parser;
mod serializer;
mod xml_parser;

#[cfg(feature = "html5")]
pub use html_parser::{HtmlParseError, HtmlParser};
pub use serializer::{SerializerOptions, VOID_ELEMENTS, XmlSerializer, escape, inner_html, outer_html};
pub use xml_parser::{ParseOutcome, ParserOptions, XmlParseError, XmlParser};

use mimic_dom::{DomTree, NodeId};

/// Parse an XML string into a new `application/xml` document
pub fn parse_xml(tree: &mut DomTree, markup: &str) -> NodeId {
    XmlParser::new().parse(tree, markup)
}

/// Serialize `node` with default options
pub fn serialize(tree: &DomTree, node: NodeId) -> String {
    XmlSerializer::new().serialize_to_string(tree, node)
}

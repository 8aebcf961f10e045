//! Namespace URIs recognized by the tree builder and attribute resolution.

pub const HTML: &str = "http://www.w3.org/1999/xhtml";
pub const SVG: &str = "http://www.w3.org/2000/svg";
pub const MATHML: &str = "http://www.w3.org/1998/Math/MathML";
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
pub const XLINK: &str = "http://www.w3.org/1999/xlink";

/// Check whether `namespace` is the given URI
#[inline]
pub fn is(namespace: Option<&str>, uri: &str) -> bool {
    namespace == Some(uri)
}

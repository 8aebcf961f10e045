//! Attribute reflection
//!
//! IDL properties such as `input.disabled` or `textarea.rows` read and write
//! a content attribute with a type coercion. Each element kind declares its
//! reflected attributes in a static table instead of repeating the
//! read-coerce-write steps per property.

use crate::{DomError, DomResult, DomTree, ElementKind, NodeId};

/// A reflected content attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectedAttribute {
    pub name: &'static str,
    pub kind: ReflectedKind,
}

/// Coercion applied between the attribute string and the property value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectedKind {
    /// Present or absent
    Boolean,
    /// Verbatim, empty when absent
    String,
    /// Integer, `default` when absent or unparsable
    Long { default: i64 },
    /// ASCII case-insensitive keyword, `default` for missing or invalid values
    Enumerated {
        keywords: &'static [&'static str],
        default: &'static str,
    },
}

/// Property value of a reflected attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectedValue {
    Bool(bool),
    String(String),
    Long(i64),
}

const fn reflect(name: &'static str, kind: ReflectedKind) -> ReflectedAttribute {
    ReflectedAttribute { name, kind }
}

use ReflectedKind::{Boolean, Enumerated, Long, String as Str};

const GLOBAL: &[ReflectedAttribute] = &[
    reflect("id", Str),
    reflect("title", Str),
    reflect("lang", Str),
    reflect("hidden", Boolean),
    reflect("dir", Enumerated { keywords: &["ltr", "rtl", "auto"], default: "" }),
];

const INPUT: &[ReflectedAttribute] = &[
    reflect("name", Str),
    reflect(
        "type",
        Enumerated {
            keywords: &[
                "button", "checkbox", "color", "date", "datetime-local", "email", "file",
                "hidden", "image", "month", "number", "password", "radio", "range", "reset",
                "search", "submit", "tel", "text", "time", "url", "week",
            ],
            default: "text",
        },
    ),
    reflect("value", Str),
    reflect("placeholder", Str),
    reflect("checked", Boolean),
    reflect("disabled", Boolean),
    reflect("required", Boolean),
    reflect("readonly", Boolean),
    reflect("multiple", Boolean),
    reflect("autofocus", Boolean),
    reflect("maxlength", Long { default: -1 }),
    reflect("minlength", Long { default: -1 }),
    reflect("size", Long { default: 20 }),
];

const BUTTON: &[ReflectedAttribute] = &[
    reflect("name", Str),
    reflect("value", Str),
    reflect("disabled", Boolean),
    reflect(
        "type",
        Enumerated { keywords: &["submit", "reset", "button"], default: "submit" },
    ),
];

const SELECT: &[ReflectedAttribute] = &[
    reflect("name", Str),
    reflect("disabled", Boolean),
    reflect("multiple", Boolean),
    reflect("required", Boolean),
    reflect("size", Long { default: 0 }),
];

const TEXTAREA: &[ReflectedAttribute] = &[
    reflect("name", Str),
    reflect("placeholder", Str),
    reflect("disabled", Boolean),
    reflect("readonly", Boolean),
    reflect("required", Boolean),
    reflect("rows", Long { default: 2 }),
    reflect("cols", Long { default: 20 }),
    reflect("maxlength", Long { default: -1 }),
    reflect(
        "wrap",
        Enumerated { keywords: &["soft", "hard", "off"], default: "soft" },
    ),
];

const FORM: &[ReflectedAttribute] = &[
    reflect("name", Str),
    reflect("action", Str),
    reflect("target", Str),
    reflect("novalidate", Boolean),
    reflect(
        "method",
        Enumerated { keywords: &["get", "post", "dialog"], default: "get" },
    ),
    reflect(
        "enctype",
        Enumerated {
            keywords: &[
                "application/x-www-form-urlencoded",
                "multipart/form-data",
                "text/plain",
            ],
            default: "application/x-www-form-urlencoded",
        },
    ),
    reflect(
        "autocomplete",
        Enumerated { keywords: &["on", "off"], default: "on" },
    ),
];

const OPTION: &[ReflectedAttribute] = &[
    reflect("disabled", Boolean),
    reflect("selected", Boolean),
    reflect("label", Str),
    reflect("value", Str),
];

const OPTGROUP: &[ReflectedAttribute] = &[reflect("disabled", Boolean), reflect("label", Str)];

const FIELDSET: &[ReflectedAttribute] = &[reflect("name", Str), reflect("disabled", Boolean)];

const OUTPUT: &[ReflectedAttribute] = &[reflect("name", Str)];

const LABEL: &[ReflectedAttribute] = &[reflect("for", Str)];

const ANCHOR: &[ReflectedAttribute] = &[
    reflect("href", Str),
    reflect("target", Str),
    reflect("rel", Str),
    reflect("download", Str),
];

const IMAGE: &[ReflectedAttribute] = &[
    reflect("src", Str),
    reflect("alt", Str),
    reflect("width", Long { default: 0 }),
    reflect("height", Long { default: 0 }),
    reflect(
        "loading",
        Enumerated { keywords: &["eager", "lazy"], default: "eager" },
    ),
];

const LINK: &[ReflectedAttribute] = &[
    reflect("href", Str),
    reflect("rel", Str),
    reflect("media", Str),
    reflect("type", Str),
    reflect("disabled", Boolean),
];

const SCRIPT: &[ReflectedAttribute] = &[
    reflect("src", Str),
    reflect("type", Str),
    reflect("async", Boolean),
    reflect("defer", Boolean),
];

const STYLE: &[ReflectedAttribute] = &[reflect("media", Str)];

const META: &[ReflectedAttribute] = &[
    reflect("name", Str),
    reflect("content", Str),
    reflect("charset", Str),
];

const SLOT: &[ReflectedAttribute] = &[reflect("name", Str)];

impl ElementKind {
    /// Reflected attributes specific to this kind (global ones excluded)
    pub fn reflected_attributes(self) -> &'static [ReflectedAttribute] {
        match self {
            Self::Input => INPUT,
            Self::Button => BUTTON,
            Self::Select => SELECT,
            Self::Textarea => TEXTAREA,
            Self::Form => FORM,
            Self::Option => OPTION,
            Self::OptGroup => OPTGROUP,
            Self::Fieldset => FIELDSET,
            Self::Output => OUTPUT,
            Self::Label => LABEL,
            Self::Anchor => ANCHOR,
            Self::Image => IMAGE,
            Self::Link => LINK,
            Self::Script => SCRIPT,
            Self::Style => STYLE,
            Self::Meta => META,
            Self::Slot => SLOT,
            _ => &[],
        }
    }
}

/// HTML rules for parsing integers: optional whitespace and sign, then
/// digits; trailing garbage is ignored
pub(crate) fn parse_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let parsed: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -parsed } else { parsed })
}

impl DomTree {
    /// Reflection entry for `name` on `element`, global attributes included
    pub fn reflected_attribute(&self, element: NodeId, name: &str) -> Option<ReflectedAttribute> {
        let data = self.node(element).as_element()?;
        if !data.is_html() {
            return None;
        }
        data.kind
            .reflected_attributes()
            .iter()
            .chain(GLOBAL)
            .find(|r| r.name == name)
            .copied()
    }

    /// Read a reflected property
    pub fn get_reflected(&self, element: NodeId, name: &str) -> Option<ReflectedValue> {
        let reflected = self.reflected_attribute(element, name)?;
        let raw = self.get_attribute(element, reflected.name);
        let value = match reflected.kind {
            ReflectedKind::Boolean => ReflectedValue::Bool(raw.is_some()),
            ReflectedKind::String => ReflectedValue::String(raw.unwrap_or_default()),
            ReflectedKind::Long { default } => ReflectedValue::Long(
                raw.as_deref().and_then(parse_integer).unwrap_or(default),
            ),
            ReflectedKind::Enumerated { keywords, default } => {
                let keyword = raw
                    .map(|v| v.to_ascii_lowercase())
                    .filter(|v| keywords.contains(&v.as_str()));
                ReflectedValue::String(keyword.unwrap_or_else(|| default.to_string()))
            }
        };
        Some(value)
    }

    /// Write a reflected property through its content attribute
    pub fn set_reflected(
        &mut self,
        element: NodeId,
        name: &str,
        value: ReflectedValue,
    ) -> DomResult<()> {
        let Some(reflected) = self.reflected_attribute(element, name) else {
            return Err(DomError::Type(format!(
                "'{}' is not a reflected attribute of this element",
                name
            )));
        };
        match (reflected.kind, value) {
            (ReflectedKind::Boolean, ReflectedValue::Bool(true)) => {
                self.set_attribute(element, reflected.name, "")
            }
            (ReflectedKind::Boolean, ReflectedValue::Bool(false)) => {
                self.remove_attribute(element, reflected.name);
                Ok(())
            }
            (ReflectedKind::Long { .. }, ReflectedValue::Long(n)) => {
                self.set_attribute(element, reflected.name, &n.to_string())
            }
            (
                ReflectedKind::String | ReflectedKind::Enumerated { .. },
                ReflectedValue::String(s),
            ) => self.set_attribute(element, reflected.name, &s),
            (kind, value) => Err(DomError::Type(format!(
                "Cannot assign {:?} to reflected attribute '{}' of kind {:?}",
                value, reflected.name, kind
            ))),
        }
    }
}

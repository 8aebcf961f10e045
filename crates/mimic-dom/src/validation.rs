//! Name validation
//!
//! Shared by the document factories and the markup parser, so that a
//! processing instruction rejected by `create_processing_instruction` is
//! rejected by the parser for the same reason.

use crate::{DomError, DomResult, namespace};

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

/// XML `NameStartChar`
#[inline]
pub fn is_name_start(c: char) -> bool {
    is_name_start_char(c)
}

/// XML `NameChar`
#[inline]
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c, '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Matches the XML `Name` production
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Why a processing instruction was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingInstructionError {
    /// Target is not a valid name
    InvalidTarget,
    /// Data contains the `?>` close sequence
    ContainsClose,
}

/// Target must be name-like and data must not contain `?>`
pub fn validate_processing_instruction(
    target: &str,
    data: &str,
) -> Result<(), ProcessingInstructionError> {
    if !is_valid_name(target) {
        return Err(ProcessingInstructionError::InvalidTarget);
    }
    if data.contains("?>") {
        return Err(ProcessingInstructionError::ContainsClose);
    }
    Ok(())
}

/// Split a qualified name and check it against `namespace`.
///
/// Returns `(namespace, prefix, local_name)`.
pub fn validate_and_extract(
    namespace: Option<&str>,
    qualified_name: &str,
) -> DomResult<(Option<String>, Option<String>, String)> {
    let namespace = namespace.filter(|ns| !ns.is_empty());

    if !is_valid_name(qualified_name) {
        return Err(DomError::InvalidCharacter(format!(
            "The qualified name provided ('{}') contains the invalid name-start character.",
            qualified_name
        )));
    }

    let (prefix, local_name) = match qualified_name.split_once(':') {
        Some((prefix, local)) => {
            if prefix.is_empty() || local.is_empty() || local.contains(':') {
                return Err(DomError::InvalidCharacter(format!(
                    "The qualified name provided ('{}') is not a valid qualified name.",
                    qualified_name
                )));
            }
            (Some(prefix), local)
        }
        None => (None, qualified_name),
    };

    if prefix.is_some() && namespace.is_none() {
        return Err(DomError::Namespace(
            "The namespace URI provided ('') is not valid for the qualified name provided."
                .into(),
        ));
    }
    if prefix == Some("xml") && namespace != Some(namespace::XML) {
        return Err(DomError::Namespace(format!(
            "The namespace URI provided ('{}') is not valid for the qualified name provided ('{}').",
            namespace.unwrap_or_default(),
            qualified_name
        )));
    }
    let is_xmlns_name = qualified_name == "xmlns" || prefix == Some("xmlns");
    if is_xmlns_name != (namespace == Some(namespace::XMLNS)) {
        return Err(DomError::Namespace(format!(
            "The namespace URI provided ('{}') is not valid for the qualified name provided ('{}').",
            namespace.unwrap_or_default(),
            qualified_name
        )));
    }

    Ok((
        namespace.map(str::to_string),
        prefix.map(str::to_string),
        local_name.to_string(),
    ))
}

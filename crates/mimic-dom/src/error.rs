//! DOM exceptions
//!
//! Tree-mutation contract violations surface as typed errors that stop the
//! offending call before anything is mutated.

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors, one variant per DOMException kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Insertion would break the tree shape (cycles, misplaced node kinds)
    #[error("HierarchyRequestError: {0}")]
    HierarchyRequest(String),

    /// Referenced node is not where the caller claimed it is
    #[error("NotFoundError: {0}")]
    NotFound(String),

    /// Name contains characters not allowed by the XML Name production
    #[error("InvalidCharacterError: {0}")]
    InvalidCharacter(String),

    #[error("NotSupportedError: {0}")]
    NotSupported(String),

    /// Attribute already belongs to another element
    #[error("InUseAttributeError: {0}")]
    InUseAttribute(String),

    #[error("InvalidStateError: {0}")]
    InvalidState(String),

    /// Malformed selector
    #[error("SyntaxError: {0}")]
    Syntax(String),

    /// Inconsistent namespace/prefix combination
    #[error("NamespaceError: {0}")]
    Namespace(String),

    /// Wrong argument count or argument type at the binding layer
    #[error("TypeError: {0}")]
    Type(String),
}

impl DomError {
    /// DOMException name as reported to script
    pub fn name(&self) -> &'static str {
        match self {
            Self::HierarchyRequest(_) => "HierarchyRequestError",
            Self::NotFound(_) => "NotFoundError",
            Self::InvalidCharacter(_) => "InvalidCharacterError",
            Self::NotSupported(_) => "NotSupportedError",
            Self::InUseAttribute(_) => "InUseAttributeError",
            Self::InvalidState(_) => "InvalidStateError",
            Self::Syntax(_) => "SyntaxError",
            Self::Namespace(_) => "NamespaceError",
            Self::Type(_) => "TypeError",
        }
    }

    /// Message without the exception name prefix
    pub fn message(&self) -> &str {
        match self {
            Self::HierarchyRequest(m)
            | Self::NotFound(m)
            | Self::InvalidCharacter(m)
            | Self::NotSupported(m)
            | Self::InUseAttribute(m)
            | Self::InvalidState(m)
            | Self::Syntax(m)
            | Self::Namespace(m)
            | Self::Type(m) => m,
        }
    }
}

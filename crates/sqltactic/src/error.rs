//! Error types for sqltactic

use thiserror::Error;

/// Result type alias for command synthesis
pub type TacticResult<T> = Result<T, TacticError>;

/// Errors raised while building a tactic command.
///
/// A failed build never yields a partial command; the error surfaces to the
/// immediate caller before any I/O can happen.
#[derive(Debug, Error)]
pub enum TacticError {
    /// A required input was absent or empty
    #[error("Missing required argument: {name}")]
    MissingArgument { name: &'static str },

    /// The model type has no usable mapping
    #[error("Invalid mapping for type '{type_name}': {reason}")]
    InvalidMapping {
        type_name: &'static str,
        reason: String,
    },

    /// A model property accessor failed while binding a parameter or result
    #[error("Property binding failed on '{type_name}.{property}': {source}")]
    PropertyBinding {
        type_name: &'static str,
        property: String,
        #[source]
        source: PropertyError,
    },

    /// The operation is declared but not available
    #[error("Unsupported operation '{operation}': {reason}")]
    Unsupported {
        operation: &'static str,
        reason: String,
    },

    /// No dialect is registered for the tag
    #[error("Unknown dialect tag: {0}")]
    UnknownDialect(String),

    /// A filter or sort symbol does not name a mapped column
    #[error("Unknown symbol '{symbol}' on table '{table}'")]
    UnknownSymbol { table: String, symbol: String },

    /// A filter expression cannot be translated
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Two bindings in one command resolved to the same parameter key
    #[error("Duplicate parameter key: {name}")]
    DuplicateParameter { name: String },

    /// Identifier cannot be quoted safely
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Native database file creation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TacticError {
    /// Create a missing-argument error
    pub fn missing(name: &'static str) -> Self {
        Self::MissingArgument { name }
    }

    /// Create an invalid-mapping error for `T`
    pub fn invalid_mapping<T: ?Sized>(reason: impl Into<String>) -> Self {
        Self::InvalidMapping {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported-operation error
    pub fn unsupported(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            operation,
            reason: reason.into(),
        }
    }

    /// Wrap an accessor failure for `T.property`
    pub fn binding<T: ?Sized>(property: impl Into<String>, source: PropertyError) -> Self {
        Self::PropertyBinding {
            type_name: std::any::type_name::<T>(),
            property: property.into(),
            source,
        }
    }

    /// Check if this is an unsupported-operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Check if this is an invalid-mapping error
    pub fn is_invalid_mapping(&self) -> bool {
        matches!(self, Self::InvalidMapping { .. })
    }

    /// Check if this is a property binding error
    pub fn is_property_binding(&self) -> bool {
        matches!(self, Self::PropertyBinding { .. })
    }
}

/// Failure reported by a [`Model`](crate::Model) property accessor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// The model has no property with this name
    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    /// The value cannot be stored in the property
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The property cannot be written
    #[error("property '{0}' is read-only")]
    ReadOnly(String),

    /// Accessor-specific failure
    #[error("{0}")]
    Other(String),
}

impl PropertyError {
    /// Create a type mismatch error
    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }
}

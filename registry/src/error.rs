//! Registry error types.

use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while building the registry or checking values against it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Duplicate type name: {0}")]
    DuplicateTypeName(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Ability '{0}' has no body")]
    MissingBody(String),

    #[error("Unknown attribute '{attr}' on {type_name}")]
    UnknownAttribute { type_name: String, attr: String },

    #[error("Missing required attribute '{attr}' on {type_name}")]
    MissingRequired { type_name: String, attr: String },

    #[error("Type mismatch in {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown ability '{name}' on {owner}")]
    UnknownAbility { owner: String, name: String },
}

impl RegistryError {
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType(name.into())
    }

    pub fn unknown_attribute(type_name: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            type_name: type_name.into(),
            attr: attr.into(),
        }
    }

    pub fn missing_required(type_name: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::MissingRequired {
            type_name: type_name.into(),
            attr: attr.into(),
        }
    }

    pub fn type_mismatch(
        context: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            context: context.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn unknown_ability(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownAbility {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

//! Error types for schema registration and graph mapping

use thiserror::Error;

/// Result type for mapper operations
pub type Result<T> = std::result::Result<T, MapperError>;

/// Schema registration and graph mapping errors
#[derive(Debug, Error)]
pub enum MapperError {
    /// Entity type registered more than once
    #[error("Entity type '{0}' is already registered")]
    DuplicateType(String),

    /// Field name declared more than once within a type
    #[error("Field '{field}' is declared more than once on entity type '{entity}'")]
    DuplicateField { entity: String, field: String },

    /// Entity type not present in the registry
    #[error("Unknown entity type '{0}'")]
    UnknownType(String),

    /// Field name not declared on the entity type
    #[error("Entity type '{entity}' has no field '{field}'")]
    UnknownField { entity: String, field: String },

    /// A field value does not match the declared field kind
    #[error("Field '{field}' on entity type '{entity}' expects a {expected} value")]
    KindMismatch {
        entity: String,
        field: String,
        expected: &'static str,
    },

    /// An instance was serialized under a type it does not belong to
    #[error("Instance '{subject}' has type '{actual}', expected '{expected}'")]
    TypeMismatch {
        subject: String,
        expected: String,
        actual: String,
    },

    /// A literal's lexical form does not parse under its declared datatype
    #[error("Cannot parse '{lexical}' as {datatype}")]
    LiteralParse { datatype: String, lexical: String },

    /// A reference object position held a literal, or vice versa
    #[error("Expected {expected} in object position for predicate <{predicate}>")]
    UnexpectedObject {
        predicate: String,
        expected: &'static str,
    },
}

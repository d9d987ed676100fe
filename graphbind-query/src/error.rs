//! Error types for selector parsing, query compilation, and execution

use thiserror::Error;

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Faults raised by the query engine collaborator
///
/// These propagate unchanged through [`QueryError::Engine`]; the repository
/// neither retries nor suppresses them.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not parse the submitted query text
    #[error("Malformed query: {0}")]
    Malformed(String),

    /// The engine failed while executing
    #[error("Engine failure: {0}")]
    Backend(String),
}

/// Selector and query compilation errors
///
/// Everything here fails fast, before any query text reaches the engine.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Selector name does not match `find_by_*` / `count_by_*`
    #[error("Unsupported selector '{0}'")]
    UnsupportedSelector(String),

    /// A selector field was given no value
    #[error("Missing value for field '{0}'")]
    MissingValue(String),

    /// A field value does not fit the field's kind
    #[error("Field '{field}' expects {expected}")]
    ValueKind {
        field: String,
        expected: &'static str,
    },

    /// Aggregate order direction was neither ASC nor DESC
    #[error("Invalid order direction '{0}', expected ASC or DESC")]
    InvalidOrder(String),

    /// Average requested over a non-numeric field
    #[error("Field '{0}' is not numeric and cannot be averaged")]
    NotAggregatable(String),

    /// An identifier value is not a usable IRI
    #[error("Invalid IRI in filter value: '{0}'")]
    InvalidIri(String),

    /// Schema resolution failed (unknown type or field)
    #[error("Schema error: {0}")]
    Schema(#[from] graphbind_mapper::MapperError),

    /// Engine collaborator fault, propagated unchanged
    #[error("Query engine error: {0}")]
    Engine(#[from] EngineError),
}

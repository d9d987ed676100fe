//! SHACL error types

use thiserror::Error;

/// Result type for shape operations
pub type Result<T> = std::result::Result<T, ShaclError>;

/// Shape derivation and validation-collaborator errors
#[derive(Debug, Error)]
pub enum ShaclError {
    /// Schema resolution failed while deriving a shape
    #[error("Schema error: {0}")]
    Schema(#[from] graphbind_mapper::MapperError),

    /// The external validator reported a fault of its own
    ///
    /// Propagated unchanged; graphbind does not retry or suppress it.
    #[error("Validator failure: {0}")]
    Validator(String),
}

//! SHACL shape derivation for graphbind
//!
//! This crate derives a SHACL shape graph from an entity type's field
//! descriptors (predicate, datatype, cardinality) and defines the narrow
//! interface to an external validation engine. Validation itself is an
//! external collaborator: graphbind emits the shape graph and hands both
//! graphs over; it never interprets the verdict beyond relaying it.
//!
//! # Example
//!
//! ```
//! use graphbind_mapper::{EntityType, ScalarKind, SchemaRegistry};
//! use graphbind_shacl::shape_graph;
//!
//! let mut builder = SchemaRegistry::builder();
//! builder.register(
//!     EntityType::new("Person", "http://example.org/Person")
//!         .with_scalar_kind("age", "http://example.org/age", ScalarKind::Int),
//! );
//! let registry = builder.freeze().unwrap();
//!
//! let shapes = shape_graph(&registry, "Person").unwrap();
//! assert!(!shapes.is_empty());
//! ```

mod error;
mod shape;
mod validate;

pub use error::{Result, ShaclError};
pub use shape::shape_graph;
pub use validate::{Inference, ShapeValidator, ValidationOptions, ValidationReport};

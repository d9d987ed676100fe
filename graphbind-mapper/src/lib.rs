//! Object/RDF graph mapping for graphbind
//!
//! This crate binds typed entity declarations to an RDF triple
//! representation: callers declare entity types once (predicate, field
//! kind, cardinality per field), build instance graphs, and map them into
//! and out of [`graphbind_graph_ir::Graph`] values.
//!
//! # Overview
//!
//! Mapping works in four pieces:
//! 1. [`SchemaRegistry`] - frozen, process-wide entity type declarations
//! 2. [`Entity`] / [`Value`] - caller-built instance graphs
//! 3. [`codec`] - native scalar <-> typed literal conversion
//! 4. [`GraphMapper`] - cycle-safe `to_rdf` / `from_rdf` traversal
//!
//! # Example
//!
//! ```
//! use graphbind_mapper::{Entity, EntityType, GraphMapper, SchemaRegistry};
//!
//! let mut builder = SchemaRegistry::builder();
//! builder.register(
//!     EntityType::new("Person", "http://example.org/Person")
//!         .with_scalar("name", "http://example.org/name"),
//! );
//! let registry = builder.freeze().unwrap();
//!
//! let mapper = GraphMapper::new(registry);
//! let person = Entity::new("Person", "http://example.org/person/1");
//! person.borrow_mut().set("name", "Alice");
//!
//! let graph = mapper.to_rdf(&person).unwrap();
//! let back = mapper
//!     .from_rdf(&graph, "Person", "http://example.org/person/1")
//!     .unwrap();
//! assert_eq!(back.borrow().scalar("name"), person.borrow().scalar("name"));
//! ```

pub mod codec;
mod error;
mod mapper;
mod schema;
mod value;

pub use error::{MapperError, Result};
pub use mapper::{GraphMapper, InstanceMemo, VisitedSet};
pub use schema::{EntityType, FieldDescriptor, FieldKind, ScalarKind, SchemaBuilder, SchemaRegistry};
pub use value::{Entity, EntityRef, FieldValue, Value};

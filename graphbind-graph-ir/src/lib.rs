//! RDF graph intermediate representation for graphbind
//!
//! This crate provides the canonical types for representing RDF graphs that
//! the mapper produces and the repository queries: terms, typed literals,
//! triples, and an insertion-ordered triple set.
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - All IRIs are stored in expanded form.
//!
//! 2. **Explicit datatypes** - Literals always have an explicit datatype,
//!    never optional. Plain strings use `xsd:string`.
//!
//! 3. **Set semantics** - `Graph` collapses duplicate triples on insertion,
//!    so unioning the output of recursive serialization never duplicates
//!    facts.
//!
//! 4. **Insertion order is the order** - iteration yields triples in first
//!    insertion order. This is the documented deterministic order for
//!    multi-valued object lookups.
//!
//! # Example
//!
//! ```
//! use graphbind_graph_ir::{Graph, Term};
//!
//! let mut graph = Graph::new();
//! graph.add(
//!     Term::iri("http://example.org/alice"),
//!     Term::iri("http://xmlns.com/foaf/0.1/name"),
//!     Term::string("Alice"),
//! );
//! assert_eq!(graph.len(), 1);
//! ```

mod datatype;
mod graph;
mod term;
mod triple;

pub use datatype::Datatype;
pub use graph::Graph;
pub use term::{BlankId, LiteralValue, Term};
pub use triple::Triple;

//! Selector-driven query layer over mapped entity graphs
//!
//! Turns declarative selector names (`find_by_name_and_city_like`,
//! `count_by_state`) into SPARQL selection text and runs them through an
//! engine collaborator, rehydrating matches back into entity instances.
//!
//! # Pipeline
//!
//! 1. [`Selector::parse`] turns a selector name into a typed AST.
//! 2. [`compile`] resolves fields against the entity type and generates
//!    query text, escaping every caller-supplied value.
//! 3. A [`QueryEngine`] executes the text against a graph.
//! 4. [`Repository`] rehydrates result subjects through the mapper.
//!
//! Find queries always project distinct subjects in subject order, so
//! LIMIT/OFFSET windows partition one stable canonical ordering.
//!
//! [`MemoryEngine`] is a small reference engine that evaluates exactly the
//! grammar the compiler emits, so the whole pipeline can run in-process.

pub mod compile;
pub mod engine;
pub mod error;
pub mod memory;
pub mod repository;
pub mod selector;

pub use compile::{Aggregate, FilterValue, Order, Page};
pub use engine::{QueryEngine, Row};
pub use error::{EngineError, QueryError, Result};
pub use memory::MemoryEngine;
pub use repository::Repository;
pub use selector::{Selector, SelectorField, SelectorOp};

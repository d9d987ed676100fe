//! The query-engine collaborator interface
//!
//! The repository hands generated SPARQL text to an engine and gets rows of
//! bound variables back. The engine is an opaque capability: one
//! synchronous request, one response, no partial-result streaming. Engine
//! faults propagate unchanged.

use crate::error::EngineError;
use graphbind_graph_ir::{Graph, Term};
use std::collections::BTreeMap;

/// One result row: variable name (without `?`) to bound term
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row(BTreeMap<String, Term>);

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable
    pub fn bind(&mut self, var: impl Into<String>, term: Term) {
        self.0.insert(var.into(), term);
    }

    /// Look up a bound variable
    pub fn get(&self, var: &str) -> Option<&Term> {
        self.0.get(var)
    }

    /// Iterate bindings in variable-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// External query execution engine
///
/// Accepts query text in the selection grammar
/// (`SELECT ... WHERE { patterns } [GROUP BY] [ORDER BY] [LIMIT] [OFFSET]`)
/// and returns rows of bound variables.
pub trait QueryEngine {
    /// Execute a query against a graph
    fn select(&self, graph: &Graph, sparql: &str) -> Result<Vec<Row>, EngineError>;
}

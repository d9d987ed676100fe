//! Repository facade over selector-driven queries
//!
//! A repository is bound to one entity type and one engine. Selector names
//! are parsed, resolved against the type's declared fields, compiled to
//! query text, executed, and the matching subjects rehydrated back into
//! entity instances through one shared memo so overlapping results alias
//! instead of duplicating.

use crate::compile::{self, Aggregate, FilterValue, Order, Page};
use crate::engine::{QueryEngine, Row};
use crate::error::{EngineError, QueryError, Result};
use crate::selector::{Selector, SelectorOp};
use graphbind_mapper::{codec, EntityRef, EntityType, GraphMapper, InstanceMemo, Value};
use graphbind_graph_ir::{Graph, Term};
use std::sync::Arc;
use tracing::debug;

/// Selector-driven query access for one entity type
pub struct Repository<E: QueryEngine> {
    mapper: GraphMapper,
    type_name: String,
    engine: E,
}

impl<E: QueryEngine> Repository<E> {
    /// Bind a repository to an entity type and an engine
    pub fn new(mapper: GraphMapper, type_name: impl Into<String>, engine: E) -> Self {
        Self {
            mapper,
            type_name: type_name.into(),
            engine,
        }
    }

    /// The entity type this repository serves
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    fn entity_type(&self) -> Result<Arc<EntityType>> {
        Ok(Arc::clone(self.mapper.registry().entity(&self.type_name)?))
    }

    /// Execute a `find_by_*` selector and rehydrate every match
    pub fn find(
        &self,
        graph: &Graph,
        selector: &str,
        values: &[(&str, FilterValue)],
    ) -> Result<Vec<EntityRef>> {
        self.find_page(graph, selector, values, Page::all())
    }

    /// Execute a `find_by_*` selector over one result window
    ///
    /// Results are ordered by subject identifier, so successive windows
    /// partition the full match set without gaps or repeats.
    pub fn find_page(
        &self,
        graph: &Graph,
        selector: &str,
        values: &[(&str, FilterValue)],
        page: Page,
    ) -> Result<Vec<EntityRef>> {
        let parsed = Selector::parse(selector)?;
        if parsed.op != SelectorOp::Find {
            return Err(QueryError::UnsupportedSelector(selector.to_string()));
        }
        let ty = self.entity_type()?;
        let sparql = compile::compile_find(&ty, &parsed.fields, values, page)?;
        debug!(type_name = %self.type_name, selector, %sparql, "compiled find query");

        let rows = self.engine.select(graph, &sparql)?;
        let mut memo = InstanceMemo::default();
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let subject = bound_iri(row, "s")?;
            out.push(
                self.mapper
                    .from_rdf_with_memo(graph, &self.type_name, subject, &mut memo)?,
            );
        }
        Ok(out)
    }

    /// Execute a `count_by_*` selector
    pub fn count(
        &self,
        graph: &Graph,
        selector: &str,
        values: &[(&str, FilterValue)],
    ) -> Result<u64> {
        let parsed = Selector::parse(selector)?;
        if parsed.op != SelectorOp::Count {
            return Err(QueryError::UnsupportedSelector(selector.to_string()));
        }
        let ty = self.entity_type()?;
        let sparql = compile::compile_count(&ty, &parsed.fields, values)?;
        debug!(type_name = %self.type_name, selector, %sparql, "compiled count query");

        let rows = self.engine.select(graph, &sparql)?;
        match rows.first() {
            Some(row) => bound_integer(row, "count").map(|n| n.max(0) as u64),
            None => Ok(0),
        }
    }

    /// Count subjects grouped by a field's value
    ///
    /// Returns `(group value, subject count)` pairs ordered by count.
    pub fn group_by_count(
        &self,
        graph: &Graph,
        group_field: &str,
        order: Order,
    ) -> Result<Vec<(Value, u64)>> {
        let rows = self.grouped(graph, group_field, &Aggregate::Count, order)?;
        rows.iter()
            .map(|row| {
                let key = group_key(row)?;
                let count = bound_integer(row, "agg")?;
                Ok((key, count.max(0) as u64))
            })
            .collect()
    }

    /// Average a numeric field per group
    ///
    /// Returns `(group value, average)` pairs ordered by average.
    pub fn group_by_avg(
        &self,
        graph: &Graph,
        group_field: &str,
        value_field: &str,
        order: Order,
    ) -> Result<Vec<(Value, f64)>> {
        let aggregate = Aggregate::Avg(value_field.to_string());
        let rows = self.grouped(graph, group_field, &aggregate, order)?;
        rows.iter()
            .map(|row| {
                let key = group_key(row)?;
                let avg = bound_double(row, "agg")?;
                Ok((key, avg))
            })
            .collect()
    }

    fn grouped(
        &self,
        graph: &Graph,
        group_field: &str,
        aggregate: &Aggregate,
        order: Order,
    ) -> Result<Vec<Row>> {
        let ty = self.entity_type()?;
        let sparql = compile::compile_group(&ty, group_field, aggregate, order)?;
        debug!(type_name = %self.type_name, group_field, %sparql, "compiled grouped query");
        Ok(self.engine.select(graph, &sparql)?)
    }
}

fn engine_fault(detail: impl Into<String>) -> QueryError {
    QueryError::Engine(EngineError::Backend(detail.into()))
}

fn bound_iri<'a>(row: &'a Row, var: &str) -> Result<&'a str> {
    row.get(var)
        .and_then(Term::as_iri)
        .ok_or_else(|| engine_fault(format!("expected an IRI binding for ?{var}")))
}

fn bound_integer(row: &Row, var: &str) -> Result<i64> {
    row.get(var)
        .and_then(Term::as_literal)
        .and_then(|(value, _)| value.as_integer())
        .ok_or_else(|| engine_fault(format!("expected an integer binding for ?{var}")))
}

fn bound_double(row: &Row, var: &str) -> Result<f64> {
    row.get(var)
        .and_then(Term::as_literal)
        .and_then(|(value, _)| value.as_double())
        .ok_or_else(|| engine_fault(format!("expected a numeric binding for ?{var}")))
}

/// Decode the grouping key: identifier objects become text values,
/// literal objects decode through the literal codec.
fn group_key(row: &Row) -> Result<Value> {
    let term = row
        .get("g")
        .ok_or_else(|| engine_fault("expected a binding for ?g"))?;
    match term {
        Term::Iri(iri) => Ok(Value::Text(iri.to_string())),
        _ => Ok(codec::decode(term)?),
    }
}

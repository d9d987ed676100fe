//! SPARQL text generation
//!
//! Compiles resolved selector fields plus caller values into the selection
//! and aggregation grammar the engine collaborator accepts. All caller
//! text is escaped before it reaches query text: string values are escaped
//! as SPARQL string literals, fuzzy fragments are additionally
//! regex-escaped, and identifier values are rejected unless they are clean
//! IRIs. Find queries always order by subject so LIMIT/OFFSET windows
//! partition one stable canonical order.

use crate::error::{QueryError, Result};
use crate::selector::SelectorField;
use graphbind_mapper::{EntityType, FieldKind, ScalarKind, Value};
use graphbind_vocab::rdf;
use std::fmt::Write;

/// A filter value supplied for one selector field
#[derive(Clone, Debug)]
pub enum FilterValue {
    /// A scalar literal, matched by equality (or fuzzily for `_like`)
    Literal(Value),
    /// An entity identifier, matched by identity
    Iri(String),
}

impl FilterValue {
    /// Identifier value for a reference field
    pub fn iri(iri: impl Into<String>) -> Self {
        FilterValue::Iri(iri.into())
    }

    /// Text literal value
    pub fn text(s: impl Into<String>) -> Self {
        FilterValue::Literal(Value::Text(s.into()))
    }

    /// Integer literal value
    pub fn int(i: i64) -> Self {
        FilterValue::Literal(Value::Int(i))
    }
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        FilterValue::Literal(v)
    }
}

/// Optional result window for find queries
#[derive(Clone, Copy, Debug, Default)]
pub struct Page {
    /// Maximum number of rows
    pub limit: Option<u64>,
    /// Number of rows to skip
    pub offset: Option<u64>,
}

impl Page {
    /// No windowing
    pub fn all() -> Self {
        Self::default()
    }

    /// First `limit` rows
    pub fn limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    /// `limit` rows starting at `offset`
    pub fn window(limit: u64, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

/// Aggregate ordering direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Ascending by aggregate value
    Asc,
    /// Descending by aggregate value
    Desc,
}

impl Order {
    fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for Order {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Order::Asc),
            "DESC" => Ok(Order::Desc),
            _ => Err(QueryError::InvalidOrder(s.to_string())),
        }
    }
}

/// Grouped aggregate kind
#[derive(Clone, Debug)]
pub enum Aggregate {
    /// Count distinct subjects per group
    Count,
    /// Average a numeric scalar field per group
    Avg(String),
}

/// Compile a find query over conjoined field clauses
pub fn compile_find(
    ty: &EntityType,
    fields: &[SelectorField],
    values: &[(&str, FilterValue)],
    page: Page,
) -> Result<String> {
    let mut query = String::from("SELECT DISTINCT ?s WHERE {\n");
    push_clauses(&mut query, ty, fields, values)?;
    query.push_str("}\nORDER BY ?s");
    if let Some(limit) = page.limit {
        let _ = write!(query, "\nLIMIT {limit}");
    }
    if let Some(offset) = page.offset {
        let _ = write!(query, "\nOFFSET {offset}");
    }
    Ok(query)
}

/// Compile a count query over the same conjoined clauses
pub fn compile_count(
    ty: &EntityType,
    fields: &[SelectorField],
    values: &[(&str, FilterValue)],
) -> Result<String> {
    let mut query = String::from("SELECT (COUNT(DISTINCT ?s) AS ?count) WHERE {\n");
    push_clauses(&mut query, ty, fields, values)?;
    query.push_str("}");
    Ok(query)
}

/// Compile a grouped aggregation over all subjects of the entity's type
pub fn compile_group(
    ty: &EntityType,
    group_field: &str,
    aggregate: &Aggregate,
    order: Order,
) -> Result<String> {
    let group = resolve_field(ty, group_field)?;

    let mut query = String::new();
    match aggregate {
        Aggregate::Count => {
            query.push_str("SELECT ?g (COUNT(DISTINCT ?s) AS ?agg) WHERE {\n");
        }
        Aggregate::Avg(value_field) => {
            let value = resolve_field(ty, value_field)?;
            match value.kind {
                FieldKind::Scalar(kind) if kind.is_numeric() => {}
                _ => return Err(QueryError::NotAggregatable(value_field.to_string())),
            }
            query.push_str("SELECT ?g (AVG(?v) AS ?agg) WHERE {\n");
        }
    }

    let _ = writeln!(
        query,
        "  ?s <{}> <{}> .",
        rdf::TYPE,
        ty.class_iri()
    );
    let _ = writeln!(query, "  ?s <{}> ?g .", group.predicate);
    if let Aggregate::Avg(value_field) = aggregate {
        let value = resolve_field(ty, value_field)?;
        let _ = writeln!(query, "  ?s <{}> ?v .", value.predicate);
    }
    query.push_str("}\nGROUP BY ?g\n");
    let _ = write!(query, "ORDER BY {}(?agg)", order.keyword());
    Ok(query)
}

fn resolve_field<'a>(
    ty: &'a EntityType,
    name: &str,
) -> Result<&'a graphbind_mapper::FieldDescriptor> {
    ty.field(name)
        .ok_or_else(|| graphbind_mapper::MapperError::UnknownField {
            entity: ty.name().to_string(),
            field: name.to_string(),
        })
        .map_err(QueryError::from)
}

fn push_clauses(
    query: &mut String,
    ty: &EntityType,
    fields: &[SelectorField],
    values: &[(&str, FilterValue)],
) -> Result<()> {
    // Type clause first: a query over one entity type never returns
    // subjects of an unrelated type sharing a predicate value.
    let _ = writeln!(query, "  ?s <{}> <{}> .", rdf::TYPE, ty.class_iri());

    for field in fields {
        let descriptor = resolve_field(ty, &field.name)?;
        let value = values
            .iter()
            .find(|(name, _)| *name == field.name)
            .map(|(_, v)| v)
            .ok_or_else(|| QueryError::MissingValue(field.name.clone()))?;

        match (&descriptor.kind, value) {
            (FieldKind::One(_) | FieldKind::Many(_), FilterValue::Iri(iri)) => {
                if field.like {
                    return Err(QueryError::ValueKind {
                        field: field.name.clone(),
                        expected: "an exact identifier match, not a fuzzy one",
                    });
                }
                let _ = writeln!(
                    query,
                    "  ?s <{}> <{}> .",
                    descriptor.predicate,
                    checked_iri(iri)?
                );
            }
            (FieldKind::One(_) | FieldKind::Many(_), FilterValue::Literal(_)) => {
                return Err(QueryError::ValueKind {
                    field: field.name.clone(),
                    expected: "an identifier value",
                });
            }
            (FieldKind::Scalar(_), FilterValue::Iri(_)) => {
                return Err(QueryError::ValueKind {
                    field: field.name.clone(),
                    expected: "a scalar value",
                });
            }
            (FieldKind::Scalar(kind), FilterValue::Literal(literal)) => {
                let var = format!("?v_{}", field.name);
                let _ = writeln!(query, "  ?s <{}> {} .", descriptor.predicate, var);
                if field.like {
                    let fragment = match literal {
                        Value::Text(s) => s.clone(),
                        other => lexical_form(other),
                    };
                    let _ = writeln!(
                        query,
                        "  FILTER regex({}, \"{}\", \"i\")",
                        var,
                        escape_string(&regex::escape(&fragment))
                    );
                } else {
                    let _ = writeln!(
                        query,
                        "  FILTER ({} = {})",
                        var,
                        render_literal(literal, *kind)
                    );
                }
            }
        }
    }
    Ok(())
}

/// Render an equality operand for a scalar filter
///
/// Numeric and boolean values render bare; everything else renders as an
/// escaped string literal compared on lexical form.
fn render_literal(value: &Value, _hint: ScalarKind) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Double(d) => {
            // A bare integer-looking token would parse as an integer
            let s = d.to_string();
            if s.contains(['.', 'e', 'E']) || s == "NaN" || s.contains("inf") {
                s
            } else {
                format!("{s}.0")
            }
        }
        other => format!("\"{}\"", escape_string(&lexical_form(other))),
    }
}

fn lexical_form(value: &Value) -> String {
    use graphbind_mapper::codec;
    match codec::encode(value).as_literal() {
        Some((literal, _)) => literal.lexical(),
        None => String::new(),
    }
}

/// Escape a string for embedding in a SPARQL string literal
///
/// Covers quote, backslash, and control characters, so caller-supplied
/// values can never terminate the literal or inject query text.
pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Validate an identifier value before embedding it in angle brackets
fn checked_iri(iri: &str) -> Result<&str> {
    let clean = !iri.is_empty()
        && !iri.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`')
        });
    if clean {
        Ok(iri)
    } else {
        Err(QueryError::InvalidIri(iri.to_string()))
    }
}

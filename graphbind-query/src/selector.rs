//! Declarative selector parsing
//!
//! A selector name like `find_by_name_and_city_like` is parsed into a typed
//! AST up front: operation, ordered field list, per-field match kind. Parse
//! failures are typed errors raised before any field resolution or query
//! generation happens.

use crate::error::{QueryError, Result};

/// What a selector asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorOp {
    /// `find_by_*` - select matching subjects
    Find,
    /// `count_by_*` - count matching subjects
    Count,
}

/// One field named by a selector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorField {
    /// Field name as declared on the entity type
    pub name: String,
    /// Whether the `_like` suffix requested a fuzzy match
    pub like: bool,
}

/// A parsed selector: operation plus conjoined field list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    /// Find or count
    pub op: SelectorOp,
    /// Fields, in selector order; all clauses are conjoined
    pub fields: Vec<SelectorField>,
}

impl Selector {
    /// Parse a selector name
    ///
    /// Grammar: `find_by_<field>[_and_<field>]*` or
    /// `count_by_<field>[_and_<field>]*`, where a field suffixed `_like`
    /// requests fuzzy matching on that field only.
    pub fn parse(name: &str) -> Result<Selector> {
        let (op, rest) = if let Some(rest) = name.strip_prefix("find_by_") {
            (SelectorOp::Find, rest)
        } else if let Some(rest) = name.strip_prefix("count_by_") {
            (SelectorOp::Count, rest)
        } else {
            return Err(QueryError::UnsupportedSelector(name.to_string()));
        };

        if rest.is_empty() {
            return Err(QueryError::UnsupportedSelector(name.to_string()));
        }

        let mut fields = Vec::new();
        for part in rest.split("_and_") {
            let (field, like) = match part.strip_suffix("_like") {
                Some(stem) => (stem, true),
                None => (part, false),
            };
            if field.is_empty() {
                return Err(QueryError::UnsupportedSelector(name.to_string()));
            }
            fields.push(SelectorField {
                name: field.to_string(),
                like,
            });
        }

        Ok(Selector { op, fields })
    }
}

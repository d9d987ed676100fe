//! Reference in-memory query engine
//!
//! Evaluates exactly the grammar the compiler emits - conjoined triple
//! patterns, equality and case-insensitive regex filters, count and
//! grouped aggregation, ORDER BY / LIMIT / OFFSET - directly against a
//! [`Graph`]. It exists so the repository can be exercised end to end
//! without an external triple store; it is not a general SPARQL engine,
//! and anything outside the canonical grammar is a [`EngineError::Malformed`]
//! fault.

use crate::engine::{QueryEngine, Row};
use crate::error::EngineError;
use graphbind_graph_ir::{Graph, Term};
use regex::RegexBuilder;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// In-memory evaluator for the compiler's canonical query grammar
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryEngine;

impl MemoryEngine {
    /// Create an engine
    pub fn new() -> Self {
        Self
    }
}

impl QueryEngine for MemoryEngine {
    fn select(&self, graph: &Graph, sparql: &str) -> Result<Vec<Row>, EngineError> {
        let query = Query::parse(sparql)?;
        query.evaluate(graph)
    }
}

type Bindings = BTreeMap<String, Term>;

#[derive(Debug)]
enum Projection {
    /// SELECT DISTINCT ?var
    Select { var: String },
    /// SELECT (COUNT(DISTINCT ?var) AS ?alias)
    Count { var: String, alias: String },
    /// SELECT ?key (COUNT(DISTINCT ?var) AS ?alias)
    GroupCount {
        key: String,
        var: String,
        alias: String,
    },
    /// SELECT ?key (AVG(?var) AS ?alias)
    GroupAvg {
        key: String,
        var: String,
        alias: String,
    },
}

#[derive(Debug)]
enum PatternObj {
    Iri(Term),
    Var(String),
}

#[derive(Debug)]
struct Pattern {
    subject: String,
    predicate: Term,
    object: PatternObj,
}

#[derive(Debug)]
enum Operand {
    Str(String),
    Int(i64),
    Double(f64),
    Bool(bool),
}

#[derive(Debug)]
enum Filter {
    Eq { var: String, operand: Operand },
    Regex { var: String, pattern: String },
}

#[derive(Debug)]
enum OrderBy {
    Var(String),
    Agg { alias: String, descending: bool },
}

#[derive(Debug)]
struct Query {
    projection: Projection,
    patterns: Vec<Pattern>,
    filters: Vec<Filter>,
    order: Option<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
}

fn malformed(detail: impl Into<String>) -> EngineError {
    EngineError::Malformed(detail.into())
}

impl Query {
    fn parse(sparql: &str) -> Result<Query, EngineError> {
        let mut lines = sparql.lines().map(str::trim).filter(|l| !l.is_empty());

        let header = lines.next().ok_or_else(|| malformed("empty query"))?;
        let projection = parse_header(header)?;

        let mut patterns = Vec::new();
        let mut filters = Vec::new();
        let mut in_where = true;
        let mut order = None;
        let mut limit = None;
        let mut offset = None;

        for line in lines {
            if in_where {
                if line == "}" {
                    in_where = false;
                } else if let Some(rest) = line.strip_prefix("FILTER regex(") {
                    filters.push(parse_regex_filter(rest)?);
                } else if let Some(rest) = line.strip_prefix("FILTER (") {
                    filters.push(parse_eq_filter(rest)?);
                } else {
                    patterns.push(parse_pattern(line)?);
                }
            } else if let Some(rest) = line.strip_prefix("GROUP BY ?") {
                // Grouping key is fixed by the projection; just check agreement
                let key = match &projection {
                    Projection::GroupCount { key, .. } | Projection::GroupAvg { key, .. } => key,
                    _ => return Err(malformed("GROUP BY without grouped projection")),
                };
                if rest != key {
                    return Err(malformed(format!("GROUP BY ?{rest} does not match ?{key}")));
                }
            } else if let Some(rest) = line.strip_prefix("ORDER BY ") {
                order = Some(parse_order(rest)?);
            } else if let Some(rest) = line.strip_prefix("LIMIT ") {
                limit = Some(rest.parse().map_err(|_| malformed("bad LIMIT"))?);
            } else if let Some(rest) = line.strip_prefix("OFFSET ") {
                offset = Some(rest.parse().map_err(|_| malformed("bad OFFSET"))?);
            } else {
                return Err(malformed(format!("unexpected line: {line}")));
            }
        }

        if in_where {
            return Err(malformed("unterminated WHERE block"));
        }

        Ok(Query {
            projection,
            patterns,
            filters,
            order,
            limit,
            offset,
        })
    }

    fn evaluate(&self, graph: &Graph) -> Result<Vec<Row>, EngineError> {
        let mut solutions: Vec<Bindings> = vec![Bindings::new()];

        for pattern in &self.patterns {
            let mut next = Vec::new();
            for solution in &solutions {
                for triple in graph.iter() {
                    if triple.p != pattern.predicate {
                        continue;
                    }
                    if let Some(bound) = solution.get(&pattern.subject) {
                        if bound != &triple.s {
                            continue;
                        }
                    }
                    let object_binding = match &pattern.object {
                        PatternObj::Iri(term) => {
                            if &triple.o != term {
                                continue;
                            }
                            None
                        }
                        PatternObj::Var(var) => match solution.get(var) {
                            Some(bound) if bound != &triple.o => continue,
                            Some(_) => None,
                            None => Some((var.clone(), triple.o.clone())),
                        },
                    };
                    let mut extended = solution.clone();
                    extended.insert(pattern.subject.clone(), triple.s.clone());
                    if let Some((var, term)) = object_binding {
                        extended.insert(var, term);
                    }
                    next.push(extended);
                }
            }
            solutions = next;
        }

        for filter in &self.filters {
            solutions = apply_filter(filter, solutions)?;
        }

        let mut rows = self.project(&solutions)?;

        if let Some(offset) = self.offset {
            let offset = offset.min(rows.len() as u64) as usize;
            rows.drain(..offset);
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    fn project(&self, solutions: &[Bindings]) -> Result<Vec<Row>, EngineError> {
        match &self.projection {
            Projection::Select { var } => {
                let mut terms = distinct_terms(solutions, var);
                match &self.order {
                    Some(OrderBy::Var(order_var)) if order_var == var => terms.sort(),
                    Some(OrderBy::Var(_)) => {
                        return Err(malformed("ORDER BY variable is not projected"))
                    }
                    Some(OrderBy::Agg { .. }) => {
                        return Err(malformed("aggregate ordering without aggregation"))
                    }
                    None => {}
                }
                Ok(terms
                    .into_iter()
                    .map(|term| {
                        let mut row = Row::new();
                        row.bind(var.clone(), term);
                        row
                    })
                    .collect())
            }
            Projection::Count { var, alias } => {
                let count = distinct_terms(solutions, var).len();
                let mut row = Row::new();
                row.bind(alias.clone(), Term::integer(count as i64));
                Ok(vec![row])
            }
            Projection::GroupCount { key, var, alias } => {
                let mut groups: Vec<(Term, FxHashSet<Term>)> = Vec::new();
                for solution in solutions {
                    let (Some(k), Some(v)) = (solution.get(key), solution.get(var)) else {
                        continue;
                    };
                    match groups.iter_mut().find(|(g, _)| g == k) {
                        Some((_, members)) => {
                            members.insert(v.clone());
                        }
                        None => {
                            let mut members = FxHashSet::default();
                            members.insert(v.clone());
                            groups.push((k.clone(), members));
                        }
                    }
                }
                let mut rows: Vec<(Term, f64, Term)> = groups
                    .into_iter()
                    .map(|(g, members)| {
                        let n = members.len();
                        (g, n as f64, Term::integer(n as i64))
                    })
                    .collect();
                self.order_grouped(&mut rows)?;
                Ok(finish_grouped(rows, key, alias))
            }
            Projection::GroupAvg { key, var, alias } => {
                let mut groups: Vec<(Term, Vec<f64>)> = Vec::new();
                for solution in solutions {
                    let (Some(k), Some(v)) = (solution.get(key), solution.get(var)) else {
                        continue;
                    };
                    let number = v
                        .as_literal()
                        .and_then(|(value, _)| value.as_double())
                        .ok_or_else(|| malformed("AVG over non-numeric value"))?;
                    match groups.iter_mut().find(|(g, _)| g == k) {
                        Some((_, values)) => values.push(number),
                        None => groups.push((k.clone(), vec![number])),
                    }
                }
                let mut rows: Vec<(Term, f64, Term)> = groups
                    .into_iter()
                    .map(|(g, values)| {
                        let avg = values.iter().sum::<f64>() / values.len() as f64;
                        (g, avg, Term::double(avg))
                    })
                    .collect();
                self.order_grouped(&mut rows)?;
                Ok(finish_grouped(rows, key, alias))
            }
        }
    }

    fn order_grouped(&self, rows: &mut [(Term, f64, Term)]) -> Result<(), EngineError> {
        match &self.order {
            Some(OrderBy::Agg { descending, .. }) => {
                // Stable sort: ties keep first-encounter order
                rows.sort_by(|a, b| {
                    let ord = a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal);
                    if *descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                });
                Ok(())
            }
            Some(OrderBy::Var(_)) => Err(malformed("grouped query ordered by plain variable")),
            None => Ok(()),
        }
    }
}

fn finish_grouped(rows: Vec<(Term, f64, Term)>, key: &str, alias: &str) -> Vec<Row> {
    rows.into_iter()
        .map(|(group, _, aggregate)| {
            let mut row = Row::new();
            row.bind(key.to_string(), group);
            row.bind(alias.to_string(), aggregate);
            row
        })
        .collect()
}

fn distinct_terms(solutions: &[Bindings], var: &str) -> Vec<Term> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for solution in solutions {
        if let Some(term) = solution.get(var) {
            if seen.insert(term.clone()) {
                out.push(term.clone());
            }
        }
    }
    out
}

fn apply_filter(filter: &Filter, solutions: Vec<Bindings>) -> Result<Vec<Bindings>, EngineError> {
    match filter {
        Filter::Eq { var, operand } => Ok(solutions
            .into_iter()
            .filter(|solution| {
                solution
                    .get(var)
                    .is_some_and(|term| operand_matches(term, operand))
            })
            .collect()),
        Filter::Regex { var, pattern } => {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| malformed(format!("bad regex: {e}")))?;
            Ok(solutions
                .into_iter()
                .filter(|solution| {
                    solution.get(var).is_some_and(|term| match term {
                        Term::Literal { value, .. } => regex.is_match(&value.lexical()),
                        Term::Iri(iri) => regex.is_match(iri),
                        Term::BlankNode(_) => false,
                    })
                })
                .collect())
        }
    }
}

fn operand_matches(term: &Term, operand: &Operand) -> bool {
    let Some((value, _)) = term.as_literal() else {
        return false;
    };
    match operand {
        Operand::Str(s) => value.lexical() == *s,
        Operand::Int(i) => value.as_integer() == Some(*i) || value.lexical() == i.to_string(),
        Operand::Double(d) => value.as_double() == Some(*d),
        Operand::Bool(b) => value.as_bool() == Some(*b) || value.lexical() == b.to_string(),
    }
}

fn parse_header(line: &str) -> Result<Projection, EngineError> {
    let body = line
        .strip_prefix("SELECT ")
        .and_then(|r| r.strip_suffix(" WHERE {"))
        .ok_or_else(|| malformed(format!("bad header: {line}")))?;

    if let Some(var) = body.strip_prefix("DISTINCT ?") {
        return Ok(Projection::Select {
            var: var.to_string(),
        });
    }
    if body.starts_with('(') {
        let (var, alias) = parse_count_aggregate(body)?;
        return Ok(Projection::Count { var, alias });
    }
    if let Some(rest) = body.strip_prefix('?') {
        let (key, aggregate) = rest
            .split_once(' ')
            .ok_or_else(|| malformed("grouped header without aggregate"))?;
        if let Ok((var, alias)) = parse_count_aggregate(aggregate) {
            return Ok(Projection::GroupCount {
                key: key.to_string(),
                var,
                alias,
            });
        }
        let (var, alias) = parse_avg_aggregate(aggregate)?;
        return Ok(Projection::GroupAvg {
            key: key.to_string(),
            var,
            alias,
        });
    }
    Err(malformed(format!("bad header: {line}")))
}

/// `(COUNT(DISTINCT ?var) AS ?alias)` -> (var, alias)
fn parse_count_aggregate(s: &str) -> Result<(String, String), EngineError> {
    let inner = s
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| malformed("bad aggregate"))?;
    let (func, alias) = inner
        .split_once(" AS ?")
        .ok_or_else(|| malformed("aggregate without alias"))?;
    let var = func
        .strip_prefix("COUNT(DISTINCT ?")
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| malformed("not a COUNT aggregate"))?;
    Ok((var.to_string(), alias.to_string()))
}

/// `(AVG(?var) AS ?alias)` -> (var, alias)
fn parse_avg_aggregate(s: &str) -> Result<(String, String), EngineError> {
    let inner = s
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| malformed("bad aggregate"))?;
    let (func, alias) = inner
        .split_once(" AS ?")
        .ok_or_else(|| malformed("aggregate without alias"))?;
    let var = func
        .strip_prefix("AVG(?")
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| malformed("not an AVG aggregate"))?;
    Ok((var.to_string(), alias.to_string()))
}

/// `?s <pred> <iri> .` or `?s <pred> ?var .`
fn parse_pattern(line: &str) -> Result<Pattern, EngineError> {
    let body = line
        .strip_suffix(" .")
        .ok_or_else(|| malformed(format!("pattern without terminator: {line}")))?;
    let mut tokens = body.split_whitespace();
    let subject = tokens
        .next()
        .and_then(|t| t.strip_prefix('?'))
        .ok_or_else(|| malformed("pattern subject must be a variable"))?;
    let predicate = tokens
        .next()
        .and_then(parse_iri_token)
        .ok_or_else(|| malformed("pattern predicate must be an IRI"))?;
    let object_token = tokens
        .next()
        .ok_or_else(|| malformed("pattern missing object"))?;
    if tokens.next().is_some() {
        return Err(malformed(format!("trailing tokens in pattern: {line}")));
    }

    let object = if let Some(var) = object_token.strip_prefix('?') {
        PatternObj::Var(var.to_string())
    } else {
        PatternObj::Iri(
            parse_iri_token(object_token)
                .ok_or_else(|| malformed("pattern object must be an IRI or variable"))?,
        )
    };

    Ok(Pattern {
        subject: subject.to_string(),
        predicate,
        object,
    })
}

fn parse_iri_token(token: &str) -> Option<Term> {
    token
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .map(Term::iri)
}

/// Remainder of `FILTER (?var = operand)` after the open paren
fn parse_eq_filter(rest: &str) -> Result<Filter, EngineError> {
    let body = rest
        .strip_suffix(')')
        .ok_or_else(|| malformed("unterminated FILTER"))?;
    let (var, operand) = body
        .split_once(" = ")
        .ok_or_else(|| malformed("FILTER without comparison"))?;
    let var = var
        .strip_prefix('?')
        .ok_or_else(|| malformed("FILTER operand must be a variable"))?;
    Ok(Filter::Eq {
        var: var.to_string(),
        operand: parse_operand(operand)?,
    })
}

/// Remainder of `FILTER regex(?var, "pattern", "i")` after `FILTER regex(`
fn parse_regex_filter(rest: &str) -> Result<Filter, EngineError> {
    let body = rest
        .strip_suffix(", \"i\")")
        .ok_or_else(|| malformed("regex filter must be case-insensitive"))?;
    let (var, pattern) = body
        .split_once(", ")
        .ok_or_else(|| malformed("regex filter missing pattern"))?;
    let var = var
        .strip_prefix('?')
        .ok_or_else(|| malformed("regex filter must test a variable"))?;
    let pattern = pattern
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .ok_or_else(|| malformed("regex pattern must be quoted"))?;
    Ok(Filter::Regex {
        var: var.to_string(),
        pattern: unescape_string(pattern)?,
    })
}

fn parse_operand(token: &str) -> Result<Operand, EngineError> {
    if let Some(quoted) = token.strip_prefix('"') {
        let inner = quoted
            .strip_suffix('"')
            .ok_or_else(|| malformed("unterminated string operand"))?;
        return Ok(Operand::Str(unescape_string(inner)?));
    }
    match token {
        "true" => return Ok(Operand::Bool(true)),
        "false" => return Ok(Operand::Bool(false)),
        _ => {}
    }
    if let Ok(i) = token.parse::<i64>() {
        return Ok(Operand::Int(i));
    }
    token
        .parse::<f64>()
        .map(Operand::Double)
        .map_err(|_| malformed(format!("bad operand: {token}")))
}

fn parse_order(rest: &str) -> Result<OrderBy, EngineError> {
    if let Some(var) = rest.strip_prefix('?') {
        return Ok(OrderBy::Var(var.to_string()));
    }
    let (descending, inner) = if let Some(inner) = rest.strip_prefix("DESC(") {
        (true, inner)
    } else if let Some(inner) = rest.strip_prefix("ASC(") {
        (false, inner)
    } else {
        return Err(malformed(format!("bad ORDER BY: {rest}")));
    };
    let alias = inner
        .strip_prefix('?')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| malformed("ORDER BY aggregate must name an alias"))?;
    Ok(OrderBy::Agg {
        alias: alias.to_string(),
        descending,
    })
}

/// Reverse of the compiler's string-literal escaping
fn unescape_string(s: &str) -> Result<String, EngineError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| malformed("bad unicode escape"))?;
                out.push(char::from_u32(code).ok_or_else(|| malformed("bad unicode escape"))?);
            }
            _ => return Err(malformed("bad escape sequence")),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphbind_vocab::rdf;

    const EX: &str = "http://example.org/";

    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        for (id, name) in [("1", "Alice"), ("2", "Bob"), ("3", "alina")] {
            let s = Term::iri(format!("{EX}person/{id}"));
            graph.add(s.clone(), Term::iri(rdf::TYPE), Term::iri(format!("{EX}Person")));
            graph.add(s, Term::iri(format!("{EX}name")), Term::string(name));
        }
        graph
    }

    fn select(graph: &Graph, sparql: &str) -> Vec<Row> {
        MemoryEngine::new().select(graph, sparql).unwrap()
    }

    #[test]
    fn equality_filter_selects_one_subject() {
        let graph = sample_graph();
        let rows = select(
            &graph,
            &format!(
                "SELECT DISTINCT ?s WHERE {{\n  ?s <{}> <{EX}Person> .\n  ?s <{EX}name> ?v .\n  FILTER (?v = \"Bob\")\n}}\nORDER BY ?s",
                rdf::TYPE
            ),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("s"),
            Some(&Term::iri(format!("{EX}person/2")))
        );
    }

    #[test]
    fn regex_filter_is_case_insensitive() {
        let graph = sample_graph();
        let rows = select(
            &graph,
            &format!(
                "SELECT DISTINCT ?s WHERE {{\n  ?s <{}> <{EX}Person> .\n  ?s <{EX}name> ?v .\n  FILTER regex(?v, \"ali\", \"i\")\n}}\nORDER BY ?s",
                rdf::TYPE
            ),
        );
        // Alice and alina both contain "ali" case-insensitively
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn count_returns_single_row() {
        let graph = sample_graph();
        let rows = select(
            &graph,
            &format!(
                "SELECT (COUNT(DISTINCT ?s) AS ?count) WHERE {{\n  ?s <{}> <{EX}Person> .\n}}",
                rdf::TYPE
            ),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("count"), Some(&Term::integer(3)));
    }

    #[test]
    fn count_of_nothing_is_zero() {
        let graph = sample_graph();
        let rows = select(
            &graph,
            &format!(
                "SELECT (COUNT(DISTINCT ?s) AS ?count) WHERE {{\n  ?s <{}> <{EX}Ghost> .\n}}",
                rdf::TYPE
            ),
        );
        assert_eq!(rows[0].get("count"), Some(&Term::integer(0)));
    }

    #[test]
    fn order_limit_offset_window() {
        let graph = sample_graph();
        let query = format!(
            "SELECT DISTINCT ?s WHERE {{\n  ?s <{}> <{EX}Person> .\n}}\nORDER BY ?s\nLIMIT 2\nOFFSET 1",
            rdf::TYPE
        );
        let rows = select(&graph, &query);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get("s"),
            Some(&Term::iri(format!("{EX}person/2")))
        );
    }

    #[test]
    fn grouped_count_orders_by_aggregate() {
        let mut graph = Graph::new();
        for (id, state) in [("1", "A"), ("2", "A"), ("3", "B"), ("4", "C")] {
            let s = Term::iri(format!("{EX}sub/{id}"));
            graph.add(s.clone(), Term::iri(rdf::TYPE), Term::iri(format!("{EX}T")));
            graph.add(s, Term::iri(format!("{EX}state")), Term::string(state));
        }
        let query = format!(
            "SELECT ?g (COUNT(DISTINCT ?s) AS ?agg) WHERE {{\n  ?s <{}> <{EX}T> .\n  ?s <{EX}state> ?g .\n}}\nGROUP BY ?g\nORDER BY DESC(?agg)",
            rdf::TYPE
        );
        let rows = select(&graph, &query);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("g"), Some(&Term::string("A")));
        assert_eq!(rows[0].get("agg"), Some(&Term::integer(2)));
    }

    #[test]
    fn unknown_grammar_is_malformed() {
        let graph = Graph::new();
        let result = MemoryEngine::new().select(&graph, "ASK { ?s ?p ?o }");
        assert!(matches!(result, Err(EngineError::Malformed(_))));
    }
}

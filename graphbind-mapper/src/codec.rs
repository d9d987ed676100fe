//! Literal codec: native scalar values <-> typed RDF literals
//!
//! A total, stateless, bidirectional mapping. Encoding picks the XSD
//! datatype from the value's native kind; decoding dispatches on the
//! literal's declared datatype. A literal with an unrecognized datatype
//! decodes to its lexical form as text, unchanged. Round-tripping any
//! supported native kind reproduces an equal value.

use crate::error::{MapperError, Result};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};
use graphbind_graph_ir::{Datatype, LiteralValue, Term};
use graphbind_vocab::xsd;

/// Encode a native scalar value into a typed literal term
pub fn encode(value: &Value) -> Term {
    match value {
        Value::Bool(b) => Term::boolean(*b),
        Value::Int(i) => Term::integer(*i),
        Value::Double(d) => Term::double(*d),
        Value::Date(d) => Term::typed(d.format("%Y-%m-%d").to_string(), Datatype::xsd_date()),
        Value::DateTime(dt) => Term::typed(
            dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Datatype::xsd_date_time(),
        ),
        Value::Text(s) => Term::string(s),
    }
}

/// Decode a typed literal term back into a native scalar value
///
/// Errors when the term is not a literal, or when a recognized datatype
/// carries a lexical form that does not parse under it.
pub fn decode(term: &Term) -> Result<Value> {
    let (value, datatype) = term.as_literal().ok_or(MapperError::UnexpectedObject {
        predicate: String::new(),
        expected: "a literal",
    })?;

    match datatype.as_iri() {
        xsd::BOOLEAN => decode_bool(value, datatype),
        xsd::INTEGER => decode_int(value, datatype),
        xsd::DOUBLE => decode_double(value, datatype),
        xsd::DATE => {
            let lexical = value.lexical();
            let date: NaiveDate = lexical
                .parse()
                .map_err(|_| parse_error(datatype, &lexical))?;
            Ok(Value::Date(date))
        }
        xsd::DATE_TIME => {
            let lexical = value.lexical();
            let dt: NaiveDateTime = lexical
                .parse()
                .map_err(|_| parse_error(datatype, &lexical))?;
            Ok(Value::DateTime(dt))
        }
        // xsd:string and any unrecognized datatype: text form unchanged
        _ => Ok(Value::Text(value.lexical())),
    }
}

fn decode_bool(value: &LiteralValue, datatype: &Datatype) -> Result<Value> {
    if let Some(b) = value.as_bool() {
        return Ok(Value::Bool(b));
    }
    // Lexical form, e.g. from a parsed interchange graph
    match value.lexical().as_str() {
        "true" | "1" => Ok(Value::Bool(true)),
        "false" | "0" => Ok(Value::Bool(false)),
        other => Err(parse_error(datatype, other)),
    }
}

fn decode_int(value: &LiteralValue, datatype: &Datatype) -> Result<Value> {
    if let Some(i) = value.as_integer() {
        return Ok(Value::Int(i));
    }
    let lexical = value.lexical();
    lexical
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| parse_error(datatype, &lexical))
}

fn decode_double(value: &LiteralValue, datatype: &Datatype) -> Result<Value> {
    if let Some(d) = value.as_double() {
        return Ok(Value::Double(d));
    }
    let lexical = value.lexical();
    lexical
        .parse::<f64>()
        .map(Value::Double)
        .map_err(|_| parse_error(datatype, &lexical))
}

fn parse_error(datatype: &Datatype, lexical: &str) -> MapperError {
    MapperError::LiteralParse {
        datatype: datatype.as_iri().to_string(),
        lexical: lexical.to_string(),
    }
}

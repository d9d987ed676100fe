//! RDF literal datatype representation
//!
//! Datatypes are always explicit in this IR - there is no "untyped" literal.
//! Plain strings default to `xsd:string`.

use graphbind_vocab::xsd;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// RDF literal datatype, stored as an expanded IRI
///
/// Use the named constructors for the datatypes the literal codec knows;
/// `from_iri` accepts any datatype IRI, which decodes to its lexical form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Datatype(Arc<str>);

impl Datatype {
    /// Create a datatype from an expanded IRI
    pub fn from_iri(iri: impl AsRef<str>) -> Self {
        Datatype(Arc::from(iri.as_ref()))
    }

    /// xsd:string - default for plain string literals
    pub fn xsd_string() -> Self {
        Self::from_iri(xsd::STRING)
    }

    /// xsd:boolean
    pub fn xsd_boolean() -> Self {
        Self::from_iri(xsd::BOOLEAN)
    }

    /// xsd:integer
    pub fn xsd_integer() -> Self {
        Self::from_iri(xsd::INTEGER)
    }

    /// xsd:double
    pub fn xsd_double() -> Self {
        Self::from_iri(xsd::DOUBLE)
    }

    /// xsd:date
    pub fn xsd_date() -> Self {
        Self::from_iri(xsd::DATE)
    }

    /// xsd:dateTime
    pub fn xsd_date_time() -> Self {
        Self::from_iri(xsd::DATE_TIME)
    }

    /// Get the IRI representation of this datatype
    pub fn as_iri(&self) -> &str {
        &self.0
    }

    /// Check if this is the xsd:string datatype
    pub fn is_xsd_string(&self) -> bool {
        self.as_iri() == xsd::STRING
    }

    /// Check if this is a numeric datatype (integer or double)
    pub fn is_numeric(&self) -> bool {
        matches!(self.as_iri(), xsd::INTEGER | xsd::DOUBLE)
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_iri())
    }
}

//! RDF vocabulary constants for graphbind
//!
//! This crate provides a centralized location for the RDF vocabulary IRIs
//! used throughout the graphbind crates.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `shacl` - SHACL vocabulary (http://www.w3.org/ns/shacl#)
//!
//! All constants are fully expanded IRIs, never prefixed forms.

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// SHACL vocabulary constants
pub mod shacl {
    /// SHACL namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/shacl#";

    /// sh:NodeShape IRI
    pub const NODE_SHAPE: &str = "http://www.w3.org/ns/shacl#NodeShape";

    /// sh:targetClass IRI
    pub const TARGET_CLASS: &str = "http://www.w3.org/ns/shacl#targetClass";

    /// sh:property IRI
    pub const PROPERTY: &str = "http://www.w3.org/ns/shacl#property";

    /// sh:path IRI
    pub const PATH: &str = "http://www.w3.org/ns/shacl#path";

    /// sh:datatype IRI
    pub const DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";

    /// sh:class IRI
    pub const CLASS: &str = "http://www.w3.org/ns/shacl#class";

    /// sh:nodeKind IRI
    pub const NODE_KIND: &str = "http://www.w3.org/ns/shacl#nodeKind";

    /// sh:IRI IRI (node kind value)
    pub const IRI: &str = "http://www.w3.org/ns/shacl#IRI";

    /// sh:minCount IRI
    pub const MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";

    /// sh:maxCount IRI
    pub const MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xsd_iris_are_expanded() {
        assert!(xsd::STRING.starts_with("http://www.w3.org/2001/XMLSchema#"));
        assert!(xsd::DATE_TIME.ends_with("#dateTime"));
    }

    #[test]
    fn shacl_iris_share_namespace() {
        for iri in [
            shacl::NODE_SHAPE,
            shacl::TARGET_CLASS,
            shacl::PROPERTY,
            shacl::PATH,
            shacl::DATATYPE,
            shacl::MIN_COUNT,
            shacl::MAX_COUNT,
        ] {
            assert!(iri.starts_with(shacl::NS));
        }
    }
}

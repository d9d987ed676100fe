//! RDF triple: one (subject, predicate, object) fact

use crate::Term;
use serde::{Deserialize, Serialize};

/// A single RDF triple
///
/// # Invariants
///
/// - `s` is an IRI or blank node
/// - `p` is always an IRI
/// - `o` may be any term
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    /// Subject term
    pub s: Term,
    /// Predicate term
    pub p: Term,
    /// Object term
    pub o: Term,
}

impl Triple {
    /// Create a new triple
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}

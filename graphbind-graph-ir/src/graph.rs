//! RDF graph - an insertion-ordered set of triples
//!
//! The `Graph` type keeps set semantics (duplicate triples collapse on
//! insertion) while preserving first-insertion order for iteration. That
//! order is what multi-valued object lookups report, which makes
//! serialization and reconstruction deterministic.

use crate::{Term, Triple};
use graphbind_vocab::rdf;
use rustc_hash::FxHashSet;

/// An insertion-ordered set of RDF triples
///
/// # Design Decisions
///
/// - **Set semantics**: `insert` drops duplicates, so graph union is plain
///   insertion of the other graph's triples.
/// - **Insertion order preserved**: iteration and the `objects` lookup yield
///   triples in first-insertion order.
///
/// # Example
///
/// ```
/// use graphbind_graph_ir::{Graph, Term, Triple};
///
/// let mut graph = Graph::new();
/// let t = Triple::new(
///     Term::iri("http://example.org/alice"),
///     Term::iri("http://xmlns.com/foaf/0.1/name"),
///     Term::string("Alice"),
/// );
/// assert!(graph.insert(t.clone()));
/// assert!(!graph.insert(t)); // duplicate collapses
/// assert_eq!(graph.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// Triples in first-insertion order
    triples: Vec<Triple>,
    /// Membership index for set semantics
    seen: FxHashSet<Triple>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple, collapsing duplicates
    ///
    /// Returns true if the triple was not already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Insert a triple by components
    pub fn add(&mut self, s: Term, p: Term, o: Term) {
        self.insert(Triple::new(s, p, o));
    }

    /// Union another graph into this one (duplicates collapse)
    pub fn union(&mut self, other: &Graph) {
        for triple in other.iter() {
            self.insert(triple.clone());
        }
    }

    /// Get the number of distinct triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Check membership of a triple
    pub fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    /// Check membership by components
    pub fn has(&self, s: &Term, p: &Term, o: &Term) -> bool {
        self.contains(&Triple::new(s.clone(), p.clone(), o.clone()))
    }

    /// Iterate over triples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Get a reference to the triples
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Get all triples (consuming the graph)
    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }

    /// Look up the unique object for a subject/predicate pair
    ///
    /// Returns the first bound object in insertion order, or None if the
    /// pair is absent.
    pub fn value(&self, s: &Term, p: &Term) -> Option<&Term> {
        self.triples
            .iter()
            .find(|t| &t.s == s && &t.p == p)
            .map(|t| &t.o)
    }

    /// Look up every object bound to a subject/predicate pair
    ///
    /// Objects are returned in insertion order.
    pub fn objects<'a>(&'a self, s: &'a Term, p: &'a Term) -> impl Iterator<Item = &'a Term> {
        self.triples
            .iter()
            .filter(move |t| &t.s == s && &t.p == p)
            .map(|t| &t.o)
    }

    /// Get all distinct subjects in insertion order
    pub fn subjects(&self) -> Vec<&Term> {
        let mut out: Vec<&Term> = Vec::new();
        let mut seen: FxHashSet<&Term> = FxHashSet::default();
        for t in &self.triples {
            if seen.insert(&t.s) {
                out.push(&t.s);
            }
        }
        out
    }

    /// Get all distinct subjects carrying `rdf:type <class>`
    pub fn subjects_of_type(&self, class_iri: &str) -> Vec<&Term> {
        let rdf_type = Term::iri(rdf::TYPE);
        let class = Term::iri(class_iri);
        let mut out: Vec<&Term> = Vec::new();
        let mut seen: FxHashSet<&Term> = FxHashSet::default();
        for t in &self.triples {
            if t.p == rdf_type && t.o == class && seen.insert(&t.s) {
                out.push(&t.s);
            }
        }
        out
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut graph = Graph::new();
        for triple in iter {
            graph.insert(triple);
        }
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_graph() -> Graph {
        let mut graph = Graph::new();

        graph.add(
            Term::iri("http://example.org/bob"),
            Term::iri("http://xmlns.com/foaf/0.1/name"),
            Term::string("Bob"),
        );
        graph.add(
            Term::iri("http://example.org/alice"),
            Term::iri("http://xmlns.com/foaf/0.1/name"),
            Term::string("Alice"),
        );
        graph.add(
            Term::iri("http://example.org/alice"),
            Term::iri("http://xmlns.com/foaf/0.1/knows"),
            Term::iri("http://example.org/bob"),
        );
        graph.add(
            Term::iri("http://example.org/alice"),
            Term::iri("http://xmlns.com/foaf/0.1/knows"),
            Term::iri("http://example.org/carol"),
        );

        graph
    }

    #[test]
    fn insert_collapses_duplicates() {
        let mut graph = Graph::new();
        let triple = Triple::new(
            Term::iri("http://example.org/s"),
            Term::iri("http://example.org/p"),
            Term::string("o"),
        );

        assert!(graph.insert(triple.clone()));
        assert!(!graph.insert(triple.clone()));
        assert!(!graph.insert(triple));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn union_is_set_union() {
        let mut a = make_test_graph();
        let b = make_test_graph();
        let before = a.len();

        a.union(&b);
        assert_eq!(a.len(), before);
    }

    #[test]
    fn value_returns_first_binding() {
        let graph = make_test_graph();
        let alice = Term::iri("http://example.org/alice");
        let knows = Term::iri("http://xmlns.com/foaf/0.1/knows");

        assert_eq!(
            graph.value(&alice, &knows),
            Some(&Term::iri("http://example.org/bob"))
        );
        assert_eq!(
            graph.value(&alice, &Term::iri("http://example.org/missing")),
            None
        );
    }

    #[test]
    fn objects_preserve_insertion_order() {
        let graph = make_test_graph();
        let alice = Term::iri("http://example.org/alice");
        let knows = Term::iri("http://xmlns.com/foaf/0.1/knows");

        let objects: Vec<_> = graph.objects(&alice, &knows).collect();
        assert_eq!(
            objects,
            vec![
                &Term::iri("http://example.org/bob"),
                &Term::iri("http://example.org/carol"),
            ]
        );
    }

    #[test]
    fn subjects_are_distinct_in_order() {
        let graph = make_test_graph();
        let subjects = graph.subjects();

        assert_eq!(
            subjects,
            vec![
                &Term::iri("http://example.org/bob"),
                &Term::iri("http://example.org/alice"),
            ]
        );
    }

    #[test]
    fn subjects_of_type_filters_class() {
        let mut graph = Graph::new();
        graph.add(
            Term::iri("http://example.org/alice"),
            Term::iri(rdf::TYPE),
            Term::iri("http://example.org/Person"),
        );
        graph.add(
            Term::iri("http://example.org/acme"),
            Term::iri(rdf::TYPE),
            Term::iri("http://example.org/Company"),
        );

        let people = graph.subjects_of_type("http://example.org/Person");
        assert_eq!(people, vec![&Term::iri("http://example.org/alice")]);
    }

    #[test]
    fn from_iterator_dedupes() {
        let triple = Triple::new(
            Term::iri("http://example.org/s"),
            Term::iri("http://example.org/p"),
            Term::string("o"),
        );
        let graph: Graph = vec![triple.clone(), triple].into_iter().collect();
        assert_eq!(graph.len(), 1);
    }
}

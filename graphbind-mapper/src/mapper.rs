//! Bidirectional object graph <-> RDF graph mapping
//!
//! Serialization walks an instance graph depth-first, emitting one type
//! triple per subject and one triple per set field, with a visited-subject
//! set breaking reference cycles: a subject already visited in the current
//! call tree gets its link triple but is not expanded again. Sharing one
//! visited set across a batch (`to_rdf_many`) deduplicates subjects
//! reachable from more than one root.
//!
//! Deserialization reverses the walk with an identifier->instance memo:
//! instances register in the memo *before* their fields populate, so a
//! field referring back to an in-progress subject resolves to that same
//! instance instead of recursing forever. The memo is also what makes two
//! referrers of one subject share a single reconstructed instance.

use crate::codec;
use crate::error::{MapperError, Result};
use crate::schema::{EntityType, FieldKind, SchemaRegistry};
use crate::value::{Entity, EntityRef, FieldValue};
use graphbind_graph_ir::{Graph, Term};
use graphbind_vocab::rdf;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

/// Set of subject IRIs already expanded in one serialization call tree
pub type VisitedSet = FxHashSet<Arc<str>>;

/// Identifier -> reconstructed instance memo for one deserialization call tree
pub type InstanceMemo = FxHashMap<Arc<str>, EntityRef>;

/// The serializer/deserializer, bound to a frozen schema registry
#[derive(Clone)]
pub struct GraphMapper {
    registry: Arc<SchemaRegistry>,
}

impl GraphMapper {
    /// Create a mapper over a frozen registry
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this mapper resolves types against
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Serialize one instance and everything reachable from it
    pub fn to_rdf(&self, entity: &EntityRef) -> Result<Graph> {
        let mut visited = VisitedSet::default();
        self.to_rdf_with_visited(entity, &mut visited)
    }

    /// Serialize a batch of roots through one shared visited set
    ///
    /// Subjects reachable from more than one root are expanded exactly once,
    /// so the union graph carries one type triple per distinct subject.
    pub fn to_rdf_many(&self, entities: &[EntityRef]) -> Result<Graph> {
        let mut visited = VisitedSet::default();
        let mut graph = Graph::new();
        for entity in entities {
            self.serialize_into(entity, &mut visited, &mut graph)?;
        }
        debug!(
            roots = entities.len(),
            triples = graph.len(),
            "serialized instance batch"
        );
        Ok(graph)
    }

    /// Serialize one instance through a caller-supplied visited set
    ///
    /// Lets callers span several top-level calls with one cycle/dedup scope.
    /// The visited set must not be shared across threads or across unrelated
    /// instance graphs.
    pub fn to_rdf_with_visited(&self, entity: &EntityRef, visited: &mut VisitedSet) -> Result<Graph> {
        let mut graph = Graph::new();
        self.serialize_into(entity, visited, &mut graph)?;
        debug!(
            subject = %entity.borrow().id(),
            triples = graph.len(),
            "serialized instance"
        );
        Ok(graph)
    }

    fn serialize_into(
        &self,
        entity: &EntityRef,
        visited: &mut VisitedSet,
        graph: &mut Graph,
    ) -> Result<()> {
        let entity = entity.borrow();
        if visited.contains(entity.id()) {
            // Already expanded in this call tree; the referrer's link triple
            // is all that remains to emit.
            return Ok(());
        }
        visited.insert(Arc::clone(entity.id()));

        let ty = self.registry.entity(entity.type_name())?;
        let subject = Term::iri(entity.id().as_ref());
        graph.add(
            subject.clone(),
            Term::iri(rdf::TYPE),
            Term::iri(ty.class_iri().as_ref()),
        );

        for field in ty.fields() {
            let Some(value) = entity.get(&field.name) else {
                continue;
            };
            let predicate = Term::iri(field.predicate.as_ref());
            match (&field.kind, value) {
                (FieldKind::Scalar(_), FieldValue::Scalar(v)) => {
                    graph.add(subject.clone(), predicate, codec::encode(v));
                }
                (FieldKind::One(_), FieldValue::One(target)) => {
                    let target_id = Arc::clone(target.borrow().id());
                    graph.add(subject.clone(), predicate, Term::iri(target_id.as_ref()));
                    self.serialize_into(target, visited, graph)?;
                }
                (FieldKind::Many(_), FieldValue::Many(targets)) => {
                    for target in targets {
                        let target_id = Arc::clone(target.borrow().id());
                        graph.add(
                            subject.clone(),
                            predicate.clone(),
                            Term::iri(target_id.as_ref()),
                        );
                        self.serialize_into(target, visited, graph)?;
                    }
                }
                (kind, _) => {
                    return Err(MapperError::KindMismatch {
                        entity: entity.type_name().to_string(),
                        field: field.name.clone(),
                        expected: match kind {
                            FieldKind::Scalar(_) => "scalar",
                            FieldKind::One(_) => "single-reference",
                            FieldKind::Many(_) => "reference-collection",
                        },
                    });
                }
            }
        }
        Ok(())
    }

    /// Reconstruct an instance of `type_name` rooted at `subject`
    ///
    /// A subject with no triples in the graph still yields an instance with
    /// its identifier set and every field unset; absence is not an error.
    pub fn from_rdf(&self, graph: &Graph, type_name: &str, subject: &str) -> Result<EntityRef> {
        let mut memo = InstanceMemo::default();
        self.from_rdf_with_memo(graph, type_name, subject, &mut memo)
    }

    /// Reconstruct through a caller-supplied identifier memo
    ///
    /// Sharing one memo across several calls makes overlapping result sets
    /// share reconstructed instances instead of duplicating them.
    pub fn from_rdf_with_memo(
        &self,
        graph: &Graph,
        type_name: &str,
        subject: &str,
        memo: &mut InstanceMemo,
    ) -> Result<EntityRef> {
        if let Some(existing) = memo.get(subject) {
            return Ok(Rc::clone(existing));
        }

        let ty = Arc::clone(self.registry.entity(type_name)?);

        // A declared type in the graph must agree with the requested type.
        // No type triple at all is fine; the subject may simply be absent.
        let subject_term = Term::iri(subject);
        if let Some(actual) = graph
            .value(&subject_term, &Term::iri(rdf::TYPE))
            .and_then(Term::as_iri)
        {
            if actual != ty.class_iri().as_ref() {
                return Err(MapperError::TypeMismatch {
                    subject: subject.to_string(),
                    expected: ty.class_iri().to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        let instance = Entity::new(type_name, subject);
        // Register before populating so a back-reference to this subject
        // resolves to the in-progress instance.
        memo.insert(Arc::clone(instance.borrow().id()), Rc::clone(&instance));

        self.populate(graph, &ty, &instance, memo)?;
        debug!(subject, type_name, "deserialized instance");
        Ok(instance)
    }

    fn populate(
        &self,
        graph: &Graph,
        ty: &EntityType,
        instance: &EntityRef,
        memo: &mut InstanceMemo,
    ) -> Result<()> {
        let subject = Term::iri(instance.borrow().id().as_ref());
        for field in ty.fields() {
            let predicate = Term::iri(field.predicate.as_ref());
            match &field.kind {
                FieldKind::Scalar(_) => {
                    if let Some(object) = graph.value(&subject, &predicate) {
                        let value = codec::decode(object)?;
                        instance.borrow_mut().set(field.name.clone(), value);
                    }
                }
                FieldKind::One(target_type) => {
                    if let Some(object) = graph.value(&subject, &predicate) {
                        let target_id = reference_iri(object, &field.predicate)?;
                        let target =
                            self.from_rdf_with_memo(graph, target_type, target_id, memo)?;
                        instance.borrow_mut().set_one(field.name.clone(), target);
                    }
                }
                FieldKind::Many(target_type) => {
                    // Collect first: recursion may need the graph borrow back
                    let ids: Vec<String> = graph
                        .objects(&subject, &predicate)
                        .map(|object| reference_iri(object, &field.predicate).map(str::to_string))
                        .collect::<Result<_>>()?;
                    if ids.is_empty() {
                        continue;
                    }
                    let mut targets = Vec::with_capacity(ids.len());
                    for id in &ids {
                        targets.push(self.from_rdf_with_memo(graph, target_type, id, memo)?);
                    }
                    instance.borrow_mut().set_many(field.name.clone(), targets);
                }
            }
        }
        Ok(())
    }
}

fn reference_iri<'a>(object: &'a Term, predicate: &str) -> Result<&'a str> {
    object.as_iri().ok_or_else(|| MapperError::UnexpectedObject {
        predicate: predicate.to_string(),
        expected: "an identifier",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntityType, ScalarKind, SchemaRegistry};
    use crate::value::Value;

    const EX: &str = "http://example.org/";

    fn registry() -> Arc<SchemaRegistry> {
        let mut builder = SchemaRegistry::builder();
        builder.register(
            EntityType::new("Person", format!("{EX}Person"))
                .with_scalar("name", format!("{EX}name"))
                .with_scalar_kind("age", format!("{EX}age"), ScalarKind::Int)
                .with_one("friend", format!("{EX}friend"), "Person"),
        );
        builder.freeze().unwrap()
    }

    #[test]
    fn unset_fields_emit_nothing() {
        let mapper = GraphMapper::new(registry());
        let person = Entity::new("Person", format!("{EX}person/1"));
        person.borrow_mut().set("name", "Alice");

        let graph = mapper.to_rdf(&person).unwrap();
        // type triple + name triple only
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn absent_subject_yields_empty_instance() {
        let mapper = GraphMapper::new(registry());
        let graph = Graph::new();

        let ghost = mapper
            .from_rdf(&graph, "Person", &format!("{EX}person/absent"))
            .unwrap();
        let ghost = ghost.borrow();
        assert_eq!(ghost.id().as_ref(), format!("{EX}person/absent"));
        assert_eq!(ghost.scalar("name"), None);
        assert!(ghost.one("friend").is_none());
    }

    #[test]
    fn unknown_type_fails_fast() {
        let mapper = GraphMapper::new(registry());
        let thing = Entity::new("Gadget", format!("{EX}gadget/1"));
        assert!(matches!(
            mapper.to_rdf(&thing),
            Err(MapperError::UnknownType(name)) if name == "Gadget"
        ));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mapper = GraphMapper::new(registry());
        let person = Entity::new("Person", format!("{EX}person/1"));
        // "friend" is declared as a single reference
        person.borrow_mut().set("friend", "not-a-reference");
        assert!(matches!(
            mapper.to_rdf(&person),
            Err(MapperError::KindMismatch { field, .. }) if field == "friend"
        ));
    }

    #[test]
    fn declared_type_must_agree() {
        let mapper = GraphMapper::new(registry());
        let mut graph = Graph::new();
        graph.add(
            Term::iri(format!("{EX}person/1")),
            Term::iri(rdf::TYPE),
            Term::iri(format!("{EX}Gadget")),
        );
        assert!(matches!(
            mapper.from_rdf(&graph, "Person", &format!("{EX}person/1")),
            Err(MapperError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn scalar_round_trip_with_typed_hint() {
        let mapper = GraphMapper::new(registry());
        let person = Entity::new("Person", format!("{EX}person/1"));
        person.borrow_mut().set("age", 30i64);

        let graph = mapper.to_rdf(&person).unwrap();
        let back = mapper
            .from_rdf(&graph, "Person", &format!("{EX}person/1"))
            .unwrap();
        assert_eq!(back.borrow().scalar("age"), Some(&Value::Int(30)));
    }
}

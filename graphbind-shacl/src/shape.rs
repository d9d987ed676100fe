//! Shape graph derivation from entity field descriptors
//!
//! One `sh:NodeShape` targets the entity's class; each field descriptor
//! becomes a blank-node property shape carrying `sh:path`, an inferred
//! datatype (or `sh:class`/`sh:nodeKind` for references), and its
//! cardinality bounds.

use crate::error::Result;
use graphbind_graph_ir::{Graph, Term};
use graphbind_mapper::{FieldKind, SchemaRegistry};
use graphbind_vocab::{rdf, shacl};

/// Derive the SHACL shape graph for a registered entity type
///
/// Pure function of the registry: reference targets resolve through it, so
/// an unresolvable target type is a schema error here, before validation.
pub fn shape_graph(registry: &SchemaRegistry, type_name: &str) -> Result<Graph> {
    let entity = registry.entity(type_name)?;
    let mut graph = Graph::new();

    let shape = Term::iri(format!("{}Shape", entity.class_iri()));
    graph.add(shape.clone(), Term::iri(rdf::TYPE), Term::iri(shacl::NODE_SHAPE));
    graph.add(
        shape.clone(),
        Term::iri(shacl::TARGET_CLASS),
        Term::iri(entity.class_iri().as_ref()),
    );

    for (index, field) in entity.fields().iter().enumerate() {
        let property = Term::blank(format!("p{index}"));
        graph.add(shape.clone(), Term::iri(shacl::PROPERTY), property.clone());
        graph.add(
            property.clone(),
            Term::iri(shacl::PATH),
            Term::iri(field.predicate.as_ref()),
        );

        match &field.kind {
            FieldKind::Scalar(kind) => {
                graph.add(
                    property.clone(),
                    Term::iri(shacl::DATATYPE),
                    Term::iri(kind.datatype().as_iri()),
                );
            }
            FieldKind::One(target) | FieldKind::Many(target) => {
                let target_class = registry.entity(target)?.class_iri().clone();
                graph.add(
                    property.clone(),
                    Term::iri(shacl::NODE_KIND),
                    Term::iri(shacl::IRI),
                );
                graph.add(
                    property.clone(),
                    Term::iri(shacl::CLASS),
                    Term::iri(target_class.as_ref()),
                );
            }
        }

        if field.min_count > 0 {
            graph.add(
                property.clone(),
                Term::iri(shacl::MIN_COUNT),
                Term::integer(i64::from(field.min_count)),
            );
        }
        if let Some(max) = field.max_count {
            graph.add(
                property,
                Term::iri(shacl::MAX_COUNT),
                Term::integer(i64::from(max)),
            );
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphbind_mapper::{EntityType, ScalarKind, SchemaRegistry};
    use graphbind_vocab::xsd;
    use std::sync::Arc;

    const EX: &str = "http://example.org/";

    fn registry() -> Arc<graphbind_mapper::SchemaRegistry> {
        let mut builder = SchemaRegistry::builder();
        builder.register(
            EntityType::new("Person", format!("{EX}Person"))
                .with_scalar("name", format!("{EX}name"))
                .with_cardinality(1, Some(1))
                .with_scalar_kind("age", format!("{EX}age"), ScalarKind::Int)
                .with_many("phones", format!("{EX}phone"), "Phone"),
        );
        builder.register(EntityType::new("Phone", format!("{EX}Phone")));
        builder.freeze().unwrap()
    }

    fn objects_of<'a>(graph: &'a Graph, p: &str) -> Vec<&'a Term> {
        graph
            .iter()
            .filter(|t| t.p == Term::iri(p))
            .map(|t| &t.o)
            .collect()
    }

    #[test]
    fn shape_targets_the_entity_class() {
        let graph = shape_graph(&registry(), "Person").unwrap();
        assert_eq!(
            objects_of(&graph, shacl::TARGET_CLASS),
            vec![&Term::iri(format!("{EX}Person"))]
        );
        assert!(graph.has(
            &Term::iri(format!("{EX}PersonShape")),
            &Term::iri(rdf::TYPE),
            &Term::iri(shacl::NODE_SHAPE),
        ));
    }

    #[test]
    fn one_property_shape_per_field() {
        let graph = shape_graph(&registry(), "Person").unwrap();
        assert_eq!(objects_of(&graph, shacl::PROPERTY).len(), 3);
        assert_eq!(objects_of(&graph, shacl::PATH).len(), 3);
    }

    #[test]
    fn datatypes_follow_scalar_hints() {
        let graph = shape_graph(&registry(), "Person").unwrap();
        let datatypes = objects_of(&graph, shacl::DATATYPE);
        assert!(datatypes.contains(&&Term::iri(xsd::STRING)));
        assert!(datatypes.contains(&&Term::iri(xsd::INTEGER)));
    }

    #[test]
    fn reference_fields_carry_class_not_datatype() {
        let graph = shape_graph(&registry(), "Person").unwrap();
        assert_eq!(
            objects_of(&graph, shacl::CLASS),
            vec![&Term::iri(format!("{EX}Phone"))]
        );
        assert_eq!(
            objects_of(&graph, shacl::NODE_KIND),
            vec![&Term::iri(shacl::IRI)]
        );
    }

    #[test]
    fn cardinality_bounds_export() {
        let graph = shape_graph(&registry(), "Person").unwrap();
        // "name" is 1:1, "age" is 0:1, "phones" is unbounded
        assert_eq!(objects_of(&graph, shacl::MIN_COUNT), vec![&Term::integer(1)]);
        assert_eq!(
            objects_of(&graph, shacl::MAX_COUNT),
            vec![&Term::integer(1), &Term::integer(1)]
        );
    }

    #[test]
    fn unknown_type_is_a_schema_error() {
        assert!(matches!(
            shape_graph(&registry(), "Gadget"),
            Err(crate::ShaclError::Schema(_))
        ));
    }
}

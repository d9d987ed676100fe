//! Entity schema registry: type descriptors, field descriptors, registration
//!
//! Entity types are declared once, up front, as explicit field descriptor
//! lists; the frozen registry is then shared read-only for the life of the
//! process. Reference fields store their target type by *name* and resolve
//! it through the registry on demand, so mutually or forward-referencing
//! types declare cleanly in any order.

use crate::error::{MapperError, Result};
use graphbind_graph_ir::Datatype;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Scalar datatype hint for a field
///
/// Used by the literal codec when decoding and by shape export for the
/// inferred `sh:datatype`. `Text` is the default when a declaration carries
/// no hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    /// xsd:boolean
    Bool,
    /// xsd:integer
    Int,
    /// xsd:double
    Double,
    /// xsd:date
    Date,
    /// xsd:dateTime
    DateTime,
    /// xsd:string
    Text,
}

impl ScalarKind {
    /// The XSD datatype this kind maps to
    pub fn datatype(self) -> Datatype {
        match self {
            ScalarKind::Bool => Datatype::xsd_boolean(),
            ScalarKind::Int => Datatype::xsd_integer(),
            ScalarKind::Double => Datatype::xsd_double(),
            ScalarKind::Date => Datatype::xsd_date(),
            ScalarKind::DateTime => Datatype::xsd_date_time(),
            ScalarKind::Text => Datatype::xsd_string(),
        }
    }

    /// Whether values of this kind are numeric
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Double)
    }
}

/// What a declared field holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// A scalar literal with a datatype hint
    Scalar(ScalarKind),
    /// A single reference to another entity type, by name
    One(String),
    /// An ordered collection of references to another entity type, by name
    Many(String),
}

impl FieldKind {
    /// Whether this field links to other entities
    pub fn is_reference(&self) -> bool {
        matches!(self, FieldKind::One(_) | FieldKind::Many(_))
    }

    /// Target type name for reference fields
    pub fn target(&self) -> Option<&str> {
        match self {
            FieldKind::One(name) | FieldKind::Many(name) => Some(name),
            FieldKind::Scalar(_) => None,
        }
    }
}

/// One declared field: predicate, kind, and cardinality bounds
///
/// Cardinality bounds are used only by shape export.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    /// Field name, unique within its entity type
    pub name: String,
    /// Predicate IRI binding this field in the graph
    pub predicate: Arc<str>,
    /// Scalar, single reference, or reference collection
    pub kind: FieldKind,
    /// Minimum occurrence (shape export only)
    pub min_count: u32,
    /// Maximum occurrence; None means unbounded (shape export only)
    pub max_count: Option<u32>,
}

/// An entity type: class IRI plus its ordered field descriptors
///
/// Immutable once registered. Build with the consuming `with_*` methods:
///
/// ```
/// use graphbind_mapper::{EntityType, ScalarKind};
///
/// let person = EntityType::new("Person", "http://example.org/Person")
///     .with_scalar("name", "http://example.org/name")
///     .with_one("address", "http://example.org/address", "Address")
///     .with_many("phones", "http://example.org/phone", "Phone");
/// assert_eq!(person.fields().len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct EntityType {
    name: String,
    class_iri: Arc<str>,
    fields: Vec<FieldDescriptor>,
}

impl EntityType {
    /// Create an entity type with no fields yet
    pub fn new(name: impl Into<String>, class_iri: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            class_iri: Arc::from(class_iri.as_ref()),
            fields: Vec::new(),
        }
    }

    /// Declare a text scalar field
    pub fn with_scalar(self, name: impl Into<String>, predicate: impl AsRef<str>) -> Self {
        self.with_scalar_kind(name, predicate, ScalarKind::Text)
    }

    /// Declare a scalar field with an explicit datatype hint
    pub fn with_scalar_kind(
        mut self,
        name: impl Into<String>,
        predicate: impl AsRef<str>,
        kind: ScalarKind,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            predicate: Arc::from(predicate.as_ref()),
            kind: FieldKind::Scalar(kind),
            min_count: 0,
            max_count: Some(1),
        });
        self
    }

    /// Declare a single-reference field targeting another entity type
    pub fn with_one(
        mut self,
        name: impl Into<String>,
        predicate: impl AsRef<str>,
        target: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            predicate: Arc::from(predicate.as_ref()),
            kind: FieldKind::One(target.into()),
            min_count: 0,
            max_count: Some(1),
        });
        self
    }

    /// Declare a reference-collection field targeting another entity type
    pub fn with_many(
        mut self,
        name: impl Into<String>,
        predicate: impl AsRef<str>,
        target: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            predicate: Arc::from(predicate.as_ref()),
            kind: FieldKind::Many(target.into()),
            min_count: 0,
            max_count: None,
        });
        self
    }

    /// Override the cardinality bounds of the most recently declared field
    ///
    /// No effect when no field has been declared yet.
    pub fn with_cardinality(mut self, min_count: u32, max_count: Option<u32>) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.min_count = min_count;
            field.max_count = max_count;
        }
        self
    }

    /// The registered type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The graph class IRI instances of this type carry
    pub fn class_iri(&self) -> &Arc<str> {
        &self.class_iri
    }

    /// The declared fields, in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field descriptor by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Collects entity types, then freezes them into a [`SchemaRegistry`]
///
/// Duplicate type names and duplicate field names are rejected at freeze
/// time, before any mapping can run against the schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<EntityType>,
}

impl SchemaBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity type declaration
    pub fn register(&mut self, entity: EntityType) -> &mut Self {
        self.types.push(entity);
        self
    }

    /// Validate the declarations and freeze them into an immutable registry
    pub fn freeze(self) -> Result<Arc<SchemaRegistry>> {
        let mut types: BTreeMap<String, Arc<EntityType>> = BTreeMap::new();
        for entity in self.types {
            let mut names = std::collections::BTreeSet::new();
            for field in entity.fields() {
                if !names.insert(field.name.as_str()) {
                    return Err(MapperError::DuplicateField {
                        entity: entity.name().to_string(),
                        field: field.name.clone(),
                    });
                }
            }
            let name = entity.name().to_string();
            if types.insert(name.clone(), Arc::new(entity)).is_some() {
                return Err(MapperError::DuplicateType(name));
            }
        }
        Ok(Arc::new(SchemaRegistry { types }))
    }
}

/// Frozen, process-wide entity schema
///
/// Built once through [`SchemaBuilder`], then shared read-only. Concurrent
/// reads need no locking.
#[derive(Debug)]
pub struct SchemaRegistry {
    types: BTreeMap<String, Arc<EntityType>>,
}

impl SchemaRegistry {
    /// Start a builder
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Resolve an entity type by name
    pub fn entity(&self, name: &str) -> Result<&Arc<EntityType>> {
        self.types
            .get(name)
            .ok_or_else(|| MapperError::UnknownType(name.to_string()))
    }

    /// Resolve a field descriptor on a named entity type
    pub fn field<'a>(&'a self, type_name: &str, field: &str) -> Result<&'a FieldDescriptor> {
        let entity = self.entity(type_name)?;
        entity.field(field).ok_or_else(|| MapperError::UnknownField {
            entity: type_name.to_string(),
            field: field.to_string(),
        })
    }

    /// Iterate all registered types in name order
    pub fn types(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.types.values()
    }
}

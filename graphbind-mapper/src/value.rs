//! Entity instances and native scalar values
//!
//! Instances are caller-built object graphs: each entity owns its scalar
//! values, and reference fields hold non-owning shared handles so two
//! instances may reference each other or share a common referent. Handles
//! are `Rc<RefCell<_>>`, which deliberately keeps an instance graph on one
//! thread; the frozen schema registry is the only state shared across
//! threads.

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

/// A native scalar value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Integer (i64 range)
    Int(i64),
    /// Floating point
    Double(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time (no timezone)
    DateTime(NaiveDateTime),
    /// Plain text
    Text(String),
}

impl Value {
    /// Try to get as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as double (integers widen)
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

/// Shared handle to an entity instance
pub type EntityRef = Rc<RefCell<Entity>>;

/// What an instance holds for one field
#[derive(Clone, Debug)]
pub enum FieldValue {
    /// A scalar literal
    Scalar(Value),
    /// A single reference to another instance
    One(EntityRef),
    /// An ordered collection of references
    Many(Vec<EntityRef>),
}

/// An entity instance: caller-assigned identifier plus per-field values
///
/// The identifier is a URI assigned by the caller; the mapper never
/// generates identifiers. Fields left unset simply emit nothing on
/// serialization and stay unset after deserialization of an absent value.
#[derive(Clone, Debug)]
pub struct Entity {
    id: Arc<str>,
    type_name: String,
    fields: BTreeMap<String, FieldValue>,
}

impl Entity {
    /// Create an instance handle with no fields set
    pub fn new(type_name: impl Into<String>, id: impl AsRef<str>) -> EntityRef {
        Rc::new(RefCell::new(Entity {
            id: Arc::from(id.as_ref()),
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }))
    }

    /// The caller-assigned identifier URI
    pub fn id(&self) -> &Arc<str> {
        &self.id
    }

    /// The entity type name this instance belongs to
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Set a scalar field
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields
            .insert(field.into(), FieldValue::Scalar(value.into()));
    }

    /// Set a single-reference field
    pub fn set_one(&mut self, field: impl Into<String>, target: EntityRef) {
        self.fields.insert(field.into(), FieldValue::One(target));
    }

    /// Set a reference-collection field
    pub fn set_many(&mut self, field: impl Into<String>, targets: Vec<EntityRef>) {
        self.fields.insert(field.into(), FieldValue::Many(targets));
    }

    /// Append one reference to a collection field, creating it if unset
    pub fn push(&mut self, field: impl Into<String>, target: EntityRef) {
        match self.fields.entry(field.into()) {
            std::collections::btree_map::Entry::Occupied(mut e) => {
                if let FieldValue::Many(items) = e.get_mut() {
                    items.push(target);
                } else {
                    e.insert(FieldValue::Many(vec![target]));
                }
            }
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(FieldValue::Many(vec![target]));
            }
        }
    }

    /// Raw field value, if set
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Scalar field value, if set and scalar
    pub fn scalar(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field) {
            Some(FieldValue::Scalar(v)) => Some(v),
            _ => None,
        }
    }

    /// Single reference, if set
    pub fn one(&self, field: &str) -> Option<EntityRef> {
        match self.fields.get(field) {
            Some(FieldValue::One(r)) => Some(Rc::clone(r)),
            _ => None,
        }
    }

    /// Reference collection; empty when unset
    pub fn many(&self, field: &str) -> Vec<EntityRef> {
        match self.fields.get(field) {
            Some(FieldValue::Many(items)) => items.iter().map(Rc::clone).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_set_and_get() {
        let person = Entity::new("Person", "http://example.org/person/1");
        person.borrow_mut().set("name", "Alice");
        person.borrow_mut().set("age", 30i64);

        let p = person.borrow();
        assert_eq!(p.scalar("name"), Some(&Value::Text("Alice".into())));
        assert_eq!(p.scalar("age"), Some(&Value::Int(30)));
        assert_eq!(p.scalar("missing"), None);
    }

    #[test]
    fn references_are_shared_not_copied() {
        let addr = Entity::new("Address", "http://example.org/address/1");
        let a = Entity::new("Person", "http://example.org/person/a");
        let b = Entity::new("Person", "http://example.org/person/b");
        a.borrow_mut().set_one("address", Rc::clone(&addr));
        b.borrow_mut().set_one("address", Rc::clone(&addr));

        addr.borrow_mut().set("street", "123 Main St");
        let via_a = a.borrow().one("address").unwrap();
        let via_b = b.borrow().one("address").unwrap();
        assert!(Rc::ptr_eq(&via_a, &via_b));
        assert_eq!(
            via_b.borrow().scalar("street"),
            Some(&Value::Text("123 Main St".into()))
        );
    }

    #[test]
    fn push_builds_a_collection() {
        let person = Entity::new("Person", "http://example.org/person/1");
        let p1 = Entity::new("Phone", "http://example.org/phone/1");
        let p2 = Entity::new("Phone", "http://example.org/phone/2");
        person.borrow_mut().push("phones", p1);
        person.borrow_mut().push("phones", p2);

        assert_eq!(person.borrow().many("phones").len(), 2);
        assert!(person.borrow().many("unset").is_empty());
    }

    #[test]
    fn mutual_references_are_expressible() {
        let a = Entity::new("Person", "http://example.org/person/a");
        let b = Entity::new("Person", "http://example.org/person/b");
        a.borrow_mut().set_one("friend", Rc::clone(&b));
        b.borrow_mut().set_one("friend", Rc::clone(&a));

        let back = a.borrow().one("friend").unwrap().borrow().one("friend").unwrap();
        assert!(Rc::ptr_eq(&back, &a));
    }
}

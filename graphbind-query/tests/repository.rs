//! End-to-end repository tests: entities are mapped into a graph, queried
//! through selectors via the in-memory engine, and rehydrated back.

use graphbind_graph_ir::Graph;
use graphbind_mapper::{
    Entity, EntityType, GraphMapper, ScalarKind, SchemaRegistry, Value,
};
use graphbind_query::{
    FilterValue, MemoryEngine, Order, Page, QueryError, Repository,
};
use std::rc::Rc;

const EX: &str = "http://example.org/";

fn registry() -> std::sync::Arc<SchemaRegistry> {
    let mut builder = SchemaRegistry::builder();
    builder.register(
        EntityType::new("Person", format!("{EX}Person"))
            .with_scalar("name", format!("{EX}name"))
            .with_scalar_kind("age", format!("{EX}age"), ScalarKind::Int)
            .with_scalar("city", format!("{EX}city"))
            .with_one("address", format!("{EX}address"), "Address"),
    );
    builder.register(
        EntityType::new("Address", format!("{EX}Address"))
            .with_scalar("street", format!("{EX}street")),
    );
    builder.freeze().unwrap()
}

struct Fixture {
    graph: Graph,
    repo: Repository<MemoryEngine>,
}

/// Five people across three cities, two sharing an address.
fn fixture() -> Fixture {
    let mapper = GraphMapper::new(registry());

    let shared = Entity::new("Address", format!("{EX}address/1"));
    shared.borrow_mut().set("street", "1 Main St");
    let other = Entity::new("Address", format!("{EX}address/2"));
    other.borrow_mut().set("street", "2 Side St");

    let people = [
        ("1", "Alice", 30i64, "Berlin", &shared),
        ("2", "Bob", 40, "Berlin", &shared),
        ("3", "Carol", 50, "Paris", &other),
        ("4", "Dave", 20, "Oslo", &other),
        ("5", "alina", 35, "Paris", &other),
    ]
    .map(|(id, name, age, city, address)| {
        let person = Entity::new("Person", format!("{EX}person/{id}"));
        {
            let mut p = person.borrow_mut();
            p.set("name", name);
            p.set("age", age);
            p.set("city", city);
            p.set_one("address", Rc::clone(address));
        }
        person
    });

    let graph = mapper.to_rdf_many(&people).unwrap();
    let repo = Repository::new(mapper, "Person", MemoryEngine::new());
    Fixture { graph, repo }
}

#[test]
fn find_by_equality_rehydrates_the_match() {
    let f = fixture();
    let found = f
        .repo
        .find(&f.graph, "find_by_name", &[("name", FilterValue::text("Bob"))])
        .unwrap();
    assert_eq!(found.len(), 1);
    let bob = found[0].borrow();
    assert_eq!(bob.scalar("name").and_then(Value::as_text), Some("Bob"));
    assert_eq!(bob.scalar("age").and_then(Value::as_int), Some(40));
    // The reference field came back too
    let address = bob.one("address").unwrap();
    assert_eq!(
        address.borrow().scalar("street").and_then(Value::as_text),
        Some("1 Main St")
    );
}

#[test]
fn find_like_matches_substring_case_insensitively() {
    let f = fixture();
    let found = f
        .repo
        .find(
            &f.graph,
            "find_by_name_like",
            &[("name", FilterValue::text("ali"))],
        )
        .unwrap();
    // Alice and alina
    assert_eq!(found.len(), 2);
}

#[test]
fn conjoined_fields_intersect() {
    let f = fixture();
    let found = f
        .repo
        .find(
            &f.graph,
            "find_by_city_and_age",
            &[
                ("city", FilterValue::text("Berlin")),
                ("age", FilterValue::int(30)),
            ],
        )
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].borrow().scalar("name").and_then(Value::as_text),
        Some("Alice")
    );
}

#[test]
fn find_by_reference_identity() {
    let f = fixture();
    let found = f
        .repo
        .find(
            &f.graph,
            "find_by_address",
            &[("address", FilterValue::iri(format!("{EX}address/1")))],
        )
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn shared_referents_rehydrate_once_per_result_set() {
    let f = fixture();
    let found = f
        .repo
        .find(
            &f.graph,
            "find_by_city",
            &[("city", FilterValue::text("Berlin"))],
        )
        .unwrap();
    assert_eq!(found.len(), 2);
    let a = found[0].borrow().one("address").unwrap();
    let b = found[1].borrow().one("address").unwrap();
    assert!(Rc::ptr_eq(&a, &b));
}

#[test]
fn pagination_windows_partition_the_match_set() {
    let f = fixture();
    let mut seen = Vec::new();
    for (limit, offset) in [(2, 0), (2, 2), (2, 4)] {
        let page = f
            .repo
            .find_page(
                &f.graph,
                "find_by_name_like",
                &[("name", FilterValue::text(""))],
                Page::window(limit, offset),
            )
            .unwrap();
        for person in &page {
            seen.push(person.borrow().id().to_string());
        }
    }
    // Three windows of two cover all five subjects exactly once
    assert_eq!(seen.len(), 5);
    let mut deduped = seen.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), 5);
}

#[test]
fn count_by_matches_and_zero() {
    let f = fixture();
    let berlin = f
        .repo
        .count(
            &f.graph,
            "count_by_city",
            &[("city", FilterValue::text("Berlin"))],
        )
        .unwrap();
    assert_eq!(berlin, 2);

    let nowhere = f
        .repo
        .count(
            &f.graph,
            "count_by_city",
            &[("city", FilterValue::text("Atlantis"))],
        )
        .unwrap();
    assert_eq!(nowhere, 0);
}

#[test]
fn selector_operation_must_match_the_call() {
    let f = fixture();
    let result = f.repo.find(
        &f.graph,
        "count_by_city",
        &[("city", FilterValue::text("Berlin"))],
    );
    assert!(matches!(result, Err(QueryError::UnsupportedSelector(_))));

    let result = f.repo.count(
        &f.graph,
        "find_by_city",
        &[("city", FilterValue::text("Berlin"))],
    );
    assert!(matches!(result, Err(QueryError::UnsupportedSelector(_))));
}

#[test]
fn group_by_count_orders_descending() {
    let f = fixture();
    let groups = f
        .repo
        .group_by_count(&f.graph, "city", Order::Desc)
        .unwrap();
    assert_eq!(groups.len(), 3);
    // Berlin and Paris both have two; Oslo has one and comes last
    assert_eq!(groups[0].1, 2);
    assert_eq!(groups[1].1, 2);
    assert_eq!(groups[2], (Value::Text("Oslo".into()), 1));
}

#[test]
fn group_by_avg_computes_per_group_means() {
    let f = fixture();
    let groups = f
        .repo
        .group_by_avg(&f.graph, "city", "age", Order::Asc)
        .unwrap();
    assert_eq!(groups.len(), 3);
    // Oslo 20, Berlin (30+40)/2 = 35, Paris (50+35)/2 = 42.5 ascending
    assert_eq!(groups[0], (Value::Text("Oslo".into()), 20.0));
    assert_eq!(groups[1], (Value::Text("Berlin".into()), 35.0));
    assert_eq!(groups[2], (Value::Text("Paris".into()), 42.5));
}

#[test]
fn group_by_avg_rejects_text_fields() {
    let f = fixture();
    let result = f.repo.group_by_avg(&f.graph, "city", "name", Order::Asc);
    assert!(matches!(result, Err(QueryError::NotAggregatable(_))));
}

//! Dual-write coordinator scenarios

use crate::common::*;
use tandem::{DocumentKey, DocumentStore, Error, Model};

#[test]
fn create_identifies_the_record_in_both_stores() {
    let engine = TestEngine::new();
    let created = engine.create_widget("a", 1);

    assert_eq!(created.id, 1);
    assert_eq!(created.type_name, "Widget");
    assert!(!created.created_at.is_empty());
    assert_eq!(created.created_at, created.updated_at);

    let key = DocumentKey::new("Widget", 1);
    assert_eq!(created.key(), key);
    assert!(engine.documents.get(&key).unwrap().is_some());
    assert!(engine.search.stored(&key).is_some());
}

#[test]
fn create_each_preserves_order() {
    let engine = TestEngine::new();
    let outcome = engine.ctx.create_each(vec![
        widget("a", 1),
        widget("b", 2),
        widget("c", 3),
    ]);
    assert!(outcome.is_complete());

    let names: Vec<String> = outcome
        .completed
        .iter()
        .map(|w| w.name.clone())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    let ids: Vec<i64> = outcome.completed.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn update_scenario_widget_lifecycle() {
    let engine = TestEngine::new();

    // create {Name:"a"} -> ID=1, TYPE="Widget", key in both stores
    let mut record = engine.create_widget("a", 1);
    assert_eq!(record.key().to_string(), "Widget:1");
    let created_stamp = record.updated_at.clone();

    // update with {Name:"b"} on that ID
    record.name = "b".to_string();
    engine.ctx.update(&mut record).unwrap();
    assert!(record.updated_at >= created_stamp);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    session
        .filter(r#"{"term":{"_id":"Widget:1"}}"#)
        .unwrap();
    let found = engine.ctx.fetch(&mut session).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "b");
    assert_eq!(found[0].id, 1);
    assert_eq!(found[0].type_name, "Widget");

    // destroy by exact id
    let outcome = engine
        .ctx
        .destroy::<Widget>(r#"{"term":{"_id":"Widget:1"}}"#);
    assert!(outcome.is_complete());
    assert_eq!(outcome.completed.len(), 1);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    session
        .filter(r#"{"term":{"_id":"Widget:1"}}"#)
        .unwrap();
    assert!(engine.ctx.fetch(&mut session).unwrap().is_empty());
    assert!(engine
        .documents
        .get(&DocumentKey::new("Widget", 1))
        .unwrap()
        .is_none());
}

#[test]
fn update_unknown_record_is_not_found() {
    let engine = TestEngine::new();
    let mut phantom = widget("a", 1);
    phantom.id = 42;
    phantom.type_name = "Widget".to_string();

    assert!(matches!(
        engine.ctx.update(&mut phantom),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn update_before_create_is_a_usage_error() {
    let engine = TestEngine::new();
    let mut fresh = widget("a", 1);
    let err = engine.ctx.update(&mut fresh).unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn destroy_filtered_subset_leaves_the_rest() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("a", 1), ("a", 2), ("b", 3)]);

    let outcome = engine.ctx.destroy::<Widget>(r#"{"term":{"name":"a"}}"#);
    assert!(outcome.is_complete());
    assert_eq!(outcome.completed.len(), 2);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    let remaining = engine.ctx.fetch(&mut session).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "b");
    assert_eq!(engine.documents.len(), 1);
    assert_eq!(engine.search.len(), 1);
}

#[test]
fn destroy_on_empty_match_set_is_idempotent() {
    let engine = TestEngine::new();

    for _ in 0..2 {
        let outcome = engine
            .ctx
            .destroy::<Widget>(r#"{"term":{"name":"missing"}}"#);
        assert!(outcome.is_complete());
        assert!(outcome.completed.is_empty());
    }
}

#[test]
fn ids_are_assigned_per_type() {
    let engine = TestEngine::new();
    let w = engine.create_widget("a", 1);
    let g = engine
        .ctx
        .create(Gadget {
            label: "g".to_string(),
            ..Gadget::default()
        })
        .unwrap();

    assert_eq!(w.id, 1);
    assert_eq!(g.id, 1);
    assert_eq!(w.key().to_string(), "Widget:1");
    assert_eq!(g.key().to_string(), "Gadget:1");
}

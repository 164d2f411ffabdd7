//! Mapping and reindex pipeline scenarios

use crate::common::*;
use tandem::{DocumentKey, SearchIndex, UNBOUNDED_LIMIT};

#[test]
fn registration_pushes_a_mapping_once() {
    let engine = TestEngine::new();
    let mapping = engine.search.mapping("Widget").unwrap().unwrap();
    assert!(mapping["Widget"]["properties"]["name"].is_object());
    assert!(mapping["Widget"]["properties"]["qty"].is_object());

    // re-registering does not replace the pushed mapping
    engine.ctx.register::<Widget>().unwrap();
    assert_eq!(engine.search.mapping("Widget").unwrap().unwrap(), mapping);
}

#[test]
fn drop_mapping_tears_down_and_tolerates_absence() {
    let engine = TestEngine::new();
    engine.ctx.drop_mapping::<Widget>().unwrap();
    assert!(engine.search.mapping("Widget").unwrap().is_none());
    // a second drop is a no-op
    engine.ctx.drop_mapping::<Widget>().unwrap();
}

#[test]
fn fetch_collection_matches_created_records() {
    let engine = TestEngine::new();
    let created = engine.seed_widgets(&[("a", 1), ("b", 2), ("c", 3)]);

    let collection = engine.ctx.fetch_collection::<Widget>().unwrap();
    assert_eq!(collection, created);

    let raw = engine.ctx.fetch_raw_collection::<Widget>().unwrap();
    assert_eq!(raw.len(), 3);
    assert_eq!(raw[0].key, DocumentKey::new("Widget", 1));
}

#[test]
fn reindex_restores_a_stale_index() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("a", 1), ("b", 2), ("c", 3)]);

    // the index drifts: one record vanishes from it
    engine
        .search
        .delete(&DocumentKey::new("Widget", 2))
        .unwrap();
    let mut session = engine.ctx.query::<Widget>().unwrap();
    assert_eq!(engine.ctx.count(&mut session).unwrap(), 2);

    engine.ctx.reindex::<Widget>().unwrap();

    // every document-store record is searchable again
    let mut session = engine.ctx.query::<Widget>().unwrap();
    session.limit(UNBOUNDED_LIMIT).unwrap();
    let found = engine.ctx.fetch(&mut session).unwrap();
    assert_eq!(
        found.len(),
        engine.ctx.fetch_collection::<Widget>().unwrap().len()
    );
    assert!(engine.search.mapping("Widget").unwrap().is_some());
}

#[test]
fn reindex_applies_to_one_type_only() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("a", 1)]);
    engine
        .ctx
        .create(Gadget {
            label: "g".to_string(),
            ..Gadget::default()
        })
        .unwrap();

    engine
        .search
        .delete(&DocumentKey::new("Gadget", 1))
        .unwrap();
    engine.ctx.reindex::<Widget>().unwrap();

    // the widget reindex does not resurrect the gadget
    assert!(engine
        .search
        .stored(&DocumentKey::new("Gadget", 1))
        .is_none());
    assert!(engine
        .search
        .stored(&DocumentKey::new("Widget", 1))
        .is_some());
}

#[test]
fn reindex_round_trip_count_matches_collection() {
    let engine = TestEngine::new();
    let specs: Vec<(String, i64)> = (1..=12).map(|i| (format!("w{i}"), i)).collect();
    for (name, qty) in &specs {
        engine.create_widget(name, *qty);
    }

    engine.ctx.reindex::<Widget>().unwrap();

    let mut session = engine.ctx.query::<Widget>().unwrap();
    assert_eq!(
        engine.ctx.count(&mut session).unwrap() as usize,
        engine.ctx.fetch_collection::<Widget>().unwrap().len()
    );
}

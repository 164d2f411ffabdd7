//! Query building and execution scenarios

use crate::common::*;
use serde_json::json;
use tandem::{Error, Model, QueryOutput};

#[test]
fn exact_id_filter_finds_created_record() {
    let engine = TestEngine::new();
    let created = engine.create_widget("a", 1);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    session
        .filter_value(json!({
            "query": { "bool": { "must": [ { "term": { "_id": created.key().to_string() } } ] } }
        }))
        .unwrap();
    let found = engine.ctx.fetch(&mut session).unwrap();
    assert_eq!(found, vec![created]);
}

#[test]
fn repeated_execution_resolves_the_same_key() {
    let engine = TestEngine::new();
    let created = engine.create_widget("a", 1);

    for _ in 0..3 {
        let mut session = engine.ctx.query::<Widget>().unwrap();
        session
            .filter(&format!(
                r#"{{"term":{{"_id":"{}"}}}}"#,
                created.key()
            ))
            .unwrap();
        let found = engine.ctx.fetch(&mut session).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key(), created.key());
    }
}

#[test]
fn sort_composes_in_call_order() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("b", 1), ("a", 2), ("a", 1), ("b", 2)]);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    session.sort("name", true).unwrap();
    session.sort("qty", false).unwrap();

    let found = engine.ctx.fetch(&mut session).unwrap();
    let keys: Vec<(String, i64)> = found.into_iter().map(|w| (w.name, w.qty)).collect();
    assert_eq!(
        keys,
        vec![
            ("a".to_string(), 2),
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("b".to_string(), 1),
        ]
    );
}

#[test]
fn filter_replacement_is_last_write_wins() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("a", 1), ("b", 2)]);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    session.filter(r#"{"term":{"name":"a"}}"#).unwrap();
    session.filter(r#"{"term":{"name":"b"}}"#).unwrap();

    let found = engine.ctx.fetch(&mut session).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "b");
}

#[test]
fn malformed_filter_leaves_session_usable() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("a", 1)]);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    session.filter(r#"{"term":{"name":"a"}}"#).unwrap();
    let err = session.filter("{broken").unwrap_err();
    assert!(matches!(err, Error::InvalidFragment(_)));

    // earlier filter still in effect
    let found = engine.ctx.fetch(&mut session).unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn pagination_with_offset_and_limit() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)]);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    session.sort("qty", true).unwrap();
    session.offset(1).unwrap();
    session.limit(2).unwrap();

    let found = engine.ctx.fetch(&mut session).unwrap();
    let qtys: Vec<i64> = found.into_iter().map(|w| w.qty).collect();
    assert_eq!(qtys, vec![2, 3]);
}

#[test]
fn default_page_size_caps_unpaginated_queries() {
    let engine = TestEngine::new();
    let specs: Vec<(String, i64)> = (1..=15).map(|i| (format!("w{i}"), i)).collect();
    for (name, qty) in &specs {
        engine.create_widget(name, *qty);
    }

    let mut session = engine.ctx.query::<Widget>().unwrap();
    let found = engine.ctx.fetch(&mut session).unwrap();
    assert_eq!(found.len(), 10);
}

#[test]
fn count_ignores_prior_size_and_offset() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("a", 1), ("a", 2), ("a", 3), ("b", 4), ("b", 5)]);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    session.filter(r#"{"term":{"name":"a"}}"#).unwrap();
    session.offset(4).unwrap();
    session.limit(100).unwrap();

    assert_eq!(engine.ctx.count(&mut session).unwrap(), 3);
}

#[test]
fn session_is_single_use() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("a", 1)]);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    engine.ctx.fetch(&mut session).unwrap();

    // consumed: both builder calls and execution now fail fast
    assert!(matches!(
        session.limit(1).unwrap_err(),
        Error::SessionUnbound
    ));
    assert!(matches!(
        engine.ctx.fetch(&mut session).unwrap_err(),
        Error::SessionUnbound
    ));

    // reset re-binds a fresh template
    session.reset();
    assert_eq!(engine.ctx.fetch(&mut session).unwrap().len(), 1);
}

#[test]
fn aggregation_queries_return_aggregations_only() {
    let engine = TestEngine::new();
    engine.seed_widgets(&[("a", 1), ("a", 2), ("b", 3)]);

    let mut session = engine.ctx.query::<Widget>().unwrap();
    session
        .aggregate(r#"{"names":{"terms":{"field":"name"}}}"#)
        .unwrap();

    match engine.ctx.execute(&mut session).unwrap() {
        QueryOutput::Aggregations(aggs) => {
            assert_eq!(
                aggs["names"]["buckets"],
                json!([
                    { "key": "a", "doc_count": 2 },
                    { "key": "b", "doc_count": 1 },
                ])
            );
        }
        QueryOutput::Records(_) => panic!("expected aggregation output"),
    }
}

#[test]
fn queries_are_scoped_to_the_bound_type() {
    let engine = TestEngine::new();
    engine.create_widget("shared", 1);
    engine
        .ctx
        .create(Gadget {
            label: "shared".to_string(),
            ..Gadget::default()
        })
        .unwrap();

    let mut session = engine.ctx.query::<Widget>().unwrap();
    let widgets = engine.ctx.fetch(&mut session).unwrap();
    assert_eq!(widgets.len(), 1);
    assert_eq!(widgets[0].type_name, "Widget");
}

#[test]
fn unregistered_model_cannot_open_a_session() {
    let engine = TestEngine::new();

    #[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq)]
    struct Unseen {
        id: i64,
        #[serde(rename = "type")]
        type_name: String,
        created_at: String,
        updated_at: String,
    }
    impl tandem::Model for Unseen {
        const NAME: &'static str = "Unseen";
        fn id(&self) -> i64 {
            self.id
        }
        fn set_id(&mut self, id: i64) {
            self.id = id;
        }
        fn type_name(&self) -> &str {
            &self.type_name
        }
        fn set_type_name(&mut self, type_name: &str) {
            self.type_name = type_name.to_string();
        }
        fn created_at(&self) -> &str {
            &self.created_at
        }
        fn set_created_at(&mut self, stamp: &str) {
            self.created_at = stamp.to_string();
        }
        fn updated_at(&self) -> &str {
            &self.updated_at
        }
        fn set_updated_at(&mut self, stamp: &str) {
            self.updated_at = stamp.to_string();
        }
    }

    let err = engine.ctx.query::<Unseen>().unwrap_err();
    assert!(err.is_usage());
}

use std::sync::{Arc, Mutex};

use engine::{
    Engine, ExecutionConfig, ExecutionError, GraphqlError, MergedCollector, Patch, PatchCollector, PathSegment, Request,
    ResolvedValue, ValueIter,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use super::dairy::{CheeseLoader, engine, engine_builder, patches, similar_cheese_id};

async fn execute_incrementally(engine: &Engine, request: impl Into<Request>) -> Vec<(Value, Value)> {
    let mut collector = Vec::<Patch>::new();
    engine
        .execute_with_collector(request.into(), &mut collector)
        .await
        .unwrap();
    patches(&collector)
}

#[tokio::test]
async fn deferred_fields_are_patched_in_document_order() {
    let mut collector = Vec::<Patch>::new();
    engine()
        .execute_with_collector(
            Request::new("{ cheese(id: 1) { id ... @defer { flavor } ... @defer { origin } } }"),
            &mut collector,
        )
        .await
        .unwrap();

    insta::assert_json_snapshot!(collector, @r#"
    [
      {
        "path": [],
        "value": {
          "data": {
            "cheese": {
              "id": 1
            }
          }
        }
      },
      {
        "path": [
          "data",
          "cheese",
          "flavor"
        ],
        "value": "Brie"
      },
      {
        "path": [
          "data",
          "cheese",
          "origin"
        ],
        "value": "France"
      }
    ]
    "#);
}

#[tokio::test]
async fn execute_returns_the_initial_result() {
    let engine = engine();
    let query = "{ cheese(id: 1) { id ... @defer { flavor } } }";

    let response = engine.execute(Request::new(query)).await.unwrap();
    assert_eq!(response.to_json(), json!({"data": {"cheese": {"id": 1}}}));

    let mut collector = Vec::<Patch>::new();
    let response = engine
        .execute_with_collector(Request::new(query), &mut collector)
        .await
        .unwrap();
    assert_eq!(response.to_json(), json!({"data": {"cheese": {"id": 1}}}));
    assert_eq!(collector.len(), 2);
}

#[tokio::test]
async fn merged_patches_match_the_non_incremental_response() {
    let engine = engine();
    let mut merged = MergedCollector::default();
    engine
        .execute_with_collector(
            Request::new(
                r#"
                {
                  cheese(id: 1) {
                    ... @defer { flavor similarCheese { id ... @defer { origin } } }
                    id
                  }
                  milk(id: "1") { flavors @stream }
                }
                "#,
            ),
            &mut merged,
        )
        .await
        .unwrap();

    let expected = engine
        .execute(Request::new(
            r#"{ cheese(id: 1) { flavor similarCheese { id origin } id } milk(id: "1") { flavors } }"#,
        ))
        .await
        .unwrap();

    assert_eq!(merged.into_document(), expected.to_json());
}

#[tokio::test]
async fn nested_deferrals_form_the_next_wave() {
    let patches = execute_incrementally(
        &engine(),
        "{ cheese(id: 1) { id ... @defer { similarCheese { id ... @defer { flavor } } } } }",
    )
    .await;

    assert_eq!(
        patches,
        vec![
            (json!([]), json!({"data": {"cheese": {"id": 1}}})),
            (json!(["data", "cheese", "similarCheese"]), json!({"id": 2})),
            (json!(["data", "cheese", "similarCheese", "flavor"]), json!("Gouda")),
        ]
    );
}

#[tokio::test]
async fn streamed_lists_deliver_one_item_per_wave() {
    let patches = execute_incrementally(
        &engine(),
        r#"{ milk(id: "1") { id flavors @stream } ... @defer { cheese(id: 1) { flavor } } }"#,
    )
    .await;

    assert_eq!(
        patches,
        vec![
            (json!([]), json!({"data": {"milk": {"id": "1", "flavors": []}}})),
            (json!(["data", "milk", "flavors", 0]), json!("Natural")),
            (json!(["data", "cheese"]), json!({"flavor": "Brie"})),
            (json!(["data", "milk", "flavors", 1]), json!("Chocolate")),
            (json!(["data", "milk", "flavors", 2]), json!("Strawberry")),
        ]
    );
}

/// Logs every patch path next to what resolvers log.
struct RecordingCollector(Arc<Mutex<Vec<String>>>);

impl PatchCollector for RecordingCollector {
    fn patch(&mut self, path: &[PathSegment], _value: Value) {
        let path = path.iter().map(ToString::to_string).collect::<Vec<_>>();
        self.0.lock().unwrap().push(format!("patch [{}]", path.join(", ")));
    }
}

#[tokio::test]
async fn streamed_iterators_are_pulled_after_the_previous_item_was_patched() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_builder()
        .resolver("Milk", "flavors", {
            let log = log.clone();
            move |ctx| {
                let flavors = ctx.parent["flavors"].as_array().cloned().unwrap_or_default();
                let log = log.clone();
                ValueIter::new(flavors.into_iter().enumerate().map(move |(index, flavor)| {
                    log.lock().unwrap().push(format!("pull {index}"));
                    ResolvedValue::Value(flavor)
                }))
                .into()
            }
        })
        .build()
        .unwrap();

    let mut collector = RecordingCollector(log.clone());
    engine
        .execute_with_collector(Request::new(r#"{ milk(id: "1") { flavors @stream } }"#), &mut collector)
        .await
        .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "patch []",
            "pull 0",
            "patch [data, milk, flavors, 0]",
            "pull 1",
            "patch [data, milk, flavors, 1]",
            "pull 2",
            "patch [data, milk, flavors, 2]",
        ]
    );
}

#[tokio::test]
async fn batches_nested_in_deferred_fields_are_fully_resolved() {
    let loader = CheeseLoader::new();
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", loader.clone(), |ctx| {
            (Value::Null, json!(similar_cheese_id(ctx.parent)))
        })
        .build()
        .unwrap();

    let patches = execute_incrementally(
        &engine,
        "{ cheese(id: 1) { id ... @defer { similarCheese { flavor similarCheese { flavor } } } } }",
    )
    .await;

    assert_eq!(
        patches,
        vec![
            (json!([]), json!({"data": {"cheese": {"id": 1}}})),
            (
                json!(["data", "cheese", "similarCheese"]),
                json!({"flavor": "Gouda", "similarCheese": {"flavor": "Manchego"}})
            ),
        ]
    );
    assert_eq!(loader.keys(), vec![vec![json!(2)], vec![json!(3)]]);
}

#[tokio::test]
async fn skip_wins_over_defer() {
    let patches = execute_incrementally(
        &engine(),
        "{ cheese(id: 1) { id ... @defer { flavor @skip(if: true) } ... @defer @skip(if: true) { origin } } }",
    )
    .await;

    assert_eq!(patches, vec![(json!([]), json!({"data": {"cheese": {"id": 1}}}))]);
}

#[tokio::test]
async fn defer_and_stream_can_be_disabled() {
    let query = "query($defer: Boolean!) { cheese(id: 1) { id ... @defer(if: $defer) { flavor } } milk(id: \"2\") { flavors @stream(if: false) } }";

    let patches = execute_incrementally(&engine(), Request::new(query).with_variables(json!({"defer": false}))).await;
    assert_eq!(
        patches,
        vec![(
            json!([]),
            json!({"data": {"cheese": {"id": 1, "flavor": "Brie"}, "milk": {"flavors": []}}})
        )]
    );

    let engine = engine_builder()
        .config(ExecutionConfig {
            incremental_delivery: false,
            ..Default::default()
        })
        .build()
        .unwrap();
    let patches = execute_incrementally(
        &engine,
        r#"{ cheese(id: 1) { id ... @defer { flavor } } milk(id: "1") { flavors @stream } }"#,
    )
    .await;
    assert_eq!(
        patches,
        vec![(
            json!([]),
            json!({
                "data": {
                    "cheese": {"id": 1, "flavor": "Brie"},
                    "milk": {"flavors": ["Natural", "Chocolate", "Strawberry"]}
                }
            })
        )]
    );
}

#[tokio::test]
async fn stream_on_a_non_list_field_is_ignored() {
    let patches = execute_incrementally(&engine(), "{ cheese(id: 1) @stream { flavor } }").await;

    assert_eq!(
        patches,
        vec![(json!([]), json!({"data": {"cheese": {"flavor": "Brie"}}}))]
    );
}

#[tokio::test]
async fn null_deferred_values_are_not_patched() {
    let patches = execute_incrementally(
        &engine(),
        "{ cheese(id: 3) { id ... @defer { similarCheese { id } } } }",
    )
    .await;

    assert_eq!(patches, vec![(json!([]), json!({"data": {"cheese": {"id": 3}}}))]);
}

#[tokio::test]
async fn deferred_errors_are_numbered_after_the_initial_ones() {
    let engine = engine_builder()
        .resolver("Cheese", "origin", |_| GraphqlError::field_error("Unknown origin").into())
        .build()
        .unwrap();

    let mut collector = Vec::<Patch>::new();
    let response = engine
        .execute_with_collector(
            Request::new("{ cheese(id: 1) { origin ... @defer { similarCheese { origin } } } }"),
            &mut collector,
        )
        .await
        .unwrap();
    assert_eq!(response.errors.len(), 1);

    let patches = patches(&collector);
    assert_eq!(patches.len(), 3);
    assert_eq!(patches[1], (json!(["data", "cheese", "similarCheese"]), json!({"origin": null})));

    let (path, error) = &patches[2];
    assert_eq!(path, &json!(["errors", 1]));
    assert_eq!(error["message"], "Unknown origin");
    assert_eq!(error["path"], json!(["cheese", "similarCheese", "origin"]));
}

#[tokio::test]
async fn unresolved_abstract_types_abort_the_execution() {
    let engine = engine_builder()
        .resolver("Query", "edible", |_| json!({"__typename": "Farm", "name": "Ferme"}).into())
        .build()
        .unwrap();

    let mut collector = Vec::<Patch>::new();
    let err = engine
        .execute_with_collector(Request::new("{ edible { fatContent } }"), &mut collector)
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::UnresolvedType { .. }), "{err:?}");
    assert_eq!(
        err.to_string(),
        "Abstract type Edible must resolve to one of its possible types, got Farm"
    );
    assert!(collector.is_empty());
}

#[tokio::test]
async fn unresolved_abstract_types_only_abort_their_deferral() {
    let engine = engine_builder()
        .resolver("Query", "edible", |_| json!({"fatContent": 0.1}).into())
        .build()
        .unwrap();

    let patches = execute_incrementally(
        &engine,
        r#"{ cheese(id: 1) { id } ... @defer { edible { fatContent } } ... @defer { milk(id: "2") { source } } }"#,
    )
    .await;

    assert_eq!(patches.len(), 3);
    assert_eq!(patches[0], (json!([]), json!({"data": {"cheese": {"id": 1}}})));

    let (path, error) = &patches[1];
    assert_eq!(path, &json!(["errors", 0]));
    assert_eq!(
        error["message"],
        "Abstract type Edible must resolve to one of its possible types, got no type"
    );
    assert_eq!(error["path"], json!(["edible"]));

    assert_eq!(patches[2], (json!(["data", "milk"]), json!({"source": "GOAT"})));
}

use std::sync::{Arc, Mutex, Weak};

use engine::{
    BatchLoad, BatchLoader, ErrorCode, ExecutionConfig, ExecutionError, GraphqlError, LoadedBatch, Request,
    ResolvedValue, ResolverContext, SchedulingPolicy,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use super::dairy::{CheeseLoader, engine_builder, errors, similar_cheese_id};

/// Shared value is the `source` argument, key is the id of the similar cheese.
fn similar_cheese_keys(ctx: ResolverContext<'_>) -> (Value, Value) {
    let shared = ctx.argument("source").cloned().unwrap_or_default();
    (shared, json!(similar_cheese_id(ctx.parent)))
}

#[tokio::test]
async fn sibling_loads_are_coalesced_into_one_call() {
    let loader = CheeseLoader::new();
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", loader.clone(), similar_cheese_keys)
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(
            r#"
            {
              a: cheese(id: 1) { similarCheese { flavor } }
              b: cheese(id: 2) { similarCheese { flavor } }
              c: cheese(id: 3) { similarCheese { flavor } }
            }
            "#,
        ))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({
            "data": {
                "a": {"similarCheese": {"flavor": "Gouda"}},
                "b": {"similarCheese": {"flavor": "Manchego"}},
                "c": {"similarCheese": null}
            }
        })
    );
    assert_eq!(loader.calls(), vec![(Value::Null, vec![json!(2), json!(3), json!(4)])]);
}

#[tokio::test]
async fn duplicate_keys_are_loaded_once() {
    let loader = CheeseLoader::new();
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", loader.clone(), similar_cheese_keys)
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(
            r#"
            {
              a: cheese(id: 1) { similarCheese { flavor } }
              b: cheese(id: 1) { similarCheese { id } }
            }
            "#,
        ))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({"data": {"a": {"similarCheese": {"flavor": "Gouda"}}, "b": {"similarCheese": {"id": 2}}}})
    );
    assert_eq!(loader.keys(), vec![vec![json!(2)]]);
}

#[tokio::test]
async fn loads_with_different_shared_values_are_separate_calls() {
    let loader = CheeseLoader::new();
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", loader.clone(), similar_cheese_keys)
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(
            r#"
            {
              a: cheese(id: 1) { cow: similarCheese(source: COW) { id } sheep: similarCheese(source: SHEEP) { id } }
              b: cheese(id: 2) { cow: similarCheese(source: COW) { id } }
            }
            "#,
        ))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({
            "data": {
                "a": {"cow": {"id": 2}, "sheep": {"id": 2}},
                "b": {"cow": {"id": 3}}
            }
        })
    );
    assert_eq!(
        loader.calls(),
        vec![
            (json!("COW"), vec![json!(2), json!(3)]),
            (json!("SHEEP"), vec![json!(2)])
        ]
    );
}

#[tokio::test]
async fn loads_inside_lists_and_type_conditions_are_coalesced() {
    let loader = CheeseLoader::new();
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", loader.clone(), similar_cheese_keys)
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new("{ dairy { ... on Cheese { similarCheese { flavor } } ... on Milk { id } } }"))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({
            "data": {
                "dairy": [
                    {"similarCheese": {"flavor": "Gouda"}},
                    {"id": "1"},
                    {"similarCheese": {"flavor": "Manchego"}}
                ]
            }
        })
    );
    assert_eq!(loader.keys(), vec![vec![json!(2), json!(3)]]);
}

#[tokio::test]
async fn nested_loads_form_one_generation_per_level() {
    let loader = CheeseLoader::new();
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", loader.clone(), similar_cheese_keys)
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(
            r#"
            {
              a: cheese(id: 1) { similarCheese { flavor similarCheese { flavor } } }
              b: cheese(id: 2) { similarCheese { flavor similarCheese { flavor } } }
            }
            "#,
        ))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({
            "data": {
                "a": {"similarCheese": {"flavor": "Gouda", "similarCheese": {"flavor": "Manchego"}}},
                "b": {"similarCheese": {"flavor": "Manchego", "similarCheese": null}}
            }
        })
    );
    assert_eq!(loader.keys(), vec![vec![json!(2), json!(3)], vec![json!(3), json!(4)]]);
}

#[tokio::test]
async fn resolvers_can_transform_loaded_values() {
    let loader = CheeseLoader::new();
    let engine = engine_builder()
        .resolver("Cheese", "origin", {
            let loader = loader.clone();
            move |ctx| {
                let id = ctx.parent["id"].clone();
                BatchLoad::new(loader.clone(), Value::Null, id)
                    .map(|cheese| match cheese {
                        ResolvedValue::Value(cheese) => cheese["origin"].clone().into(),
                        other => other,
                    })
                    .map(|origin| match origin {
                        ResolvedValue::Value(Value::String(origin)) => json!(origin.to_uppercase()).into(),
                        other => other,
                    })
                    .into()
            }
        })
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new("{ a: cheese(id: 1) { origin } b: cheese(id: 3) { origin } }"))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({"data": {"a": {"origin": "FRANCE"}, "b": {"origin": "SPAIN"}}})
    );
    assert_eq!(loader.keys(), vec![vec![json!(1), json!(3)]]);
}

struct UnavailableLoader;

#[async_trait::async_trait]
impl BatchLoader for UnavailableLoader {
    async fn load(&self, _shared: &Value, _keys: &[Value]) -> Result<LoadedBatch, GraphqlError> {
        Err(GraphqlError::new("Cheese registry unavailable", ErrorCode::BatchLoadError))
    }
}

#[tokio::test]
async fn loader_errors_become_errors_of_every_waiting_field() {
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", Arc::new(UnavailableLoader), similar_cheese_keys)
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(
            "{ a: cheese(id: 1) { flavor similarCheese { flavor } } b: cheese(id: 2) { similarCheese { flavor } } }",
        ))
        .await
        .unwrap();

    assert_eq!(
        response.data,
        Some(json!({"a": {"flavor": "Brie", "similarCheese": null}, "b": {"similarCheese": null}}))
    );
    assert_eq!(
        errors(&response.errors),
        json!([
            {"message": "Cheese registry unavailable", "path": ["a", "similarCheese"]},
            {"message": "Cheese registry unavailable", "path": ["b", "similarCheese"]}
        ])
    );
    assert!(response.errors.iter().all(|err| err.code == ErrorCode::BatchLoadError));
}

/// Only ever returns the first key it is given.
#[derive(Default)]
struct ForgetfulLoader {
    calls: Mutex<Vec<Vec<Value>>>,
}

#[async_trait::async_trait]
impl BatchLoader for ForgetfulLoader {
    fn name(&self) -> &str {
        "ForgetfulLoader"
    }

    async fn load(&self, _shared: &Value, keys: &[Value]) -> Result<LoadedBatch, GraphqlError> {
        self.calls.lock().unwrap().push(keys.to_vec());
        let mut batch = LoadedBatch::new();
        if let Some(key) = keys.first() {
            batch.insert(key, json!({"__typename": "Cheese", "id": key, "flavor": "Comté"}));
        }
        Ok(batch)
    }
}

#[tokio::test]
async fn missing_keys_are_retried_in_the_next_generation() {
    let loader = Arc::new(ForgetfulLoader::default());
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", loader.clone(), similar_cheese_keys)
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(
            "{ a: cheese(id: 1) { similarCheese { id } } b: cheese(id: 2) { similarCheese { id } } }",
        ))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({"data": {"a": {"similarCheese": {"id": 2}}, "b": {"similarCheese": {"id": 3}}}})
    );
    assert_eq!(
        *loader.calls.lock().unwrap(),
        vec![vec![json!(2), json!(3)], vec![json!(3)]]
    );
}

#[tokio::test]
async fn keys_never_returned_fail_the_execution() {
    let loader = Arc::new(ForgetfulLoader::default());
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", loader.clone(), similar_cheese_keys)
        .config(ExecutionConfig {
            max_batch_generations: 1,
            ..Default::default()
        })
        .build()
        .unwrap();

    let err = engine
        .execute(Request::new(
            "{ a: cheese(id: 1) { similarCheese { id } } b: cheese(id: 2) { similarCheese { id } } }",
        ))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, ExecutionError::LoaderExhausted { loader, attempts: 1, .. } if loader == "ForgetfulLoader"),
        "{err:?}"
    );
    assert_eq!(
        err.to_string(),
        "Batch loader ForgetfulLoader did not return keys 3 after 1 attempts"
    );
    assert_eq!(GraphqlError::from(err).code, ErrorCode::BatchLoadError);
}

/// Resolves every key to another load of the same key on itself.
struct CyclicLoader {
    this: Weak<CyclicLoader>,
    calls: Mutex<usize>,
}

#[async_trait::async_trait]
impl BatchLoader for CyclicLoader {
    fn name(&self) -> &str {
        "CyclicLoader"
    }

    async fn load(&self, shared: &Value, keys: &[Value]) -> Result<LoadedBatch, GraphqlError> {
        *self.calls.lock().unwrap() += 1;
        let this: Arc<dyn BatchLoader> = self.this.upgrade().ok_or_else(GraphqlError::internal_server_error)?;
        let mut batch = LoadedBatch::new();
        for key in keys {
            batch.insert(key, BatchLoad::new(this.clone(), shared.clone(), key.clone()));
        }
        Ok(batch)
    }
}

#[tokio::test]
async fn loaders_resolving_to_themselves_fail_after_max_generations() {
    let loader = Arc::new_cyclic(|this| CyclicLoader {
        this: this.clone(),
        calls: Mutex::new(0),
    });
    let engine = engine_builder()
        .batched("Cheese", "similarCheese", loader.clone(), similar_cheese_keys)
        .config(ExecutionConfig {
            max_batch_generations: 4,
            ..Default::default()
        })
        .build()
        .unwrap();

    let err = engine
        .execute(Request::new("{ cheese(id: 1) { similarCheese { id } } }"))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, ExecutionError::LoaderExhausted { loader, attempts: 4, .. } if loader == "CyclicLoader"),
        "{err:?}"
    );
    assert_eq!(
        err.to_string(),
        "Batch loader CyclicLoader did not return keys 2 after 4 attempts"
    );
    assert_eq!(*loader.calls.lock().unwrap(), 4);
}

#[tokio::test]
async fn concurrent_scheduling_produces_the_same_response() {
    let query = r#"
        {
          a: cheese(id: 1) { cow: similarCheese(source: COW) { flavor } sheep: similarCheese(source: SHEEP) { flavor } }
          b: cheese(id: 2) { cow: similarCheese(source: COW) { flavor } }
        }
    "#;

    let mut responses = Vec::new();
    for scheduling in [SchedulingPolicy::Sequential, SchedulingPolicy::Concurrent] {
        let loader = CheeseLoader::new();
        let engine = engine_builder()
            .batched("Cheese", "similarCheese", loader.clone(), similar_cheese_keys)
            .config(ExecutionConfig {
                scheduling,
                ..Default::default()
            })
            .build()
            .unwrap();
        let response = engine.execute(Request::new(query)).await.unwrap();
        assert_eq!(loader.calls().len(), 2);
        responses.push(response.to_json().to_string());
    }

    assert_eq!(responses[0], responses[1]);
}

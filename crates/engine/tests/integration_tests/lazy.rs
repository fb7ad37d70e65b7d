use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use engine::{BatchLoad, LazyValue, Request, ResolvedValue, ValueIter};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use super::dairy::{CheeseLoader, cheese, engine_builder, similar_cheese_id};

#[tokio::test]
async fn a_shared_lazy_value_is_computed_once() {
    let computations = Arc::new(AtomicUsize::new(0));
    let label = LazyValue::new({
        let computations = computations.clone();
        move || {
            computations.fetch_add(1, Ordering::SeqCst);
            json!("AOP").into()
        }
    });
    let engine = engine_builder()
        .resolver("Cheese", "origin", move |_| label.clone().into())
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(
            "{ a: cheese(id: 1) { origin } b: cheese(id: 2) { origin } c: cheese(id: 3) { origin } }",
        ))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({"data": {"a": {"origin": "AOP"}, "b": {"origin": "AOP"}, "c": {"origin": "AOP"}}})
    );
    assert_eq!(computations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn lazy_values_complete_like_any_other_value() {
    let engine = engine_builder()
        .resolver("Query", "cheese", |ctx| {
            let id = ctx.argument("id").and_then(Value::as_i64).unwrap_or_default();
            LazyValue::new(move || cheese(id).into()).into()
        })
        .resolver("Cheese", "flavor", |ctx| {
            let flavor = ctx.parent["flavor"].clone();
            LazyValue::ready(flavor)
                .then(|flavor| match flavor {
                    ResolvedValue::Value(Value::String(flavor)) => json!(flavor.to_lowercase()).into(),
                    other => other,
                })
                .into()
        })
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new("{ cheese(id: 2) { flavor similarCheese { flavor } } }"))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({"data": {"cheese": {"flavor": "gouda", "similarCheese": {"flavor": "manchego"}}}})
    );
}

#[tokio::test]
async fn batch_loads_returned_by_lazy_values_join_the_same_generation() {
    let loader = CheeseLoader::new();
    let engine = engine_builder()
        .resolver("Cheese", "similarCheese", {
            let loader = loader.clone();
            move |ctx| {
                let key = json!(similar_cheese_id(ctx.parent));
                let load = BatchLoad::new(loader.clone(), Value::Null, key);
                if ctx.parent["source"] == "SHEEP" {
                    LazyValue::new(move || load.into()).into()
                } else {
                    load.into()
                }
            }
        })
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(
            "{ a: cheese(id: 3) { similarCheese { id } } b: cheese(id: 1) { similarCheese { flavor } } }",
        ))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({"data": {"a": {"similarCheese": null}, "b": {"similarCheese": {"flavor": "Gouda"}}}})
    );
    assert_eq!(loader.keys(), vec![vec![json!(2), json!(4)]]);
}

#[tokio::test]
async fn lists_can_be_iterators_of_resolved_values() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let engine = engine_builder()
        .resolver("Milk", "flavors", {
            let pulled = pulled.clone();
            move |ctx| {
                let flavors = ctx.parent["flavors"].as_array().cloned().unwrap_or_default();
                let pulled = pulled.clone();
                ValueIter::new(flavors.into_iter().map(move |flavor| {
                    pulled.fetch_add(1, Ordering::SeqCst);
                    LazyValue::ready(flavor).into()
                }))
                .into()
            }
        })
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(r#"{ milk(id: "1") { flavors } other: milk(id: "2") { flavors } }"#))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({
            "data": {
                "milk": {"flavors": ["Natural", "Chocolate", "Strawberry"]},
                "other": {"flavors": []}
            }
        })
    );
    assert_eq!(pulled.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn lazy_values_of_nulled_objects_are_never_forced() {
    let computations = Arc::new(AtomicUsize::new(0));
    let engine = engine_builder()
        .resolver("Cheese", "origin", {
            let computations = computations.clone();
            move |ctx| {
                let origin = ctx.parent["origin"].clone();
                let computations = computations.clone();
                LazyValue::new(move || {
                    computations.fetch_add(1, Ordering::SeqCst);
                    origin.into()
                })
                .into()
            }
        })
        .resolver("Cheese", "flavor", |_| ResolvedValue::null())
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new("{ cheese(id: 1) { origin flavor } }"))
        .await
        .unwrap();

    assert_eq!(response.data, Some(json!({"cheese": null})));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(computations.load(Ordering::SeqCst), 0);
}

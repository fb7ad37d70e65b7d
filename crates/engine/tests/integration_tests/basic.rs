use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use engine::{Engine, ErrorCode, Request, ResolvedValue};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use super::dairy::{self, cheese, engine, engine_builder, errors};

#[tokio::test]
async fn fields_default_to_the_parent_property() {
    let engine = Engine::new(dairy::schema());
    let request = Request::new("{ edible { fatContent ... on Cheese { id flavor __typename } } }")
        .with_root_value(json!({"edible": cheese(1)}));

    let response = engine.execute(request).await.unwrap();

    insta::assert_json_snapshot!(response.to_json(), @r#"
    {
      "data": {
        "edible": {
          "fatContent": 0.19,
          "id": 1,
          "flavor": "Brie",
          "__typename": "Cheese"
        }
      }
    }
    "#);
}

#[tokio::test]
async fn selections_follow_document_order_across_type_conditions() {
    let response = engine()
        .execute(Request::new(
            r#"
            {
              dairy {
                ... on Cheese { id flavor }
                ... on Edible { fatContent }
                __typename
                ... on Milk { id source }
              }
            }
            "#,
        ))
        .await
        .unwrap();

    insta::assert_json_snapshot!(response.to_json(), @r#"
    {
      "data": {
        "dairy": [
          {
            "id": 1,
            "flavor": "Brie",
            "fatContent": 0.19,
            "__typename": "Cheese"
          },
          {
            "fatContent": 0.04,
            "__typename": "Milk",
            "id": "1",
            "source": "COW"
          },
          {
            "id": 2,
            "flavor": "Gouda",
            "fatContent": 0.3,
            "__typename": "Cheese"
          }
        ]
      }
    }
    "#);
}

#[tokio::test]
async fn fields_requested_under_several_type_conditions_resolve_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = engine_builder()
        .resolver("Cheese", "producer", {
            let calls = calls.clone();
            move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                json!({"name": "Ferme des Peupliers", "location": "Normandy"}).into()
            }
        })
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(
            r#"
            {
              edible {
                ... on Cheese { producer { name } }
                ... on Edible { producer { location } }
                ...Producer
              }
            }

            fragment Producer on Cheese {
              producer { name }
            }
            "#,
        ))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({"data": {"edible": {"producer": {"name": "Ferme des Peupliers", "location": "Normandy"}}}})
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn arguments_come_from_literals_variables_and_defaults() {
    let engine = engine_builder()
        .resolver("Cheese", "similarCheese", |ctx| {
            match ctx.argument("source").and_then(Value::as_str) {
                Some("SHEEP") => cheese(3).into(),
                Some(_) => cheese(2).into(),
                None => ResolvedValue::null(),
            }
        })
        .build()
        .unwrap();

    let request = Request::new(
        r#"
        query Similar($id: Int!, $source: Animal) {
          cheese(id: $id) {
            flavor
            sheep: similarCheese(source: $source) { flavor }
            cow: similarCheese(source: COW) { flavor }
            none: similarCheese { flavor }
          }
        }
        "#,
    )
    .with_operation_name("Similar")
    .with_variables(json!({"id": 1, "source": "SHEEP"}));
    let response = engine.execute(request).await.unwrap();

    assert_eq!(
        response.to_json(),
        json!({
            "data": {
                "cheese": {
                    "flavor": "Brie",
                    "sheep": {"flavor": "Manchego"},
                    "cow": {"flavor": "Gouda"},
                    "none": null
                }
            }
        })
    );
}

#[tokio::test]
async fn resolvers_see_the_request_context() {
    let engine = engine_builder()
        .resolver("Cheese", "origin", |ctx| {
            let origin = ctx.parent.get("origin").and_then(Value::as_str).unwrap_or_default();
            match ctx.context.get("locale").and_then(Value::as_str) {
                Some("fr") if origin == "France" => json!("La France").into(),
                _ => json!(origin).into(),
            }
        })
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new("{ cheese(id: 1) { origin } }").with_context(json!({"locale": "fr"})))
        .await
        .unwrap();

    assert_eq!(response.to_json(), json!({"data": {"cheese": {"origin": "La France"}}}));
}

#[tokio::test]
async fn leaf_values_are_coerced() {
    let engine = engine_builder()
        .resolver("Cheese", "origin", |_| json!(42).into())
        .resolver("Cheese", "fatContent", |_| json!(1).into())
        .resolver("Milk", "id", |_| json!(7).into())
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new(r#"{ cheese(id: 1) { origin fatContent } milk(id: "1") { id } }"#))
        .await
        .unwrap();

    assert_eq!(
        response.to_json(),
        json!({"data": {"cheese": {"origin": "42", "fatContent": 1.0}, "milk": {"id": "7"}}})
    );
}

#[tokio::test]
async fn coercion_errors_null_the_field() {
    let engine = engine_builder()
        .resolver("Cheese", "origin", |_| json!({"country": "France"}).into())
        .resolver("Cheese", "source", |_| json!("HORSE").into())
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new("{ a: cheese(id: 1) { origin } b: cheese(id: 2) { flavor source } }"))
        .await
        .unwrap();

    assert_eq!(response.data, Some(json!({"a": {"origin": null}, "b": null})));
    assert_eq!(
        errors(&response.errors),
        json!([
            {"message": r#"String cannot represent value: {"country":"France"}"#, "path": ["a", "origin"]},
            {"message": r#"Enum Animal cannot represent value: "HORSE""#, "path": ["b", "source"]}
        ])
    );
    assert!(response.errors.iter().all(|err| err.code == ErrorCode::CoercionError));
}

#[tokio::test]
async fn custom_scalar_coercion() {
    let schema = dairy::schema_from(
        r#"
        scalar Date
        type Query { today: Date, tomorrow: Date }
        "#,
    );
    let engine = Engine::builder(schema)
        .scalar("Date", |value| match value.as_str() {
            Some(date) if date.len() == 10 => Ok(value.clone()),
            _ => Err(format!("Invalid date: {value}")),
        })
        .build()
        .unwrap();

    let response = engine
        .execute(Request::new("{ today tomorrow }").with_root_value(json!({"today": "2024-05-01", "tomorrow": 3})))
        .await
        .unwrap();

    assert_eq!(response.data, Some(json!({"today": "2024-05-01", "tomorrow": null})));
    assert_eq!(
        errors(&response.errors),
        json!([{"message": "Invalid date: 3", "path": ["tomorrow"]}])
    );
}

#[tokio::test]
async fn invalid_operations_have_no_data() {
    let response = engine()
        .execute(Request::new("{ cheese(id: 1) { unknown } }"))
        .await
        .unwrap();

    assert_eq!(response.data, None);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].code, ErrorCode::OperationValidationError);
    assert!(
        response.errors[0]
            .message
            .ends_with("does not have a field named 'unknown'"),
        "{}",
        response.errors[0].message
    );
    assert!(response.to_json().get("data").is_none());

    let response = engine().execute(Request::new("{ cheese(id: 1) { ")).await.unwrap();
    assert_eq!(response.data, None);
    assert_eq!(response.errors[0].code, ErrorCode::OperationParsingError);
}

#[tokio::test]
async fn missing_variables_are_request_errors() {
    let response = engine()
        .execute(Request::new("query ($id: Int!) { cheese(id: $id) { flavor } }"))
        .await
        .unwrap();

    assert_eq!(response.data, None);
    assert_eq!(errors(&response.errors), json!([{"message": "Variable $id is missing", "path": null}]));
    assert_eq!(response.errors[0].code, ErrorCode::VariableError);
}

#[tokio::test]
async fn subscriptions_are_rejected() {
    let schema = dairy::schema_from(
        r#"
        type Query { cheese: String }
        type Subscription { cheeseAdded: String }
        "#,
    );
    let response = Engine::new(schema)
        .execute(Request::new("subscription { cheeseAdded }"))
        .await
        .unwrap();

    assert_eq!(response.data, None);
    assert_eq!(response.errors[0].code, ErrorCode::OperationValidationError);
}

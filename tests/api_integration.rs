//! Integration tests for the HTTP API
//!
//! Drives the router directly with `oneshot`, sharing state through clones

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use screener::core::{create_router, EvidenceStore, FillPolicy};
use screener::types::{Criterion, EvidenceItem, ExcludeReasons};
use serde_json::{json, Value};
use tower::ServiceExt;

fn create_test_router() -> Router {
    let items = vec![
        EvidenceItem::new(1).with_field("title", "Dedupe at scale"),
        EvidenceItem::new(2)
            .with_field("title", "A survey of record linkage")
            .with_exclude_reasons(ExcludeReasons::parse("secondary study")),
        EvidenceItem::new(3).with_field("title", "JedAI"),
    ];
    let store = EvidenceStore::new(items, Criterion::defaults(), FillPolicy::AnyDecision).unwrap();
    create_router(store)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["items"], 3);
    assert_eq!(json["filled"], 1);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_criteria_endpoint() {
    let app = create_test_router();
    let (status, json) = send(&app, "GET", "/criteria", None).await;

    assert_eq!(status, StatusCode::OK);
    let criteria = json.as_array().unwrap();
    assert_eq!(criteria.len(), Criterion::defaults().len());
    assert_eq!(criteria[0]["criterionType"], "include");
}

#[tokio::test]
async fn test_get_evidence() {
    let app = create_test_router();
    let (status, json) = send(&app, "GET", "/evidence/2", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["clusterId"], 2);
    assert_eq!(json["include"], false);
    assert_eq!(json["excludeReasons"], json!(["secondary study"]));

    let (status, json) = send(&app, "GET", "/evidence/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_evidence_by_text_id() {
    let items = vec![
        EvidenceItem::new("007").with_field("title", "Agent"),
        EvidenceItem::new(7).with_field("title", "Seven"),
    ];
    let store = EvidenceStore::new(items, Criterion::defaults(), FillPolicy::AnyDecision).unwrap();
    let app = create_router(store);

    let (status, json) = send(&app, "GET", "/evidence/007", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["clusterId"], "007");
    assert_eq!(json["title"], "Agent");

    let (status, json) = send(&app, "GET", "/evidence/7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["clusterId"], 7);

    let (status, json) = send(
        &app,
        "PATCH",
        "/evidence/toggle-exclude-reason",
        Some(json!({"id": "007", "toggle": true, "exclude_reason": "technique, method or experiment"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["remaining_exclusions"], json!(["technique, method or experiment"]));
    assert_eq!(json["evidence"]["clusterId"], "007");
}

#[tokio::test]
async fn test_toggle_applies_and_clears_reason() {
    let app = create_test_router();

    let (status, json) = send(
        &app,
        "PATCH",
        "/evidence/toggle-exclude-reason",
        Some(json!({"id": 1, "toggle": true, "exclude_reason": "Not English"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["selection_status"], "exclude");
    assert_eq!(json["remaining_exclusions"], json!(["not english"]));
    assert_eq!(json["changed"], true);
    assert_eq!(json["complete"], true);
    assert_eq!(json["evidence"]["include"], false);

    // Same toggle again: stored state unchanged
    let (_, json) = send(
        &app,
        "PATCH",
        "/evidence/toggle-exclude-reason",
        Some(json!({"id": 1, "toggle": true, "exclude_reason": "not english"})),
    )
    .await;
    assert_eq!(json["changed"], false);
    assert_eq!(json["remaining_exclusions"], json!(["not english"]));

    let (_, json) = send(
        &app,
        "PATCH",
        "/evidence/toggle-exclude-reason",
        Some(json!({"id": 1, "toggle": false, "exclude_reason": "not english"})),
    )
    .await;
    assert_eq!(json["selection_status"], "include");
    assert_eq!(json["remaining_exclusions"], json!([]));
    assert_eq!(json["evidence"]["include"], true);
}

#[tokio::test]
async fn test_toggle_errors() {
    let app = create_test_router();

    let (status, _) = send(
        &app,
        "PATCH",
        "/evidence/toggle-exclude-reason",
        Some(json!({"id": 99, "toggle": true, "exclude_reason": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(
        &app,
        "PATCH",
        "/evidence/toggle-exclude-reason",
        Some(json!({"id": 1, "toggle": true, "exclude_reason": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "VALIDATION");
}

#[tokio::test]
async fn test_save_derives_include_from_reasons() {
    let app = create_test_router();

    let (status, json) = send(
        &app,
        "PATCH",
        "/evidence/save",
        Some(json!({
            "clusterId": 3,
            "include": true,
            "excludeReasons": ["not e2e", "not e2e", "<unspecified reason>"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["evidence"]["include"], false);
    assert_eq!(json["remaining_exclusions"], json!(["not e2e"]));
    assert_eq!(json["changed"], true);
}

#[tokio::test]
async fn test_navigate_actions() {
    let app = create_test_router();
    let nav = |body: Value| {
        let app = app.clone();
        async move { send(&app, "POST", "/evidence/navigate", Some(body)).await }
    };

    let (status, json) = nav(json!({"clusterId": 2, "action": "next"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["evidence"]["clusterId"], 3);
    assert_eq!(json["minId"], 1);
    assert_eq!(json["maxId"], 3);
    assert_eq!(json["allFilled"], false);

    let (_, json) = nav(json!({"clusterId": 1, "action": "prev"})).await;
    assert_eq!(json["evidence"]["clusterId"], 1);

    let (_, json) = nav(json!({"clusterId": 3, "action": "last"})).await;
    assert_eq!(json["evidence"]["clusterId"], 3);

    let (_, json) = nav(json!({"clusterId": 1, "action": "unfilled"})).await;
    assert_eq!(json["evidence"]["clusterId"], 3);

    let (_, json) = nav(json!({"clusterId": 3, "action": "firstUnfilled"})).await;
    assert_eq!(json["evidence"]["clusterId"], 1);

    let (_, json) = nav(json!({"clusterId": 1, "action": "goto", "targetId": 3})).await;
    assert_eq!(json["evidence"]["clusterId"], 3);

    let (status, json) = nav(json!({"clusterId": 9999, "action": "goto"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "evidence 9999 not found");
}

#[tokio::test]
async fn test_navigate_all_filled() {
    let app = create_test_router();
    for id in [1, 3] {
        let (status, _) = send(
            &app,
            "PATCH",
            "/evidence/toggle-exclude-reason",
            Some(json!({"id": id, "toggle": false, "exclude_reason": "not er"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = send(
        &app,
        "POST",
        "/evidence/navigate",
        Some(json!({"clusterId": 3, "action": "nextUnfilled"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["allFilled"], true);
    assert_eq!(json["evidence"]["clusterId"], 3);
}

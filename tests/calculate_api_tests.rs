//! Integration tests for the HTTP surface, driven through the axum router
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use blinds_pricing::{
    api,
    ledger::{CsvLedger, MemoryLedger},
    PricingCalculator, PricingRules,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(ledger: Arc<MemoryLedger>) -> Router {
    api::router(Arc::new(PricingCalculator::new(ledger, PricingRules::default())))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_calculate(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/calculate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_and_ping() {
    let ledger = Arc::new(MemoryLedger::new());

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(ledger.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let request = Request::builder().uri("/ping").body(Body::empty()).unwrap();
    let (status, body) = send(app(ledger), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "message": "pong" }));
}

#[tokio::test]
async fn test_calculate_applies_moq_floor() {
    let ledger = Arc::new(MemoryLedger::new());

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [{"width": 1.0, "height": 1.0, "pcs": 2}]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "ok": true,
            "lines": [
                { "width": 1.0, "height": 1.0, "area": 1.0, "moq_area": 1.5 },
                { "width": 1.0, "height": 1.0, "area": 1.0, "moq_area": 1.5 }
            ],
            "total_area": 3.0,
            "net": 117.0,
            "vat": 5.85,
            "total": 122.85
        })
    );
    assert_eq!(ledger.rows().len(), 2);
}

#[tokio::test]
async fn test_calculate_defaults_pcs_to_one() {
    let ledger = Arc::new(MemoryLedger::new());

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [{"width": 2, "height": 1}]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"].as_array().unwrap().len(), 1);
    assert_eq!(body["total_area"], json!(2.0));
    assert_eq!(body["net"], json!(78.0));
    assert_eq!(body["vat"], json!(3.9));
    assert_eq!(body["total"], json!(81.9));
    assert_eq!(ledger.rows().len(), 1);
}

#[tokio::test]
async fn test_calculate_empty_items_with_clear() {
    let ledger = Arc::new(MemoryLedger::new());

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [], "clear": true}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"], json!([]));
    assert_eq!(body["total"], json!(0.0));
    assert_eq!(ledger.clear_calls(), 1);
    assert_eq!(ledger.append_calls(), 0);
}

#[tokio::test]
async fn test_malformed_payload_is_client_error() {
    let ledger = Arc::new(MemoryLedger::new());

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [{"width": "wide", "height": 1.0}], "clear": true}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"]["type"], json!("validation_error"));
    assert_eq!(ledger.clear_calls(), 0);
}

#[tokio::test]
async fn test_non_positive_dimensions_rejected() {
    let ledger = Arc::new(MemoryLedger::new());

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [{"width": 1.0, "height": 1.0}, {"width": -2.0, "height": 1.0}]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("items[1]"));
    assert_eq!(ledger.append_calls(), 0);
}

#[tokio::test]
async fn test_ledger_failure_is_server_error() {
    let ledger = Arc::new(MemoryLedger::failing_on_append(2));

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [{"width": 2.0, "height": 1.0, "pcs": 3}]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["type"], json!("external_store_error"));
    assert_eq!(body["error"]["rows_written"], json!(1));
    assert_eq!(ledger.rows().len(), 1);
}

#[tokio::test]
async fn test_dry_run_leaves_ledger_untouched() {
    let ledger = Arc::new(MemoryLedger::new());

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [{"width": 1.0, "height": 1.0, "pcs": 2}], "clear": true, "dry_run": true}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(122.85));
    assert_eq!(ledger.clear_calls(), 0);
    assert_eq!(ledger.append_calls(), 0);
}

#[tokio::test]
async fn test_csv_ledger_receives_one_row_per_piece() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");
    let calculator = PricingCalculator::new(Arc::new(CsvLedger::new(&path)), PricingRules::default());
    let app = api::router(Arc::new(calculator));

    let (status, _) = send(
        app,
        post_calculate(r#"{"items": [{"width": 1.2, "height": 1.3, "pcs": 2}, {"width": 0.5, "height": 0.5}]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "width,height,area,moq_area\n1.2,1.3,1.56,1.56\n1.2,1.3,1.56,1.56\n0.5,0.5,0.25,1.5\n"
    );
}

#[tokio::test]
async fn test_calculate_rounds_on_binary_values() {
    let ledger = Arc::new(MemoryLedger::new());

    // 0.5 * 3.05 is 1.52499.. as a double
    let (status, body) = send(
        app(ledger),
        post_calculate(r#"{"items": [{"width": 0.5, "height": 3.05}]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"][0]["area"], json!(1.52));
    assert_eq!(body["total_area"], json!(1.52));
    assert_eq!(body["net"], json!(59.28));
    assert_eq!(body["vat"], json!(2.96));
    assert_eq!(body["total"], json!(62.24));
}

#[tokio::test]
async fn test_integral_float_pcs_accepted() {
    let ledger = Arc::new(MemoryLedger::new());

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [{"width": 2.0, "height": 1.0, "pcs": 2.0}]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"].as_array().unwrap().len(), 2);
    assert_eq!(ledger.rows().len(), 2);

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [{"width": 2.0, "height": 1.0, "pcs": 2.5}]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(ledger.rows().len(), 2);
}

#[tokio::test]
async fn test_piece_limit_is_client_error() {
    let ledger = Arc::new(MemoryLedger::new());

    let (status, body) = send(
        app(ledger.clone()),
        post_calculate(r#"{"items": [{"width": 2.0, "height": 1.0, "pcs": 5000}], "clear": true}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], json!("validation_error"));
    assert!(body["error"]["message"].as_str().unwrap().contains("limit of 1000"));
    assert_eq!(ledger.clear_calls(), 0);
    assert!(ledger.rows().is_empty());
}

//! HTTP-level integration tests for the Setu REST backend.
//!
//! Each test builds the router in memory and drives it with `oneshot`; no
//! socket or external service is needed.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::Router;
use base64::Engine;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

use setu::forms::{Reconciler, SubmissionAdapter};
use setu::scanner::{DocumentScanService, PlainTextExtractor};
use setu_types::{ExtractedData, SubmissionPayload};
use setu_web_server::{create_router, AppState};

// ── Helpers ────────────────────────────────────────────────────

fn build_test_app() -> (Router, Arc<Mutex<Vec<SubmissionPayload>>>) {
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delivered);
    let state = AppState::new(
        Reconciler::with_builtin_config(),
        DocumentScanService::new(Arc::new(PlainTextExtractor)),
        SubmissionAdapter::from_fn(move |payload: &SubmissionPayload| {
            sink.lock().unwrap().push(payload.clone());
        }),
    );
    (create_router(state), delivered)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(
        |_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }),
    )
}

async fn send_raw(app: &Router, method: &str, uri: &str, body: Option<&str>) -> axum::response::Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Bodies are sent as written so the OCR field order reaches the server
/// untouched; `json!` would sort object keys.
async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let resp = send_raw(app, method, uri, body).await;
    let status = resp.status();
    (status, body_json(resp).await)
}

const CITIZENSHIP_REQUEST: &str = r#"{
    "ocr_response": {
        "status": "ok",
        "document_type": "citizenship",
        "extracted_data": {
            "full_name": "Ram Sharma",
            "dob": "1990-01-01",
            "citizenship_number": "",
            "district": "Kathmandu"
        }
    }
}"#;

const CITIZENSHIP_FIELD_ORDER: [&str; 4] = ["full_name", "dob", "citizenship_number", "district"];

/// Typed views over the envelope, keeping object key order from the wire
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct Submitted {
    submitted: bool,
    payload: ExtractedData,
}

fn field_names(session: &Value) -> Vec<&str> {
    session["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let (app, _) = build_test_app();
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": "OK", "error": null}));
}

#[tokio::test]
async fn test_citizenship_scenario_over_http() {
    let (app, delivered) = build_test_app();

    let (status, body) = send(&app, "POST", "/api/forms/sessions", Some(CITIZENSHIP_REQUEST)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ready");
    let session = &body["data"]["session"];
    assert_eq!(session["title"], "CITIZENSHIP Mock Form");
    assert_eq!(field_names(session), CITIZENSHIP_FIELD_ORDER);
    assert_eq!(session["fields"][1], json!({"name": "dob", "label": "Dob", "type": "date"}));
    let id = session["id"].as_str().unwrap().to_string();

    let (_, body) = send(&app, "POST", &format!("/api/forms/sessions/{}/validate", id), None).await;
    assert_eq!(
        body["data"],
        json!({"valid": false, "errors": {"citizenship_number": "Required"}})
    );

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/forms/sessions/{}/fields/citizenship_number", id),
        Some(r#"{"value": "12-34-56"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["values"]["citizenship_number"], "12-34-56");
    assert_eq!(body["data"]["errors"], json!({}));

    let resp = send_raw(&app, "POST", &format!("/api/forms/sessions/{}/submit", id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let submitted: Envelope<Submitted> = serde_json::from_slice(&bytes).unwrap();
    assert!(submitted.data.submitted);
    let payload: Vec<(&str, &str)> = submitted.data.payload.iter().collect();
    assert_eq!(
        payload,
        vec![
            ("document_type", "citizenship"),
            ("full_name", "Ram Sharma"),
            ("dob", "1990-01-01"),
            ("citizenship_number", "12-34-56"),
            ("district", "Kathmandu"),
        ]
    );
    assert_eq!(delivered.lock().unwrap().len(), 1);

    // Submitted sessions are discarded
    let (status, _) = send(&app, "GET", &format!("/api/forms/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_field_order_follows_ocr_order() {
    let (app, _) = build_test_app();
    let request = r#"{
        "ocr_response": {
            "status": "ok",
            "document_type": "citizenship",
            "extracted_data": {"zeta": "z", "alpha": "a", "mid": "m"}
        }
    }"#;

    let (status, body) = send(&app, "POST", "/api/forms/sessions", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field_names(&body["data"]["session"]), ["zeta", "alpha", "mid"]);
}

#[tokio::test]
async fn test_invalid_submit_keeps_session() {
    let (app, delivered) = build_test_app();
    let (_, body) = send(&app, "POST", "/api/forms/sessions", Some(CITIZENSHIP_REQUEST)).await;
    let id = body["data"]["session"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "POST", &format!("/api/forms/sessions/{}/submit", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["submitted"], false);
    assert_eq!(body["data"]["errors"], json!({"citizenship_number": "Required"}));
    assert!(delivered.lock().unwrap().is_empty());

    let (status, body) = send(&app, "GET", &format!("/api/forms/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phase"], "editing");
}

#[tokio::test]
async fn test_unknown_field_and_cancel() {
    let (app, _) = build_test_app();
    let (_, body) = send(&app, "POST", "/api/forms/sessions", Some(CITIZENSHIP_REQUEST)).await;
    let id = body["data"]["session"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/forms/sessions/{}/fields/nickname", id),
        Some(r#"{"value": "Ramu"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unknown field 'nickname'");

    let uri = format!("/api/forms/sessions/{}", id);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_document_type_is_unavailable() {
    let (app, _) = build_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/forms/sessions",
        Some(r#"{"ocr_response": {"status": "ok", "extracted_data": {"full_name": "Ram"}}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "status": "unavailable",
            "reason": "missing_document_type",
            "message": "No document type detected."
        })
    );
}

#[tokio::test]
async fn test_resolve_static_fields() {
    let (app, _) = build_test_app();
    let request = r#"{
        "ocr_response": {
            "status": "ok",
            "document_type": "citizenship",
            "extracted_data": {"full_name": "Ram Sharma", "dob": "1990-01-01"}
        },
        "use_dynamic_fields": false
    }"#;

    let (status, body) = send(&app, "POST", "/api/forms/resolve", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        ["Full Name", "Date of Birth", "Citizenship Number", "District"]
    );

    let (_, body) = send(&app, "GET", "/api/forms/config", None).await;
    let types: Vec<&String> = body["data"]["document_types"]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(types.len(), 4);
}

#[tokio::test]
async fn test_scan_document() {
    let (app, _) = build_test_app();
    let content = base64::engine::general_purpose::STANDARD
        .encode("Name: Ram Sharma\nDate of Birth: 1990-01-01\nDistrict: Kathmandu");
    let request = json!({
        "file_name": "citizen.txt",
        "content_base64": content,
        "document_type": "citizenship"
    })
    .to_string();

    let resp = send_raw(&app, "POST", "/api/documents/scan/", Some(&request)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let scanned: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        scanned,
        json!({
            "status": "success",
            "document_type": "citizenship",
            "extracted_data": {
                "full_name": "Ram Sharma",
                "dob": "1990-01-01",
                "citizenship_number": "",
                "district": "Kathmandu"
            }
        })
    );

    // Extracted fields keep parser order on the wire
    #[derive(Deserialize)]
    struct Scanned {
        extracted_data: ExtractedData,
    }
    let scanned: Scanned = serde_json::from_slice(&bytes).unwrap();
    let keys: Vec<&str> = scanned.extracted_data.keys().collect();
    assert_eq!(keys, CITIZENSHIP_FIELD_ORDER);
}

#[tokio::test]
async fn test_scan_errors() {
    let (app, _) = build_test_app();

    let (status, body) = send(&app, "GET", "/api/documents/scan/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["detail"].as_str().unwrap().starts_with("Use POST"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/documents/scan/",
        Some(r#"{"document_type": "citizenship"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "File and document_type are required.");

    let content = base64::engine::general_purpose::STANDARD.encode("Land deed");
    let request = json!({"file_name": "deed.txt", "content_base64": content, "document_type": "land"});
    let (status, body) = send(&app, "POST", "/api/documents/scan/", Some(&request.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid document_type.");

    let request = json!({"file_name": "card.png", "content_base64": content, "document_type": "pan"});
    let (status, _) = send(&app, "POST", "/api/documents/scan/", Some(&request.to_string())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

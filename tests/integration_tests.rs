use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceExt;

use booking_autofill::config::AppConfig;
use booking_autofill::handlers;
use booking_autofill::models::{BookingRecord, FillReport, StatusKind};
use booking_autofill::services::page::{self, PageError};
use booking_autofill::services::panel::{PageTransport, PanelSession};
use booking_autofill::services::resolver::{FieldResolver, ResolverMode};
use booking_autofill::state::AppState;

// ── Mock Transport ──

/// Stands in for a page the panel cannot reach.
struct UnreachablePage;

#[async_trait]
impl PageTransport for UnreachablePage {
    async fn fill_form(&self, _record: &BookingRecord) -> Result<FillReport, PageError> {
        Err(PageError::AgentGone)
    }
}

// ── Helpers ──

const EMAIL: &str = "Hi team,\n\
    Please find the booking below.\n\
    Date: 5th April 2025\n\
    Start time: 2pm\n\
    Room: Studio A\n\
    Client names: Acme School\n\
    Client contact email: a@b.com\n\
    Client contact phone: 0400 000 000\n\
    Package: DJ Package\n\
    Thanks!";

const FORM_PAGE: &str = r#"<html><body><form>
  <label for="contact">Account point of contact</label><input id="contact">
  <label for="date">Event date</label><input type="date" id="date">
  <label for="kind">Event type</label>
  <select id="kind"><option value="">--</option><option value="edu">Schools &amp; Universities</option></select>
  <fieldset><legend>Is it a SATURDAY booking?</legend>
    <label><input type="radio" name="sat" value="Yes"> Yes</label>
    <label><input type="radio" name="sat" value="No"> No</label>
  </fieldset>
  <label for="school">School/company:</label><input id="school">
  <label for="email">Customer best contact email</label><input id="email">
  <label for="venue">Venue (room)</label><input id="venue">
  <label for="start">Start time</label><input id="start">
  <label for="finish">Finish time</label><input id="finish">
</form></body></html>"#;

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        form_page_path: None,
        selectors_path: None,
        resolver_mode: ResolverMode::Auto,
        date_picker_settle_ms: 0,
        dropdown_settle_ms: 0,
        default_account_contact: "May".to_string(),
        default_account_email: String::new(),
    }
}

fn test_state(page: Option<&str>) -> Arc<AppState> {
    let config = test_config();
    let resolver = FieldResolver::new(config.resolver_config().unwrap());
    let (handle, _agent) = page::spawn(resolver, page.map(str::to_string));
    Arc::new(AppState {
        panel: PanelSession::new(Arc::new(handle.clone())),
        page: handle,
    })
}

fn test_state_with_transport(transport: Arc<dyn PageTransport>) -> Arc<AppState> {
    let config = test_config();
    let resolver = FieldResolver::new(config.resolver_config().unwrap());
    let (handle, _agent) = page::spawn(resolver, None);
    Arc::new(AppState {
        panel: PanelSession::new(transport),
        page: handle,
    })
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/panel", get(handlers::panel::panel_page))
        .route("/api/extract", post(handlers::panel::extract))
        .route(
            "/api/record",
            get(handlers::panel::get_record).put(handlers::panel::put_record),
        )
        .route("/api/fill", post(handlers::panel::fill))
        .route(
            "/api/page",
            get(handlers::page::get_page).post(handlers::page::load_page),
        )
        .with_state(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(res: axum::response::Response) -> String {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

// ── Health & Panel Page ──

#[tokio::test]
async fn test_health() {
    let app = test_app(test_state(None));

    let res = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_panel_page_served() {
    let app = test_app(test_state(None));

    let res = app.oneshot(empty_request("GET", "/panel")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert!(html.contains("Fill Form"));
}

// ── Extraction ──

#[tokio::test]
async fn test_extract_returns_record() {
    let app = test_app(test_state(None));

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/extract",
            serde_json::json!({ "text": EMAIL }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"]["kind"], "success");
    assert_eq!(
        json["status"]["message"],
        "Data extracted successfully. Click \"Fill Form\" to autofill the booking form."
    );
    let record = &json["record"];
    assert_eq!(record["eventDate"], "05/Apr/25");
    assert_eq!(record["isSaturday"], true);
    assert_eq!(record["startTime"], "2pm");
    assert_eq!(record["finishTime"], "6:00pm");
    assert_eq!(record["totalHours"], 4.0);
    assert_eq!(record["venue"], "Studio A");
    assert_eq!(record["schoolCompany"], "Acme School");
    assert_eq!(record["personName"], "Acme School");
    assert_eq!(record["contactEmail"], "a@b.com");
    assert_eq!(record["accountEmail"], "a@b.com");
    assert_eq!(record["hasDjPackage"], true);
    assert_eq!(record["eventType"], "Schools & Universities");
    assert_eq!(record["createCustomerContact"], true);
}

#[tokio::test]
async fn test_extract_blank_text_rejected() {
    let app = test_app(test_state(None));

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/extract",
            serde_json::json!({ "text": "  " }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["error"], "Please paste the email content first.");
    assert_eq!(json["status"]["kind"], "error");
}

#[tokio::test]
async fn test_record_starts_empty_then_holds_latest_extraction() {
    let state = test_state(None);

    let res = test_app(state.clone())
        .oneshot(empty_request("GET", "/api/record"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert!(json["record"].is_null());

    for text in [EMAIL, "Location: Main Hall"] {
        let res = test_app(state.clone())
            .oneshot(json_request(
                "POST",
                "/api/extract",
                serde_json::json!({ "text": text }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = test_app(state)
        .oneshot(empty_request("GET", "/api/record"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["record"]["venue"], "Main Hall");
    assert!(json["record"].get("eventDate").is_none());
}

#[tokio::test]
async fn test_put_record_replaces_and_derives_times() {
    let state = test_state(None);

    let res = test_app(state.clone())
        .oneshot(json_request(
            "PUT",
            "/api/record",
            serde_json::json!({ "startTime": "10:00pm", "venue": "Roof" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["record"]["finishTime"], "2:00am");
    assert_eq!(json["record"]["totalHours"], 4.0);

    let (pending, _) = state.panel.current().await;
    assert_eq!(pending.unwrap().venue.as_deref(), Some("Roof"));
}

#[tokio::test]
async fn test_put_record_is_normalized_like_an_extraction() {
    let state = test_state(None);

    let res = test_app(state.clone())
        .oneshot(json_request(
            "PUT",
            "/api/record",
            serde_json::json!({ "eventDate": "5th April 2025", "contactEmail": "a@b.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    let record = &json["record"];
    assert_eq!(record["eventDate"], "05/Apr/25");
    assert_eq!(record["isSaturday"], true);
    assert_eq!(record["createCustomerContact"], true);
    assert_eq!(record["eventType"], "Schools & Universities");
    assert_eq!(record["accountEmail"], "a@b.com");
    assert_eq!(
        json["status"]["message"],
        "Record updated. Click \"Fill Form\" to autofill the booking form."
    );
}

#[tokio::test]
async fn test_put_record_with_huge_hours_keeps_serving() {
    let state = test_state(None);

    let res = test_app(state.clone())
        .oneshot(json_request(
            "PUT",
            "/api/record",
            serde_json::json!({ "startTime": "2pm", "totalHours": 1e13 }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["record"]["finishTime"], "");

    let res = test_app(state)
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

// ── Fill ──

#[tokio::test]
async fn test_fill_without_record_conflicts() {
    let app = test_app(test_state(Some(FORM_PAGE)));

    let res = app.oneshot(empty_request("POST", "/api/fill")).await.unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let json = body_json(res).await;
    assert_eq!(json["error"], "Please extract data first.");
}

#[tokio::test]
async fn test_extract_then_fill_updates_page() {
    let state = test_state(Some(FORM_PAGE));

    let res = test_app(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/extract",
            serde_json::json!({ "text": EMAIL }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state.clone())
        .oneshot(empty_request("POST", "/api/fill"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"]["message"], "Form filled successfully!");
    assert_eq!(json["report"]["success"], true);
    assert_eq!(json["report"]["message"], "Form filled successfully");

    let fields = json["report"]["fields"].as_array().unwrap();
    let status_of = |name: &str| {
        fields
            .iter()
            .find(|f| f["field"] == name)
            .map(|f| f["status"].as_str().unwrap().to_string())
    };
    assert_eq!(status_of("venue").as_deref(), Some("filled"));
    assert_eq!(status_of("is_saturday").as_deref(), Some("filled"));
    // the page has no phone or DJ package controls
    assert_eq!(status_of("contact_phone").as_deref(), Some("not_found"));
    assert_eq!(status_of("has_dj_package").as_deref(), Some("not_found"));

    let res = test_app(state)
        .oneshot(empty_request("GET", "/api/page"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert!(html.contains(r#"id="venue" value="Studio A""#), "{html}");
    assert!(html.contains(r#"id="finish" value="6:00pm""#), "{html}");
    assert!(html.contains(r#"value="edu" selected"#), "{html}");
}

#[tokio::test]
async fn test_fill_with_no_page_loaded_is_transport_error() {
    let state = test_state(None);

    test_app(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/extract",
            serde_json::json!({ "text": EMAIL }),
        ))
        .await
        .unwrap();

    let res = test_app(state)
        .oneshot(empty_request("POST", "/api/fill"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(res).await;
    assert_eq!(
        json["error"],
        "Error filling form: no booking page is loaded"
    );
}

#[tokio::test]
async fn test_fill_surfaces_transport_failure_verbatim() {
    let state = test_state_with_transport(Arc::new(UnreachablePage));

    test_app(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/extract",
            serde_json::json!({ "text": EMAIL }),
        ))
        .await
        .unwrap();

    let res = test_app(state.clone())
        .oneshot(empty_request("POST", "/api/fill"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(res).await;
    assert_eq!(json["error"], "Error filling form: page agent is not running");

    let (pending, status) = state.panel.current().await;
    assert_eq!(status.kind, StatusKind::Error);
    assert!(pending.is_some());
}

// ── Page Agent ──

#[tokio::test]
async fn test_load_page_then_snapshot() {
    let state = test_state(None);

    let res = test_app(state.clone())
        .oneshot(empty_request("GET", "/api/page"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = test_app(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/page",
            serde_json::json!({ "html": FORM_PAGE }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["loaded"], true);

    let res = test_app(state)
        .oneshot(empty_request("GET", "/api/page"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Account point of contact"));
}

#[tokio::test]
async fn test_load_empty_page_rejected() {
    let app = test_app(test_state(None));

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/page",
            serde_json::json!({ "html": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ── Configuration ──

#[tokio::test]
async fn test_selector_file_overrides_defaults() {
    let path: PathBuf = std::env::temp_dir().join(format!(
        "booking-autofill-selectors-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, r##"{"fields":{"venue":"#room-field"}}"##).unwrap();

    let mut config = test_config();
    config.selectors_path = Some(path.clone());
    config.resolver_mode = ResolverMode::Direct;
    let resolver = FieldResolver::new(config.resolver_config().unwrap());
    let (handle, _agent) = page::spawn(
        resolver,
        Some(r#"<body><input id="room-field"></body>"#.to_string()),
    );

    let record = BookingRecord {
        venue: Some("Studio A".to_string()),
        ..Default::default()
    };
    let report = handle.fill_form(&record).await.unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(report.success);
    let html = handle.snapshot().await.unwrap().unwrap();
    assert!(html.contains(r#"value="Studio A""#), "{html}");
}

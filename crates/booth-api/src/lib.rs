//! JSON REST API for booth.
//!
//! Exposes an axum [`Router`] backed by any [`booth_core::store::RecordStore`].
//! TLS, static front-ends and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", booth_api::api_router(state))
//! ```

pub mod analytics;
pub mod contacts;
pub mod error;
pub mod extract;
pub mod notify;
pub mod qr_codes;
pub mod signups;
pub mod wheel;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use booth_core::{report::RoiAssumptions, store::RecordStore};
use serde_json::{Value, json};

pub use error::ApiError;
pub use notify::Notifier;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub notifier: Notifier,
  pub roi:      RoiAssumptions,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: self.notifier.clone(),
      roi:      self.roi,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Contacts
    .route("/contacts", get(contacts::list::<S>).post(contacts::create::<S>))
    .route("/contacts/export", get(contacts::export::<S>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S>)
        .patch(contacts::update::<S>)
        .delete(contacts::delete_one::<S>),
    )
    // QR codes and scans
    .route("/qr-codes", get(qr_codes::list::<S>).post(qr_codes::create::<S>))
    .route("/qr-codes/top", get(qr_codes::top::<S>))
    .route(
      "/qr-codes/{id}",
      get(qr_codes::get_one::<S>).patch(qr_codes::set_active::<S>),
    )
    .route("/qr-codes/{id}/stats", get(qr_codes::stats::<S>))
    .route("/qr-codes/{id}/scans", post(qr_codes::record_scan::<S>))
    .route("/scans/{id}/convert", post(qr_codes::convert_scan::<S>))
    // Loummel signups
    .route("/signups", get(signups::list::<S>).post(signups::create::<S>))
    // Prize wheel
    .route("/wheel/results", get(wheel::list::<S>).post(wheel::create::<S>))
    .route("/wheel/stats", get(wheel::stats::<S>))
    // Analytics
    .route("/dashboard", get(analytics::kpis::<S>))
    .route("/reports/{kind}", get(analytics::get_report::<S>))
    .route("/health", get(health))
    .with_state(state)
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use booth_core::event::DomainEvent;
  use booth_store_json::SnapshotStore;
  use tokio::sync::mpsc::UnboundedReceiver;
  use tower::ServiceExt as _;

  use super::*;

  fn make_state() -> (AppState<SnapshotStore>, UnboundedReceiver<DomainEvent>) {
    let (notifier, rx) = Notifier::channel();
    let state = AppState {
      store: Arc::new(SnapshotStore::open_in_memory()),
      notifier,
      roi: RoiAssumptions {
        average_customer_value: 1000.0,
        conversion_rate:        0.5,
        cost_per_lead:          100.0,
      },
    };
    (state, rx)
  }

  async fn call(
    state:  &AppState<SnapshotStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    api_router(state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn contact_json(name: &str, callback: Option<&str>) -> Value {
    let mut body = json!({
      "name": name,
      "email": format!("{}@example.com", name.to_lowercase()),
      "phone": "+33 6 00 00 00 00",
      "company": "Expo, Ltd",
    });
    if let Some(pref) = callback {
      body["callback_preference"] = json!(pref);
    }
    body
  }

  // ── Contacts ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_contact_classifies_and_emits_event() {
    let (state, mut rx) = make_state();
    let resp = call(&state, "POST", "/contacts", Some(contact_json("Alice", Some("urgent")))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "hot");

    match rx.try_recv() {
      Ok(DomainEvent::ContactCreated(c)) => assert_eq!(c.name, "Alice"),
      other => panic!("expected ContactCreated, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn create_contact_reports_every_invalid_field() {
    let (state, _rx) = make_state();
    let resp = call(&state, "POST", "/contacts", Some(json!({ "email": "nope" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    let fields: Vec<&str> = body["details"]
      .as_array()
      .unwrap()
      .iter()
      .map(|d| d["field"].as_str().unwrap())
      .collect();
    assert_eq!(fields, ["email", "name", "phone"]);

    let list = json_body(call(&state, "GET", "/contacts", None).await).await;
    assert_eq!(list["total"], 0);
  }

  #[tokio::test]
  async fn list_contacts_paginates_and_filters() {
    let (state, _rx) = make_state();
    for (name, pref) in [("Ann", Some("urgent")), ("Ben", Some("48h")), ("Cyd", None)] {
      call(&state, "POST", "/contacts", Some(contact_json(name, pref))).await;
    }

    let page = json_body(call(&state, "GET", "/contacts?limit=2&offset=1", None).await).await;
    assert_eq!(page["total"], 3);
    let names: Vec<&str> = page["items"]
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["name"].as_str().unwrap())
      .collect();
    assert_eq!(names, ["Ben", "Cyd"]);

    let warm = json_body(call(&state, "GET", "/contacts?status=warm", None).await).await;
    assert_eq!(warm["total"], 1);
    assert_eq!(warm["items"][0]["name"], "Ben");

    let search = json_body(call(&state, "GET", "/contacts?search=CYD", None).await).await;
    assert_eq!(search["total"], 1);
  }

  #[tokio::test]
  async fn get_update_and_delete_contact() {
    let (state, _rx) = make_state();
    let created = json_body(
      call(&state, "POST", "/contacts", Some(contact_json("Dana", None))).await,
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/contacts/{id}");

    let resp = call(&state, "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = call(
      &state,
      "PATCH",
      &uri,
      Some(json!({ "callback_preference": "urgent", "position": "CTO" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["status"], "cold");
    assert_eq!(updated["position"], "CTO");

    let resp = call(&state, "PATCH", &uri, Some(json!({ "email": "broken" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(call(&state, "DELETE", &uri, None).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(call(&state, "GET", &uri, None).await.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn missing_contact_is_404_everywhere() {
    let (state, _rx) = make_state();
    call(&state, "POST", "/contacts", Some(contact_json("Eve", None))).await;
    let uri = format!("/contacts/{}", uuid::Uuid::new_v4());

    assert_eq!(call(&state, "GET", &uri, None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
      call(&state, "PATCH", &uri, Some(json!({ "name": "X" }))).await.status(),
      StatusCode::NOT_FOUND
    );
    assert_eq!(call(&state, "DELETE", &uri, None).await.status(), StatusCode::NOT_FOUND);

    let list = json_body(call(&state, "GET", "/contacts", None).await).await;
    assert_eq!(list["total"], 1);
  }

  #[tokio::test]
  async fn export_contacts_as_csv() {
    let (state, _rx) = make_state();
    call(&state, "POST", "/contacts", Some(contact_json("Fay", Some("48h")))).await;

    let resp = call(&state, "GET", "/contacts/export", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/csv"), "Content-Type: {ct}");

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let csv = std::str::from_utf8(&bytes).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("id,name,email,phone,company"));
    let row = lines.next().unwrap();
    assert!(row.contains(",\"Expo, Ltd\","), "row: {row}");
    assert!(row.contains(",48h,warm,"), "row: {row}");
  }

  // ── QR codes ───────────────────────────────────────────────────────────────

  async fn create_qr(state: &AppState<SnapshotStore>, name: &str) -> String {
    let resp = call(
      state,
      "POST",
      "/qr-codes",
      Some(json!({ "name": name, "type": "contact", "url": "https://x" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await["id"].as_str().unwrap().to_owned()
  }

  #[tokio::test]
  async fn booth_a_stats_over_http() {
    let (state, _rx) = make_state();
    let id = create_qr(&state, "Booth A").await;

    let mut scans = Vec::new();
    for _ in 0..3 {
      let resp = call(&state, "POST", &format!("/qr-codes/{id}/scans"), None).await;
      assert_eq!(resp.status(), StatusCode::CREATED);
      scans.push(json_body(resp).await["id"].as_str().unwrap().to_owned());
    }
    let resp = call(&state, "POST", &format!("/scans/{}/convert", scans[0]), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stats = json_body(call(&state, "GET", &format!("/qr-codes/{id}/stats"), None).await).await;
    assert_eq!(stats, json!({ "total_scans": 3, "conversions": 1, "conversion_rate": 33.33 }));

    let qr = json_body(call(&state, "GET", &format!("/qr-codes/{id}"), None).await).await;
    assert_eq!(qr["scan_count"], 3);
  }

  #[tokio::test]
  async fn qr_code_requires_a_valid_url() {
    let (state, _rx) = make_state();
    let resp = call(
      &state,
      "POST",
      "/qr-codes",
      Some(json!({ "name": "Bad", "type": "vcard", "url": "not a url" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  async fn first_detail(resp: axum::response::Response) -> (String, Value) {
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(ct.starts_with("application/json"), "Content-Type: {ct}");
    let body = json_body(resp).await;
    assert_eq!(body["error"], "validation failed");
    let field = body["details"][0]["field"].as_str().unwrap().to_owned();
    (field, body)
  }

  #[tokio::test]
  async fn qr_code_without_type_is_a_validation_error() {
    let (state, _rx) = make_state();
    let resp = call(
      &state,
      "POST",
      "/qr-codes",
      Some(json!({ "name": "Booth A", "url": "https://x" })),
    )
    .await;
    let (field, _) = first_detail(resp).await;
    assert_eq!(field, "type");

    let codes = json_body(call(&state, "GET", "/qr-codes", None).await).await;
    assert!(codes.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn wrongly_typed_field_is_a_validation_error() {
    let (state, _rx) = make_state();
    let resp = call(
      &state,
      "POST",
      "/contacts",
      Some(json!({ "name": 5, "email": "a@example.com", "phone": "0" })),
    )
    .await;
    let (field, body) = first_detail(resp).await;
    assert_eq!(field, "name");
    assert!(!body["details"][0]["message"].as_str().unwrap().is_empty());
  }

  #[tokio::test]
  async fn malformed_json_is_a_validation_error() {
    let (state, _rx) = make_state();
    let req = Request::builder()
      .method("POST")
      .uri("/signups")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{ \"name\": "))
      .unwrap();
    let resp = api_router(state.clone()).oneshot(req).await.unwrap();
    let (field, _) = first_detail(resp).await;
    assert_eq!(field, "body");
  }

  #[tokio::test]
  async fn inactive_code_refuses_scans_until_reactivated() {
    let (state, _rx) = make_state();
    let id = create_qr(&state, "Side door").await;
    let uri = format!("/qr-codes/{id}");

    let resp = call(&state, "PATCH", &uri, Some(json!({ "active": false }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["active"], false);

    let resp = call(&state, "POST", &format!("{uri}/scans"), None).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let qr = json_body(call(&state, "GET", &uri, None).await).await;
    assert_eq!(qr["scan_count"], 0);

    let resp = call(&state, "PATCH", &uri, Some(json!({}))).await;
    let (field, _) = first_detail(resp).await;
    assert_eq!(field, "active");

    call(&state, "PATCH", &uri, Some(json!({ "active": true }))).await;
    let resp = call(&state, "POST", &format!("{uri}/scans"), None).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn scanning_unknown_code_is_404() {
    let (state, _rx) = make_state();
    let uri = format!("/qr-codes/{}/scans", uuid::Uuid::new_v4());
    assert_eq!(call(&state, "POST", &uri, None).await.status(), StatusCode::NOT_FOUND);
    let uri = format!("/qr-codes/{}/stats", uuid::Uuid::new_v4());
    assert_eq!(call(&state, "GET", &uri, None).await.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn top_codes_ranked_by_scans() {
    let (state, _rx) = make_state();
    let quiet = create_qr(&state, "Quiet").await;
    let busy = create_qr(&state, "Busy").await;
    call(&state, "POST", &format!("/qr-codes/{quiet}/scans"), None).await;
    for _ in 0..2 {
      call(&state, "POST", &format!("/qr-codes/{busy}/scans"), None).await;
    }

    let top = json_body(call(&state, "GET", "/qr-codes/top?limit=1", None).await).await;
    assert_eq!(top, json!([{ "name": "Busy", "scans": 2 }]));
  }

  // ── Signups ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn duplicate_signup_is_409_and_not_stored() {
    let (state, _rx) = make_state();
    let body = json!({ "name": "Gil", "email": "gil@example.com", "phone": "0102" });

    let resp = call(&state, "POST", "/signups", Some(body.clone())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let signup = json_body(resp).await;
    assert!(signup["promo_code"].as_str().unwrap().starts_with("LOUMMEL-"));

    let resp = call(&state, "POST", "/signups", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let list = json_body(call(&state, "GET", "/signups", None).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  // ── Wheel ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn wheel_stats_count_prizes() {
    let (state, _rx) = make_state();
    for prize in ["mug", "tote", "mug"] {
      let resp = call(
        &state,
        "POST",
        "/wheel/results",
        Some(json!({ "name": "Hal", "email": "hal@example.com", "prize": prize })),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let stats = json_body(call(&state, "GET", "/wheel/stats", None).await).await;
    assert_eq!(stats["total_plays"], 3);
    assert_eq!(stats["prizes"][0], json!({ "prize": "mug", "count": 2 }));
  }

  // ── Analytics ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dashboard_counts_todays_records() {
    let (state, _rx) = make_state();
    call(&state, "POST", "/contacts", Some(contact_json("Ivy", Some("urgent")))).await;
    call(&state, "POST", "/contacts", Some(contact_json("Jon", None))).await;

    let kpis = json_body(call(&state, "GET", "/dashboard", None).await).await;
    assert_eq!(kpis["total_contacts"], 2);
    assert_eq!(kpis["today_contacts"], 2);
    assert_eq!(kpis["hot_leads"], 1);
  }

  #[tokio::test]
  async fn reports_by_kind() {
    let (state, _rx) = make_state();

    let resp = call(&state, "GET", "/reports/roi", None).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    for name in ["Kim", "Lou"] {
      call(&state, "POST", "/contacts", Some(contact_json(name, Some("48h")))).await;
    }
    call(
      &state,
      "POST",
      "/signups",
      Some(json!({ "name": "Kim", "email": "kim@example.com", "phone": "1" })),
    )
    .await;

    let daily = json_body(call(&state, "GET", "/reports/daily", None).await).await;
    assert_eq!(daily["total_contacts"], 2);
    assert_eq!(daily["conversion_rate"], 50.0);

    let event = json_body(call(&state, "GET", "/reports/event", None).await).await;
    assert_eq!(event["lead_distribution"], json!({ "hot": 0, "warm": 2, "cold": 0 }));

    // 2 contacts * 0.5 = 1 customer * 1000 / (2 * 100) * 100.
    let roi = json_body(call(&state, "GET", "/reports/roi", None).await).await;
    assert_eq!(roi["estimated_customers"], 1);
    assert_eq!(roi["roi_percent"], 500.0);

    let resp = call(&state, "GET", "/reports/weekly", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn health_is_ok() {
    let (state, _rx) = make_state();
    let resp = call(&state, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }
}

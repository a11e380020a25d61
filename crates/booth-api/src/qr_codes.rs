//! Handlers for `/qr-codes` and `/scans` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/qr-codes` | All codes in creation order |
//! | `POST` | `/qr-codes` | Body: [`NewQrCodeBody`]; returns 201 |
//! | `GET`  | `/qr-codes/top` | `?limit=` (default 5); most scanned first |
//! | `GET`  | `/qr-codes/:id` | 404 if not found |
//! | `PATCH` | `/qr-codes/:id` | Body: [`UpdateQrCodeBody`]; switches the code on or off |
//! | `GET`  | `/qr-codes/:id/stats` | Scan totals and conversion rate |
//! | `POST` | `/qr-codes/:id/scans` | Records a scan; returns 201, 409 if the code is inactive |
//! | `POST` | `/scans/:id/convert` | Flags a scan as converted |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use booth_core::{
  record::{NewQrCode, QrCode, QrKind, Scan, ScanRequest},
  scans::{QrRanking, ScanStats, stats_for, top_qr_codes},
  store::RecordStore,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiError, extract::ValidatedJson};

pub const DEFAULT_TOP_LIMIT: usize = 5;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /qr-codes`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<QrCode>>, ApiError>
where
  S: RecordStore,
{
  let codes = state.store.list_qr_codes().await.map_err(ApiError::from_store)?;
  Ok(Json(codes))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct NewQrCodeBody {
  #[serde(default)]
  #[validate(length(min = 1, message = "name is required"))]
  pub name:   String,
  #[serde(rename = "type")]
  pub kind:   QrKind,
  #[serde(default)]
  #[validate(url(message = "must be a valid URL"))]
  pub url:    String,
  pub active: Option<bool>,
}

/// `POST /qr-codes`: returns 201 + the stored [`QrCode`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ValidatedJson(body): ValidatedJson<NewQrCodeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let input = NewQrCode {
    name:   body.name,
    kind:   body.kind,
    url:    body.url,
    active: body.active.unwrap_or(true),
  };
  let qr = state
    .store
    .create_qr_code(input)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(qr_code_id = %qr.id, name = %qr.name, "qr code created");
  Ok((StatusCode::CREATED, Json(qr)))
}

// ─── Get one / stats ──────────────────────────────────────────────────────────

async fn require_qr<S: RecordStore>(store: &S, id: Uuid) -> Result<QrCode, ApiError> {
  store
    .get_qr_code(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("qr code {id} not found")))
}

/// `GET /qr-codes/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<QrCode>, ApiError>
where
  S: RecordStore,
{
  Ok(Json(require_qr(state.store.as_ref(), id).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQrCodeBody {
  pub active: bool,
}

/// `PATCH /qr-codes/:id`
pub async fn set_active<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  ValidatedJson(body): ValidatedJson<UpdateQrCodeBody>,
) -> Result<Json<QrCode>, ApiError>
where
  S: RecordStore,
{
  let qr = state
    .store
    .set_qr_code_active(id, body.active)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(qr_code_id = %id, active = qr.active, "qr code toggled");
  Ok(Json(qr))
}

/// `GET /qr-codes/:id/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ScanStats>, ApiError>
where
  S: RecordStore,
{
  require_qr(state.store.as_ref(), id).await?;
  let scans = state
    .store
    .list_scans(Some(id))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(stats_for(id, &scans)))
}

// ─── Top ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct TopParams {
  pub limit: Option<usize>,
}

/// `GET /qr-codes/top[?limit=N]`
pub async fn top<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<TopParams>,
) -> Result<Json<Vec<QrRanking>>, ApiError>
where
  S: RecordStore,
{
  let codes = state.store.list_qr_codes().await.map_err(ApiError::from_store)?;
  let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);
  Ok(Json(top_qr_codes(&codes, limit)))
}

// ─── Scans ────────────────────────────────────────────────────────────────────

/// Requester metadata from headers. The address is the first
/// `X-Forwarded-For` hop, falling back to `X-Real-IP`.
fn scan_request(headers: &HeaderMap) -> ScanRequest {
  let text = |name: &str| {
    headers
      .get(name)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned)
  };

  let address = text("x-forwarded-for")
    .and_then(|list| list.split(',').next().map(|hop| hop.trim().to_owned()))
    .filter(|hop| !hop.is_empty())
    .or_else(|| text("x-real-ip"));

  ScanRequest {
    user_agent: text(header::USER_AGENT.as_str()),
    address,
  }
}

/// `POST /qr-codes/:id/scans`: increments the code's `scan_count`.
pub async fn record_scan<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let scan = state
    .store
    .record_scan(id, scan_request(&headers))
    .await
    .map_err(ApiError::from_store)?;
  tracing::debug!(qr_code_id = %id, scan_id = %scan.id, "scan recorded");
  Ok((StatusCode::CREATED, Json(scan)))
}

/// `POST /scans/:id/convert`
pub async fn convert_scan<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Scan>, ApiError>
where
  S: RecordStore,
{
  let scan = state
    .store
    .mark_scan_converted(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(scan))
}

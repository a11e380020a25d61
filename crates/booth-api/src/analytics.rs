//! Dashboard and report endpoints. Both read one snapshot per request.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dashboard` | Today vs all-time KPIs, local midnight boundary |
//! | `GET`  | `/reports/:kind` | `daily`, `event` or `roi`; anything else is 400 |

use axum::{
  Json,
  extract::{Path, State},
};
use booth_core::{
  dashboard::{DashboardKpis, dashboard},
  report::{self, Report, ReportKind},
  store::RecordStore,
};
use chrono::Local;

use crate::{AppState, error::ApiError};

/// `GET /dashboard`
pub async fn kpis<S>(State(state): State<AppState<S>>) -> Result<Json<DashboardKpis>, ApiError>
where
  S: RecordStore,
{
  let snapshot = state.store.snapshot().await.map_err(ApiError::from_store)?;
  Ok(Json(dashboard(&snapshot, &Local::now())))
}

/// `GET /reports/:kind`
pub async fn get_report<S>(
  State(state): State<AppState<S>>,
  Path(kind): Path<String>,
) -> Result<Json<Report>, ApiError>
where
  S: RecordStore,
{
  let kind: ReportKind = kind.parse()?;
  let snapshot = state.store.snapshot().await.map_err(ApiError::from_store)?;
  let report = report::generate(kind, &snapshot, &Local::now(), state.roi)?;
  Ok(Json(report))
}

//! Handlers for the prize wheel.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/wheel/results` | Body: [`NewWheelResultBody`]; returns 201 |
//! | `GET`  | `/wheel/results` | All plays |
//! | `GET`  | `/wheel/stats` | Per-prize distribution |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use booth_core::{
  event::DomainEvent,
  record::{NewWheelResult, WheelResult},
  store::RecordStore,
  wheel::{WheelStats, prize_distribution},
};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, extract::ValidatedJson};

#[derive(Debug, Deserialize, Validate)]
pub struct NewWheelResultBody {
  #[serde(default)]
  #[validate(length(min = 1, message = "name is required"))]
  pub name:  String,
  #[serde(default)]
  #[validate(email(message = "must be a valid email address"))]
  pub email: String,
  #[serde(default)]
  #[validate(length(min = 1, message = "prize is required"))]
  pub prize: String,
}

/// `POST /wheel/results`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ValidatedJson(body): ValidatedJson<NewWheelResultBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let result = state
    .store
    .record_wheel_result(NewWheelResult {
      name:  body.name,
      email: body.email,
      prize: body.prize,
    })
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(result_id = %result.id, prize = %result.prize, "wheel result recorded");
  state.notifier.emit(DomainEvent::WheelResultRecorded(result.clone()));

  Ok((StatusCode::CREATED, Json(result)))
}

/// `GET /wheel/results`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<WheelResult>>, ApiError>
where
  S: RecordStore,
{
  let results = state
    .store
    .list_wheel_results()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(results))
}

/// `GET /wheel/stats`
pub async fn stats<S>(State(state): State<AppState<S>>) -> Result<Json<WheelStats>, ApiError>
where
  S: RecordStore,
{
  let results = state
    .store
    .list_wheel_results()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(prize_distribution(&results)))
}

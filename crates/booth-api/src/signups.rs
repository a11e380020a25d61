//! Handlers for `/signups` (Loummel marketplace signups).
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/signups` | All signups |
//! | `POST` | `/signups` | Body: [`NewSignupBody`]; 201 + signup with promo code, 409 if the email is taken |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use booth_core::{
  event::DomainEvent,
  record::{LoummelSignup, NewSignup},
  store::RecordStore,
};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, extract::ValidatedJson};

#[derive(Debug, Deserialize, Validate)]
pub struct NewSignupBody {
  #[serde(default)]
  #[validate(length(min = 1, message = "name is required"))]
  pub name:  String,
  #[serde(default)]
  #[validate(email(message = "must be a valid email address"))]
  pub email: String,
  #[serde(default)]
  #[validate(length(min = 1, message = "phone is required"))]
  pub phone: String,
}

/// `POST /signups`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ValidatedJson(body): ValidatedJson<NewSignupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let signup = state
    .store
    .create_signup(NewSignup {
      name:  body.name,
      email: body.email.trim().to_owned(),
      phone: body.phone,
    })
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(signup_id = %signup.id, "loummel signup created");
  state.notifier.emit(DomainEvent::SignupCreated(signup.clone()));

  Ok((StatusCode::CREATED, Json(signup)))
}

/// `GET /signups`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<LoummelSignup>>, ApiError>
where
  S: RecordStore,
{
  let signups = state.store.list_signups().await.map_err(ApiError::from_store)?;
  Ok(Json(signups))
}

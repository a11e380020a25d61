//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use booth_core::FieldError;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed")]
  Validation(Vec<FieldError>),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Convert any store error through its [`booth_core::Error`] form.
  pub fn from_store<E: Into<booth_core::Error>>(e: E) -> Self { Self::from(e.into()) }
}

impl From<booth_core::Error> for ApiError {
  fn from(e: booth_core::Error) -> Self {
    use booth_core::Error as E;
    match e {
      E::ContactNotFound(_) | E::QrCodeNotFound(_) | E::ScanNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      E::DuplicateEmail(_) | E::QrCodeInactive(_) => ApiError::Conflict(e.to_string()),
      E::Validation(fields) => ApiError::Validation(fields),
      E::UnknownReportKind(_) => ApiError::BadRequest(e.to_string()),
      E::EmptyReportBase(_) => ApiError::Unprocessable(e.to_string()),
      E::Serialization(_) => ApiError::Store(Box::new(e)),
      E::Storage(inner) => ApiError::Store(inner),
    }
  }
}

/// Leading text axum puts before serde's own message for a body that is
/// valid JSON but does not fit the target type.
const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Field-level error for a serde failure. serde reports a bad value as
/// `<path>: <message>` and an absent one as a "missing field" message
/// naming the field.
fn deserialize_field_error(detail: &str) -> FieldError {
  if let Some(rest) = detail.strip_prefix("missing field `")
    && let Some((field, _)) = rest.split_once('`')
  {
    return FieldError::new(field, format!("{field} is required"));
  }
  match detail.split_once(": ") {
    Some((path, message)) if !path.is_empty() && !path.contains(' ') => {
      FieldError::new(path, message)
    }
    _ => FieldError::new("body", detail),
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    match rejection {
      JsonRejection::JsonDataError(e) => {
        let text = e.body_text();
        let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(&text);
        ApiError::Validation(vec![deserialize_field_error(detail)])
      }
      JsonRejection::JsonSyntaxError(e) => {
        ApiError::Validation(vec![FieldError::new("body", e.body_text())])
      }
      other => ApiError::BadRequest(other.body_text()),
    }
  }
}

impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self {
    let mut fields: Vec<FieldError> = errors
      .field_errors()
      .into_iter()
      .flat_map(|(field, errs)| {
        errs.iter().map(move |err| {
          let message = err
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
          FieldError::new(field.to_string(), message)
        })
      })
      .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    ApiError::Validation(fields)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Validation(fields) => {
        let body = json!({ "error": "validation failed", "details": fields });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
      }
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

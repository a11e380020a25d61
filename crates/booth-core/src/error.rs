//! Error types for `booth-core`.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: field.into(), message: message.into() }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("contact not found: {0}")]
  ContactNotFound(Uuid),

  #[error("qr code not found: {0}")]
  QrCodeNotFound(Uuid),

  #[error("scan not found: {0}")]
  ScanNotFound(Uuid),

  #[error("qr code is inactive: {0}")]
  QrCodeInactive(Uuid),

  #[error("email already registered: {0}")]
  DuplicateEmail(String),

  #[error("validation failed on {} field(s)", .0.len())]
  Validation(Vec<FieldError>),

  #[error("unknown report kind: {0:?}")]
  UnknownReportKind(String),

  /// A report whose ratios would divide by zero.
  #[error("report cannot be computed: {0}")]
  EmptyReportBase(&'static str),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// True for the "no record with this id" family of errors.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::ContactNotFound(_) | Self::QrCodeNotFound(_) | Self::ScanNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

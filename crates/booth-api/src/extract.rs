//! Request extractors.

use axum::{
  Json,
  extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// A JSON body that has been deserialised and then validated.
///
/// Both stages reject with [`ApiError::Validation`], so a wrongly typed or
/// absent field gets the same 400 body as a failed `#[validate]` rule.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
  S: Send + Sync,
  T: DeserializeOwned + Validate,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state).await?;
    value.validate()?;
    Ok(Self(value))
  }
}

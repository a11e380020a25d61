//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | Optional `status`, `search`, `limit` (default 50), `offset` |
//! | `POST`   | `/contacts` | Body: [`NewContactBody`]; returns 201 + stored contact |
//! | `GET`    | `/contacts/export` | All contacts as `text/csv` |
//! | `GET`    | `/contacts/:id` | 404 if not found |
//! | `PATCH`  | `/contacts/:id` | Body: [`UpdateContactBody`]; status is not re-derived |
//! | `DELETE` | `/contacts/:id` | 204; 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use booth_core::{
  event::DomainEvent,
  export::contacts_to_csv,
  record::{CallbackPreference, Contact, ContactPatch, LeadStatus, NewContact},
  store::{ContactQuery, Page, RecordStore},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiError, extract::ValidatedJson};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub status: Option<LeadStatus>,
  /// Case-insensitive substring over name, surname, email and company.
  pub search: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /contacts[?status=hot][&search=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Contact>>, ApiError>
where
  S: RecordStore,
{
  let query = ContactQuery {
    status: params.status,
    search: params.search,
    limit:  params.limit,
    offset: params.offset,
  };
  let page = state
    .store
    .list_contacts(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /contacts`.
///
/// Required strings default to empty so that a missing field is reported by
/// validation, field by field.
#[derive(Debug, Deserialize, Validate)]
pub struct NewContactBody {
  #[serde(default)]
  #[validate(length(min = 1, message = "name is required"))]
  pub name:                String,
  pub surname:             Option<String>,
  #[serde(default)]
  #[validate(email(message = "must be a valid email address"))]
  pub email:               String,
  #[serde(default)]
  #[validate(length(min = 1, message = "phone is required"))]
  pub phone:               String,
  pub company:             Option<String>,
  pub position:            Option<String>,
  pub sector:              Option<String>,
  pub company_size:        Option<String>,
  pub needs:               Option<String>,
  #[validate(length(max = 5000, message = "message is too long"))]
  pub message:             Option<String>,
  pub callback_preference: Option<CallbackPreference>,
}

impl From<NewContactBody> for NewContact {
  fn from(b: NewContactBody) -> Self {
    NewContact {
      name:                b.name,
      surname:             b.surname,
      email:               b.email,
      phone:               b.phone,
      company:             b.company,
      position:            b.position,
      sector:              b.sector,
      company_size:        b.company_size,
      needs:               b.needs,
      message:             b.message,
      callback_preference: b.callback_preference,
    }
  }
}

/// `POST /contacts`: returns 201 + the stored [`Contact`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ValidatedJson(body): ValidatedJson<NewContactBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let contact = state
    .store
    .create_contact(NewContact::from(body))
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(
    contact_id = %contact.id,
    status = contact.status.as_str(),
    "contact created"
  );
  state.notifier.emit(DomainEvent::ContactCreated(contact.clone()));

  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Contact>, ApiError>
where
  S: RecordStore,
{
  let contact = state
    .store
    .get_contact(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /contacts/:id`. Absent fields are unchanged.
#[derive(Debug, Deserialize, Validate, Default)]
pub struct UpdateContactBody {
  #[validate(length(min = 1, message = "name cannot be empty"))]
  pub name:                Option<String>,
  pub surname:             Option<String>,
  #[validate(email(message = "must be a valid email address"))]
  pub email:               Option<String>,
  #[validate(length(min = 1, message = "phone cannot be empty"))]
  pub phone:               Option<String>,
  pub company:             Option<String>,
  pub position:            Option<String>,
  pub sector:              Option<String>,
  pub company_size:        Option<String>,
  pub needs:               Option<String>,
  #[validate(length(max = 5000, message = "message is too long"))]
  pub message:             Option<String>,
  pub callback_preference: Option<CallbackPreference>,
  pub status:              Option<LeadStatus>,
}

impl From<UpdateContactBody> for ContactPatch {
  fn from(b: UpdateContactBody) -> Self {
    ContactPatch {
      name:                b.name,
      surname:             b.surname,
      email:               b.email,
      phone:               b.phone,
      company:             b.company,
      position:            b.position,
      sector:              b.sector,
      company_size:        b.company_size,
      needs:               b.needs,
      message:             b.message,
      callback_preference: b.callback_preference,
      status:              b.status,
    }
  }
}

/// `PATCH /contacts/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  ValidatedJson(body): ValidatedJson<UpdateContactBody>,
) -> Result<Json<Contact>, ApiError>
where
  S: RecordStore,
{
  let contact = state
    .store
    .update_contact(id, ContactPatch::from(body))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(contact))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/:id`: erases the contact.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
{
  state
    .store
    .delete_contact(id)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(contact_id = %id, "contact erased");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Export ───────────────────────────────────────────────────────────────────

/// `GET /contacts/export`: every contact, as CSV.
pub async fn export<S>(
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let snapshot = state.store.snapshot().await.map_err(ApiError::from_store)?;
  let csv = contacts_to_csv(&snapshot.contacts)?;
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (header::CONTENT_DISPOSITION, "attachment; filename=\"contacts.csv\""),
    ],
    csv,
  ))
}

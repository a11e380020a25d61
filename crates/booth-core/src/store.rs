//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `booth-store-json`).
//! Higher layers (`booth-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::record::{
  Contact, ContactPatch, LeadStatus, LoummelSignup, NewContact, NewQrCode,
  NewSignup, NewWheelResult, QrCode, Scan, ScanRequest, Snapshot, WheelResult,
};

pub const DEFAULT_PAGE_LIMIT: usize = 50;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`RecordStore::list_contacts`].
#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
  /// Restrict to contacts with this lead status.
  pub status: Option<LeadStatus>,
  /// Case-insensitive substring over name, surname, email and company.
  pub search: Option<String>,
  /// Defaults to [`DEFAULT_PAGE_LIMIT`].
  pub limit:  Option<usize>,
  /// Clamped to the number of matches.
  pub offset: Option<usize>,
}

impl ContactQuery {
  /// Filter and paginate `contacts` in insertion order.
  pub fn apply(&self, contacts: &[Contact]) -> Page<Contact> {
    let needle = self
      .search
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_lowercase);

    let matched: Vec<&Contact> = contacts
      .iter()
      .filter(|c| self.status.is_none_or(|s| c.status == s))
      .filter(|c| needle.as_deref().is_none_or(|n| c.matches_search(n)))
      .collect();

    let total = matched.len();
    let offset = self.offset.unwrap_or(0).min(total);
    let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

    Page {
      items: matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect(),
      total,
    }
  }
}

/// One page of results plus the number of matches before pagination.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a booth record store backend.
///
/// `get_*` methods return `None` for an unknown id; `update`, `delete` and
/// scan operations fail with a not-found [`crate::Error`] instead, leaving the
/// store unchanged.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Persist a new contact; the store assigns id, status and timestamps.
  fn create_contact(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  fn list_contacts<'a>(
    &'a self,
    query: &'a ContactQuery,
  ) -> impl Future<Output = Result<Page<Contact>, Self::Error>> + Send + 'a;

  fn get_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  fn update_contact(
    &self,
    id: Uuid,
    patch: ContactPatch,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Erase a contact entirely.
  fn delete_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── QR codes and scans ────────────────────────────────────────────────

  fn create_qr_code(
    &self,
    input: NewQrCode,
  ) -> impl Future<Output = Result<QrCode, Self::Error>> + Send + '_;

  fn list_qr_codes(
    &self,
  ) -> impl Future<Output = Result<Vec<QrCode>, Self::Error>> + Send + '_;

  fn get_qr_code(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<QrCode>, Self::Error>> + Send + '_;

  /// Switch a code on or off. Inactive codes refuse new scans.
  fn set_qr_code_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<QrCode, Self::Error>> + Send + '_;

  /// Append a scan and bump the code's `scan_count` in one write. Fails
  /// with [`crate::Error::QrCodeInactive`] for a code that is switched off.
  fn record_scan(
    &self,
    qr_code_id: Uuid,
    request: ScanRequest,
  ) -> impl Future<Output = Result<Scan, Self::Error>> + Send + '_;

  /// Flag a scan as converted. Idempotent.
  fn mark_scan_converted(
    &self,
    scan_id: Uuid,
  ) -> impl Future<Output = Result<Scan, Self::Error>> + Send + '_;

  /// All scans, or only those of one QR code.
  fn list_scans(
    &self,
    qr_code_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Scan>, Self::Error>> + Send + '_;

  // ── Loummel signups ───────────────────────────────────────────────────

  /// Register a signup and hand out a promo code. Fails with
  /// [`crate::Error::DuplicateEmail`] if the email is already registered.
  fn create_signup(
    &self,
    input: NewSignup,
  ) -> impl Future<Output = Result<LoummelSignup, Self::Error>> + Send + '_;

  fn list_signups(
    &self,
  ) -> impl Future<Output = Result<Vec<LoummelSignup>, Self::Error>> + Send + '_;

  // ── Prize wheel ───────────────────────────────────────────────────────

  fn record_wheel_result(
    &self,
    input: NewWheelResult,
  ) -> impl Future<Output = Result<WheelResult, Self::Error>> + Send + '_;

  fn list_wheel_results(
    &self,
  ) -> impl Future<Output = Result<Vec<WheelResult>, Self::Error>> + Send + '_;

  // ── Snapshot ──────────────────────────────────────────────────────────

  /// A consistent copy of every collection, for reports.
  fn snapshot(
    &self,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;
}

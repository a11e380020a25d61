//! Record types: the five collections held by a [`crate::store::RecordStore`].
//!
//! Every record is owned by the store. Cross-record links (a scan pointing at
//! its QR code) are plain ids resolved by lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lead::classify;

// ─── Contacts ────────────────────────────────────────────────────────────────

/// How soon a contact asked to be called back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackPreference {
  #[serde(rename = "urgent")]
  Urgent,
  #[serde(rename = "48h")]
  Within48h,
  /// Any other stated preference.
  #[serde(rename = "other")]
  #[serde(other)]
  Other,
}

/// Priority tier of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
  Hot,
  Warm,
  Cold,
}

impl LeadStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Hot => "hot",
      Self::Warm => "warm",
      Self::Cold => "cold",
    }
  }
}

impl CallbackPreference {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Urgent => "urgent",
      Self::Within48h => "48h",
      Self::Other => "other",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
  pub id:                  Uuid,
  pub name:                String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub surname:             Option<String>,
  pub email:               String,
  pub phone:               String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub company:             Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub position:            Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sector:              Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub company_size:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub needs:               Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message:             Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub callback_preference: Option<CallbackPreference>,
  pub status:              LeadStatus,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

impl Contact {
  /// Build a contact from a submission. This is the one place a lead is
  /// classified.
  pub fn from_new(id: Uuid, input: NewContact, now: DateTime<Utc>) -> Self {
    Self {
      id,
      status: classify(input.callback_preference),
      name: input.name,
      surname: input.surname,
      email: input.email,
      phone: input.phone,
      company: input.company,
      position: input.position,
      sector: input.sector,
      company_size: input.company_size,
      needs: input.needs,
      message: input.message,
      callback_preference: input.callback_preference,
      created_at: now,
      updated_at: now,
    }
  }

  /// Apply an explicit update. Status changes only if the patch sets it.
  pub fn apply(&mut self, patch: ContactPatch, now: DateTime<Utc>) {
    let ContactPatch {
      name,
      surname,
      email,
      phone,
      company,
      position,
      sector,
      company_size,
      needs,
      message,
      callback_preference,
      status,
    } = patch;

    if let Some(v) = name {
      self.name = v;
    }
    if let Some(v) = email {
      self.email = v;
    }
    if let Some(v) = phone {
      self.phone = v;
    }
    if let Some(v) = status {
      self.status = v;
    }
    if let Some(v) = callback_preference {
      self.callback_preference = Some(v);
    }
    for (slot, value) in [
      (&mut self.surname, surname),
      (&mut self.company, company),
      (&mut self.position, position),
      (&mut self.sector, sector),
      (&mut self.company_size, company_size),
      (&mut self.needs, needs),
      (&mut self.message, message),
    ] {
      if value.is_some() {
        *slot = value;
      }
    }
    self.updated_at = now;
  }

  /// Case-insensitive substring match over name, surname, email and company.
  /// `needle` must already be lowercase.
  pub fn matches_search(&self, needle: &str) -> bool {
    [
      Some(self.name.as_str()),
      self.surname.as_deref(),
      Some(self.email.as_str()),
      self.company.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
  }
}

/// Input to [`crate::store::RecordStore::create_contact`].
/// `id`, `status` and timestamps are always set by the store.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
  pub name:                String,
  pub surname:             Option<String>,
  pub email:               String,
  pub phone:               String,
  pub company:             Option<String>,
  pub position:            Option<String>,
  pub sector:              Option<String>,
  pub company_size:        Option<String>,
  pub needs:               Option<String>,
  pub message:             Option<String>,
  pub callback_preference: Option<CallbackPreference>,
}

impl NewContact {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    name: impl Into<String>,
    email: impl Into<String>,
    phone: impl Into<String>,
  ) -> Self {
    Self {
      name: name.into(),
      email: email.into(),
      phone: phone.into(),
      ..Self::default()
    }
  }
}

/// Partial update for a contact. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPatch {
  pub name:                Option<String>,
  pub surname:             Option<String>,
  pub email:               Option<String>,
  pub phone:               Option<String>,
  pub company:             Option<String>,
  pub position:            Option<String>,
  pub sector:              Option<String>,
  pub company_size:        Option<String>,
  pub needs:               Option<String>,
  pub message:             Option<String>,
  pub callback_preference: Option<CallbackPreference>,
  pub status:              Option<LeadStatus>,
}

// ─── QR codes and scans ──────────────────────────────────────────────────────

/// What a printed QR code leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrKind {
  Contact,
  Loummel,
  Resources,
  Vcard,
  Appointment,
  Social,
  Game,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
  pub id:         Uuid,
  pub name:       String,
  #[serde(rename = "type")]
  pub kind:       QrKind,
  pub url:        String,
  /// Number of [`Scan`]s referencing this code; bumped in the same write
  /// that appends the scan.
  pub scan_count: u64,
  /// Inactive codes keep their history but refuse new scans.
  pub active:     bool,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::create_qr_code`].
#[derive(Debug, Clone)]
pub struct NewQrCode {
  pub name:   String,
  pub kind:   QrKind,
  pub url:    String,
  pub active: bool,
}

impl NewQrCode {
  pub fn new(name: impl Into<String>, kind: QrKind, url: impl Into<String>) -> Self {
    Self { name: name.into(), kind, url: url.into(), active: true }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
  pub id:         Uuid,
  pub qr_code_id: Uuid,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_agent: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address:    Option<String>,
  pub scanned_at: DateTime<Utc>,
  #[serde(default)]
  pub converted:  bool,
}

/// Requester metadata captured with a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
  pub user_agent: Option<String>,
  pub address:    Option<String>,
}

// ─── Loummel signups ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoummelSignup {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub promo_code: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSignup {
  pub name:  String,
  pub email: String,
  pub phone: String,
}

/// Normalised form used for the signup email-uniqueness check.
pub fn email_key(email: &str) -> String { email.trim().to_lowercase() }

// ─── Prize wheel ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelResult {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  pub prize:      String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWheelResult {
  pub name:  String,
  pub email: String,
  pub prize: String,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Every collection, in insertion order. Also the on-disk format of the
/// file-backed store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  #[serde(default)]
  pub contacts:      Vec<Contact>,
  #[serde(default)]
  pub qr_codes:      Vec<QrCode>,
  #[serde(default)]
  pub scans:         Vec<Scan>,
  #[serde(default)]
  pub signups:       Vec<LoummelSignup>,
  #[serde(default)]
  pub wheel_results: Vec<WheelResult>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn contact(pref: Option<CallbackPreference>) -> Contact {
    let mut input = NewContact::new("Ada", "ada@example.com", "+33 1 23");
    input.callback_preference = pref;
    input.company = Some("Analytical Engines".into());
    Contact::from_new(Uuid::new_v4(), input, Utc::now())
  }

  #[test]
  fn status_is_derived_on_creation() {
    assert_eq!(contact(Some(CallbackPreference::Urgent)).status, LeadStatus::Hot);
    assert_eq!(contact(None).status, LeadStatus::Cold);
  }

  #[test]
  fn update_does_not_reclassify() {
    let mut c = contact(None);
    let created = c.created_at;
    c.apply(
      ContactPatch {
        callback_preference: Some(CallbackPreference::Urgent),
        company: Some("New Co".into()),
        ..ContactPatch::default()
      },
      created + chrono::Duration::seconds(5),
    );
    assert_eq!(c.status, LeadStatus::Cold);
    assert_eq!(c.callback_preference, Some(CallbackPreference::Urgent));
    assert_eq!(c.company.as_deref(), Some("New Co"));
    assert!(c.updated_at > created);
  }

  #[test]
  fn update_can_set_status_explicitly() {
    let mut c = contact(None);
    c.apply(
      ContactPatch { status: Some(LeadStatus::Warm), ..ContactPatch::default() },
      Utc::now(),
    );
    assert_eq!(c.status, LeadStatus::Warm);
  }

  #[test]
  fn search_is_case_insensitive_over_fixed_fields() {
    let c = contact(None);
    assert!(c.matches_search("analytical"));
    assert!(c.matches_search("ada@"));
    assert!(!c.matches_search("+33"));
  }

  #[test]
  fn qr_kind_serialises_as_type() {
    let qr = QrCode {
      id:         Uuid::nil(),
      name:       "Booth A".into(),
      kind:       QrKind::Contact,
      url:        "https://x".into(),
      scan_count: 0,
      active:     true,
      created_at: Utc::now(),
    };
    let v = serde_json::to_value(&qr).unwrap();
    assert_eq!(v["type"], "contact");
  }

  #[test]
  fn email_key_normalises() {
    assert_eq!(email_key("  Bob@Example.COM "), "bob@example.com");
  }
}

//! Lead classification.
//!
//! A contact's priority tier is derived from how soon they asked to be called
//! back. Classification happens once, when the contact is created.

use crate::record::{CallbackPreference, LeadStatus};

/// Map a callback preference to a lead tier.
///
/// `urgent` is hot, `48h` is warm, anything else (including no preference)
/// is cold.
pub fn classify(preference: Option<CallbackPreference>) -> LeadStatus {
  match preference {
    Some(CallbackPreference::Urgent) => LeadStatus::Hot,
    Some(CallbackPreference::Within48h) => LeadStatus::Warm,
    Some(CallbackPreference::Other) | None => LeadStatus::Cold,
  }
}

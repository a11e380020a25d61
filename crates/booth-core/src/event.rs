//! Domain events emitted after a record is committed.
//!
//! Consumers (confirmation email, CRM sync) run outside the request path and
//! never influence the operation that produced the event.

use crate::record::{Contact, LoummelSignup, WheelResult};

#[derive(Debug, Clone)]
pub enum DomainEvent {
  ContactCreated(Contact),
  SignupCreated(LoummelSignup),
  WheelResultRecorded(WheelResult),
}

impl DomainEvent {
  /// Short name used in log fields.
  pub fn name(&self) -> &'static str {
    match self {
      Self::ContactCreated(_) => "contact_created",
      Self::SignupCreated(_) => "signup_created",
      Self::WheelResultRecorded(_) => "wheel_result_recorded",
    }
  }
}

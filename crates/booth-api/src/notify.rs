//! Fire-and-forget notifications.
//!
//! Handlers hand a [`DomainEvent`] to the [`Notifier`] after the record is
//! committed and return immediately. A single worker task ([`run_worker`])
//! drains the channel and calls the mailer and the CRM. Failures are logged
//! and dropped: delivery is at-most-once, with no retries.

use std::future::Future;

use booth_core::{event::DomainEvent, record::Contact};
use serde_json::json;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("mail delivery failed: {0}")]
  Mail(String),

  #[error("crm sync failed: {0}")]
  Crm(String),
}

// ─── Collaborator traits ─────────────────────────────────────────────────────

/// Outbound email service.
pub trait Mailer: Send + Sync + 'static {
  fn send(
    &self,
    recipient: &str,
    template: &'static str,
    context: serde_json::Value,
  ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// CRM that mirrors newly collected contacts.
pub trait CrmSync: Send + Sync + 'static {
  fn sync_contact(
    &self,
    contact: &Contact,
  ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Mailer that only logs what it would have sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
  async fn send(
    &self,
    recipient: &str,
    template: &'static str,
    context: serde_json::Value,
  ) -> Result<(), NotifyError> {
    tracing::info!(%recipient, template, %context, "email queued");
    Ok(())
  }
}

/// CRM sync that only logs the contact id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrm;

impl CrmSync for LogCrm {
  async fn sync_contact(&self, contact: &Contact) -> Result<(), NotifyError> {
    tracing::info!(contact_id = %contact.id, "contact synced to crm");
    Ok(())
  }
}

// ─── Channel ─────────────────────────────────────────────────────────────────

/// Sending half of the notification channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
  tx: mpsc::UnboundedSender<DomainEvent>,
}

impl Notifier {
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<DomainEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }

  /// Queue `event` for the worker. Never blocks, never fails the caller.
  pub fn emit(&self, event: DomainEvent) {
    let name = event.name();
    if self.tx.send(event).is_err() {
      tracing::warn!(event = name, "notification worker gone; event dropped");
    }
  }
}

// ─── Worker ──────────────────────────────────────────────────────────────────

/// Consume events until every [`Notifier`] is dropped.
pub async fn run_worker<M, C>(
  mut rx: mpsc::UnboundedReceiver<DomainEvent>,
  mailer: M,
  crm: C,
) where
  M: Mailer,
  C: CrmSync,
{
  while let Some(event) = rx.recv().await {
    let name = event.name();
    for e in deliver(&event, &mailer, &crm).await {
      tracing::warn!(event = name, error = %e, "notification failed");
    }
  }
  tracing::debug!("notification worker stopped");
}

/// Run every side effect of `event` and collect the failures. A failed step
/// does not prevent the next one.
async fn deliver<M: Mailer, C: CrmSync>(
  event: &DomainEvent,
  mailer: &M,
  crm: &C,
) -> Vec<NotifyError> {
  let outcomes = match event {
    DomainEvent::ContactCreated(contact) => {
      let mail = mailer
        .send(
          &contact.email,
          "contact_confirmation",
          json!({ "name": contact.name, "status": contact.status }),
        )
        .await;
      let sync = crm.sync_contact(contact).await;
      vec![mail, sync]
    }
    DomainEvent::SignupCreated(signup) => {
      vec![
        mailer
          .send(
            &signup.email,
            "loummel_welcome",
            json!({ "name": signup.name, "promo_code": signup.promo_code }),
          )
          .await,
      ]
    }
    DomainEvent::WheelResultRecorded(result) => {
      vec![
        mailer
          .send(
            &result.email,
            "wheel_prize",
            json!({ "name": result.name, "prize": result.prize }),
          )
          .await,
      ]
    }
  };
  outcomes.into_iter().filter_map(Result::err).collect()
}

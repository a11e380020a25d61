//! CRM sync over a plain JSON webhook.

use std::time::Duration;

use booth_api::notify::{CrmSync, NotifyError};
use booth_core::record::Contact;
use reqwest::Client;

/// POSTs each new contact as JSON to a fixed URL.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct WebhookCrm {
  client: Client,
  url:    String,
}

impl WebhookCrm {
  pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
    Ok(Self { client, url: url.into() })
  }
}

impl CrmSync for WebhookCrm {
  async fn sync_contact(&self, contact: &Contact) -> Result<(), NotifyError> {
    let resp = self
      .client
      .post(&self.url)
      .json(contact)
      .send()
      .await
      .map_err(|e| NotifyError::Crm(e.to_string()))?;

    if !resp.status().is_success() {
      return Err(NotifyError::Crm(format!("webhook returned {}", resp.status())));
    }
    tracing::debug!(contact_id = %contact.id, "contact pushed to crm webhook");
    Ok(())
  }
}

//! Reminder dispatch: render, send, record.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use replenish_core::{EmailStatus, StoreId};

use crate::db::EmailLogStore;
use crate::models::NewEmailLogEntry;
use crate::services::email::{MailTransport, ReminderEmail, ReminderVars, render_reminder_body};
use crate::services::settings::SettingsSource;

use super::evaluate::ReminderCandidate;

/// Settings path for the support sender display name.
const SENDER_NAME_PATH: &str = "trans_email/ident_support/name";
/// Settings path for the support sender address.
const SENDER_EMAIL_PATH: &str = "trans_email/ident_support/email";

/// Path segment between the media base URL and a product image path.
const PRODUCT_MEDIA_SEGMENT: &str = "catalog/product";

/// Upper bound on one transport call so a stuck remote cannot stall the
/// scheduler slot.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Failed(String),
}

/// Fallback sender identity when the store has no support identity
/// configured.
#[derive(Debug, Clone)]
pub struct SenderIdentity {
    pub name: String,
    pub email: String,
}

/// Sends one reminder per qualifying candidate and records the outcome.
///
/// A transport failure is a per-candidate `Failed` outcome, never an abort:
/// the failed attempt still gets an email log row and the run moves on to
/// the next candidate. A log-write failure is logged and swallowed.
pub struct Dispatcher {
    transport: Arc<dyn MailTransport>,
    log: Arc<dyn EmailLogStore>,
    settings: Arc<dyn SettingsSource>,
    store: StoreId,
    media_base_url: String,
    fallback_sender: SenderIdentity,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        transport: Arc<dyn MailTransport>,
        log: Arc<dyn EmailLogStore>,
        settings: Arc<dyn SettingsSource>,
        store: StoreId,
        media_base_url: String,
        fallback_sender: SenderIdentity,
    ) -> Self {
        Self {
            transport,
            log,
            settings,
            store,
            media_base_url,
            fallback_sender,
        }
    }

    /// Render and send one reminder, then append the attempt to the email
    /// log with status `sent` or `failed`.
    pub async fn dispatch(&self, candidate: &ReminderCandidate) -> DispatchOutcome {
        match self.try_send(candidate).await {
            Ok(()) => {
                tracing::info!(
                    product_id = %candidate.product_id,
                    to = %candidate.customer_email,
                    "reminder email sent"
                );
                self.record(candidate, EmailStatus::Sent).await;
                DispatchOutcome::Sent
            }
            Err(reason) => {
                tracing::warn!(
                    product_id = %candidate.product_id,
                    to = %candidate.customer_email,
                    reason = %reason,
                    "reminder email failed"
                );
                self.record(candidate, EmailStatus::Failed).await;
                DispatchOutcome::Failed(reason)
            }
        }
    }

    async fn try_send(&self, candidate: &ReminderCandidate) -> Result<(), String> {
        let price = format!("{:.2}", candidate.product_price);
        let image_url = candidate.product_image.as_deref().map(|path| {
            let sep = if path.starts_with('/') { "" } else { "/" };
            format!("{}{PRODUCT_MEDIA_SEGMENT}{sep}{path}", self.media_base_url)
        });

        let (text_body, html_body) = render_reminder_body(&ReminderVars {
            customer_name: &candidate.customer_name,
            product_name: &candidate.product_name,
            product_price: &price,
            product_url: &candidate.product_url,
            product_image: image_url.as_deref(),
        })
        .map_err(|e| e.to_string())?;

        let (from_name, from_address) = self.sender().await;

        let email = ReminderEmail {
            to_address: candidate.customer_email.clone(),
            to_name: candidate.customer_name.clone(),
            from_address,
            from_name,
            subject: format!("Time to restock: {}", candidate.product_name),
            text_body,
            html_body,
        };

        match tokio::time::timeout(SEND_TIMEOUT, self.transport.send(&email)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "transport send timed out after {}s",
                SEND_TIMEOUT.as_secs()
            )),
        }
    }

    /// Resolve the sender identity from store settings, falling back to the
    /// configured defaults.
    async fn sender(&self) -> (String, String) {
        let name = self
            .setting_or_warn(SENDER_NAME_PATH)
            .await
            .unwrap_or_else(|| self.fallback_sender.name.clone());
        let email = self
            .setting_or_warn(SENDER_EMAIL_PATH)
            .await
            .unwrap_or_else(|| self.fallback_sender.email.clone());
        (name, email)
    }

    async fn setting_or_warn(&self, path: &str) -> Option<String> {
        match self.settings.value(path, self.store).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(path, error = %e, "settings lookup failed; using fallback");
                None
            }
        }
    }

    async fn record(&self, candidate: &ReminderCandidate, status: EmailStatus) {
        let entry = NewEmailLogEntry {
            customer_email: candidate.customer_email.to_string(),
            customer_name: candidate.customer_name.clone(),
            product_name: candidate.product_name.clone(),
            status,
            sent_at: Utc::now(),
        };

        if let Err(e) = self.log.append(entry).await {
            tracing::error!(
                product_id = %candidate.product_id,
                error = %e,
                "failed to write email log entry"
            );
        }
    }
}

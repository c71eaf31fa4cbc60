use crate::domain::{
    eligible_recipients, BloodType, Recipient, RecipientEmail, ScarcityAlert, StockStatus,
};
use crate::email::Email;
use crate::routes::error_chain_fmt;
use crate::store::Store;
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;

/// Turns a shortage into in-app notifications and one email, at most once per
/// blood type and level within the suppression window.
#[derive(Clone)]
pub struct ScarcityNotifier {
    store: Arc<dyn Store>,
    email_client: Arc<dyn Email>,
    suppression_window: chrono::Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotifyOutcome {
    Delivered {
        recipient_count: usize,
        message_id: String,
    },
    NoRecipients,
    /// An alert for the same blood type and level went out within the window.
    Suppressed,
    NotScarce,
}

impl NotifyOutcome {
    pub fn recipient_count(&self) -> usize {
        match self {
            NotifyOutcome::Delivered {
                recipient_count, ..
            } => *recipient_count,
            _ => 0,
        }
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            NotifyOutcome::Delivered { message_id, .. } => Some(message_id),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotifyOutcome::Delivered { .. } => "delivered",
            NotifyOutcome::NoRecipients => "no_recipients",
            NotifyOutcome::Suppressed => "suppressed",
            NotifyOutcome::NotScarce => "not_scarce",
        }
    }
}

#[derive(thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to claim the alert.")]
    Claim(#[source] anyhow::Error),
    #[error("Failed to look up eligible recipients.")]
    RecipientLookup(#[source] anyhow::Error),
    #[error("Failed to record the in-app notifications.")]
    RecordNotifications(#[source] anyhow::Error),
    #[error("Failed to deliver the alert email.")]
    Delivery(#[source] anyhow::Error),
}

impl std::fmt::Debug for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// What a stock scan did for one scarce blood type.
#[derive(Debug)]
pub struct StockCheck {
    pub blood_type: BloodType,
    pub status: StockStatus,
    pub outcome: Result<NotifyOutcome, NotifyError>,
}

impl ScarcityNotifier {
    pub fn new(
        store: Arc<dyn Store>,
        email_client: Arc<dyn Email>,
        suppression_window: chrono::Duration,
    ) -> Self {
        Self {
            store,
            email_client,
            suppression_window,
        }
    }

    #[tracing::instrument(
        name = "Evaluating a scarcity alert",
        skip(self, alert),
        fields(
            blood_type = %alert.blood_type,
            units = %alert.units,
            status = %alert.status
        )
    )]
    pub async fn evaluate_and_notify(
        &self,
        alert: ScarcityAlert,
    ) -> Result<NotifyOutcome, NotifyError> {
        if !alert.status.is_scarce() {
            return Ok(NotifyOutcome::NotScarce);
        }

        // Postgres keeps microseconds; the release must match the stored value.
        let now = Utc::now().trunc_subsecs(6);
        let claimed = self
            .store
            .claim_alert(
                alert.blood_type,
                alert.status,
                now,
                now - self.suppression_window,
            )
            .await
            .map_err(NotifyError::Claim)?;
        if !claimed {
            tracing::info!("An alert for this blood type and level was already sent recently");
            return Ok(NotifyOutcome::Suppressed);
        }

        let outcome = self.dispatch(&alert).await;
        match &outcome {
            Ok(NotifyOutcome::Delivered { .. }) => {}
            Ok(_) => self.release(&alert, now).await,
            Err(error) => {
                tracing::error!(error.cause_chain = ?error, "Scarcity alert failed");
                self.release(&alert, now).await
            }
        }
        outcome
    }

    async fn dispatch(&self, alert: &ScarcityAlert) -> Result<NotifyOutcome, NotifyError> {
        let recipients = self
            .recipients_for(alert.blood_type)
            .await
            .map_err(NotifyError::RecipientLookup)?;
        if recipients.is_empty() {
            tracing::info!("No donors are eligible for this alert");
            return Ok(NotifyOutcome::NoRecipients);
        }

        let notifications = recipients
            .iter()
            .map(|r| alert.notification_for(r.user_id))
            .collect();
        self.store
            .record_notifications(notifications)
            .await
            .map_err(NotifyError::RecordNotifications)?;

        let addresses: Vec<RecipientEmail> = recipients.into_iter().map(|r| r.email).collect();
        let message_id = self
            .email_client
            .send_email(
                &addresses,
                &alert.email_subject(),
                &alert.email_html(),
                &alert.email_text(),
            )
            .await
            .map_err(NotifyError::Delivery)?;

        tracing::info!(recipient_count = addresses.len(), %message_id, "Scarcity alert delivered");
        Ok(NotifyOutcome::Delivered {
            recipient_count: addresses.len(),
            message_id,
        })
    }

    async fn release(&self, alert: &ScarcityAlert, claimed_at: DateTime<Utc>) {
        if let Err(error) = self
            .store
            .release_alert(alert.blood_type, alert.status, claimed_at)
            .await
        {
            tracing::error!(
                error.cause_chain = ?error,
                "Failed to release the alert claim. The next alert will wait for the window to pass",
            );
        }
    }

    #[tracing::instrument(name = "Resolving eligible recipients", skip(self))]
    pub async fn recipients_for(&self, blood_type: BloodType) -> anyhow::Result<Vec<Recipient>> {
        let (profiles, preferences) = self.store.candidates_for(blood_type).await?;
        Ok(eligible_recipients(blood_type, profiles, &preferences))
    }

    /// Counts who would be alerted, without claiming, recording or sending.
    #[tracing::instrument(name = "Previewing a scarcity alert", skip(self))]
    pub async fn preview(&self, blood_type: BloodType) -> Result<usize, NotifyError> {
        self.recipients_for(blood_type)
            .await
            .map(|recipients| recipients.len())
            .map_err(NotifyError::RecipientLookup)
    }

    /// Alerts on every blood type at or under the low threshold. One failing
    /// blood type does not stop the scan.
    #[tracing::instrument(name = "Checking stock levels", skip(self))]
    pub async fn check_stock_levels(&self) -> anyhow::Result<Vec<StockCheck>> {
        let stock = self.store.stock_levels().await?;
        let mut checks = Vec::new();
        for record in stock {
            let alert = match ScarcityAlert::from_stock(record.blood_type, record.units) {
                Some(alert) => alert,
                None => continue,
            };
            let outcome = self.evaluate_and_notify(alert).await;
            checks.push(StockCheck {
                blood_type: alert.blood_type,
                status: alert.status,
                outcome,
            });
        }
        Ok(checks)
    }
}

use crate::domain::{BloodType, RecipientEmail, ScarcityAlert, StockStatus, StockUnits};
use crate::email::Email;
use crate::routes::ApiError;
use crate::store::Store;
use anyhow::Context;
use rocket::serde::json::Json;
use rocket::State;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailBody {
    user_ids: Option<Vec<Uuid>>,
    blood_type: Option<String>,
    units: Option<i64>,
    status: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    success: bool,
    message_id: String,
    recipient_count: usize,
}

struct SendEmailRequest {
    user_ids: Vec<Uuid>,
    alert: ScarcityAlert,
}

impl TryFrom<SendEmailBody> for SendEmailRequest {
    type Error = String;

    fn try_from(body: SendEmailBody) -> Result<Self, Self::Error> {
        let (user_ids, blood_type, units, status) =
            match (body.user_ids, body.blood_type, body.units, body.status) {
                (Some(user_ids), Some(blood_type), Some(units), Some(status)) => {
                    (user_ids, blood_type, units, status)
                }
                _ => return Err("Missing required fields".into()),
            };
        let alert = ScarcityAlert::new(
            BloodType::parse(&blood_type)?,
            StockUnits::parse(units)?,
            StockStatus::parse(&status)?,
        );
        Ok(SendEmailRequest { user_ids, alert })
    }
}

/// Emails the listed users about a shortage. Every address goes into the one
/// message; nothing is recorded and no suppression window applies.
#[tracing::instrument(
    name = "Sending a scarcity email to selected users",
    skip(body, store, email_client),
    fields(request_id = %Uuid::new_v4())
)]
#[post("/api/send-email", data = "<body>")]
pub async fn send_scarcity_email(
    body: Json<SendEmailBody>,
    store: &State<Arc<dyn Store>>,
    email_client: &State<Arc<dyn Email>>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let request: SendEmailRequest = body
        .into_inner()
        .try_into()
        .map_err(ApiError::ValidationError)?;

    let profiles = store
        .profiles_by_ids(&request.user_ids)
        .await
        .context("Failed to fetch users")?;
    let mut seen = HashSet::new();
    let recipients: Vec<RecipientEmail> = profiles
        .into_iter()
        .filter_map(|profile| match RecipientEmail::parse(profile.email) {
            Ok(email) => Some(email),
            Err(error) => {
                tracing::warn!(
                    user_id = %profile.user_id,
                    %error,
                    "Skipping a user without a valid address"
                );
                None
            }
        })
        .filter(|email| seen.insert(email.mailbox_key()))
        .collect();
    if recipients.is_empty() {
        return Err(ApiError::ValidationError("No valid recipients found".into()));
    }

    let alert = request.alert;
    let message_id = email_client
        .send_email(
            &recipients,
            &alert.email_subject(),
            &alert.email_html(),
            &alert.email_text(),
        )
        .await
        .context("Failed to send email")?;
    tracing::info!(recipient_count = recipients.len(), %message_id, "Email sent");

    Ok(Json(SendEmailResponse {
        success: true,
        message_id,
        recipient_count: recipients.len(),
    }))
}

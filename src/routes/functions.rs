use crate::domain::notification::BLOOD_SCARCITY;
use crate::domain::{BloodType, ScarcityAlert, StockStatus, StockUnits};
use crate::notifier::{NotifyOutcome, ScarcityNotifier};
use crate::routes::ApiError;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct NotificationFunctionBody {
    #[serde(rename = "type")]
    kind: String,
    blood_type: String,
    units: i64,
    status: String,
    #[serde(default)]
    preview: bool,
}

#[derive(serde::Serialize)]
#[serde(untagged)]
pub enum NotifyResponse {
    Preview {
        count: usize,
    },
    Notified {
        success: bool,
        count: usize,
        outcome: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
}

impl NotifyResponse {
    pub fn preview(count: usize) -> Json<Self> {
        Json(NotifyResponse::Preview { count })
    }

    pub fn notified(outcome: &NotifyOutcome) -> Json<Self> {
        Json(NotifyResponse::Notified {
            success: true,
            count: outcome.recipient_count(),
            outcome: outcome.label(),
            message_id: outcome.message_id().map(String::from),
        })
    }
}

/// Server-side entry point for a scarcity alert. `preview` only counts the
/// donors who would be alerted.
#[tracing::instrument(
    name = "Running the scarcity notification function",
    skip(body, notifier),
    fields(
        request_id = %Uuid::new_v4(),
        blood_type = %body.blood_type,
        units = body.units,
        preview = body.preview
    )
)]
#[post("/functions/send-email", data = "<body>")]
pub async fn notification_function(
    body: Json<NotificationFunctionBody>,
    notifier: &State<ScarcityNotifier>,
) -> Result<Json<NotifyResponse>, ApiError> {
    if body.kind != BLOOD_SCARCITY {
        return Err(ApiError::ValidationError(format!(
            "Unsupported notification type: {}",
            body.kind
        )));
    }
    let blood_type = BloodType::parse(&body.blood_type).map_err(ApiError::ValidationError)?;
    let units = StockUnits::parse(body.units).map_err(ApiError::ValidationError)?;
    let claimed_status = StockStatus::parse(&body.status).map_err(ApiError::ValidationError)?;
    if claimed_status != StockStatus::from_units(units) {
        tracing::warn!(
            %claimed_status,
            derived_status = %StockStatus::from_units(units),
            "Requested status disagrees with the unit count, using the unit count"
        );
    }

    if body.preview {
        let count = notifier.preview(blood_type).await?;
        return Ok(NotifyResponse::preview(count));
    }

    let outcome = match ScarcityAlert::from_stock(blood_type, units) {
        Some(alert) => notifier.evaluate_and_notify(alert).await?,
        None => NotifyOutcome::NotScarce,
    };
    Ok(NotifyResponse::notified(&outcome))
}

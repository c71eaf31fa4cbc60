use crate::domain::{BloodType, ScarcityAlert, StockRecord, StockStatus, StockUnits};
use crate::notifier::{NotifyOutcome, ScarcityNotifier};
use crate::routes::ApiError;
use crate::store::Store;
use anyhow::Context;
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

#[derive(serde::Deserialize)]
pub struct SimulationBody {
    blood_type: String,
    units: i64,
    #[serde(default)]
    preview: bool,
}

#[derive(serde::Serialize)]
#[serde(untagged)]
pub enum SimulationResponse {
    Preview {
        count: usize,
    },
    Applied {
        success: bool,
        blood_type: BloodType,
        units: StockUnits,
        status: StockStatus,
        count: usize,
        outcome: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
}

/// Sets a stock level by hand and runs the scarcity flow for it.
#[tracing::instrument(
    name = "Simulating a stock change",
    skip(body, store, notifier),
    fields(blood_type = %body.blood_type, units = body.units, preview = body.preview)
)]
#[post("/simulations", data = "<body>")]
pub async fn simulate(
    body: Json<SimulationBody>,
    store: &State<Arc<dyn Store>>,
    notifier: &State<ScarcityNotifier>,
) -> Result<Json<SimulationResponse>, ApiError> {
    let blood_type = BloodType::parse(&body.blood_type).map_err(ApiError::ValidationError)?;
    let units = StockUnits::parse(body.units).map_err(ApiError::ValidationError)?;

    if body.preview {
        let count = notifier.preview(blood_type).await?;
        return Ok(Json(SimulationResponse::Preview { count }));
    }

    let record = StockRecord::new(blood_type, units, Utc::now());
    store
        .upsert_stock(&record)
        .await
        .context("Failed to update stock level.")?;

    let outcome = match ScarcityAlert::from_stock(blood_type, units) {
        Some(alert) => notifier.evaluate_and_notify(alert).await?,
        None => NotifyOutcome::NotScarce,
    };
    Ok(Json(SimulationResponse::Applied {
        success: true,
        blood_type,
        units,
        status: record.status,
        count: outcome.recipient_count(),
        outcome: outcome.label(),
        message_id: outcome.message_id().map(String::from),
    }))
}

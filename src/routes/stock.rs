use crate::domain::{BloodType, StockRecord, StockUnits};
use crate::routes::ApiError;
use crate::store::Store;
use anyhow::Context;
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

#[derive(serde::Deserialize)]
pub struct StockUpdate {
    units: i64,
}

#[tracing::instrument(name = "Listing stock levels", skip(store))]
#[get("/stock")]
pub async fn list_stock(
    store: &State<Arc<dyn Store>>,
) -> Result<Json<Vec<StockRecord>>, ApiError> {
    let stock = store
        .stock_levels()
        .await
        .context("Failed to load stock levels.")?;
    Ok(Json(stock))
}

#[tracing::instrument(
    name = "Updating a stock level",
    skip(body, store),
    fields(units = body.units)
)]
#[put("/stock/<blood_type>", data = "<body>")]
pub async fn update_stock(
    blood_type: BloodType,
    body: Json<StockUpdate>,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<StockRecord>, ApiError> {
    let units = StockUnits::parse(body.units).map_err(ApiError::ValidationError)?;
    let record = StockRecord::new(blood_type, units, Utc::now());
    store
        .upsert_stock(&record)
        .await
        .context("Failed to update stock level.")?;
    Ok(Json(record))
}

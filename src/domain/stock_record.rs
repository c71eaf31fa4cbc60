use crate::domain::{BloodType, StockStatus, StockUnits};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StockRecord {
    pub blood_type: BloodType,
    pub units: StockUnits,
    pub status: StockStatus,
    pub last_updated: DateTime<Utc>,
}

impl StockRecord {
    /// The status is always derived from `units`, never taken from the caller.
    pub fn new(blood_type: BloodType, units: StockUnits, last_updated: DateTime<Utc>) -> Self {
        Self {
            blood_type,
            units,
            status: StockStatus::from_units(units),
            last_updated,
        }
    }
}

use crate::domain::{BloodType, StockRecord, StockUnits};
use crate::schema::blood_stock;
use chrono::offset::Utc;
use chrono::DateTime;
use diesel::prelude::*;

#[derive(Queryable)]
pub struct BloodStock {
    pub blood_type: String,
    pub units: i32,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = blood_stock)]
pub struct NewBloodStock<'a> {
    pub blood_type: &'a str,
    pub units: i32,
    pub status: &'a str,
    pub last_updated: &'a DateTime<Utc>,
}

impl<'a> From<&'a StockRecord> for NewBloodStock<'a> {
    fn from(record: &'a StockRecord) -> Self {
        NewBloodStock {
            blood_type: record.blood_type.as_str(),
            units: record.units.as_i32(),
            status: record.status.as_str(),
            last_updated: &record.last_updated,
        }
    }
}

impl TryFrom<BloodStock> for StockRecord {
    type Error = String;

    // The stored status column is informational; it is re-derived on read.
    fn try_from(row: BloodStock) -> Result<Self, Self::Error> {
        let blood_type = BloodType::parse(&row.blood_type)?;
        let units = StockUnits::parse(row.units.into())?;
        Ok(StockRecord::new(blood_type, units, row.last_updated))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct StockUnits(u32);

impl StockUnits {
    /// Stored as a Postgres `INT4`, so the upper bound is `i32::MAX`.
    pub fn parse(units: i64) -> Result<StockUnits, String> {
        if units < 0 {
            Err(format!("{} is not a valid unit count: it is negative.", units))
        } else if units > i32::MAX as i64 {
            Err(format!("{} is not a valid unit count: it is too large.", units))
        } else {
            Ok(Self(units as u32))
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn as_i32(&self) -> i32 {
        self.0 as i32
    }
}

impl std::fmt::Display for StockUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

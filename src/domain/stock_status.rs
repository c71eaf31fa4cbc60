use crate::domain::StockUnits;
use std::fmt;

/// At or below this many units a blood type is critical.
pub const CRITICAL_THRESHOLD: u32 = 10;
/// At or below this many units (and above the critical threshold) a blood type is low.
pub const LOW_THRESHOLD: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StockStatus {
    Available,
    Low,
    Critical,
}

impl StockStatus {
    /// The one place scarcity is decided.
    pub fn from_units(units: StockUnits) -> StockStatus {
        match units.value() {
            u if u <= CRITICAL_THRESHOLD => Self::Critical,
            u if u <= LOW_THRESHOLD => Self::Low,
            _ => Self::Available,
        }
    }

    /// Accepts the spellings used by older clients: `Low`, `LOW`, `Critical`,
    /// `CRITICAL` and `VERY_LOW` (read as critical).
    pub fn parse(s: &str) -> Result<StockStatus, String> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "low" => Ok(Self::Low),
            "critical" | "very_low" | "very low" => Ok(Self::Critical),
            _ => Err(format!("{} is not a valid stock status.", s)),
        }
    }

    pub fn is_scarce(&self) -> bool {
        !matches!(self, Self::Available)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Low => "Low",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for StockStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        StockStatus::parse(&s)
    }
}

impl From<StockStatus> for String {
    fn from(status: StockStatus) -> Self {
        status.as_str().to_string()
    }
}

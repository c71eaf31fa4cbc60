use crate::domain::notification::BLOOD_SCARCITY;
use crate::domain::{BloodType, NewNotification, StockStatus, StockUnits};
use uuid::Uuid;

/// A shortage of one blood type, and the wording donors receive about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScarcityAlert {
    pub blood_type: BloodType,
    pub units: StockUnits,
    pub status: StockStatus,
}

impl ScarcityAlert {
    pub fn new(blood_type: BloodType, units: StockUnits, status: StockStatus) -> Self {
        Self {
            blood_type,
            units,
            status,
        }
    }

    /// `None` when the stock level is not scarce.
    pub fn from_stock(blood_type: BloodType, units: StockUnits) -> Option<Self> {
        let status = StockStatus::from_units(units);
        status
            .is_scarce()
            .then(|| Self::new(blood_type, units, status))
    }

    pub fn email_subject(&self) -> String {
        format!("Blood Scarcity Alert: {} Blood Type", self.blood_type)
    }

    pub fn email_html(&self) -> String {
        format!(
            "<h2>Blood Scarcity Alert</h2>\
            <p>The blood bank is currently experiencing a {status} supply of {blood_type} blood type.</p>\
            <p>Current units available: {units}</p>\
            <p>As someone with {blood_type} blood type, your donation could help save lives.</p>\
            <p>Please consider donating if you are eligible.</p>\
            <p>Thank you for your support!</p>",
            status = self.status.as_str().to_lowercase(),
            blood_type = self.blood_type,
            units = self.units,
        )
    }

    pub fn email_text(&self) -> String {
        format!(
            "Blood Scarcity Alert\n\n\
            The blood bank is currently experiencing a {status} supply of {blood_type} blood type.\n\
            Current units available: {units}\n\n\
            As someone with {blood_type} blood type, your donation could help save lives.\n\
            Please consider donating if you are eligible.\n\n\
            Thank you for your support!",
            status = self.status.as_str().to_lowercase(),
            blood_type = self.blood_type,
            units = self.units,
        )
    }

    pub fn notification_for(&self, user_id: Uuid) -> NewNotification {
        NewNotification {
            user_id,
            kind: BLOOD_SCARCITY,
            title: format!("Blood Scarcity Alert: {}", self.blood_type),
            message: format!(
                "The blood bank is running {} on {} blood ({} units available).",
                self.status.as_str().to_lowercase(),
                self.blood_type,
                self.units
            ),
        }
    }
}

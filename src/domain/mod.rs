mod blood_type;
mod directory;
pub mod notification;
mod recipient_email;
mod scarcity_alert;
mod stock_record;
mod stock_status;
mod stock_units;

pub use blood_type::BloodType;
pub use directory::{eligible_recipients, NotificationPreference, Recipient, UserProfile};
pub use notification::{NewNotification, NotificationRecord};
pub use recipient_email::RecipientEmail;
pub use scarcity_alert::ScarcityAlert;
pub use stock_record::StockRecord;
pub use stock_status::{StockStatus, CRITICAL_THRESHOLD, LOW_THRESHOLD};
pub use stock_units::StockUnits;

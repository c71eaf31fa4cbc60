use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const BLOOD_SCARCITY: &str = "blood_scarcity";

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn into_record(self, created_at: DateTime<Utc>) -> NotificationRecord {
        NotificationRecord {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            kind: self.kind.to_string(),
            title: self.title,
            message: self.message,
            read: false,
            created_at,
        }
    }
}

use crate::domain::NotificationRecord;
use crate::schema::notifications;
use chrono::offset::Utc;
use chrono::DateTime;
use diesel::prelude::*;

#[derive(Queryable)]
pub struct Notification {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow<'a> {
    pub id: &'a uuid::Uuid,
    pub user_id: &'a uuid::Uuid,
    pub kind: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub read: bool,
    pub created_at: &'a DateTime<Utc>,
}

impl<'a> From<&'a NotificationRecord> for NewNotificationRow<'a> {
    fn from(record: &'a NotificationRecord) -> Self {
        NewNotificationRow {
            id: &record.id,
            user_id: &record.user_id,
            kind: &record.kind,
            title: &record.title,
            message: &record.message,
            read: record.read,
            created_at: &record.created_at,
        }
    }
}

impl From<Notification> for NotificationRecord {
    fn from(row: Notification) -> Self {
        NotificationRecord {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind,
            title: row.title,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

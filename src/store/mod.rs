mod memory;
mod postgres;

use crate::domain::{
    BloodType, NewNotification, NotificationPreference, NotificationRecord, StockRecord,
    StockStatus, UserProfile,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
use uuid::Uuid;

/// Stock levels, the donor directory, in-app notifications and the alert
/// ledger. Every call is independent: nothing here spans a transaction across
/// methods.
#[async_trait]
pub trait Store: Send + Sync {
    async fn stock_levels(&self) -> anyhow::Result<Vec<StockRecord>>;

    async fn upsert_stock(&self, record: &StockRecord) -> anyhow::Result<()>;

    async fn upsert_profile(&self, profile: &UserProfile) -> anyhow::Result<()>;

    async fn upsert_preference(&self, preference: &NotificationPreference) -> anyhow::Result<()>;

    async fn profiles_by_ids(&self, user_ids: &[Uuid]) -> anyhow::Result<Vec<UserProfile>>;

    /// Every profile that could be eligible for `blood_type` together with the
    /// preferences set for it. Eligibility itself is decided by
    /// [`crate::domain::eligible_recipients`].
    async fn candidates_for(
        &self,
        blood_type: BloodType,
    ) -> anyhow::Result<(Vec<UserProfile>, Vec<NotificationPreference>)>;

    async fn record_notifications(&self, notifications: Vec<NewNotification>) -> anyhow::Result<()>;

    async fn notifications_for(&self, user_id: Uuid) -> anyhow::Result<Vec<NotificationRecord>>;

    /// Returns `false` when no matching notification exists.
    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> anyhow::Result<bool>;

    /// Atomically claims the right to alert about `blood_type` at `status`.
    /// Fails (returns `false`) if a claim newer than `not_before` exists.
    async fn claim_alert(
        &self,
        blood_type: BloodType,
        status: StockStatus,
        now: DateTime<Utc>,
        not_before: DateTime<Utc>,
    ) -> anyhow::Result<bool>;

    /// Drops the claim taken at `claimed_at`; a newer claim is left alone.
    async fn release_alert(
        &self,
        blood_type: BloodType,
        status: StockStatus,
        claimed_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}

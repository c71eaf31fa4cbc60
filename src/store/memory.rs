use crate::domain::{
    BloodType, NewNotification, NotificationPreference, NotificationRecord, StockRecord,
    StockStatus, UserProfile,
};
use crate::store::Store;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct State {
    stock: BTreeMap<BloodType, StockRecord>,
    // Vec keeps insertion order, which the eligibility rule relies on.
    profiles: Vec<UserProfile>,
    preferences: HashMap<(Uuid, BloodType), NotificationPreference>,
    notifications: Vec<NotificationRecord>,
    alerts: HashMap<(BloodType, StockStatus), DateTime<Utc>>,
}

/// A process-local [`Store`], used by the test suite and for running the
/// service without a database.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> anyhow::Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow::anyhow!("The in-memory store lock was poisoned."))
    }

    /// Every notification recorded so far, oldest first.
    pub fn all_notifications(&self) -> Vec<NotificationRecord> {
        self.state
            .lock()
            .map(|state| state.notifications.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn stock_levels(&self) -> anyhow::Result<Vec<StockRecord>> {
        Ok(self.state()?.stock.values().cloned().collect())
    }

    async fn upsert_stock(&self, record: &StockRecord) -> anyhow::Result<()> {
        self.state()?.stock.insert(record.blood_type, record.clone());
        Ok(())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> anyhow::Result<()> {
        let mut state = self.state()?;
        match state.profiles.iter_mut().find(|p| p.user_id == profile.user_id) {
            Some(existing) => *existing = profile.clone(),
            None => state.profiles.push(profile.clone()),
        }
        Ok(())
    }

    async fn upsert_preference(&self, preference: &NotificationPreference) -> anyhow::Result<()> {
        self.state()?.preferences.insert(
            (preference.user_id, preference.blood_type),
            preference.clone(),
        );
        Ok(())
    }

    async fn profiles_by_ids(&self, user_ids: &[Uuid]) -> anyhow::Result<Vec<UserProfile>> {
        Ok(self
            .state()?
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn candidates_for(
        &self,
        blood_type: BloodType,
    ) -> anyhow::Result<(Vec<UserProfile>, Vec<NotificationPreference>)> {
        let state = self.state()?;
        let preferences: Vec<NotificationPreference> = state
            .preferences
            .values()
            .filter(|p| p.blood_type == blood_type)
            .cloned()
            .collect();
        let profiles = state
            .profiles
            .iter()
            .filter(|p| {
                p.blood_group == Some(blood_type)
                    || preferences.iter().any(|pref| pref.user_id == p.user_id)
            })
            .cloned()
            .collect();
        Ok((profiles, preferences))
    }

    async fn record_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> anyhow::Result<()> {
        let now = Utc::now();
        self.state()?
            .notifications
            .extend(notifications.into_iter().map(|n| n.into_record(now)));
        Ok(())
    }

    async fn notifications_for(&self, user_id: Uuid) -> anyhow::Result<Vec<NotificationRecord>> {
        let mut notifications: Vec<NotificationRecord> = self
            .state()?
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.reverse();
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> anyhow::Result<bool> {
        let mut state = self.state()?;
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn claim_alert(
        &self,
        blood_type: BloodType,
        status: StockStatus,
        now: DateTime<Utc>,
        not_before: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let mut state = self.state()?;
        match state.alerts.get(&(blood_type, status)) {
            Some(claimed_at) if *claimed_at > not_before => Ok(false),
            _ => {
                state.alerts.insert((blood_type, status), now);
                Ok(true)
            }
        }
    }

    async fn release_alert(
        &self,
        blood_type: BloodType,
        status: StockStatus,
        claimed_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut state = self.state()?;
        if state.alerts.get(&(blood_type, status)) == Some(&claimed_at) {
            state.alerts.remove(&(blood_type, status));
        }
        Ok(())
    }
}

use crate::configuration::DatabaseSettings;
use crate::domain::{
    BloodType, NewNotification, NotificationPreference, NotificationRecord, StockRecord,
    StockStatus, UserProfile,
};
use crate::models::*;
use crate::store::Store;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use secrecy::ExposeSecret;
use std::time::Duration;
use uuid::Uuid;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// [`Store`] backed by Postgres. Diesel is synchronous, so every query runs on
/// tokio's blocking pool with a connection checked out of an r2d2 pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Builds the pool without opening a connection; the first query does.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Self {
        let manager =
            ConnectionManager::<PgConnection>::new(settings.connection_string().expose_secret());
        let pool = Pool::builder()
            .max_size(settings.max_connections)
            .connection_timeout(Duration::from_secs(2))
            .build_unchecked(manager);
        Self { pool }
    }

    #[tracing::instrument(name = "Running pending database migrations", skip(self))]
    pub async fn migrate(&self) -> anyhow::Result<()> {
        self.run(|conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map(|_| ())
                .map_err(|e| anyhow!(e))
        })
        .await
        .context("Failed to run database migrations.")
    }

    async fn run<F, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&mut PgConnection) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .context("Failed to retrieve a connection from the DB pool.")?;
            f(&mut *conn)
        })
        .await
        .context("The database task panicked or was cancelled.")?
    }
}

#[async_trait]
impl Store for PgStore {
    #[tracing::instrument(name = "Loading stock levels", skip(self))]
    async fn stock_levels(&self) -> anyhow::Result<Vec<StockRecord>> {
        self.run(|conn| {
            use crate::schema::blood_stock;
            let rows = blood_stock::table
                .order(blood_stock::blood_type.asc())
                .load::<BloodStock>(conn)
                .context("Failed to load blood stock.")?;
            let mut records = Vec::with_capacity(rows.len());
            for row in rows {
                match StockRecord::try_from(row) {
                    Ok(record) => records.push(record),
                    Err(error) => tracing::warn!(%error, "Skipping an invalid blood stock row"),
                }
            }
            Ok(records)
        })
        .await
    }

    #[tracing::instrument(
        name = "Saving a stock level",
        skip(self, record),
        fields(blood_type = %record.blood_type)
    )]
    async fn upsert_stock(&self, record: &StockRecord) -> anyhow::Result<()> {
        let record = record.clone();
        self.run(move |conn| {
            use crate::schema::blood_stock;
            let row = NewBloodStock::from(&record);
            diesel::insert_into(blood_stock::table)
                .values(&row)
                .on_conflict(blood_stock::blood_type)
                .do_update()
                .set((
                    blood_stock::units.eq(row.units),
                    blood_stock::status.eq(row.status),
                    blood_stock::last_updated.eq(row.last_updated),
                ))
                .execute(conn)
                .context("Failed to upsert blood stock.")?;
            Ok(())
        })
        .await
    }

    #[tracing::instrument(
        name = "Saving a user profile",
        skip(self, profile),
        fields(user_id = %profile.user_id)
    )]
    async fn upsert_profile(&self, profile: &UserProfile) -> anyhow::Result<()> {
        let profile = profile.clone();
        self.run(move |conn| {
            use crate::schema::user_profiles;
            let row = NewUserProfile::from(&profile);
            diesel::insert_into(user_profiles::table)
                .values(&row)
                .on_conflict(user_profiles::user_id)
                .do_update()
                .set((
                    user_profiles::email.eq(row.email),
                    user_profiles::blood_group.eq(row.blood_group),
                    user_profiles::scarcity_alerts.eq(row.scarcity_alerts),
                ))
                .execute(conn)
                .context("Failed to upsert user profile.")?;
            Ok(())
        })
        .await
    }

    #[tracing::instrument(
        name = "Saving a notification preference",
        skip(self, preference),
        fields(user_id = %preference.user_id)
    )]
    async fn upsert_preference(&self, preference: &NotificationPreference) -> anyhow::Result<()> {
        let preference = preference.clone();
        self.run(move |conn| {
            use crate::schema::notification_preferences as prefs;
            let row = NewNotificationPreference::from(&preference);
            diesel::insert_into(prefs::table)
                .values(&row)
                .on_conflict((prefs::user_id, prefs::blood_type))
                .do_update()
                .set(prefs::is_active.eq(row.is_active))
                .execute(conn)
                .context("Failed to upsert notification preference.")?;
            Ok(())
        })
        .await
    }

    #[tracing::instrument(name = "Looking up users by id", skip(self, user_ids))]
    async fn profiles_by_ids(&self, user_ids: &[Uuid]) -> anyhow::Result<Vec<UserProfile>> {
        let user_ids = user_ids.to_vec();
        self.run(move |conn| {
            use crate::schema::user_profiles;
            let rows = user_profiles::table
                .filter(user_profiles::user_id.eq_any(user_ids))
                .load::<UserProfileRow>(conn)
                .context("Failed to load user profiles.")?;
            Ok(rows.into_iter().map(UserProfile::from).collect())
        })
        .await
    }

    #[tracing::instrument(name = "Loading alert candidates", skip(self))]
    async fn candidates_for(
        &self,
        blood_type: BloodType,
    ) -> anyhow::Result<(Vec<UserProfile>, Vec<NotificationPreference>)> {
        self.run(move |conn| {
            use crate::schema::notification_preferences as prefs;
            use crate::schema::user_profiles;

            let preference_rows = prefs::table
                .filter(prefs::blood_type.eq(blood_type.as_str()))
                .load::<NotificationPreferenceRow>(conn)
                .context("Failed to load notification preferences.")?;
            let preferences = preference_rows
                .into_iter()
                .map(NotificationPreference::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| anyhow!(e))?;
            let watcher_ids: Vec<Uuid> = preferences.iter().map(|p| p.user_id).collect();

            let profile_rows = user_profiles::table
                .filter(
                    user_profiles::blood_group
                        .eq(blood_type.as_str())
                        .or(user_profiles::user_id.eq_any(watcher_ids)),
                )
                .order(user_profiles::user_id.asc())
                .load::<UserProfileRow>(conn)
                .context("Failed to load user profiles.")?;
            let profiles = profile_rows.into_iter().map(UserProfile::from).collect();
            Ok((profiles, preferences))
        })
        .await
    }

    #[tracing::instrument(
        name = "Recording notifications",
        skip(self, notifications),
        fields(count = notifications.len())
    )]
    async fn record_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> anyhow::Result<()> {
        if notifications.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let records: Vec<NotificationRecord> = notifications
            .into_iter()
            .map(|n| n.into_record(now))
            .collect();
        self.run(move |conn| {
            use crate::schema::notifications;
            let rows: Vec<NewNotificationRow> =
                records.iter().map(NewNotificationRow::from).collect();
            diesel::insert_into(notifications::table)
                .values(&rows)
                .execute(conn)
                .context("Failed to insert notifications.")?;
            Ok(())
        })
        .await
    }

    #[tracing::instrument(name = "Loading notifications", skip(self))]
    async fn notifications_for(&self, user_id: Uuid) -> anyhow::Result<Vec<NotificationRecord>> {
        self.run(move |conn| {
            use crate::schema::notifications;
            let rows = notifications::table
                .filter(notifications::user_id.eq(user_id))
                .order(notifications::created_at.desc())
                .load::<Notification>(conn)
                .context("Failed to load notifications.")?;
            Ok(rows.into_iter().map(NotificationRecord::from).collect())
        })
        .await
    }

    #[tracing::instrument(name = "Marking a notification as read", skip(self))]
    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> anyhow::Result<bool> {
        self.run(move |conn| {
            use crate::schema::notifications;
            let updated = diesel::update(
                notifications::table
                    .filter(notifications::id.eq(notification_id))
                    .filter(notifications::user_id.eq(user_id)),
            )
            .set(notifications::read.eq(true))
            .execute(conn)
            .context("Failed to mark notification as read.")?;
            Ok(updated > 0)
        })
        .await
    }

    #[tracing::instrument(name = "Claiming an alert", skip(self, now, not_before))]
    async fn claim_alert(
        &self,
        blood_type: BloodType,
        status: StockStatus,
        now: DateTime<Utc>,
        not_before: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        self.run(move |conn| {
            use crate::schema::alert_dispatches as dispatches;
            use diesel::query_dsl::methods::FilterDsl;
            // A single statement, so two concurrent claims cannot both win.
            let claimed = diesel::insert_into(dispatches::table)
                .values((
                    dispatches::blood_type.eq(blood_type.as_str()),
                    dispatches::status.eq(status.as_str()),
                    dispatches::claimed_at.eq(now),
                ))
                .on_conflict((dispatches::blood_type, dispatches::status))
                .do_update()
                .set(dispatches::claimed_at.eq(now))
                .filter(dispatches::claimed_at.le(not_before))
                .execute(conn)
                .context("Failed to claim the alert.")?;
            Ok(claimed == 1)
        })
        .await
    }

    #[tracing::instrument(name = "Releasing an alert claim", skip(self, claimed_at))]
    async fn release_alert(
        &self,
        blood_type: BloodType,
        status: StockStatus,
        claimed_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.run(move |conn| {
            use crate::schema::alert_dispatches as dispatches;
            diesel::delete(
                dispatches::table
                    .filter(dispatches::blood_type.eq(blood_type.as_str()))
                    .filter(dispatches::status.eq(status.as_str()))
                    .filter(dispatches::claimed_at.eq(claimed_at)),
            )
            .execute(conn)
            .context("Failed to release the alert claim.")?;
            Ok(())
        })
        .await
    }
}

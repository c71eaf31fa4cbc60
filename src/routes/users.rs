use crate::domain::{
    BloodType, NotificationPreference, NotificationRecord, RecipientEmail, UserProfile,
};
use crate::routes::ApiError;
use crate::store::Store;
use anyhow::Context;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct ProfileBody {
    email: String,
    blood_group: Option<String>,
    scarcity_alerts: Option<bool>,
}

impl ProfileBody {
    fn into_profile(self, user_id: Uuid) -> Result<UserProfile, String> {
        let email = RecipientEmail::parse(self.email)?;
        let blood_group = self
            .blood_group
            .as_deref()
            .map(BloodType::parse)
            .transpose()?;
        Ok(UserProfile {
            user_id,
            email: email.as_ref().to_string(),
            blood_group,
            scarcity_alerts: self.scarcity_alerts,
        })
    }
}

#[derive(serde::Deserialize)]
pub struct PreferenceBody {
    is_active: bool,
}

#[tracing::instrument(name = "Saving a user profile", skip(body, store))]
#[put("/users/<user_id>/profile", data = "<body>")]
pub async fn upsert_profile(
    user_id: Uuid,
    body: Json<ProfileBody>,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = body
        .into_inner()
        .into_profile(user_id)
        .map_err(ApiError::ValidationError)?;
    store
        .upsert_profile(&profile)
        .await
        .context("Failed to save the user profile.")?;
    Ok(Json(profile))
}

#[tracing::instrument(
    name = "Saving a notification preference",
    skip(body, store),
    fields(is_active = body.is_active)
)]
#[put("/users/<user_id>/preferences/<blood_type>", data = "<body>")]
pub async fn set_preference(
    user_id: Uuid,
    blood_type: BloodType,
    body: Json<PreferenceBody>,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<NotificationPreference>, ApiError> {
    let preference = NotificationPreference {
        user_id,
        blood_type,
        is_active: body.is_active,
    };
    store
        .upsert_preference(&preference)
        .await
        .context("Failed to save the notification preference.")?;
    Ok(Json(preference))
}

/// Newest first.
#[tracing::instrument(name = "Listing notifications", skip(store))]
#[get("/users/<user_id>/notifications")]
pub async fn list_notifications(
    user_id: Uuid,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<Vec<NotificationRecord>>, ApiError> {
    let notifications = store
        .notifications_for(user_id)
        .await
        .context("Failed to load notifications.")?;
    Ok(Json(notifications))
}

#[tracing::instrument(name = "Marking a notification as read", skip(store))]
#[post("/users/<user_id>/notifications/<notification_id>/read")]
pub async fn mark_notification_read(
    user_id: Uuid,
    notification_id: Uuid,
    store: &State<Arc<dyn Store>>,
) -> Result<(), ApiError> {
    let found = store
        .mark_notification_read(user_id, notification_id)
        .await
        .context("Failed to update the notification.")?;
    if !found {
        return Err(ApiError::NotFound("Notification not found".into()));
    }
    Ok(())
}

use crate::domain::{BloodType, NotificationPreference, UserProfile};
use crate::schema::{notification_preferences, user_profiles};
use diesel::prelude::*;

#[derive(Queryable)]
pub struct UserProfileRow {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub blood_group: Option<String>,
    pub scarcity_alerts: Option<bool>,
}

#[derive(Insertable)]
#[diesel(table_name = user_profiles)]
pub struct NewUserProfile<'a> {
    pub user_id: &'a uuid::Uuid,
    pub email: &'a str,
    pub blood_group: Option<&'a str>,
    pub scarcity_alerts: Option<bool>,
}

impl<'a> From<&'a UserProfile> for NewUserProfile<'a> {
    fn from(profile: &'a UserProfile) -> Self {
        NewUserProfile {
            user_id: &profile.user_id,
            email: &profile.email,
            blood_group: profile.blood_group.as_ref().map(BloodType::as_str),
            scarcity_alerts: profile.scarcity_alerts,
        }
    }
}

impl From<UserProfileRow> for UserProfile {
    // An unrecognised blood group reads as unset: the donor is then only
    // reachable through an explicit preference.
    fn from(row: UserProfileRow) -> Self {
        let blood_group = row.blood_group.and_then(|group| match BloodType::parse(&group) {
            Ok(blood_type) => Some(blood_type),
            Err(error) => {
                tracing::warn!(user_id = %row.user_id, %error, "Ignoring a stored blood group");
                None
            }
        });
        UserProfile {
            user_id: row.user_id,
            email: row.email,
            blood_group,
            scarcity_alerts: row.scarcity_alerts,
        }
    }
}

#[derive(Queryable)]
pub struct NotificationPreferenceRow {
    pub user_id: uuid::Uuid,
    pub blood_type: String,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = notification_preferences)]
pub struct NewNotificationPreference<'a> {
    pub user_id: &'a uuid::Uuid,
    pub blood_type: &'a str,
    pub is_active: bool,
}

impl<'a> From<&'a NotificationPreference> for NewNotificationPreference<'a> {
    fn from(preference: &'a NotificationPreference) -> Self {
        NewNotificationPreference {
            user_id: &preference.user_id,
            blood_type: preference.blood_type.as_str(),
            is_active: preference.is_active,
        }
    }
}

impl TryFrom<NotificationPreferenceRow> for NotificationPreference {
    type Error = String;

    fn try_from(row: NotificationPreferenceRow) -> Result<Self, Self::Error> {
        Ok(NotificationPreference {
            user_id: row.user_id,
            blood_type: BloodType::parse(&row.blood_type)?,
            is_active: row.is_active,
        })
    }
}

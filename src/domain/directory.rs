use crate::domain::{BloodType, RecipientEmail};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub email: String,
    pub blood_group: Option<BloodType>,
    /// Profile-wide scarcity opt-in. `None` counts as opted in.
    pub scarcity_alerts: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NotificationPreference {
    pub user_id: Uuid,
    pub blood_type: BloodType,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub user_id: Uuid,
    pub email: RecipientEmail,
}

/// Decides who hears about a shortage of `blood_type`.
///
/// An explicit preference for the blood type wins. Without one, users whose
/// blood group matches are included unless they switched scarcity alerts off.
/// Users with an unusable address are skipped and the result holds each
/// address once, in the order the profiles were given.
pub fn eligible_recipients(
    blood_type: BloodType,
    profiles: Vec<UserProfile>,
    preferences: &[NotificationPreference],
) -> Vec<Recipient> {
    let explicit: HashMap<Uuid, bool> = preferences
        .iter()
        .filter(|p| p.blood_type == blood_type)
        .map(|p| (p.user_id, p.is_active))
        .collect();

    let mut seen = HashSet::new();
    let mut recipients = Vec::new();
    for profile in profiles {
        let eligible = match explicit.get(&profile.user_id) {
            Some(is_active) => *is_active,
            None => {
                profile.blood_group == Some(blood_type) && profile.scarcity_alerts != Some(false)
            }
        };
        if !eligible {
            continue;
        }
        match RecipientEmail::parse(profile.email) {
            Ok(email) => {
                if seen.insert(email.mailbox_key()) {
                    recipients.push(Recipient {
                        user_id: profile.user_id,
                        email,
                    });
                }
            }
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    user_id = %profile.user_id,
                    "Skipping an eligible donor. Their stored contact details are invalid",
                );
            }
        }
    }
    recipients
}

diesel::table! {
    blood_stock (blood_type) {
        blood_type -> Text,
        units -> Int4,
        status -> Text,
        last_updated -> Timestamptz,
    }
}

diesel::table! {
    user_profiles (user_id) {
        user_id -> Uuid,
        email -> Text,
        blood_group -> Nullable<Text>,
        scarcity_alerts -> Nullable<Bool>,
    }
}

diesel::table! {
    notification_preferences (user_id, blood_type) {
        user_id -> Uuid,
        blood_type -> Text,
        is_active -> Bool,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Text,
        title -> Text,
        message -> Text,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    alert_dispatches (blood_type, status) {
        blood_type -> Text,
        status -> Text,
        claimed_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    blood_stock,
    user_profiles,
    notification_preferences,
    notifications,
    alert_dispatches,
);

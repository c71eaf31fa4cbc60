use crate::helpers::spawn_app;
use bloodbank::domain::BloodType;
use serde_json::json;

fn scarcity_payload(blood_type: &str, units: i64, status: &str) -> serde_json::Value {
    json!({
        "type": "blood_scarcity",
        "blood_type": blood_type,
        "units": units,
        "status": status
    })
}

#[tokio::test]
async fn preview_counts_eligible_donors_without_side_effects() {
    // arrange
    let app = spawn_app().await;
    app.add_donor("ada@example.com", Some(BloodType::ANegative), None)
        .await;
    app.add_donor("grace@example.com", Some(BloodType::ANegative), Some(false))
        .await;
    let opted_in = app
        .add_donor("linus@example.com", Some(BloodType::OPositive), None)
        .await;
    app.set_preference(opted_in, BloodType::ANegative, true).await;
    let mut body = scarcity_payload("A-", 4, "Critical");
    body["preview"] = json!(true);

    // act
    let response = app.post_function(&body).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"count": 2}));
    assert!(app.email_client.sent_emails().is_empty());
    assert!(app.store.all_notifications().is_empty());
}

#[tokio::test]
async fn a_scarcity_alert_records_notifications_and_sends_one_email() {
    // arrange
    let app = spawn_app().await;
    let ada = app
        .add_donor("ada@example.com", Some(BloodType::BPositive), None)
        .await;
    let grace = app
        .add_donor("grace@example.com", Some(BloodType::BPositive), Some(true))
        .await;

    // act
    let response = app.post_function(&scarcity_payload("B+", 15, "Low")).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["outcome"], "delivered");
    assert_eq!(body["message_id"], "message-1");

    let sent = app.email_client.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients, vec!["ada@example.com", "grace@example.com"]);

    let notified: Vec<_> = app
        .store
        .all_notifications()
        .into_iter()
        .map(|n| n.user_id)
        .collect();
    assert_eq!(notified, vec![ada, grace]);
}

#[tokio::test]
async fn the_unit_count_decides_the_level() {
    // arrange
    let app = spawn_app().await;
    app.add_donor("ada@example.com", Some(BloodType::OPositive), None)
        .await;

    // act
    let response = app
        .post_function(&scarcity_payload("O+", 45, "Critical"))
        .await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["outcome"], "not_scarce");
    assert_eq!(body["count"], 0);
    assert!(app.email_client.sent_emails().is_empty());
}

#[tokio::test]
async fn no_eligible_donors_means_no_email_and_no_records() {
    // arrange
    let app = spawn_app().await;
    app.add_donor("ada@example.com", Some(BloodType::AbNegative), None)
        .await;

    // act
    let response = app.post_function(&scarcity_payload("O-", 2, "Critical")).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["outcome"], "no_recipients");
    assert_eq!(body["count"], 0);
    assert!(app.email_client.sent_emails().is_empty());
    assert!(app.store.all_notifications().is_empty());
}

#[tokio::test]
async fn unsupported_notification_types_are_rejected() {
    // arrange
    let app = spawn_app().await;
    let mut body = scarcity_payload("O-", 2, "Critical");
    body["type"] = json!("newsletter");

    // act
    let response = app.post_function(&body).await;

    // assert
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app
        .post_function(&json!({"type": "blood_scarcity", "blood_type": "O-"}))
        .await;

    // assert
    assert_eq!(400, response.status().as_u16());
}

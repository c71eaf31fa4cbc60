use crate::helpers::spawn_app;
use bloodbank::domain::{BloodType, StockStatus};
use bloodbank::store::Store;
use serde_json::json;

#[tokio::test]
async fn a_simulation_updates_stock_and_alerts_donors() {
    // arrange
    let app = spawn_app().await;
    app.add_donor("ada@example.com", Some(BloodType::ONegative), None)
        .await;

    // act
    let response = app
        .post_simulation(&json!({"blood_type": "O-", "units": 8}))
        .await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["blood_type"], "O-");
    assert_eq!(body["units"], 8);
    assert_eq!(body["status"], "Critical");
    assert_eq!(body["outcome"], "delivered");
    assert_eq!(body["count"], 1);

    let stock = app.store.stock_levels().await.unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0].status, StockStatus::Critical);
    assert_eq!(app.email_client.sent_emails().len(), 1);
    assert_eq!(app.store.all_notifications().len(), 1);
}

#[tokio::test]
async fn a_preview_simulation_touches_nothing() {
    // arrange
    let app = spawn_app().await;
    app.add_donor("ada@example.com", Some(BloodType::ONegative), None)
        .await;

    // act
    let response = app
        .post_simulation(&json!({"blood_type": "O-", "units": 8, "preview": true}))
        .await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"count": 1}));
    assert!(app.store.stock_levels().await.unwrap().is_empty());
    assert!(app.email_client.sent_emails().is_empty());
    assert!(app.store.all_notifications().is_empty());
}

#[tokio::test]
async fn healthy_stock_is_saved_without_an_alert() {
    // arrange
    let app = spawn_app().await;
    app.add_donor("ada@example.com", Some(BloodType::APositive), None)
        .await;

    // act
    let response = app
        .post_simulation(&json!({"blood_type": "A+", "units": 21}))
        .await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "Available");
    assert_eq!(body["outcome"], "not_scarce");
    assert!(app.email_client.sent_emails().is_empty());
}

#[tokio::test]
async fn simulations_reject_invalid_input() {
    // arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (json!({"blood_type": "C+", "units": 5}), "an unknown blood type"),
        (json!({"blood_type": "A+", "units": -5}), "negative units"),
        (json!({"units": 5}), "no blood type"),
    ];

    for (body, description) in test_cases {
        // act
        let response = app.post_simulation(&body).await;

        // assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request for {}.",
            description
        );
    }
}

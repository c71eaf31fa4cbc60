use crate::helpers::MockEmailClient;
use bloodbank::domain::{
    BloodType, ScarcityAlert, StockRecord, StockStatus, StockUnits, UserProfile,
};
use bloodbank::notifier::{NotifyError, NotifyOutcome, ScarcityNotifier};
use bloodbank::store::{InMemoryStore, Store};
use chrono::Utc;
use claim::{assert_err, assert_ok_eq};
use std::sync::Arc;
use uuid::Uuid;

struct Fixture {
    store: Arc<InMemoryStore>,
    email_client: Arc<MockEmailClient>,
    notifier: ScarcityNotifier,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let email_client = Arc::new(MockEmailClient::default());
    let notifier = ScarcityNotifier::new(
        store.clone(),
        email_client.clone(),
        chrono::Duration::minutes(60),
    );
    Fixture {
        store,
        email_client,
        notifier,
    }
}

async fn add_donor(store: &InMemoryStore, email: &str, blood_group: BloodType) -> Uuid {
    let user_id = Uuid::new_v4();
    store
        .upsert_profile(&UserProfile {
            user_id,
            email: email.into(),
            blood_group: Some(blood_group),
            scarcity_alerts: None,
        })
        .await
        .unwrap();
    user_id
}

fn alert(blood_type: BloodType, units: i64) -> ScarcityAlert {
    ScarcityAlert::from_stock(blood_type, StockUnits::parse(units).unwrap()).unwrap()
}

#[tokio::test]
async fn a_second_alert_at_the_same_level_is_suppressed() {
    // arrange
    let f = fixture();
    add_donor(&f.store, "ada@example.com", BloodType::APositive).await;

    // act
    let first = f.notifier.evaluate_and_notify(alert(BloodType::APositive, 18)).await;
    let second = f.notifier.evaluate_and_notify(alert(BloodType::APositive, 15)).await;

    // assert
    assert_ok_eq!(
        first,
        NotifyOutcome::Delivered {
            recipient_count: 1,
            message_id: "message-1".into()
        }
    );
    assert_ok_eq!(second, NotifyOutcome::Suppressed);
    assert_eq!(f.email_client.sent_emails().len(), 1);
    assert_eq!(f.store.all_notifications().len(), 1);
}

#[tokio::test]
async fn an_escalation_to_critical_is_not_suppressed() {
    // arrange
    let f = fixture();
    add_donor(&f.store, "ada@example.com", BloodType::APositive).await;

    // act
    f.notifier
        .evaluate_and_notify(alert(BloodType::APositive, 18))
        .await
        .unwrap();
    let escalation = f.notifier.evaluate_and_notify(alert(BloodType::APositive, 9)).await;

    // assert
    assert_eq!(escalation.unwrap().label(), "delivered");
    let sent = f.email_client.sent_emails();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].html_content.contains("a critical supply of A+"));
}

#[tokio::test]
async fn other_blood_types_are_tracked_separately() {
    // arrange
    let f = fixture();
    add_donor(&f.store, "ada@example.com", BloodType::APositive).await;
    add_donor(&f.store, "grace@example.com", BloodType::ONegative).await;

    // act
    f.notifier
        .evaluate_and_notify(alert(BloodType::APositive, 5))
        .await
        .unwrap();
    let other = f.notifier.evaluate_and_notify(alert(BloodType::ONegative, 5)).await;

    // assert
    assert_eq!(other.unwrap().recipient_count(), 1);
    assert_eq!(f.email_client.sent_emails().len(), 2);
}

#[tokio::test]
async fn a_failed_delivery_releases_the_claim() {
    // arrange
    let f = fixture();
    add_donor(&f.store, "ada@example.com", BloodType::BNegative).await;
    f.email_client.fail_deliveries(true);

    // act
    let failed = f.notifier.evaluate_and_notify(alert(BloodType::BNegative, 3)).await;
    f.email_client.fail_deliveries(false);
    let retried = f.notifier.evaluate_and_notify(alert(BloodType::BNegative, 3)).await;

    // assert
    assert!(matches!(assert_err!(failed), NotifyError::Delivery(_)));
    assert_eq!(retried.unwrap().label(), "delivered");
    assert_eq!(f.email_client.sent_emails().len(), 1);
}

#[tokio::test]
async fn no_recipients_does_not_hold_the_claim() {
    // arrange
    let f = fixture();

    // act
    let empty = f.notifier.evaluate_and_notify(alert(BloodType::AbPositive, 2)).await;
    add_donor(&f.store, "ada@example.com", BloodType::AbPositive).await;
    let delivered = f.notifier.evaluate_and_notify(alert(BloodType::AbPositive, 2)).await;

    // assert
    assert_ok_eq!(empty, NotifyOutcome::NoRecipients);
    assert_eq!(delivered.unwrap().recipient_count(), 1);
}

#[tokio::test]
async fn non_scarce_alerts_do_nothing() {
    // arrange
    let f = fixture();
    add_donor(&f.store, "ada@example.com", BloodType::APositive).await;
    let healthy = ScarcityAlert::new(
        BloodType::APositive,
        StockUnits::parse(40).unwrap(),
        StockStatus::Available,
    );

    // act
    let outcome = f.notifier.evaluate_and_notify(healthy).await;

    // assert
    assert_ok_eq!(outcome, NotifyOutcome::NotScarce);
    assert!(f.email_client.sent_emails().is_empty());
}

#[tokio::test]
async fn checking_stock_levels_alerts_every_scarce_blood_type() {
    // arrange
    let f = fixture();
    add_donor(&f.store, "ada@example.com", BloodType::APositive).await;
    add_donor(&f.store, "grace@example.com", BloodType::ONegative).await;
    for (blood_type, units) in [
        (BloodType::APositive, 20),
        (BloodType::ONegative, 10),
        (BloodType::BPositive, 21),
    ] {
        f.store
            .upsert_stock(&StockRecord::new(
                blood_type,
                StockUnits::parse(units).unwrap(),
                Utc::now(),
            ))
            .await
            .unwrap();
    }

    // act
    let checks = f.notifier.check_stock_levels().await.unwrap();

    // assert
    let levels: Vec<_> = checks.iter().map(|c| (c.blood_type, c.status)).collect();
    assert_eq!(
        levels,
        vec![
            (BloodType::APositive, StockStatus::Low),
            (BloodType::ONegative, StockStatus::Critical),
        ]
    );
    assert!(checks.iter().all(|c| c.outcome.is_ok()));
    assert_eq!(f.email_client.sent_emails().len(), 2);
}

#[tokio::test]
async fn preview_counts_without_claiming() {
    // arrange
    let f = fixture();
    add_donor(&f.store, "ada@example.com", BloodType::APositive).await;

    // act
    let count = f.notifier.preview(BloodType::APositive).await;
    let outcome = f.notifier.evaluate_and_notify(alert(BloodType::APositive, 4)).await;

    // assert
    assert_ok_eq!(count, 1);
    assert_eq!(outcome.unwrap().label(), "delivered");
}

#[tokio::test]
async fn overlapping_alerts_send_one_email() {
    // arrange
    let f = fixture();
    add_donor(&f.store, "ada@example.com", BloodType::ONegative).await;
    let alert = alert(BloodType::ONegative, 7);

    // act
    let (first, second) = tokio::join!(
        f.notifier.evaluate_and_notify(alert),
        f.notifier.evaluate_and_notify(alert),
    );

    // assert
    let mut outcomes = vec![first.unwrap().label(), second.unwrap().label()];
    outcomes.sort();
    assert_eq!(outcomes, vec!["delivered", "suppressed"]);
    assert_eq!(f.email_client.sent_emails().len(), 1);
}

use async_trait::async_trait;
use bloodbank::configuration::{get_configuration, Settings};
use bloodbank::domain::{BloodType, NotificationPreference, RecipientEmail, UserProfile};
use bloodbank::email::Email;
use bloodbank::startup::Application;
use bloodbank::store::{InMemoryStore, PgStore, Store};
use bloodbank::telemetry::{get_subscriber, init_subscriber};
use diesel::{Connection, PgConnection, RunQueryDsl};
use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".into();
    let subscriber_name = "test".into();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to install the tracing subscriber.");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).expect("Failed to install the tracing subscriber.");
    }
});

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
}

/// Records every message instead of sending it. Can be told to fail.
#[derive(Default)]
pub struct MockEmailClient {
    sent_emails: Mutex<Vec<SentEmail>>,
    fail: AtomicBool,
}

impl MockEmailClient {
    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.sent_emails.lock().unwrap().clone()
    }

    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Email for MockEmailClient {
    async fn send_email(
        &self,
        recipients: &[RecipientEmail],
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<String, anyhow::Error> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("The mail provider is unavailable.");
        }
        let mut sent = self.sent_emails.lock().unwrap();
        sent.push(SentEmail {
            recipients: recipients.iter().map(|r| r.as_ref().to_string()).collect(),
            subject: subject.into(),
            html_content: html_content.into(),
            text_content: text_content.into(),
        });
        Ok(format!("message-{}", sent.len()))
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub email_client: Arc<MockEmailClient>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_send_email(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/api/send-email", body).await
    }

    pub async fn post_function(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/functions/send-email", body).await
    }

    pub async fn post_simulation(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/simulations", body).await
    }

    /// Adds a donor straight to the store and returns their id.
    pub async fn add_donor(
        &self,
        email: &str,
        blood_group: Option<BloodType>,
        scarcity_alerts: Option<bool>,
    ) -> Uuid {
        let user_id = Uuid::new_v4();
        self.store
            .upsert_profile(&UserProfile {
                user_id,
                email: email.into(),
                blood_group,
                scarcity_alerts,
            })
            .await
            .unwrap();
        user_id
    }

    pub async fn set_preference(&self, user_id: Uuid, blood_type: BloodType, is_active: bool) {
        self.store
            .upsert_preference(&NotificationPreference {
                user_id,
                blood_type,
                is_active,
            })
            .await
            .unwrap();
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Starts the server on a random port with an in-memory store and a recording
/// mailer. The stock monitor is off unless `customise` turns it on.
pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = None;
        c.monitor.enabled = false;
        customise(&mut c);
        c
    };

    let store = Arc::new(InMemoryStore::new());
    let email_client = Arc::new(MockEmailClient::default());

    let app = Application::build(&configuration, store.clone(), email_client.clone())
        .await
        .expect("Failed to build application.");
    let port = app.port;
    let _ = tokio::spawn(app.server.launch());
    TestApp {
        address: format!(
            "http://127.0.0.1:{}",
            port.get().await.expect("The server did not start.")
        ),
        store,
        email_client,
        api_client: reqwest::Client::new(),
    }
}

/// A `PgStore` on a freshly created, migrated database of its own.
pub async fn spawn_database() -> PgStore {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.database.database_name = Uuid::new_v4().to_string();
        c
    };

    let mut connection = PgConnection::establish(
        configuration
            .database
            .connection_string_without_database()
            .expose_secret(),
    )
    .expect("Failed to connect to Postgres.");
    diesel::sql_query(format!(
        "CREATE DATABASE \"{}\"",
        configuration.database.database_name
    ))
    .execute(&mut connection)
    .expect("Failed to create database.");

    let store = PgStore::connect_lazy(&configuration.database);
    store.migrate().await.expect("Failed to migrate the database.");
    store
}

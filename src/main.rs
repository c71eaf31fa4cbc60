use anyhow::Context;
use bloodbank::configuration::get_configuration;
use bloodbank::email::SesEmailClient;
use bloodbank::startup::Application;
use bloodbank::store::PgStore;
use bloodbank::telemetry::{get_subscriber, init_subscriber};
use std::sync::Arc;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("bloodbank".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let store = PgStore::connect_lazy(&configuration.database);
    store.migrate().await?;
    let email_client = SesEmailClient::from_settings(&configuration.email_client)
        .await
        .context("Failed to set up the email client.")?;

    let app = Application::build(&configuration, Arc::new(store), Arc::new(email_client)).await?;
    let _ = app.server.launch().await?;
    Ok(())
}

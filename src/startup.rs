use crate::bound_port::{listen_port, BoundPort};
use crate::catchers::*;
use crate::configuration::Settings;
use crate::cors::Cors;
use crate::email::Email;
use crate::monitor::StockMonitor;
use crate::notifier::ScarcityNotifier;
use crate::routes::*;
use crate::store::Store;
use rocket::config::LogLevel;
use rocket::{Config, Ignite, Rocket};
use std::sync::Arc;

pub struct Application {
    pub server: Rocket<Ignite>,
    pub port: BoundPort,
}

impl Application {
    /// Ignites the server without launching it. With no configured port the
    /// OS picks one, reported through `port` after liftoff.
    pub async fn build(
        configuration: &Settings,
        store: Arc<dyn Store>,
        email_client: Arc<dyn Email>,
    ) -> Result<Application, rocket::Error> {
        let (report_port, port) = listen_port();
        let notifier = ScarcityNotifier::new(
            store.clone(),
            email_client.clone(),
            configuration.notifications.suppression_window(),
        );

        let mut rocket = rocket::custom(Config {
            port: configuration.application.port.unwrap_or(0),
            address: configuration.application.host,
            log_level: LogLevel::Off,
            ..Config::debug_default()
        })
        .attach(report_port)
        .attach(Cors);
        if configuration.monitor.enabled {
            rocket = rocket.attach(StockMonitor::new(
                notifier.clone(),
                configuration.monitor.interval(),
            ));
        }

        let server = rocket
            .manage(store)
            .manage(email_client)
            .manage(notifier)
            .mount(
                "/",
                routes![
                    health,
                    preflight,
                    list_stock,
                    update_stock,
                    simulate,
                    upsert_profile,
                    set_preference,
                    list_notifications,
                    mark_notification_read,
                    send_scarcity_email,
                    notification_function,
                ],
            )
            .register(
                "/",
                catchers![
                    unprocessable_entity_to_bad_request,
                    bad_request,
                    not_found,
                    internal_error
                ],
            )
            .ignite()
            .await?;
        Ok(Application { server, port })
    }
}

use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};
use tokio::sync::watch;

/// The listening port, known once Rocket has lifted off. A configured port of
/// 0 lets the OS choose, so the value can differ from the configuration.
pub fn listen_port() -> (ReportBoundPort, BoundPort) {
    let (tx, rx) = watch::channel(None);
    (ReportBoundPort { tx }, BoundPort { rx })
}

/// Liftoff fairing that publishes the port to its paired [`BoundPort`].
pub struct ReportBoundPort {
    tx: watch::Sender<Option<u16>>,
}

impl ReportBoundPort {
    fn report(&self, port: u16) {
        if self.tx.send(Some(port)).is_err() {
            tracing::debug!(port, "Bound port reported with nobody listening");
        }
    }
}

#[rocket::async_trait]
impl Fairing for ReportBoundPort {
    fn info(&self) -> Info {
        Info {
            name: "Bound port reporter",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let port = rocket.config().port;
        tracing::info!(port, "Listening");
        self.report(port);
    }
}

#[derive(Clone)]
pub struct BoundPort {
    rx: watch::Receiver<Option<u16>>,
}

impl BoundPort {
    /// Waits for liftoff. `None` if the server was dropped before binding.
    pub async fn get(&self) -> Option<u16> {
        let mut rx = self.rx.clone();
        loop {
            if let Some(port) = *rx.borrow_and_update() {
                return Some(port);
            }
            if rx.changed().await.is_err() {
                return *rx.borrow();
            }
        }
    }
}

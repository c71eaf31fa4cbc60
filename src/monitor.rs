use crate::notifier::ScarcityNotifier;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Runs the stock scan on a fixed period for as long as the server is up.
pub struct StockMonitor {
    notifier: ScarcityNotifier,
    period: Duration,
}

impl StockMonitor {
    pub fn new(notifier: ScarcityNotifier, period: Duration) -> StockMonitor {
        StockMonitor { notifier, period }
    }
}

#[rocket::async_trait]
impl Fairing for StockMonitor {
    fn info(&self) -> Info {
        Info {
            name: "Stock Monitor",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        tracing::info!(period_seconds = self.period.as_secs(), "Starting the stock monitor");
        tokio::spawn(run_until(
            self.notifier.clone(),
            self.period,
            rocket.shutdown(),
        ));
    }
}

/// The first scan happens one period after start.
pub async fn run_until<S>(notifier: ScarcityNotifier, period: Duration, shutdown: S)
where
    S: Future<Output = ()>,
{
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Stopping the stock monitor");
                break;
            }
            _ = interval.tick() => scan(&notifier).await,
        }
    }
}

async fn scan(notifier: &ScarcityNotifier) {
    let checks = match notifier.check_stock_levels().await {
        Ok(checks) => checks,
        Err(error) => {
            tracing::error!(error.cause_chain = ?error, "Failed to load stock levels");
            return;
        }
    };
    for check in checks {
        match check.outcome {
            Ok(outcome) => tracing::info!(
                blood_type = %check.blood_type,
                status = %check.status,
                ?outcome,
                "Stock check finished"
            ),
            Err(error) => tracing::warn!(
                blood_type = %check.blood_type,
                status = %check.status,
                error.cause_chain = ?error,
                "Stock check failed"
            ),
        }
    }
}

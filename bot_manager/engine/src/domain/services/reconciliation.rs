//! Reconciliation loop
//! Periodically checks supervised bots against the OS

use crate::domain::services::BotSupervisor;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct ReconciliationService {
    supervisor: Arc<BotSupervisor>,
    interval: Duration,
}

impl ReconciliationService {
    pub fn new(supervisor: Arc<BotSupervisor>, interval: Duration) -> Self {
        Self {
            supervisor,
            interval,
        }
    }

    /// Runs until the cancellation token is triggered
    pub async fn run(&self, cancellation_token: CancellationToken) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Reconciliation loop started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Reconciliation loop received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.supervisor.reconcile_once().await;
                    if report.exited > 0 || report.failed > 0 {
                        info!(
                            checked = report.checked,
                            exited = report.exited,
                            failed = report.failed,
                            "Reconciliation pass found changes"
                        );
                    } else {
                        debug!(checked = report.checked, "Reconciliation pass clean");
                    }
                }
            }
        }

        info!("Reconciliation loop stopped");
    }
}

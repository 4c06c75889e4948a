//! Periodic `system_update` publisher
//! Runs on its own schedule whether or not anyone is listening

use crate::domain::ports::Broadcaster;
use crate::domain::use_cases::{GetSystemMetrics, ListBots};
use crate::domain::{BotEvent, DomainError, SystemUpdate};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct StatusBroadcastService {
    list_bots: Arc<dyn ListBots>,
    metrics: Arc<dyn GetSystemMetrics>,
    broadcaster: Arc<dyn Broadcaster>,
    interval: Duration,
}

impl StatusBroadcastService {
    pub fn new(
        list_bots: Arc<dyn ListBots>,
        metrics: Arc<dyn GetSystemMetrics>,
        broadcaster: Arc<dyn Broadcaster>,
        interval: Duration,
    ) -> Self {
        Self {
            list_bots,
            metrics,
            broadcaster,
            interval,
        }
    }

    /// Build and publish one update
    pub async fn publish_once(&self) -> Result<(), DomainError> {
        let metrics = self.metrics.execute().await?;
        let running_bots = self.list_bots.running().await?;

        self.broadcaster
            .publish(BotEvent::SystemUpdate(SystemUpdate {
                metrics,
                running_bots,
            }));
        Ok(())
    }

    pub async fn run(&self, cancellation_token: CancellationToken) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Status broadcast loop started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.publish_once().await {
                        warn!(error = %e, "Failed to publish system update");
                    }
                }
            }
        }

        info!("Status broadcast loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::{
        MockExecutor, MockSampler, MockSystemSampler, RecordingBroadcaster,
    };
    use crate::domain::ports::BotStore;
    use crate::domain::services::{BotSupervisor, SupervisorSettings};
    use crate::domain::use_cases::{GetSystemMetricsUseCase, ListBotsUseCase};
    use crate::domain::{Bot, HostUsage};
    use crate::infrastructure::InMemoryBotStore;

    #[tokio::test]
    async fn test_publish_once() {
        let store = Arc::new(InMemoryBotStore::new());
        let broadcaster = Arc::new(RecordingBroadcaster::new());
        let supervisor = Arc::new(BotSupervisor::new(
            store.clone(),
            Arc::new(MockExecutor::new()),
            Arc::new(MockSampler::new()),
            broadcaster.clone(),
            SupervisorSettings::default(),
        ));

        let running = Bot::builder("running", "/bin/sleep").build().unwrap();
        let running_id = running.id().clone();
        store.insert_bot(running).await.unwrap();
        store
            .insert_bot(Bot::builder("idle", "/bin/sleep").build().unwrap())
            .await
            .unwrap();
        supervisor.start(&running_id).await.unwrap();
        broadcaster.clear();

        let service = StatusBroadcastService::new(
            Arc::new(ListBotsUseCase::new(store.clone(), supervisor.clone())),
            Arc::new(GetSystemMetricsUseCase::new(
                store.clone(),
                Arc::new(MockSystemSampler {
                    usage: HostUsage {
                        cpu_percent: 10.0,
                        memory_percent: 20.0,
                        disk_percent: 30.0,
                    },
                }),
            )),
            broadcaster.clone(),
            Duration::from_secs(5),
        );
        service.publish_once().await.unwrap();

        let events = broadcaster.events();
        assert_eq!(events.len(), 1);
        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["type"], "system_update");
        assert_eq!(json["data"]["metrics"]["active_bots"], 1);
        assert_eq!(json["data"]["metrics"]["total_bots"], 2);
        assert_eq!(json["data"]["metrics"]["disk_usage"], 30.0);
        assert_eq!(json["data"]["running_bots"][0]["name"], "running");
        assert_eq!(json["data"]["running_bots"][0]["cpu_usage"], 2.5);
    }
}

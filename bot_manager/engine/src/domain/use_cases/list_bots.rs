//! ListBots use case
//! Bot views enriched with live process stats

use crate::domain::ports::BotStore;
use crate::domain::services::BotSupervisor;
use crate::domain::{Bot, BotId, BotStatus, BotView, DomainError, LiveStats};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

#[async_trait]
pub trait ListBots: Send + Sync {
    async fn list(&self) -> Result<Vec<BotView>, DomainError>;

    async fn get(&self, bot_id: &BotId) -> Result<BotView, DomainError>;

    /// Views of bots currently running
    async fn running(&self) -> Result<Vec<BotView>, DomainError>;
}

pub struct ListBotsUseCase {
    store: Arc<dyn BotStore>,
    supervisor: Arc<BotSupervisor>,
}

impl ListBotsUseCase {
    pub fn new(store: Arc<dyn BotStore>, supervisor: Arc<BotSupervisor>) -> Self {
        Self { store, supervisor }
    }

    async fn view(&self, bot: Bot) -> Result<BotView, DomainError> {
        if bot.status() != BotStatus::Running {
            return Ok(BotView::idle(bot));
        }

        match self.supervisor.get_live_stats(bot.id()).await? {
            stats @ LiveStats::Sampled { .. } => Ok(BotView::new(bot, &stats)),
            // Reconciled while sampling; show the fresh record
            LiveStats::Exited { .. } | LiveStats::Idle { .. } => {
                let fresh = self.store.find_bot(bot.id()).await?;
                Ok(BotView::idle(fresh))
            }
        }
    }
}

#[async_trait]
impl ListBots for ListBotsUseCase {
    async fn list(&self) -> Result<Vec<BotView>, DomainError> {
        let bots = self.store.list_bots().await?;
        let mut views = Vec::with_capacity(bots.len());

        for bot in bots {
            let id = bot.id().clone();
            match self.view(bot.clone()).await {
                Ok(view) => views.push(view),
                // Deleted between listing and sampling
                Err(DomainError::BotNotFound(_)) => {}
                // One unreadable process must not hide the other bots
                Err(e @ DomainError::Sampler(_)) => {
                    warn!(
                        bot_id = %id,
                        error = %e,
                        "Failed to sample bot, listing without stats"
                    );
                    views.push(BotView::idle(bot));
                }
                Err(e) => {
                    warn!(bot_id = %id, error = %e, "Failed to build bot view");
                    return Err(e);
                }
            }
        }
        Ok(views)
    }

    async fn get(&self, bot_id: &BotId) -> Result<BotView, DomainError> {
        let bot = self.store.find_bot(bot_id).await?;
        self.view(bot).await
    }

    async fn running(&self) -> Result<Vec<BotView>, DomainError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|view| view.bot.status() == BotStatus::Running)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::{MockExecutor, MockSampler, RecordingBroadcaster};
    use crate::domain::services::SupervisorSettings;
    use crate::infrastructure::InMemoryBotStore;

    #[tokio::test]
    async fn test_list_enriches_running_bots() {
        let store = Arc::new(InMemoryBotStore::new());
        let sampler = Arc::new(MockSampler::new());
        let supervisor = Arc::new(BotSupervisor::new(
            store.clone(),
            Arc::new(MockExecutor::new()),
            sampler.clone(),
            Arc::new(RecordingBroadcaster::new()),
            SupervisorSettings::default(),
        ));
        let use_case = ListBotsUseCase::new(store.clone(), supervisor.clone());

        let running = Bot::builder("running", "/bin/sleep").build().unwrap();
        let vanished = Bot::builder("vanished", "/bin/sleep").build().unwrap();
        let idle = Bot::builder("idle", "/bin/sleep").build().unwrap();
        let (running_id, vanished_id) = (running.id().clone(), vanished.id().clone());
        for bot in [running, vanished, idle] {
            store.insert_bot(bot).await.unwrap();
        }
        supervisor.start(&running_id).await.unwrap();
        let gone_pid = supervisor.start(&vanished_id).await.unwrap().pid;
        sampler.mark_dead(gone_pid);

        let views = use_case.list().await.unwrap();
        assert_eq!(views.len(), 3);

        let running_view = use_case.get(&running_id).await.unwrap();
        assert_eq!(running_view.cpu_usage, Some(2.5));
        assert_eq!(running_view.uptime.as_deref(), Some("0:00:00"));

        let vanished_view = use_case.get(&vanished_id).await.unwrap();
        assert_eq!(vanished_view.bot.status(), BotStatus::Stopped);
        assert!(vanished_view.cpu_usage.is_none());

        let names: Vec<_> = use_case
            .running()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.bot.name().to_string())
            .collect();
        assert_eq!(names, vec!["running"]);
    }

    #[tokio::test]
    async fn test_list_survives_sampler_error() {
        let store = Arc::new(InMemoryBotStore::new());
        let sampler = Arc::new(MockSampler::new());
        let supervisor = Arc::new(BotSupervisor::new(
            store.clone(),
            Arc::new(MockExecutor::new()),
            sampler.clone(),
            Arc::new(RecordingBroadcaster::new()),
            SupervisorSettings::default(),
        ));
        let use_case = ListBotsUseCase::new(store.clone(), supervisor.clone());

        let healthy = Bot::builder("healthy", "/bin/sleep").build().unwrap();
        let unreadable = Bot::builder("unreadable", "/bin/sleep").build().unwrap();
        let (healthy_id, unreadable_id) = (healthy.id().clone(), unreadable.id().clone());
        for bot in [healthy, unreadable] {
            store.insert_bot(bot).await.unwrap();
        }
        supervisor.start(&healthy_id).await.unwrap();
        let pid = supervisor.start(&unreadable_id).await.unwrap().pid;
        sampler.fail_with_error(pid);

        let views = use_case.list().await.unwrap();

        assert_eq!(views.len(), 2);
        let healthy_view = views.iter().find(|v| v.bot.id() == &healthy_id).unwrap();
        assert_eq!(healthy_view.cpu_usage, Some(2.5));
        let unreadable_view = views
            .iter()
            .find(|v| v.bot.id() == &unreadable_id)
            .unwrap();
        assert_eq!(unreadable_view.bot.status(), BotStatus::Running);
        assert!(unreadable_view.cpu_usage.is_none());
        assert!(use_case.get(&unreadable_id).await.is_err());
    }
}

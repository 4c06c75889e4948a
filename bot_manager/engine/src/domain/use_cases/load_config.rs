//! LoadConfig use case
//!
//! Registers bots from YAML definitions and starts those marked `auto_start`

use crate::domain::ports::BotStore;
use crate::domain::services::BotSupervisor;
use crate::domain::use_cases::CreateBot;
use crate::domain::{BotId, DomainError, LoadConfigCommand, LoadConfigResponse};
use crate::infrastructure::load_config_from_path;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

#[async_trait]
pub trait LoadConfig: Send + Sync {
    async fn execute(&self, command: LoadConfigCommand) -> Result<LoadConfigResponse, DomainError>;
}

pub struct LoadConfigUseCase {
    store: Arc<dyn BotStore>,
    create_bot: Arc<dyn CreateBot>,
    supervisor: Arc<BotSupervisor>,
}

impl LoadConfigUseCase {
    pub fn new(
        store: Arc<dyn BotStore>,
        create_bot: Arc<dyn CreateBot>,
        supervisor: Arc<BotSupervisor>,
    ) -> Self {
        Self {
            store,
            create_bot,
            supervisor,
        }
    }
}

#[async_trait]
impl LoadConfig for LoadConfigUseCase {
    async fn execute(&self, command: LoadConfigCommand) -> Result<LoadConfigResponse, DomainError> {
        info!(config_path = %command.config_path, "Loading bot configuration");

        let configs = load_config_from_path(&command.config_path)?;
        let mut response = LoadConfigResponse::default();
        if configs.is_empty() {
            warn!("No bots found in configuration");
            return Ok(response);
        }

        let existing: HashSet<String> = self
            .store
            .list_bots()
            .await?
            .into_iter()
            .map(|b| b.name().to_string())
            .collect();

        // Create everything first, then start
        let mut to_auto_start: Vec<(String, BotId)> = Vec::new();
        for (name, config) in configs {
            if existing.contains(&name) {
                info!(name = %name, "Bot already registered, skipping");
                response.bots_skipped += 1;
                continue;
            }

            match self.create_bot.execute(config.to_command(&name)).await {
                Ok(created) => {
                    response.bots_created += 1;
                    if config.auto_start {
                        to_auto_start.push((name, created.bot_id));
                    }
                }
                Err(e) => {
                    let msg = format!("Failed to create bot '{}': {}", name, e);
                    warn!("{}", msg);
                    response.errors.push(msg);
                }
            }
        }

        if command.auto_start {
            for (name, bot_id) in to_auto_start {
                match self.supervisor.start(&bot_id).await {
                    Ok(started) => {
                        response.bots_started += 1;
                        info!(name = %name, pid = started.pid, "Bot auto-started");
                    }
                    Err(e) => {
                        let msg = format!("Failed to auto-start '{}': {}", name, e);
                        warn!("{}", msg);
                        response.errors.push(msg);
                    }
                }
            }
        }

        info!(
            created = response.bots_created,
            skipped = response.bots_skipped,
            started = response.bots_started,
            errors = response.errors.len(),
            "Configuration loading completed"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::{MockExecutor, MockSampler, RecordingBroadcaster};
    use crate::domain::services::SupervisorSettings;
    use crate::domain::use_cases::CreateBotUseCase;
    use crate::domain::BotStatus;
    use crate::infrastructure::InMemoryBotStore;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_creates_and_auto_starts() {
        let store = Arc::new(InMemoryBotStore::new());
        let executor = Arc::new(MockExecutor::new());
        let supervisor = Arc::new(BotSupervisor::new(
            store.clone(),
            executor.clone(),
            Arc::new(MockSampler::new()),
            Arc::new(RecordingBroadcaster::new()),
            SupervisorSettings::default(),
        ));
        let create = Arc::new(CreateBotUseCase::new(
            store.clone(),
            supervisor.log_sink().clone(),
        ));
        let use_case = LoadConfigUseCase::new(store.clone(), create, supervisor);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bots.yaml");
        fs::write(
            &path,
            "bots:\n  worker:\n    command: /bin/sleep 100\n    auto_start: true\n  idle:\n    command: /bin/true\n  bad:\n    command: \"\"\n",
        )
        .unwrap();
        let path = path.to_str().unwrap().to_string();

        let response = use_case
            .execute(LoadConfigCommand::new(path.clone()))
            .await
            .unwrap();

        assert_eq!(response.bots_created, 2);
        assert_eq!(response.bots_started, 1);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(executor.spawn_count(), 1);

        let statuses: Vec<_> = store
            .list_bots()
            .await
            .unwrap()
            .into_iter()
            .map(|b| (b.name().to_string(), b.status()))
            .collect();
        assert!(statuses.contains(&("worker".to_string(), BotStatus::Running)));
        assert!(statuses.contains(&("idle".to_string(), BotStatus::Stopped)));

        // Loading again registers nothing new
        let again = use_case.execute(LoadConfigCommand::new(path)).await.unwrap();
        assert_eq!(again.bots_created, 0);
        assert_eq!(again.bots_skipped, 2);
    }
}

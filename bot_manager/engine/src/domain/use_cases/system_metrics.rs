//! GetSystemMetrics use case

use crate::domain::ports::{BotStore, SystemSampler};
use crate::domain::{BotStatus, DomainError, SystemMetrics};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait GetSystemMetrics: Send + Sync {
    async fn execute(&self) -> Result<SystemMetrics, DomainError>;
}

/// Host utilization plus active/total bot counts
pub struct GetSystemMetricsUseCase {
    store: Arc<dyn BotStore>,
    sampler: Arc<dyn SystemSampler>,
}

impl GetSystemMetricsUseCase {
    pub fn new(store: Arc<dyn BotStore>, sampler: Arc<dyn SystemSampler>) -> Self {
        Self { store, sampler }
    }
}

#[async_trait]
impl GetSystemMetrics for GetSystemMetricsUseCase {
    async fn execute(&self) -> Result<SystemMetrics, DomainError> {
        let usage = self.sampler.sample().await?;
        let bots = self.store.list_bots().await?;
        let active = bots
            .iter()
            .filter(|b| b.status() == BotStatus::Running)
            .count();

        Ok(SystemMetrics::new(usage, active, bots.len()))
    }
}

//! Application composition root
//!
//! Wires the adapters, the supervisor and every use case together. The
//! daemon builds one of these with the production adapters; tests swap in
//! their own.

use crate::domain::ports::{BotStore, ProcessExecutor, ProcessSampler, SystemSampler};
use crate::domain::services::{
    BotSupervisor, ReconciliationService, StatusBroadcastService, SupervisorSettings,
};
use crate::domain::use_cases::{
    BotLogs, BotLogsUseCase, CreateBot, CreateBotUseCase, DeleteBot, DeleteBotUseCase,
    GetSystemMetrics, GetSystemMetricsUseCase, ListBots, ListBotsUseCase, LoadConfig,
    LoadConfigUseCase, UpdateBot, UpdateBotUseCase,
};
use crate::domain::BotEvent;
use crate::infrastructure::{
    FanoutBroadcaster, InMemoryBotStore, SysinfoSampler, TokioProcessExecutor,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub struct Application {
    store: Arc<dyn BotStore>,
    broadcaster: Arc<FanoutBroadcaster>,
    supervisor: Arc<BotSupervisor>,

    create_bot: Arc<dyn CreateBot>,
    update_bot: Arc<dyn UpdateBot>,
    delete_bot: Arc<dyn DeleteBot>,
    load_config: Arc<dyn LoadConfig>,

    list_bots: Arc<dyn ListBots>,
    bot_logs: Arc<dyn BotLogs>,
    system_metrics: Arc<dyn GetSystemMetrics>,
}

impl Application {
    /// Production wiring: tokio executor, sysinfo sampling, in-memory store
    pub fn new(settings: SupervisorSettings) -> Self {
        let sampler = Arc::new(SysinfoSampler::new());
        Self::with_adapters(
            Arc::new(InMemoryBotStore::new()),
            Arc::new(TokioProcessExecutor::new()),
            sampler.clone(),
            sampler,
            settings,
        )
    }

    pub fn with_adapters(
        store: Arc<dyn BotStore>,
        executor: Arc<dyn ProcessExecutor>,
        sampler: Arc<dyn ProcessSampler>,
        system_sampler: Arc<dyn SystemSampler>,
        settings: SupervisorSettings,
    ) -> Self {
        let broadcaster = Arc::new(FanoutBroadcaster::new());
        let supervisor = Arc::new(BotSupervisor::new(
            store.clone(),
            executor,
            sampler,
            broadcaster.clone(),
            settings,
        ));
        let log_sink = supervisor.log_sink().clone();

        let create_bot: Arc<dyn CreateBot> =
            Arc::new(CreateBotUseCase::new(store.clone(), log_sink.clone()));
        let update_bot = Arc::new(UpdateBotUseCase::new(store.clone(), log_sink.clone()));
        let delete_bot = Arc::new(DeleteBotUseCase::new(supervisor.clone()));
        let load_config = Arc::new(LoadConfigUseCase::new(
            store.clone(),
            create_bot.clone(),
            supervisor.clone(),
        ));

        let list_bots = Arc::new(ListBotsUseCase::new(store.clone(), supervisor.clone()));
        let bot_logs = Arc::new(BotLogsUseCase::new(store.clone(), log_sink));
        let system_metrics = Arc::new(GetSystemMetricsUseCase::new(store.clone(), system_sampler));

        Self {
            store,
            broadcaster,
            supervisor,
            create_bot,
            update_bot,
            delete_bot,
            load_config,
            list_bots,
            bot_logs,
            system_metrics,
        }
    }

    pub fn store(&self) -> Arc<dyn BotStore> {
        self.store.clone()
    }

    /// Start, stop, restart and live stats go straight to the supervisor
    pub fn supervisor(&self) -> Arc<BotSupervisor> {
        self.supervisor.clone()
    }

    pub fn create_bot(&self) -> Arc<dyn CreateBot> {
        self.create_bot.clone()
    }

    pub fn update_bot(&self) -> Arc<dyn UpdateBot> {
        self.update_bot.clone()
    }

    pub fn delete_bot(&self) -> Arc<dyn DeleteBot> {
        self.delete_bot.clone()
    }

    pub fn load_config(&self) -> Arc<dyn LoadConfig> {
        self.load_config.clone()
    }

    pub fn list_bots(&self) -> Arc<dyn ListBots> {
        self.list_bots.clone()
    }

    pub fn bot_logs(&self) -> Arc<dyn BotLogs> {
        self.bot_logs.clone()
    }

    pub fn system_metrics(&self) -> Arc<dyn GetSystemMetrics> {
        self.system_metrics.clone()
    }

    /// Register a new event listener
    pub fn subscribe(&self, name: impl Into<String>) -> mpsc::Receiver<Arc<BotEvent>> {
        self.broadcaster.subscribe(name)
    }

    pub fn listener_count(&self) -> usize {
        self.broadcaster.listener_count()
    }

    pub fn reconciliation_service(&self, interval: Duration) -> ReconciliationService {
        ReconciliationService::new(self.supervisor.clone(), interval)
    }

    pub fn status_broadcast_service(&self, interval: Duration) -> StatusBroadcastService {
        StatusBroadcastService::new(
            self.list_bots.clone(),
            self.system_metrics.clone(),
            self.broadcaster.clone(),
            interval,
        )
    }
}

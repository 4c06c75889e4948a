//! Bot supervisor
//! Turns lifecycle intents into OS actions and keeps recorded state in
//! line with what the OS reports

use crate::constants::supervisor::{
    DEFAULT_KILL_TIMEOUT_SEC, DEFAULT_RESTART_DELAY_MS, DEFAULT_STOP_GRACE_SEC,
};
use crate::domain::ports::{
    BotStore, Broadcaster, OutputLine, OutputStream, ProcessExecutor, ProcessSampler, SpawnConfig,
};
use crate::domain::services::{BotLocks, HandleRegistry, LogSink, SupervisionHandle};
use crate::domain::{
    Bot, BotEvent, BotId, BotStatus, DomainError, LiveStats, LogLevel, LogSource,
    StartBotResponse,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupervisorSettings {
    /// How long a process gets between SIGTERM and SIGKILL
    pub stop_grace: Duration,
    /// How long to wait for the reaper after SIGKILL
    pub kill_timeout: Duration,
    /// Pause between the stop and start halves of a restart
    pub restart_delay: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            stop_grace: Duration::from_secs(DEFAULT_STOP_GRACE_SEC),
            kill_timeout: Duration::from_secs(DEFAULT_KILL_TIMEOUT_SEC),
            restart_delay: Duration::from_millis(DEFAULT_RESTART_DELAY_MS),
        }
    }
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub checked: usize,
    pub exited: usize,
    pub failed: usize,
}

pub struct BotSupervisor {
    store: Arc<dyn BotStore>,
    executor: Arc<dyn ProcessExecutor>,
    sampler: Arc<dyn ProcessSampler>,
    broadcaster: Arc<dyn Broadcaster>,
    log_sink: LogSink,
    registry: HandleRegistry,
    locks: BotLocks,
    settings: SupervisorSettings,
}

impl BotSupervisor {
    pub fn new(
        store: Arc<dyn BotStore>,
        executor: Arc<dyn ProcessExecutor>,
        sampler: Arc<dyn ProcessSampler>,
        broadcaster: Arc<dyn Broadcaster>,
        settings: SupervisorSettings,
    ) -> Self {
        let log_sink = LogSink::new(store.clone(), broadcaster.clone());
        Self {
            store,
            executor,
            sampler,
            broadcaster,
            log_sink,
            registry: HandleRegistry::new(),
            locks: BotLocks::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    pub fn log_sink(&self) -> &LogSink {
        &self.log_sink
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Spawn the bot's process and start supervising it
    pub async fn start(&self, bot_id: &BotId) -> Result<StartBotResponse, DomainError> {
        let _guard = self.locks.acquire(bot_id).await;
        let mut bot = self.store.find_bot(bot_id).await?;

        if bot.status().is_active() {
            return Err(DomainError::AlreadyRunning(bot_id.to_string()));
        }

        let previous = bot.status();
        bot.mark_starting()?;
        self.persist_transition(&bot, previous).await;
        self.log_sink
            .record(
                bot_id,
                LogLevel::Info,
                format!("Starting bot '{}'", bot.name()),
                LogSource::Api,
            )
            .await;

        let spawned = match self.executor.spawn(SpawnConfig::from_bot(&bot)).await {
            Ok(spawned) => spawned,
            Err(e) => {
                let reason = match e {
                    DomainError::SpawnFailure(reason) => reason,
                    other => other.to_string(),
                };
                error!(bot_id = %bot_id, error = %reason, "Failed to spawn bot process");

                bot.mark_error()?;
                self.persist_transition(&bot, BotStatus::Starting).await;
                self.log_sink
                    .record(
                        bot_id,
                        LogLevel::Error,
                        format!("Failed to start bot: {}", reason),
                        LogSource::System,
                    )
                    .await;
                return Err(DomainError::SpawnFailure(reason));
            }
        };

        let pid = spawned.pid;
        let handle = Arc::new(SupervisionHandle::new(bot_id.clone(), pid, spawned.exit));
        if let Err(e) = self.registry.put(handle) {
            // Per-bot serialization is broken; do not leave an orphan behind
            let _ = self.executor.kill_group(pid, libc::SIGKILL).await;
            panic!("supervision invariant violated for bot {}: {}", bot_id, e);
        }

        if let Some(output) = spawned.output {
            self.forward_output(bot_id.clone(), output);
        }

        bot.mark_running(pid)?;
        self.persist_transition(&bot, BotStatus::Starting).await;
        self.log_sink
            .record(
                bot_id,
                LogLevel::Info,
                format!("Bot '{}' started successfully with PID {}", bot.name(), pid),
                LogSource::System,
            )
            .await;

        Ok(StartBotResponse {
            bot_id: bot_id.clone(),
            pid,
        })
    }

    /// Gracefully terminate the bot's process, escalating to SIGKILL
    pub async fn stop(&self, bot_id: &BotId) -> Result<(), DomainError> {
        let _guard = self.locks.acquire(bot_id).await;
        let mut bot = self.store.find_bot(bot_id).await?;
        self.stop_locked(&mut bot).await
    }

    /// Stop then start; a bot that was not running is simply started
    pub async fn restart(&self, bot_id: &BotId) -> Result<StartBotResponse, DomainError> {
        match self.stop(bot_id).await {
            Ok(()) => tokio::time::sleep(self.settings.restart_delay).await,
            Err(DomainError::NotRunning(_)) => {
                debug!(bot_id = %bot_id, "Bot not running, restart proceeds with start");
            }
            Err(e) => return Err(e),
        }
        self.start(bot_id).await
    }

    /// Current resource usage of a running bot
    pub async fn get_live_stats(&self, bot_id: &BotId) -> Result<LiveStats, DomainError> {
        let bot = self.store.find_bot(bot_id).await?;

        let pid = match (bot.status(), bot.pid()) {
            (BotStatus::Running, Some(pid)) => pid,
            (status, _) => return Ok(LiveStats::Idle { status }),
        };

        match self.sampler.sample(pid).await {
            Ok(sample) => Ok(LiveStats::sampled(pid, &sample)),
            Err(DomainError::SampleFailure(_)) => {
                if self.reconcile_bot(bot_id).await? {
                    Ok(LiveStats::Exited { pid })
                } else {
                    let bot = self.store.find_bot(bot_id).await?;
                    Ok(LiveStats::Idle {
                        status: bot.status(),
                    })
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Check every supervised bot against the OS once
    pub async fn reconcile_once(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for bot_id in self.registry.bot_ids() {
            report.checked += 1;
            match self.reconcile_bot(&bot_id).await {
                Ok(true) => report.exited += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    error!(bot_id = %bot_id, error = %e, "Failed to reconcile bot");
                }
            }
        }

        report
    }

    /// Stop the bot if needed, then drop its record and logs
    pub async fn delete(&self, bot_id: &BotId) -> Result<(), DomainError> {
        let guard = self.locks.acquire(bot_id).await;
        let mut bot = self.store.find_bot(bot_id).await?;

        if bot.status() == BotStatus::Running {
            self.stop_locked(&mut bot).await?;
        }

        self.store.delete_logs(bot_id).await?;
        self.store.delete_bot(bot_id).await?;
        drop(guard);
        self.locks.forget(bot_id);

        info!(bot_id = %bot_id, name = %bot.name(), "Bot deleted");
        Ok(())
    }

    /// Stop every supervised bot concurrently; returns how many stopped cleanly
    pub async fn stop_all(self: &Arc<Self>) -> usize {
        let mut tasks = JoinSet::new();
        for bot_id in self.registry.bot_ids() {
            let supervisor = self.clone();
            tasks.spawn(async move {
                let result = supervisor.stop(&bot_id).await;
                (bot_id, result)
            });
        }

        let mut stopped = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => stopped += 1,
                Ok((bot_id, Err(e))) => {
                    warn!(bot_id = %bot_id, error = %e, "Failed to stop bot during shutdown")
                }
                Err(e) => error!(error = %e, "Stop task panicked"),
            }
        }
        stopped
    }

    // ===== Internals =====

    async fn stop_locked(&self, bot: &mut Bot) -> Result<(), DomainError> {
        let bot_id = bot.id().clone();

        if bot.status() != BotStatus::Running {
            return Err(DomainError::NotRunning(bot_id.to_string()));
        }

        let Some(handle) = self.registry.get(&bot_id) else {
            // Record claims a process nobody supervises
            warn!(bot_id = %bot_id, pid = ?bot.pid(), "No supervised process for running bot");
            bot.mark_stopped()?;
            self.persist_transition(bot, BotStatus::Running).await;
            self.log_sink
                .record(
                    &bot_id,
                    LogLevel::Warning,
                    "no supervised process found, marked stopped",
                    LogSource::System,
                )
                .await;
            return Ok(());
        };

        bot.mark_stopping()?;
        self.persist_transition(bot, BotStatus::Running).await;
        self.log_sink
            .record(
                &bot_id,
                LogLevel::Info,
                format!("Stopping bot '{}'", bot.name()),
                LogSource::Api,
            )
            .await;

        let result = self.terminate(&handle).await;
        self.registry.remove(&bot_id);

        match result {
            Ok(exit_code) => {
                bot.mark_stopped()?;
                self.persist_transition(bot, BotStatus::Stopping).await;
                info!(bot_id = %bot_id, pid = handle.pid(), exit_code = exit_code, "Bot process terminated");
                self.log_sink
                    .record(
                        &bot_id,
                        LogLevel::Info,
                        format!("Bot '{}' stopped successfully", bot.name()),
                        LogSource::System,
                    )
                    .await;
                Ok(())
            }
            Err(e) => {
                bot.mark_error()?;
                self.persist_transition(bot, BotStatus::Stopping).await;
                self.log_sink
                    .record(
                        &bot_id,
                        LogLevel::Error,
                        format!("Failed to stop bot: {}", e),
                        LogSource::System,
                    )
                    .await;
                Err(e)
            }
        }
    }

    /// SIGTERM, bounded wait, SIGKILL to the group, bounded wait
    async fn terminate(&self, handle: &SupervisionHandle) -> Result<i32, DomainError> {
        let pid = handle.pid();

        if let Some(code) = handle.exit_code() {
            return Ok(code);
        }

        if let Err(e) = self.executor.kill(pid, libc::SIGTERM).await {
            warn!(pid = pid, error = %e, "Failed to send SIGTERM");
        }

        if let Some(code) = handle.wait_exit(self.settings.stop_grace).await {
            debug!(pid = pid, exit_code = code, "Process exited after SIGTERM");
            return Ok(code);
        }

        warn!(
            pid = pid,
            grace_ms = self.settings.stop_grace.as_millis() as u64,
            "Process did not exit within grace period, sending SIGKILL"
        );
        if let Err(e) = self.executor.kill_group(pid, libc::SIGKILL).await {
            warn!(pid = pid, error = %e, "Failed to send SIGKILL to process group");
        }

        handle
            .wait_exit(self.settings.kill_timeout)
            .await
            .ok_or_else(|| {
                DomainError::TerminationFailure(format!(
                    "process {} still alive {}s after SIGKILL",
                    pid,
                    self.settings.kill_timeout.as_secs()
                ))
            })
    }

    /// Returns true when the bot's process turned out to be gone
    async fn reconcile_bot(&self, bot_id: &BotId) -> Result<bool, DomainError> {
        let _guard = self.locks.acquire(bot_id).await;

        let Some(mut bot) = self.store.load_bot(bot_id).await? else {
            self.registry.remove(bot_id);
            return Ok(false);
        };
        if bot.status() != BotStatus::Running {
            return Ok(false);
        }

        let handle = self.registry.get(bot_id);
        let pid = match (&handle, bot.pid()) {
            (Some(handle), _) => handle.pid(),
            (None, Some(pid)) => pid,
            (None, None) => return Ok(false),
        };

        let exit_code = handle.as_ref().and_then(|h| h.exit_code());
        if exit_code.is_none() {
            match self.sampler.sample(pid).await {
                Ok(_) => return Ok(false),
                Err(DomainError::SampleFailure(_)) => {}
                Err(e) => return Err(e),
            }
        }
        // The reaper may have caught up while sampling
        let exit_code = exit_code.or_else(|| handle.as_ref().and_then(|h| h.exit_code()));

        self.registry.remove(bot_id);
        bot.mark_stopped()?;
        self.persist_transition(&bot, BotStatus::Running).await;

        let message = match exit_code {
            Some(code) => format!("process exited unexpectedly (exit code {})", code),
            None => "process exited unexpectedly".to_string(),
        };
        self.log_sink
            .record(bot_id, LogLevel::Warning, message, LogSource::System)
            .await;

        Ok(true)
    }

    /// Persist the bot's state fields and announce the transition
    async fn persist_transition(&self, bot: &Bot, from: BotStatus) {
        if let Err(e) = self
            .store
            .save_bot_status(bot.id(), bot.status_update())
            .await
        {
            warn!(bot_id = %bot.id(), status = %bot.status(), error = %e, "Failed to persist bot status");
        }

        self.broadcaster.publish(BotEvent::status_changed(
            bot.id().clone(),
            from,
            bot.status(),
            bot.pid(),
        ));
    }

    fn forward_output(&self, bot_id: BotId, mut output: mpsc::Receiver<OutputLine>) {
        let sink = self.log_sink.clone();
        tokio::spawn(async move {
            while let Some(OutputLine { stream, line }) = output.recv().await {
                let level = match stream {
                    OutputStream::Stdout => LogLevel::Info,
                    OutputStream::Stderr => LogLevel::Error,
                };
                sink.record(&bot_id, level, line, LogSource::Bot).await;
            }
            debug!(bot_id = %bot_id, "Output stream closed");
        });
    }
}

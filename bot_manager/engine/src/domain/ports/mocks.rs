//! Hand-written port doubles for unit tests

use super::{
    Broadcaster, OutputLine, ProcessExecutor, ProcessSampler, SpawnConfig, SpawnResult,
    SystemSampler,
};
use crate::domain::{BotEvent, DomainError, HostUsage, LogEntry, ProcessSample, StatusChange};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::SystemTime;
use tokio::sync::{mpsc, watch};

/// Signal sent through the mock executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentSignal {
    pub pid: u32,
    pub signal: i32,
    pub group: bool,
}

/// Executor that hands out fake PIDs and lets tests drive process exit
pub struct MockExecutor {
    next_pid: AtomicU32,
    exits: Mutex<HashMap<u32, watch::Sender<Option<i32>>>>,
    signals: Mutex<Vec<SentSignal>>,
    spawned: Mutex<Vec<SpawnConfig>>,
    output: Mutex<Vec<OutputLine>>,
    /// Spawn fails with this reason
    pub fail_spawn: Option<String>,
    /// Process exits as soon as it receives SIGTERM
    pub exit_on_term: bool,
    /// Process exits as soon as its group receives SIGKILL
    pub exit_on_kill: bool,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(1000),
            exits: Mutex::new(HashMap::new()),
            signals: Mutex::new(Vec::new()),
            spawned: Mutex::new(Vec::new()),
            output: Mutex::new(Vec::new()),
            fail_spawn: None,
            exit_on_term: true,
            exit_on_kill: true,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            fail_spawn: Some(reason.to_string()),
            ..Self::new()
        }
    }

    /// Ignores SIGTERM, dies on SIGKILL
    pub fn stubborn() -> Self {
        Self {
            exit_on_term: false,
            ..Self::new()
        }
    }

    /// Survives everything
    pub fn unkillable() -> Self {
        Self {
            exit_on_term: false,
            exit_on_kill: false,
            ..Self::new()
        }
    }

    /// Lines every captured spawn will emit
    pub fn with_output(self, lines: Vec<OutputLine>) -> Self {
        *self.output.lock().unwrap() = lines;
        self
    }

    pub fn simulate_exit(&self, pid: u32, code: i32) {
        if let Some(tx) = self.exits.lock().unwrap().get(&pid) {
            let _ = tx.send(Some(code));
        }
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.lock().unwrap().len()
    }

    pub fn spawned(&self) -> Vec<SpawnConfig> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn signals(&self) -> Vec<SentSignal> {
        self.signals.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessExecutor for MockExecutor {
    async fn spawn(&self, config: SpawnConfig) -> Result<SpawnResult, DomainError> {
        if let Some(reason) = &self.fail_spawn {
            return Err(DomainError::SpawnFailure(reason.clone()));
        }

        let capture = config.capture_output;
        self.spawned.lock().unwrap().push(config);

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = watch::channel(None);
        self.exits.lock().unwrap().insert(pid, tx);

        let output = if capture {
            let lines = self.output.lock().unwrap().clone();
            let (out_tx, out_rx) = mpsc::channel(lines.len().max(1));
            for line in lines {
                let _ = out_tx.try_send(line);
            }
            Some(out_rx)
        } else {
            None
        };

        Ok(SpawnResult {
            pid,
            exit: rx,
            output,
        })
    }

    async fn kill(&self, pid: u32, signal: i32) -> Result<(), DomainError> {
        self.signals.lock().unwrap().push(SentSignal {
            pid,
            signal,
            group: false,
        });
        if signal == libc::SIGTERM && self.exit_on_term {
            self.simulate_exit(pid, 128 + libc::SIGTERM);
        }
        Ok(())
    }

    async fn kill_group(&self, pid: u32, signal: i32) -> Result<(), DomainError> {
        self.signals.lock().unwrap().push(SentSignal {
            pid,
            signal,
            group: true,
        });
        if signal == libc::SIGKILL && self.exit_on_kill {
            self.simulate_exit(pid, 128 + libc::SIGKILL);
        }
        Ok(())
    }
}

/// Sampler reporting a fixed sample for every live PID
#[derive(Default)]
pub struct MockSampler {
    dead: Mutex<HashSet<u32>>,
    failing: Mutex<HashSet<u32>>,
}

impl MockSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dead(&self, pid: u32) {
        self.dead.lock().unwrap().insert(pid);
    }

    /// Sampling `pid` fails with a sampler error instead of reporting it gone
    pub fn fail_with_error(&self, pid: u32) {
        self.failing.lock().unwrap().insert(pid);
    }
}

#[async_trait]
impl ProcessSampler for MockSampler {
    async fn sample(&self, pid: u32) -> Result<ProcessSample, DomainError> {
        if self.dead.lock().unwrap().contains(&pid) {
            return Err(DomainError::SampleFailure(pid));
        }
        if self.failing.lock().unwrap().contains(&pid) {
            return Err(DomainError::Sampler(format!("cannot read pid {}", pid)));
        }
        Ok(ProcessSample {
            cpu_percent: 2.5,
            memory_percent: 1.25,
            start_time: SystemTime::now(),
        })
    }
}

pub struct MockSystemSampler {
    pub usage: HostUsage,
}

#[async_trait]
impl SystemSampler for MockSystemSampler {
    async fn sample(&self) -> Result<HostUsage, DomainError> {
        Ok(self.usage)
    }
}

/// Broadcaster keeping every published event
#[derive(Default)]
pub struct RecordingBroadcaster {
    events: Mutex<Vec<BotEvent>>,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BotEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn status_changes(&self) -> Vec<StatusChange> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BotEvent::StatusChanged(change) => Some(change),
                _ => None,
            })
            .collect()
    }

    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BotEvent::Log(entry) => Some(entry),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn publish(&self, event: BotEvent) {
        self.events.lock().unwrap().push(event);
    }
}


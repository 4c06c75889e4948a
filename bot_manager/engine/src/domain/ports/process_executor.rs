//! ProcessExecutor port
//! Interface for spawning and signalling OS processes

use crate::domain::{Bot, DomainError};
use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

/// Configuration for spawning a process
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnConfig {
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: Option<String>,
    /// Overrides applied on top of the inherited environment
    pub env_vars: Vec<(String, String)>,
    /// Pipe stdout/stderr back as lines instead of discarding them
    pub capture_output: bool,
}

impl SpawnConfig {
    pub fn from_bot(bot: &Bot) -> Self {
        let mut env_vars: Vec<(String, String)> = bot
            .env()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        env_vars.sort();

        Self {
            command: bot.command().to_string(),
            args: bot.args().to_vec(),
            working_dir: Some(bot.working_dir().to_string()),
            env_vars,
            capture_output: bot.capture_output(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One line of captured child output
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub line: String,
}

/// Result of spawning a process
pub struct SpawnResult {
    pub pid: u32,
    /// Becomes `Some(code)` once the child has been reaped.
    /// Processes killed by a signal report `128 + signal`.
    pub exit: watch::Receiver<Option<i32>>,
    /// Captured output, present when `capture_output` was requested
    pub output: Option<mpsc::Receiver<OutputLine>>,
}

impl std::fmt::Debug for SpawnResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnResult")
            .field("pid", &self.pid)
            .field("exit", &*self.exit.borrow())
            .field("output", &self.output.is_some())
            .finish()
    }
}

/// Port for executing system processes
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Spawn a new process in its own process group
    async fn spawn(&self, config: SpawnConfig) -> Result<SpawnResult, DomainError>;

    /// Send a signal to a single process. A process that is already gone is
    /// not an error.
    async fn kill(&self, pid: u32, signal: i32) -> Result<(), DomainError>;

    /// Send a signal to the process group led by `pid`
    async fn kill_group(&self, pid: u32, signal: i32) -> Result<(), DomainError>;
}

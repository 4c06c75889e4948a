//! Domain-level errors
//! These represent business rule violations, not infrastructure failures

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // Bot lifecycle errors
    #[error("Bot '{0}' not found")]
    BotNotFound(String),

    #[error("Bot '{0}' is already running")]
    AlreadyRunning(String),

    #[error("Bot '{0}' is not running")]
    NotRunning(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Supervision errors
    /// A second handle was about to be installed for the same bot.
    /// Only reachable if per-bot serialization is broken.
    #[error("Supervision handle for bot '{0}' already exists")]
    DuplicateHandle(String),

    #[error("Failed to spawn process: {0}")]
    SpawnFailure(String),

    #[error("Process {0} no longer exists")]
    SampleFailure(u32),

    #[error("Failed to terminate process: {0}")]
    TerminationFailure(String),

    // Validation errors
    #[error("Invalid bot name: {0}")]
    InvalidName(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // Collaborator errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Sampler error: {0}")]
    Sampler(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

//! Bot entity
//! The persisted bot record and its lifecycle state machine

use crate::constants::bot::DEFAULT_WORKING_DIR;
use crate::domain::ports::BotStatusUpdate;
use crate::domain::value_objects::rfc3339;
use crate::domain::{BotId, BotStatus, BotType, DomainError, UpdateBotCommand};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    // Identity
    id: BotId,
    name: String,
    description: Option<String>,
    bot_type: BotType,
    port: Option<u16>,

    // Launch definition
    command: String,
    args: Vec<String>,
    working_dir: String,
    env: HashMap<String, String>,
    capture_output: bool,

    // State
    status: BotStatus,
    pid: Option<u32>,

    // Timestamps
    #[serde(with = "rfc3339")]
    created_at: SystemTime,
    #[serde(with = "rfc3339::option")]
    last_started: Option<SystemTime>,
    #[serde(with = "rfc3339::option")]
    last_stopped: Option<SystemTime>,
}

impl Bot {
    /// Create a builder for a new bot record
    ///
    /// # Example
    /// ```
    /// use bm_engine::domain::Bot;
    ///
    /// let bot = Bot::builder("echo-bot", "/usr/bin/python3")
    ///     .arg("bot.py")
    ///     .env_var("TOKEN", "secret")
    ///     .build()?;
    /// assert_eq!(bot.working_dir(), "/app");
    /// # Ok::<(), bm_engine::domain::DomainError>(())
    /// ```
    pub fn builder(name: impl Into<String>, command: impl Into<String>) -> BotBuilder {
        BotBuilder::new(name, command)
    }

    // ===== Getters =====

    pub fn id(&self) -> &BotId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn bot_type(&self) -> BotType {
        self.bot_type
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &str {
        &self.working_dir
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn capture_output(&self) -> bool {
        self.capture_output
    }

    pub fn status(&self) -> BotStatus {
        self.status
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn last_started(&self) -> Option<SystemTime> {
        self.last_started
    }

    pub fn last_stopped(&self) -> Option<SystemTime> {
        self.last_stopped
    }

    // ===== State transitions =====

    fn transition(&mut self, next: BotStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn mark_starting(&mut self) -> Result<(), DomainError> {
        self.transition(BotStatus::Starting)
    }

    /// Record the native PID of a freshly spawned process
    pub fn mark_running(&mut self, pid: u32) -> Result<(), DomainError> {
        self.transition(BotStatus::Running)?;
        self.pid = Some(pid);
        self.last_started = Some(SystemTime::now());
        Ok(())
    }

    pub fn mark_stopping(&mut self) -> Result<(), DomainError> {
        self.transition(BotStatus::Stopping)
    }

    /// Termination confirmed (or exit detected while running)
    pub fn mark_stopped(&mut self) -> Result<(), DomainError> {
        self.transition(BotStatus::Stopped)?;
        self.pid = None;
        self.last_stopped = Some(SystemTime::now());
        Ok(())
    }

    pub fn mark_error(&mut self) -> Result<(), DomainError> {
        self.transition(BotStatus::Error)?;
        self.pid = None;
        Ok(())
    }

    /// Snapshot of the state fields persisted after each transition
    pub fn status_update(&self) -> BotStatusUpdate {
        BotStatusUpdate {
            status: self.status,
            pid: self.pid,
            last_started: self.last_started,
            last_stopped: self.last_stopped,
        }
    }

    pub fn apply_status_update(&mut self, update: &BotStatusUpdate) {
        self.status = update.status;
        self.pid = update.pid;
        self.last_started = update.last_started;
        self.last_stopped = update.last_stopped;
    }

    // ===== Definition updates =====

    /// Apply a partial definition update; takes effect at the next start
    pub fn apply_update(&mut self, update: &UpdateBotCommand) -> Result<(), DomainError> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(command) = &update.command {
            validate_command(command)?;
        }
        if let Some(env) = &update.env {
            validate_env(env)?;
        }

        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(bot_type) = update.bot_type {
            self.bot_type = bot_type;
        }
        if let Some(port) = update.port {
            self.port = Some(port);
        }
        if let Some(command) = &update.command {
            self.command = command.clone();
        }
        if let Some(args) = &update.args {
            self.args = args.clone();
        }
        if let Some(working_dir) = &update.working_dir {
            self.working_dir = working_dir.clone();
        }
        if let Some(env) = &update.env {
            self.env = env.clone();
        }
        if let Some(capture_output) = update.capture_output {
            self.capture_output = capture_output;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(
            "Bot name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_command(command: &str) -> Result<(), DomainError> {
    if command.trim().is_empty() {
        return Err(DomainError::InvalidCommand(
            "Command cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_env(env: &HashMap<String, String>) -> Result<(), DomainError> {
    for key in env.keys() {
        if key.is_empty() || key.contains('=') || key.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidConfiguration(format!(
                "invalid environment variable name '{}'",
                key
            )));
        }
    }
    Ok(())
}

/// Builder for Bot
#[derive(Debug, Clone)]
pub struct BotBuilder {
    id: Option<BotId>,
    name: String,
    command: String,
    description: Option<String>,
    bot_type: BotType,
    port: Option<u16>,
    args: Vec<String>,
    working_dir: Option<String>,
    env: HashMap<String, String>,
    capture_output: bool,
}

impl BotBuilder {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            command: command.into(),
            description: None,
            bot_type: BotType::default(),
            port: None,
            args: Vec::new(),
            working_dir: None,
            env: HashMap::new(),
            capture_output: true,
        }
    }

    /// Use a caller-supplied id instead of a generated UUID
    pub fn id(mut self, id: impl Into<BotId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn bot_type(mut self, bot_type: BotType) -> Self {
        self.bot_type = bot_type;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    pub fn build(self) -> Result<Bot, DomainError> {
        validate_name(&self.name)?;
        validate_command(&self.command)?;
        validate_env(&self.env)?;

        Ok(Bot {
            id: self.id.unwrap_or_else(BotId::generate),
            name: self.name.trim().to_string(),
            description: self.description,
            bot_type: self.bot_type,
            port: self.port,
            command: self.command,
            args: self.args,
            working_dir: self
                .working_dir
                .unwrap_or_else(|| DEFAULT_WORKING_DIR.to_string()),
            env: self.env,
            capture_output: self.capture_output,
            status: BotStatus::Stopped,
            pid: None,
            created_at: SystemTime::now(),
            last_started: None,
            last_stopped: None,
        })
    }
}

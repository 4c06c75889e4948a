//! CreateBot Command

use crate::domain::{BotId, BotType};
use std::collections::HashMap;

/// Command to register a new bot
#[derive(Debug, Clone, Default)]
pub struct CreateBotCommand {
    pub name: String,
    /// Program to run. When `args` is empty this may be a full command line,
    /// which is split on whitespace.
    pub command: String,
    pub args: Vec<String>,
    pub description: Option<String>,
    pub bot_type: BotType,
    pub port: Option<u16>,
    pub working_dir: Option<String>,
    pub env: HashMap<String, String>,
    /// Defaults to true through `new`
    pub capture_output: bool,
}

impl CreateBotCommand {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            capture_output: true,
            ..Default::default()
        }
    }

    /// Program and arguments to persist
    pub fn program_and_args(&self) -> (String, Vec<String>) {
        if !self.args.is_empty() {
            return (self.command.clone(), self.args.clone());
        }

        let mut parts = self.command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        (program, parts.collect())
    }
}

#[derive(Debug, Clone)]
pub struct CreateBotResponse {
    pub bot_id: BotId,
    pub name: String,
}

//! UpdateBot Command

use crate::domain::{BotId, BotType};
use std::collections::HashMap;

/// Partial update of a bot definition; `None` leaves a field unchanged
#[derive(Debug, Clone)]
pub struct UpdateBotCommand {
    pub bot_id: BotId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub bot_type: Option<BotType>,
    pub port: Option<u16>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub working_dir: Option<String>,
    pub env: Option<HashMap<String, String>>,
    pub capture_output: Option<bool>,
}

impl UpdateBotCommand {
    pub fn new(bot_id: BotId) -> Self {
        Self {
            bot_id,
            name: None,
            description: None,
            bot_type: None,
            port: None,
            command: None,
            args: None,
            working_dir: None,
            env: None,
            capture_output: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.bot_type.is_none()
            && self.port.is_none()
            && self.command.is_none()
            && self.args.is_none()
            && self.working_dir.is_none()
            && self.env.is_none()
            && self.capture_output.is_none()
    }
}

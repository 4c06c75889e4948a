use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// Kind of bot, informational only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BotType {
    Discord,
    Telegram,
    Webhook,
    #[default]
    General,
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotType::Discord => write!(f, "discord"),
            BotType::Telegram => write!(f, "telegram"),
            BotType::Webhook => write!(f, "webhook"),
            BotType::General => write!(f, "general"),
        }
    }
}

impl FromStr for BotType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discord" => Ok(BotType::Discord),
            "telegram" => Ok(BotType::Telegram),
            "webhook" => Ok(BotType::Webhook),
            "general" => Ok(BotType::General),
            other => Err(DomainError::InvalidConfiguration(format!(
                "unknown bot type '{}'",
                other
            ))),
        }
    }
}

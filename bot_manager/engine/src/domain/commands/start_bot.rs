use crate::domain::BotId;

/// Outcome of a successful start
#[derive(Debug, Clone, PartialEq)]
pub struct StartBotResponse {
    pub bot_id: BotId,
    pub pid: u32,
}

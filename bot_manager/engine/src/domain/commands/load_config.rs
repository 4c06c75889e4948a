//! LoadConfig Command

/// Register bots from a YAML file or directory
#[derive(Debug, Clone)]
pub struct LoadConfigCommand {
    pub config_path: String,
    /// Start bots marked `auto_start`
    pub auto_start: bool,
}

impl LoadConfigCommand {
    pub fn new(config_path: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            auto_start: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadConfigResponse {
    pub bots_created: usize,
    /// Bots whose name was already registered
    pub bots_skipped: usize,
    pub bots_started: usize,
    pub errors: Vec<String>,
}

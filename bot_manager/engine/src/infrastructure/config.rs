//! Bot definitions from YAML
//!
//! Two layouts are accepted:
//! - a single file with a top-level `bots:` map of name -> definition
//! - a directory of `*.yaml`/`*.yml` files, one bot per file, named after the file

use crate::constants::bot::DEFAULT_CONFIG_PATHS;
use crate::domain::{BotType, CreateBotCommand, DomainError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ffi::OsStr;
use std::path::Path;
use tracing::warn;

/// Top-level configuration file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bots: BTreeMap<String, BotConfig>,
}

/// One bot definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub bot_type: BotType,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub working_dir: Option<String>,

    #[serde(default)]
    pub env: HashMap<String, String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default = "default_capture_output")]
    pub capture_output: bool,

    #[serde(default)]
    pub auto_start: bool,
}

fn default_capture_output() -> bool {
    true
}

impl BotConfig {
    pub fn to_command(&self, name: &str) -> CreateBotCommand {
        CreateBotCommand {
            name: name.to_string(),
            command: self.command.clone(),
            args: self.args.clone(),
            description: self.description.clone(),
            bot_type: self.bot_type,
            port: self.port,
            working_dir: self.working_dir.clone(),
            env: self.env.clone(),
            capture_output: self.capture_output,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &str) -> Result<Self, DomainError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::InvalidConfiguration(format!("Failed to read config file '{}': {}", path, e))
        })?;
        Self::parse(&contents)
            .map_err(|e| DomainError::InvalidConfiguration(format!("{} ({})", e, path)))
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        // serde_yaml silently keeps the last of duplicate keys
        validate_no_duplicate_bot_names(contents)?;
        serde_yaml::from_str(contents).map_err(|e| format!("Failed to parse YAML: {}", e))
    }
}

fn validate_no_duplicate_bot_names(yaml_content: &str) -> Result<(), String> {
    let mut seen = HashSet::new();
    let mut base_indent: Option<usize> = None;
    let mut name_indent: Option<usize> = None;

    for line in yaml_content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - line.trim_start().len();

        if trimmed == "bots:" {
            base_indent = Some(indent);
            continue;
        }

        let Some(base) = base_indent else { continue };
        if indent <= base {
            break;
        }

        // First nested line fixes the indentation of bot names
        let names_at = *name_indent.get_or_insert(indent);
        if indent == names_at && !trimmed.starts_with('-') {
            if let Some((name, _)) = trimmed.split_once(':') {
                let name = name.trim().trim_matches(|c| c == '"' || c == '\'');
                if !name.is_empty() && !seen.insert(name.to_string()) {
                    return Err(format!(
                        "Duplicate bot name '{}' in configuration. Each bot must have a unique name.",
                        name
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Load bot definitions from a file or a directory
pub fn load_config_from_path(config_path: &str) -> Result<Vec<(String, BotConfig)>, DomainError> {
    let path = Path::new(config_path);

    if path.is_dir() {
        load_from_directory(path)
    } else if path.is_file() {
        Ok(Config::load(config_path)?.bots.into_iter().collect())
    } else {
        Err(DomainError::InvalidConfiguration(format!(
            "Configuration path does not exist: {}",
            config_path
        )))
    }
}

/// Each file is one bot; the file stem is its name. Unreadable files are
/// skipped with a warning.
fn load_from_directory(dir: &Path) -> Result<Vec<(String, BotConfig)>, DomainError> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| {
            DomainError::InvalidConfiguration(format!(
                "Failed to read config directory '{}': {}",
                dir.display(),
                e
            ))
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && (path.extension() == Some(OsStr::new("yaml"))
                    || path.extension() == Some(OsStr::new("yml")))
        })
        .collect();

    // Deterministic load order
    entries.sort();

    let mut bots = Vec::new();
    for path in entries {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!(path = %path.display(), "Skipping config file with invalid name");
            continue;
        };

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|contents| {
                serde_yaml::from_str::<BotConfig>(&contents).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(config) => bots.push((name.to_string(), config)),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to load bot config file"),
        }
    }

    Ok(bots)
}

/// First existing default location, if any
pub fn get_default_config_path() -> Option<String> {
    DEFAULT_CONFIG_PATHS
        .iter()
        .find(|p| Path::new(p).exists())
        .map(|p| p.to_string())
}

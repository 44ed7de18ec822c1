//! # Configuration Management Module
//!
//! Every tunable of the rule set lives here: the ledger objective and its
//! feedback sound, the transfer marker and range, the discovery reward and
//! milestone table, the achievement catalogue, the tick cadences, storage and
//! logging.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use craftledger::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     config.validate()?;
//!     println!("Objective: {}", config.ledger.objective);
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [ledger]
//! objective = "money"
//! display_name = "Money"
//!
//! [transfer]
//! marker_item = "minecraft:stick"
//! range = 2.0
//!
//! [[achievements]]
//! id = "achievement_monster_hunter"
//! title = "Monster Hunter"
//! reward = 300
//! interval_ticks = 80
//! requirement = { kind = "any_of", items = ["minecraft:bone"] }
//! ```
//!
//! Missing sections and fields fall back to [`Config::default`]. Listing any
//! `[[achievements]]` table replaces the built-in catalogue.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::host::SoundCue;
use crate::rules::achievement::{default_catalogue, AchievementRule};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    /// Broadcast once the scoreboard is ready. Empty disables it.
    pub ready_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Scoreboard objective holding balances.
    pub objective: String,
    pub display_name: String,
    /// Unit suffix shown after amounts, e.g. "G".
    pub currency_suffix: String,
    /// Sound played at the player whenever their balance changes.
    pub sound: SoundCue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub enabled: bool,
    /// Item type that must be held to request a transfer.
    pub marker_item: String,
    /// Maximum distance between giver and receiver.
    pub range: f64,
    /// Tell the giver when nobody stands close enough. Off keeps the silent no-op.
    pub notify_no_recipient: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Distinct item types required.
    pub count: usize,
    pub reward: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub enabled: bool,
    /// Paid once per distinct item type per player per process lifetime.
    pub first_item_reward: i64,
    pub milestones: Vec<Milestone>,
}

/// Tick cadences. The host runs at `ticks_per_second`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub ticks_per_second: u32,
    pub startup_delay_ticks: u64,
    pub display_interval_ticks: u64,
    pub transfer_interval_ticks: u64,
    pub discovery_interval_ticks: u64,
    pub milestone_interval_ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the sled database backing simulated worlds.
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Main configuration structure. Every section is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub transfer: TransferConfig,
    pub discovery: DiscoveryConfig,
    pub achievements: Vec<AchievementRule>,
    pub schedule: ScheduleConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject settings that would make a rule misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.ledger.objective.trim().is_empty() {
            return Err(anyhow!("ledger.objective must not be empty"));
        }
        if self.schedule.ticks_per_second == 0 {
            return Err(anyhow!("schedule.ticks_per_second must be > 0"));
        }
        let intervals = [
            ("display_interval_ticks", self.schedule.display_interval_ticks),
            ("transfer_interval_ticks", self.schedule.transfer_interval_ticks),
            ("discovery_interval_ticks", self.schedule.discovery_interval_ticks),
            ("milestone_interval_ticks", self.schedule.milestone_interval_ticks),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(anyhow!("schedule.{} must be > 0", name));
            }
        }
        if self.transfer.range.is_nan() || self.transfer.range <= 0.0 {
            return Err(anyhow!("transfer.range must be a positive distance"));
        }
        if self.transfer.marker_item.trim().is_empty() {
            return Err(anyhow!("transfer.marker_item must not be empty"));
        }
        for pair in self.discovery.milestones.windows(2) {
            if pair[1].count <= pair[0].count {
                return Err(anyhow!(
                    "discovery.milestones must be strictly increasing (found {} after {})",
                    pair[1].count,
                    pair[0].count
                ));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for rule in &self.achievements {
            if rule.interval_ticks == 0 {
                return Err(anyhow!("achievement {} has interval_ticks = 0", rule.id));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(anyhow!("duplicate achievement id {}", rule.id));
            }
            rule.requirement.validate().map_err(|e| anyhow!("achievement {}: {}", rule.id, e))?;
        }
        Ok(())
    }
}

/// Milestone table paid for distinct item types collected.
pub fn default_milestones() -> Vec<Milestone> {
    [
        (50, 200),
        (100, 250),
        (250, 300),
        (500, 350),
        (1000, 400),
        (1500, 500),
        (2000, 600),
        (3000, 700),
        (4000, 800),
        (5000, 900),
    ]
    .into_iter()
    .map(|(count, reward)| Milestone { count, reward })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            ledger: LedgerConfig::default(),
            transfer: TransferConfig::default(),
            discovery: DiscoveryConfig::default(),
            achievements: default_catalogue(),
            schedule: ScheduleConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "craftledger world".to_string(),
            ready_message: "§e[System] Startup complete!".to_string(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            objective: "money".to_string(),
            display_name: "Money".to_string(),
            currency_suffix: "G".to_string(),
            sound: SoundCue {
                name: "random.levelup".to_string(),
                volume: 0.4,
                pitch: 1.0,
            },
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_item: "minecraft:stick".to_string(),
            range: 2.0,
            notify_no_recipient: false,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            first_item_reward: 25,
            milestones: default_milestones(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20,
            startup_delay_ticks: 20,
            display_interval_ticks: 20,
            transfer_interval_ticks: 20,
            discovery_interval_ticks: 20,
            milestone_interval_ticks: 20,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

//! `frontier.ron` loading and mapping onto the engine's settings.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use frontier_engine::{BackoffSettings, EngineConfig, PartitionMode, StoreSettings};
use serde::Deserialize;

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "frontier.ron";
pub const API_KEY_ENV: &str = "FRONTIER_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub base_url: String,
    pub api_key: String,
    pub auth_cache_dir: PathBuf,
    pub workers: usize,
    pub queue_capacity: usize,
    pub partition_mode: PartitionMode,
    pub backoff_floor: u32,
    pub backoff_ceiling: u32,
    pub backoff_unit_ms: u64,
    pub cooldown_secs: u64,
    pub restart_delay_secs: u64,
    pub stats_interval_secs: u64,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            base_url: StoreSettings::default().base_url,
            api_key: String::new(),
            auth_cache_dir: PathBuf::from("."),
            workers: engine.workers,
            queue_capacity: engine.queue_capacity,
            partition_mode: engine.partition_mode,
            backoff_floor: engine.backoff.floor,
            backoff_ceiling: engine.backoff.ceiling,
            backoff_unit_ms: 1000,
            cooldown_secs: engine.cooldown.as_secs(),
            restart_delay_secs: 1,
            stats_interval_secs: 30,
            log: LogDestination::Terminal,
        }
    }
}

impl AppConfig {
    /// Loads `explicit` if given, otherwise `frontier.ron` when present,
    /// otherwise the defaults. `FRONTIER_API_KEY` replaces the file's key.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };
        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_key = key.trim().to_string();
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("api_key is empty; set it in the config or via {API_KEY_ENV}");
        }
        if self.backoff_floor == 0 {
            bail!("backoff_floor must be at least 1");
        }
        if self.backoff_ceiling < self.backoff_floor {
            bail!(
                "backoff_ceiling {} is below backoff_floor {}",
                self.backoff_ceiling,
                self.backoff_floor
            );
        }
        if self.backoff_unit_ms == 0 {
            bail!("backoff_unit_ms must be positive");
        }
        if self.stats_interval_secs == 0 {
            bail!("stats_interval_secs must be positive");
        }
        self.engine_config()
            .validate()
            .context("invalid engine settings")?;
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        let unit = Duration::from_millis(self.backoff_unit_ms);
        EngineConfig {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            partition_mode: self.partition_mode,
            backoff: BackoffSettings {
                floor: self.backoff_floor,
                ceiling: self.backoff_ceiling,
                unit,
            },
            cooldown: Duration::from_secs(self.cooldown_secs),
            full_queue_pause: unit,
            ..EngineConfig::default()
        }
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            base_url: self.base_url.clone(),
            ..StoreSettings::default()
        }
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }
}

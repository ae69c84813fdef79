//! fastprov.toml configuration parser.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::system::ProvisioningSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastProvConfig {
    #[serde(default)]
    pub randomize_pool_order: bool,
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pools: Vec<PoolConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub demand: Vec<DemandConfig>,
}

/// A simulated backend pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default)]
    pub serve_unlabeled: bool,
    pub max_slots: u32,
    #[serde(default = "default_launch_delay_ms")]
    pub launch_delay_ms: u64,
}

/// Work to enqueue at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandConfig {
    /// Label expression; omit for unlabeled work.
    pub label: Option<String>,
    pub count: u32,
}

fn default_tick_interval_secs() -> u64 {
    10
}

fn default_launch_delay_ms() -> u64 {
    2_000
}

impl Default for FastProvConfig {
    fn default() -> Self {
        Self {
            randomize_pool_order: false,
            tick_interval_secs: default_tick_interval_secs(),
            pools: Vec::new(),
            demand: Vec::new(),
        }
    }
}

impl FastProvConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: FastProvConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_secs must be at least 1".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for pool in &self.pools {
            if pool.name.trim().is_empty() {
                return Err(ConfigError::Invalid("pool name must not be empty".to_string()));
            }
            if !seen.insert(pool.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate pool name: {}",
                    pool.name
                )));
            }
        }
        Ok(())
    }
}

impl ProvisioningSettings for FastProvConfig {
    fn randomize_pool_order(&self) -> bool {
        self.randomize_pool_order
    }
}

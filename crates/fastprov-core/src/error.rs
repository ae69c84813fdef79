//! Error types shared across fastprov crates.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for backend pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Faults raised by a backend pool.
///
/// A pool that grants fewer slots than requested is *not* faulting; these
/// variants cover the cases where the pool could not answer at all.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool {pool} is unavailable: {reason}")]
    Unavailable { pool: String, reason: String },

    #[error("pool {pool} backend error: {message}")]
    Backend { pool: String, message: String },

    #[error("pool {pool} panicked: {message}")]
    Panicked { pool: String, message: String },
}

impl PoolError {
    /// Name of the pool that raised the fault.
    pub fn pool(&self) -> &str {
        match self {
            PoolError::Unavailable { pool, .. }
            | PoolError::Backend { pool, .. }
            | PoolError::Panicked { pool, .. } => pool,
        }
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_names_the_faulting_pool() {
        let faults = [
            PoolError::Unavailable {
                pool: "east".to_string(),
                reason: "quota".to_string(),
            },
            PoolError::Backend {
                pool: "east".to_string(),
                message: "timeout".to_string(),
            },
            PoolError::Panicked {
                pool: "east".to_string(),
                message: "index out of bounds".to_string(),
            },
        ];
        for fault in &faults {
            assert_eq!(fault.pool(), "east");
        }
        assert_eq!(
            faults[2].to_string(),
            "pool east panicked: index out of bounds"
        );
    }
}

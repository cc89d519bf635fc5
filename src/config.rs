use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable naming the SQLite database file
pub const DATABASE_ENV: &str = "ROSTER_DATABASE";
/// Environment variable overriding the connection pool size
pub const POOL_SIZE_ENV: &str = "ROSTER_POOL_SIZE";

const DEFAULT_DATABASE_PATH: &str = "data/roster.db";
const DEFAULT_POOL_SIZE: u32 = 4;

/// Where the database lives and how many pooled connections to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Reads the configuration from `ROSTER_DATABASE` and `ROSTER_POOL_SIZE`,
    /// falling back to defaults for unset variables
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var(DATABASE_ENV) {
            Ok(path) if !path.is_empty() => Self::new(path),
            _ => Self::default(),
        };

        if let Ok(size) = env::var(POOL_SIZE_ENV) {
            config.pool_size = size
                .parse()
                .with_context(|| format!("{} must be a positive integer, got {:?}", POOL_SIZE_ENV, size))?;
        }
        if config.pool_size == 0 {
            anyhow::bail!("{} must be at least 1", POOL_SIZE_ENV);
        }

        Ok(config)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DatabaseConfig::default();
        assert_eq!(config.path, PathBuf::from("data/roster.db"));
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn test_config_with_path() {
        let config = DatabaseConfig::new("/tmp/company.db");
        assert_eq!(config.path, PathBuf::from("/tmp/company.db"));
    }
}

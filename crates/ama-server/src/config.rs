use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use ama::store::{SqliteStore, StoreError};

use crate::error::ConfigError;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_DATABASE: &str = "ama.db";

/// Value of `AMA_DATABASE` selecting a throwaway in-memory database.
pub const MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database: DatabaseLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl FromStr for DatabaseLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("database path is empty".to_string()),
            MEMORY_DATABASE => Ok(DatabaseLocation::Memory),
            path => Ok(DatabaseLocation::File(PathBuf::from(path))),
        }
    }
}

impl DatabaseLocation {
    pub fn open(&self) -> Result<SqliteStore, StoreError> {
        match self {
            DatabaseLocation::Memory => SqliteStore::open_memory(),
            DatabaseLocation::File(path) => SqliteStore::open(path),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_address: try_load(&lookup, "AMA_BIND", DEFAULT_BIND)?,
            database: try_load(&lookup, "AMA_DATABASE", DEFAULT_DATABASE)?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }
    })
}

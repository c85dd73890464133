use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Fill an empty database with demo courses on startup.
    pub seed_demo_data: bool,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

impl Config {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = parse_or(&lookup, "SERVER_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(&lookup, "SERVER_PORT", 3000u16)?;
        let url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://courses.db".to_string());
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?;
        let seed_demo_data = parse_or(&lookup, "SEED_DEMO_DATA", false)?;

        if max_connections == 0 {
            return Err(AppError::Configuration(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            seed_demo_data,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::Configuration(format!("Failed to parse {}: {}", key, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.database.url, "sqlite://courses.db");
        assert_eq!(config.database.max_connections, 5);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = config_from(&[
            ("SERVER_HOST", "0.0.0.0"),
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
            ("SEED_DEMO_DATA", "true"),
        ])
        .unwrap();
        assert_eq!(config.server.addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 2);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn malformed_values_are_configuration_errors() {
        let err = config_from(&[("SERVER_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, AppError::Configuration(msg) if msg.contains("SERVER_PORT")));

        let err = config_from(&[("DATABASE_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}

//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                     | Default        |
//! |------------------------------|----------------|
//! | `GROCERY_BIND_ADDR`          | `0.0.0.0`      |
//! | `GROCERY_PORT`               | `5000`         |
//! | `GROCERY_DATABASE_PATH`      | `./grocery.db` |
//! | `GROCERY_DB_MAX_CONNECTIONS` | `5`            |
//! | `GROCERY_BILL_NUMBER_DATE`   | `bill-date`    |
//! | `GROCERY_CORS_ORIGIN`        | any origin     |

use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::http::HeaderValue;
use grocery_core::BillNumberDate;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address to listen on
    pub bind_addr: IpAddr,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// Which date decides a bill's month prefix
    pub bill_number_date: BillNumberDate,

    /// Allowed browser origin; `None` allows any
    pub cors_origin: Option<HeaderValue>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            database_path: PathBuf::from("./grocery.db"),
            max_connections: 5,
            bill_number_date: BillNumberDate::BillDate,
            cors_origin: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = env::vars()
            .filter(|(key, _)| key.starts_with("GROCERY_"))
            .collect();
        Self::from_vars(&vars)
    }

    /// Builds the configuration from a variable map (the environment in
    /// production, a literal map in tests).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let config = ApiConfig {
            bind_addr: match get("GROCERY_BIND_ADDR") {
                Some(v) => v
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("GROCERY_BIND_ADDR".to_string()))?,
                None => defaults.bind_addr,
            },

            port: match get("GROCERY_PORT") {
                Some(v) => v
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("GROCERY_PORT".to_string()))?,
                None => defaults.port,
            },

            database_path: get("GROCERY_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: match get("GROCERY_DB_MAX_CONNECTIONS") {
                Some(v) => v
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("GROCERY_DB_MAX_CONNECTIONS".to_string()))?,
                None => defaults.max_connections,
            },

            bill_number_date: match get("GROCERY_BILL_NUMBER_DATE") {
                Some(v) => v.parse().map_err(|reason| ConfigError::InvalidPolicy {
                    key: "GROCERY_BILL_NUMBER_DATE".to_string(),
                    reason,
                })?,
                None => defaults.bill_number_date,
            },

            cors_origin: match get("GROCERY_CORS_ORIGIN") {
                Some(v) => Some(
                    HeaderValue::from_str(v)
                        .map_err(|_| ConfigError::InvalidValue("GROCERY_CORS_ORIGIN".to_string()))?,
                ),
                None => None,
            },
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "GROCERY_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidPolicy { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert_eq!(config.database_path, PathBuf::from("./grocery.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.bill_number_date, BillNumberDate::BillDate);
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_vars(&vars(&[
            ("GROCERY_BIND_ADDR", "127.0.0.1"),
            ("GROCERY_PORT", "8080"),
            ("GROCERY_DATABASE_PATH", "/var/lib/grocery/pos.db"),
            ("GROCERY_DB_MAX_CONNECTIONS", "8"),
            ("GROCERY_BILL_NUMBER_DATE", "issue-time"),
            ("GROCERY_CORS_ORIGIN", "http://localhost:5173"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/grocery/pos.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.bill_number_date, BillNumberDate::IssueTime);
        assert_eq!(
            config.cors_origin.as_ref().and_then(|v| v.to_str().ok()),
            Some("http://localhost:5173")
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ApiConfig::from_vars(&vars(&[("GROCERY_PORT", "http")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            ApiConfig::from_vars(&vars(&[("GROCERY_DB_MAX_CONNECTIONS", "0")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            ApiConfig::from_vars(&vars(&[("GROCERY_BILL_NUMBER_DATE", "yesterday")])),
            Err(ConfigError::InvalidPolicy { .. })
        ));
        assert!(matches!(
            ApiConfig::from_vars(&vars(&[("GROCERY_CORS_ORIGIN", "http://ti\nll")])),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}

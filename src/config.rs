//! Runtime configuration
//!
//! Everything is read from `FOODGRAM_*` environment variables with local defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Default number of recipes per page in listings
pub const DEFAULT_PAGE_SIZE: i64 = 6;

/// Upper bound for a requested page size
pub const MAX_PAGE_SIZE: i64 = 100;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {var} '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings shared by the binaries
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub page_size: i64,
}

impl Config {
    /// Build the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = std::env::var("FOODGRAM_BIND_ADDR").ok();
        let page_size = std::env::var("FOODGRAM_PAGE_SIZE").ok();
        Ok(Self {
            database_path: database_path(),
            bind_addr: parse_bind_addr(bind_addr.as_deref())?,
            page_size: parse_page_size(page_size.as_deref())?,
        })
    }
}

fn parse_bind_addr(raw: Option<&str>) -> Result<SocketAddr, ConfigError> {
    let raw = raw.unwrap_or(DEFAULT_BIND_ADDR);
    raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
        var: "FOODGRAM_BIND_ADDR",
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_page_size(raw: Option<&str>) -> Result<i64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PAGE_SIZE);
    };
    let size = raw
        .parse::<i64>()
        .map_err(|e| ConfigError::Invalid {
            var: "FOODGRAM_PAGE_SIZE",
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
    Ok(size.clamp(1, MAX_PAGE_SIZE))
}

/// Project `data/` directory, found relative to the running executable
pub fn data_dir() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path
}

/// Database path from `FOODGRAM_DATABASE_PATH` or `data/foodgram.db`
pub fn database_path() -> PathBuf {
    std::env::var("FOODGRAM_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("foodgram.db"))
}

/// Ingredient fixture path for the loader
pub fn ingredients_path() -> PathBuf {
    std::env::var("FOODGRAM_INGREDIENTS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("ingredients.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr_parsing() {
        assert_eq!(parse_bind_addr(None).unwrap().to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(parse_bind_addr(Some("0.0.0.0:9000")).unwrap().port(), 9000);

        let err = parse_bind_addr(Some("localhost")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "FOODGRAM_BIND_ADDR", .. }));
    }

    #[test]
    fn test_page_size_parsing() {
        assert_eq!(parse_page_size(None).unwrap(), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("12")).unwrap(), 12);
        assert_eq!(parse_page_size(Some("0")).unwrap(), 1);
        assert_eq!(parse_page_size(Some("5000")).unwrap(), MAX_PAGE_SIZE);
        assert!(matches!(
            parse_page_size(Some("six")),
            Err(ConfigError::Invalid { var: "FOODGRAM_PAGE_SIZE", .. })
        ));
    }
}

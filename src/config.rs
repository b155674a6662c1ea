use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?} ({reason})")]
    Invalid { name: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base = lookup("GENERATION_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Url::parse(&api_base).map_err(|e| ConfigError::Invalid {
            name: "GENERATION_API_BASE",
            value: api_base.clone(),
            reason: e.to_string(),
        })?;

        let host = match lookup("HOST") {
            Some(v) => v.parse::<IpAddr>().map_err(|e| ConfigError::Invalid {
                name: "HOST",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let port = match lookup("PORT") {
            Some(v) => v.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self { api_base, addr: SocketAddr::new(host, port) })
    }
}

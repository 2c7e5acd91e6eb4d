use crate::error::{ProxyError, Result};
use std::env;

const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub yahoo_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ProxyError::Config("Invalid PORT".to_string()))?;

        // Overridable so tests can point the proxy at a stub server
        let yahoo_base_url = env::var("YAHOO_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_YAHOO_BASE_URL.to_string());

        Ok(Self {
            port,
            yahoo_base_url,
        })
    }
}

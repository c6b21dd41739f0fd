use std::{env, str::FromStr};

use anyhow::anyhow;

/// What confirmation does when a line asks for more units than are in stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StockPolicy {
    /// Abort the confirmation; nothing is deducted.
    #[default]
    Reject,
    /// Deduct anyway and let the counter go negative as a backorder signal.
    Backorder,
}

impl FromStr for StockPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(StockPolicy::Reject),
            "backorder" => Ok(StockPolicy::Backorder),
            other => Err(anyhow!("unknown STOCK_POLICY `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub stock_policy: StockPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(10);
        let stock_policy = match env::var("STOCK_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => StockPolicy::default(),
        };
        Ok(Self {
            port,
            database_url,
            host,
            max_connections,
            stock_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_policy_parses_case_insensitively() {
        assert_eq!("reject".parse::<StockPolicy>().unwrap(), StockPolicy::Reject);
        assert_eq!(" Backorder ".parse::<StockPolicy>().unwrap(), StockPolicy::Backorder);
        assert!("clamp".parse::<StockPolicy>().is_err());
    }
}

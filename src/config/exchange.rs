use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    Kucoin,
    Hyperliquid,
}

impl ExchangeKind {
    pub const ALL: [ExchangeKind; 2] = [ExchangeKind::Kucoin, ExchangeKind::Hyperliquid];

    /// Lowercase key used in config values and per-exchange file names
    pub fn key(&self) -> &'static str {
        match self {
            ExchangeKind::Kucoin => "kucoin",
            ExchangeKind::Hyperliquid => "hyperliquid",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExchangeKind::Kucoin => "KuCoin",
            ExchangeKind::Hyperliquid => "Hyperliquid",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ExchangeKind::Kucoin => "https://api-futures.kucoin.com",
            ExchangeKind::Hyperliquid => "https://api.hyperliquid.xyz",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub kind: ExchangeKind,
    /// Falls back to the venue's public endpoint when empty
    pub base_url: Option<String>,
    pub request_timeout_ms: u64,
    /// Overrides the adapter's advertised rate limit
    pub rate_limit_ms: Option<u64>,
    pub order_book_depth: usize,
    /// Quote asset tried once for unified symbols the venue does not list
    pub alternate_quote: Option<String>,
}

impl ExchangeConfig {
    pub fn base_url(&self) -> String {
        self.base_url.clone()
            .unwrap_or_else(|| self.kind.default_base_url().to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl FromStr for ExchangeKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        ExchangeKind::ALL.into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| Error::ConfigError(format!("unknown exchange `{}`", value)))
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            kind: ExchangeKind::Kucoin,
            base_url: None,
            request_timeout_ms: 30_000,
            rate_limit_ms: None,
            order_book_depth: 20,
            alternate_quote: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_from_its_key() {
        assert_eq!("Hyperliquid".parse::<ExchangeKind>().unwrap(), ExchangeKind::Hyperliquid);
        assert_eq!(" kucoin ".parse::<ExchangeKind>().unwrap(), ExchangeKind::Kucoin);
        assert!(matches!("binance".parse::<ExchangeKind>(), Err(Error::ConfigError(_))));
    }
}

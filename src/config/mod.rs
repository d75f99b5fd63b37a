use std::env;
use std::time::Duration;

use crate::polymarket::data_client::DEFAULT_TRADE_LIMIT;
use crate::polymarket::transport::{DATA_API_BASE, DEFAULT_REQUEST_TIMEOUT};
use crate::services::MonitorConfig;

const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub target_address: String,
    pub poll_interval_ms: u64,
    pub enable_websocket: bool,

    // Data API
    pub data_api_base_url: String,
    pub data_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub trade_fetch_limit: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target_address = lookup("TARGET_ADDRESS")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("TARGET_ADDRESS must be set"))?;

        Ok(Self {
            target_address,
            poll_interval_ms: lookup("POLL_INTERVAL_MS")
                .unwrap_or_else(|| DEFAULT_POLL_INTERVAL_MS.to_string())
                .parse()?,
            enable_websocket: lookup("ENABLE_WEBSOCKET")
                .unwrap_or_else(|| "false".into())
                .parse()
                .unwrap_or(false),

            data_api_base_url: lookup("DATA_API_BASE_URL").unwrap_or_else(|| DATA_API_BASE.into()),
            data_api_key: lookup("DATA_API_KEY").filter(|k| !k.trim().is_empty()),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| DEFAULT_REQUEST_TIMEOUT.as_secs().to_string())
                .parse()?,
            trade_fetch_limit: lookup("TRADE_FETCH_LIMIT")
                .unwrap_or_else(|| DEFAULT_TRADE_LIMIT.to_string())
                .parse()?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            target_address: self.target_address.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            enable_websocket: self.enable_websocket,
            trade_limit: self.trade_fetch_limit,
        }
    }
}

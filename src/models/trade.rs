use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Market, Side};

/// A completed trade. `id` is stable across polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub market: Market,
    pub outcome: String,
    pub side: Side,
    pub quantity: String,
    pub price: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    pub user_address: String,
}

/// Trades for one user, newest first as returned by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTrades {
    pub user_address: String,
    pub trades: Vec<Trade>,
    pub total_trades: usize,
    pub timestamp: DateTime<Utc>,
}

impl UserTrades {
    pub fn empty(user_address: &str) -> Self {
        Self {
            user_address: user_address.to_string(),
            trades: Vec::new(),
            total_trades: 0,
            timestamp: Utc::now(),
        }
    }
}

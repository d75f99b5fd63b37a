use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Position, Trade, UserPositions, UserTrades};

pub const RECENT_TRADES_LIMIT: usize = 10;

/// Snapshot delivered to observers and compared across polling cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingStatus {
    pub user_address: String,
    pub total_positions: usize,
    pub total_value: String,
    /// Most recent first, at most [`RECENT_TRADES_LIMIT`].
    pub recent_trades: Vec<Trade>,
    pub open_positions: Vec<Position>,
    pub last_updated: DateTime<Utc>,
}

impl TradingStatus {
    pub fn from_parts(user_address: &str, positions: UserPositions, trades: UserTrades) -> Self {
        let mut recent_trades = trades.trades;
        recent_trades.truncate(RECENT_TRADES_LIMIT);

        Self {
            user_address: user_address.to_string(),
            total_positions: positions.positions.len(),
            total_value: positions.total_value,
            recent_trades,
            open_positions: positions.positions,
            last_updated: Utc::now(),
        }
    }

    pub fn trade_ids(&self) -> impl Iterator<Item = &str> {
        self.recent_trades.iter().map(|t| t.id.as_str())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Market;

/// One open position at fetch time. Amounts are decimal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub market: Market,
    pub outcome: String,
    pub quantity: String,
    pub price: String,
    /// Source value, or quantity × price when the source omits it.
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPositions {
    pub user_address: String,
    pub positions: Vec<Position>,
    pub total_value: String,
    pub timestamp: DateTime<Utc>,
}

impl UserPositions {
    /// Result for an address with no positions, or a failed fetch inside a cycle.
    pub fn empty(user_address: &str) -> Self {
        Self {
            user_address: user_address.to_string(),
            positions: Vec::new(),
            total_value: "0".into(),
            timestamp: Utc::now(),
        }
    }
}

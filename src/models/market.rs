use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical market record, built fresh from each response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: String,
    pub question: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub liquidity: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<Decimal>,
    pub active: bool,
}

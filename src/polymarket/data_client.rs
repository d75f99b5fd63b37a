use std::sync::Arc;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use metrics::counter;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Market, UserPositions, UserTrades};
use crate::normalize::fields::lookup;
use crate::normalize::{normalize_market, normalize_positions, normalize_trades, total_value};

use super::transport::{Transport, TransportError};

pub const DEFAULT_TRADE_LIMIT: u32 = 50;
const MAX_CONCURRENT_MARKET_FETCHES: usize = 8;
const LIST_WRAPPER_KEYS: &[&str] = &["data", "positions", "trades", "results"];

/// One way of addressing a list endpoint.
#[derive(Debug, Clone, Copy)]
struct RequestShape<'a> {
    path: &'a str,
    query: &'a [(&'a str, &'a str)],
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to {operation}: {source}")]
    Request {
        operation: String,
        #[source]
        source: TransportError,
    },
}

impl ClientError {
    fn request(operation: impl Into<String>, source: TransportError) -> Self {
        ClientError::Request {
            operation: operation.into(),
            source,
        }
    }

    pub fn operation(&self) -> &str {
        match self {
            ClientError::Request { operation, .. } => operation,
        }
    }
}

/// Read-only client for a single account's positions, trades and markets.
#[derive(Clone)]
pub struct DataClient {
    transport: Arc<dyn Transport>,
}

impl DataClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch open positions for `address`.
    ///
    /// Tries `/users/{address}/positions`, then `/positions?user=`. Not-found
    /// from both is an empty result; any other failure is returned.
    pub async fn get_user_positions(&self, address: &str) -> Result<UserPositions, ClientError> {
        let primary_path = format!("/users/{address}/positions");
        let primary = RequestShape {
            path: &primary_path,
            query: &[("active", "true")],
        };
        let fallback = RequestShape {
            path: "/positions",
            query: &[("user", address), ("active", "true")],
        };
        let items = self
            .fetch_list_with_fallback(primary, fallback)
            .await
            .map_err(|e| ClientError::request(format!("fetch positions for {address}"), e))?;

        let Some(items) = items else {
            tracing::debug!(address = %address, "No positions found");
            return Ok(UserPositions::empty(address));
        };

        let positions = normalize_positions(&items);
        let total_value = total_value(&positions);

        Ok(UserPositions {
            user_address: address.to_string(),
            positions,
            total_value,
            timestamp: Utc::now(),
        })
    }

    /// Fetch the most recent trades for `address`, newest first.
    pub async fn get_user_trades(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<UserTrades, ClientError> {
        let primary_path = format!("/users/{address}/trades");
        let limit = limit.to_string();
        let primary = RequestShape {
            path: &primary_path,
            query: &[("limit", limit.as_str()), ("sort", "desc")],
        };
        let fallback = RequestShape {
            path: "/trades",
            query: &[("user", address), ("limit", limit.as_str()), ("sort", "desc")],
        };
        let items = self
            .fetch_list_with_fallback(primary, fallback)
            .await
            .map_err(|e| ClientError::request(format!("fetch trades for {address}"), e))?;

        let Some(items) = items else {
            tracing::debug!(address = %address, "No trades found");
            return Ok(UserTrades::empty(address));
        };

        let trades = normalize_trades(&items, address);

        Ok(UserTrades {
            user_address: address.to_string(),
            total_trades: trades.len(),
            trades,
            timestamp: Utc::now(),
        })
    }

    /// Fetch a single market. A missing market is an error here.
    pub async fn get_market(&self, market_id: &str) -> Result<Market, ClientError> {
        let path = format!("/markets/{market_id}");
        let body = self
            .transport
            .get_json(&path, &[])
            .await
            .map_err(|e| ClientError::request(format!("fetch market {market_id}"), e))?;

        Ok(normalize_market(&body))
    }

    /// Fetch several markets concurrently, keeping input order.
    /// Markets that fail to load are left out.
    pub async fn get_markets(&self, market_ids: &[String]) -> Vec<Market> {
        stream::iter(market_ids)
            .map(|id| async move {
                match self.get_market(id).await {
                    Ok(market) => Some(market),
                    Err(e) => {
                        tracing::debug!(error = %e, market_id = %id, "Dropping market from batch");
                        None
                    }
                }
            })
            .buffered(MAX_CONCURRENT_MARKET_FETCHES)
            .filter_map(|market| async move { market })
            .collect()
            .await
    }

    /// Run the primary request shape, then the fallback. `Ok(None)` means
    /// both reported not-found.
    async fn fetch_list_with_fallback(
        &self,
        primary: RequestShape<'_>,
        fallback: RequestShape<'_>,
    ) -> Result<Option<Vec<Value>>, TransportError> {
        let first_err = match self.fetch_list(primary).await {
            Ok(items) => return Ok(Some(items)),
            Err(e) => e,
        };

        tracing::debug!(
            error = %first_err,
            path = %primary.path,
            fallback = %fallback.path,
            "Primary request shape failed, trying fallback"
        );
        counter!("polywatch_fetch_fallbacks_total").increment(1);

        match self.fetch_list(fallback).await {
            Ok(items) => Ok(Some(items)),
            Err(second_err) => match (first_err.is_not_found(), second_err.is_not_found()) {
                (true, true) => Ok(None),
                (true, false) => Err(second_err),
                _ => Err(first_err),
            },
        }
    }

    async fn fetch_list(&self, shape: RequestShape<'_>) -> Result<Vec<Value>, TransportError> {
        let body = self.transport.get_json(shape.path, shape.query).await?;
        extract_items(body)
            .ok_or_else(|| TransportError::Unexpected(format!("{} did not return a list", shape.path)))
    }
}

/// Accept a bare array or an object wrapping one under a known key.
fn extract_items(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(_) => match lookup(&body, LIST_WRAPPER_KEYS)? {
            Value::Array(items) => Some(items.clone()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_is_accepted() {
        let items = extract_items(json!([{ "id": 1 }, { "id": 2 }])).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn wrapped_arrays_are_accepted() {
        assert_eq!(extract_items(json!({ "data": [{}] })).unwrap().len(), 1);
        assert_eq!(extract_items(json!({ "positions": [] })).unwrap().len(), 0);
        assert_eq!(extract_items(json!({ "trades": [{}, {}] })).unwrap().len(), 2);
    }

    #[test]
    fn other_shapes_are_rejected() {
        assert!(extract_items(json!({ "error": "rate limited" })).is_none());
        assert!(extract_items(json!({ "data": "nope" })).is_none());
        assert!(extract_items(json!("text")).is_none());
    }
}

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::models::TradingStatus;
use crate::normalize::fields::decimal_or_zero;

/// Relative totalValue move (1%) that counts as significant.
const VALUE_CHANGE_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// Denominator floor for the relative-change ratio.
const MIN_BASE_VALUE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Why a snapshot was judged significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    FirstSnapshot,
    NewTrades,
    PositionCount,
    ValueMoved,
}

/// Decides whether a snapshot differs enough from the last delivered one.
/// Keeps the trade ids it last saw between calls.
#[derive(Debug, Default, Clone)]
pub struct ChangeDetector {
    seen_trade_ids: HashSet<String>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seen_trades<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seen_trade_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn seen_trade_ids(&self) -> &HashSet<String> {
        &self.seen_trade_ids
    }

    pub fn has_significant_change(
        &mut self,
        previous: Option<&TradingStatus>,
        current: &TradingStatus,
    ) -> bool {
        self.evaluate(previous, current).is_some()
    }

    /// Rules in order, first match wins. The retained trade-id set is
    /// replaced on the first snapshot and whenever new trades appear.
    pub fn evaluate(
        &mut self,
        previous: Option<&TradingStatus>,
        current: &TradingStatus,
    ) -> Option<ChangeReason> {
        let Some(previous) = previous else {
            self.remember_trades(current);
            return Some(ChangeReason::FirstSnapshot);
        };

        if current
            .trade_ids()
            .any(|id| !self.seen_trade_ids.contains(id))
        {
            self.remember_trades(current);
            return Some(ChangeReason::NewTrades);
        }

        if current.total_positions != previous.total_positions {
            return Some(ChangeReason::PositionCount);
        }

        let prev_value = decimal_or_zero(&previous.total_value);
        let curr_value = decimal_or_zero(&current.total_value);
        let base = prev_value.max(MIN_BASE_VALUE);
        // Overflow means the move is far past the threshold.
        let relative = curr_value
            .checked_sub(prev_value)
            .and_then(|delta| delta.abs().checked_div(base));
        match relative {
            Some(relative) if relative <= VALUE_CHANGE_THRESHOLD => None,
            _ => Some(ChangeReason::ValueMoved),
        }
    }

    fn remember_trades(&mut self, current: &TradingStatus) {
        self.seen_trade_ids = current.trade_ids().map(str::to_string).collect();
    }
}

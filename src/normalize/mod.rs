//! Shape-tolerant mapping of upstream payloads onto the canonical models.
//!
//! Each logical field has an ordered list of candidate keys. The first key
//! present wins and a typed default covers the rest, so nothing here fails.

pub mod fields;
pub mod market;
pub mod records;

pub use market::{embedded_market, normalize_market};
pub use records::{
    normalize_position, normalize_positions, normalize_trade, normalize_trades, total_value,
};

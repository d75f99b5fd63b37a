pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod polymarket;
pub mod services;

pub use errors::MonitorError;
pub use models::{Market, Position, Side, Trade, TradingStatus, UserPositions, UserTrades};
pub use polymarket::{DataClient, HttpTransport, Transport};
pub use services::{Monitor, MonitorConfig, StatusObserver};

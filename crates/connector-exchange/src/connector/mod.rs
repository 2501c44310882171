//! 거래소 커넥터 구현.

pub mod binance;
pub mod config;
mod orders;
mod wire;

pub use binance::BinanceConnector;
pub use config::{BinanceConfig, Endpoints};

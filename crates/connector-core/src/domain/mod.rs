//! 커넥터 도메인 모델.

pub mod account;
pub mod instrument;
pub mod market_data;
pub mod order;

pub use account::*;
pub use instrument::*;
pub use market_data::*;
pub use order::*;

//! # Connector Exchange
//!
//! Binance 선물/현물 커넥터.
//!
//! # 구성 요소
//!
//! - [`RequestSigner`] - HMAC-SHA256 요청 서명
//! - [`RestClient`] - 서명/에러 처리를 담당하는 REST 클라이언트
//! - [`InstrumentRegistry`] - 종목별 거래 규칙
//! - [`PriceCache`] - REST와 스트림이 함께 쓰는 최우선 호가 캐시
//! - [`SubscriptionRegistry`] - 채널별 구독 상태와 재연결 replay
//! - [`StreamManager`] - 재연결 루프를 도는 WebSocket 연결 관리자
//! - [`StrategyDispatcher`] - 스트림 이벤트를 전략으로 전달하고 PnL을 갱신
//! - [`BinanceConnector`] - 위 구성 요소를 묶은 커넥터 (주문 연산 포함)
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use connector_exchange::{BinanceConfig, BinanceConnector, Channel, MemoryLog};
//! use std::sync::Arc;
//!
//! let settings = connector_core::ConnectorSettings::load_default()?;
//! let config = BinanceConfig::from_env(&settings.exchange).expect("credentials");
//! let connector = BinanceConnector::connect(config, Arc::new(MemoryLog::new())).await?;
//!
//! connector.subscribe_channel(&["ETHUSDT"], Channel::AggTrade);
//! ```

pub mod connector;
pub mod dispatch;
pub mod error;
pub mod instruments;
pub mod log_sink;
pub mod price_cache;
pub mod rest;
pub mod signer;
pub mod strategy;
pub mod subscription;
pub mod websocket;

pub use connector::{BinanceConfig, BinanceConnector, Endpoints};
pub use dispatch::StrategyDispatcher;
pub use error::{ExchangeError, ExchangeResult};
pub use instruments::InstrumentRegistry;
pub use log_sink::{LogEntry, LogSink, MemoryLog, TracingLog};
pub use price_cache::PriceCache;
pub use rest::{RestClient, Security};
pub use signer::{Params, RequestSigner};
pub use strategy::{
    PositionSide, SharedStrategy, Strategy, StrategyId, StrategyRegistry, TickOutcome, TradeRecord,
    TradeStatus,
};
pub use subscription::{Channel, SubscribeCommand, SubscriptionRegistry, MAX_INSTRUMENTS_PER_CALL};
pub use websocket::{ConnectionState, StreamConfig, StreamManager};

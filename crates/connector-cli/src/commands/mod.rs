//! CLI 명령어 구현 모듈.

pub mod account;
pub mod market;
pub mod stream;

use anyhow::{Context, Result};
use connector_core::{ConnectorSettings, Instrument, Venue};
use connector_exchange::{BinanceConfig, BinanceConnector, LogSink};
use std::sync::Arc;

/// 명령 공통 연결 옵션.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// 테스트넷 강제 사용
    pub testnet: bool,
    /// 현물 시장 사용 (기본은 선물)
    pub spot: bool,
}

/// 설정과 환경 변수의 자격증명으로 커넥터를 생성합니다.
pub async fn connect(
    settings: &ConnectorSettings,
    options: &ConnectOptions,
    log: Arc<dyn LogSink>,
) -> Result<BinanceConnector> {
    let mut exchange = settings.exchange.clone();
    exchange.testnet |= options.testnet;
    if options.spot {
        exchange.futures = false;
    }

    let config = BinanceConfig::from_env(&exchange).with_context(|| {
        if exchange.testnet {
            "BINANCE_TESTNET_API_KEY / BINANCE_TESTNET_API_SECRET not set"
        } else {
            "BINANCE_API_KEY / BINANCE_API_SECRET not set"
        }
    })?;

    let venue: Venue = config.venue;
    let connector = BinanceConnector::connect(config, log)
        .await
        .with_context(|| format!("Failed to connect to {}", venue))?;

    Ok(connector)
}

/// 심볼로 종목을 찾습니다. 대소문자를 구분하지 않습니다.
pub fn find_instrument(connector: &BinanceConnector, symbol: &str) -> Result<Instrument> {
    connector
        .instrument(&symbol.to_uppercase())
        .cloned()
        .with_context(|| format!("Unknown symbol on {}: {}", connector.venue(), symbol))
}

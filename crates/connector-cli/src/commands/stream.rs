//! 실시간 시세 스트리밍 확인.
//!
//! 종목을 구독한 뒤 Ctrl-C를 받을 때까지 주기적으로 가격 캐시와 새 로그 항목을 출력합니다.

use anyhow::{Context, Result};
use connector_core::PriceQuote;
use connector_exchange::{BinanceConnector, Channel, MemoryLog};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// 스트리밍 명령 설정.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// 구독할 종목
    pub symbols: Vec<String>,
    /// 구독 채널
    pub channel: Channel,
    /// 출력 주기
    pub interval: Duration,
}

/// 구독 후 Ctrl-C까지 시세를 출력하고, 종료 시 커넥터를 정리합니다.
pub async fn run_stream(
    connector: &BinanceConnector,
    log: &MemoryLog,
    options: StreamOptions,
) -> Result<()> {
    let symbols: Vec<String> = options.symbols.iter().map(|s| s.to_uppercase()).collect();
    for symbol in &symbols {
        if connector.instrument(symbol).is_none() {
            warn!(symbol = %symbol, "Symbol not listed, subscribing anyway");
        }
    }

    if connector
        .subscribe_channel(symbols.as_slice(), options.channel)
        .is_none()
    {
        info!(channel = %options.channel, "Already subscribed to all requested symbols");
    }

    let mut ticker = tokio::time::interval(options.interval);
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Ctrl-C received, shutting down");
                break;
            }
            _ = ticker.tick() => {
                for entry in log.take_undisplayed() {
                    println!("[{}] {}", entry.logged_at.format("%H:%M:%S"), entry.message);
                }
                let line = format_quotes(&connector.prices(), &symbols);
                if !line.is_empty() {
                    println!("{} | {}", connector.connection_state(), line);
                }
            }
        }
    }

    connector.shutdown().await;
    Ok(())
}

/// 요청한 종목 순서대로 `SYMBOL bid/ask (spread)` 목록을 만듭니다. 시세가 없는 종목은 생략합니다.
fn format_quotes(prices: &HashMap<String, PriceQuote>, symbols: &[String]) -> String {
    symbols
        .iter()
        .filter_map(|s| {
            prices
                .get(s)
                .map(|q| format!("{} {}/{} ({})", s, q.bid, q.ask, q.spread()))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

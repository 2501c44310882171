//! 스트리밍 이벤트를 가격 캐시와 전략으로 전달하는 디스패치 브리지.
//!
//! 스트림 세션 태스크에서 호출됩니다.
//! - `bookTicker` → 가격 캐시 갱신 후 해당 심볼 전략들의 열린 거래 PnL 재계산
//! - `aggTrade` → 해당 심볼 전략마다 `parse_trade` 후 `check_trade`

use crate::error::ExchangeError;
use crate::price_cache::PriceCache;
use crate::strategy::{SharedStrategy, Strategy, StrategyRegistry};
use crate::websocket::messages::{parse_stream_message, AggTradeEvent, BookTickerEvent, StreamEvent};
use connector_core::QuoteSource;
use parking_lot::MutexGuard;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// 스트림 이벤트 디스패처.
#[derive(Debug, Clone)]
pub struct StrategyDispatcher {
    prices: Arc<PriceCache>,
    strategies: Arc<StrategyRegistry>,
}

impl StrategyDispatcher {
    pub fn new(prices: Arc<PriceCache>, strategies: Arc<StrategyRegistry>) -> Self {
        Self { prices, strategies }
    }

    /// 텍스트 프레임 하나를 처리합니다. 잘못된 메시지는 로그를 남기고 버립니다.
    pub fn handle_text(&self, text: &str) {
        match parse_stream_message(text) {
            Ok(StreamEvent::BookTicker(ev)) => self.on_book_ticker(&ev),
            Ok(StreamEvent::AggTrade(ev)) => self.on_agg_trade(&ev),
            Ok(StreamEvent::Control(value)) => {
                if value.get("error").is_some() {
                    warn!("Stream request rejected: {}", value);
                } else {
                    debug!("Stream control message: {}", value);
                }
            }
            Ok(StreamEvent::Ignored(event_type)) => {
                trace!(event_type = %event_type, "Ignoring stream event");
            }
            Err(e) => warn!("Dropping stream message: {} ({})", e, text),
        }
    }

    /// 최우선 호가 갱신.
    pub fn on_book_ticker(&self, ev: &BookTickerEvent) {
        let quote = self
            .prices
            .update(&ev.symbol, ev.bid, ev.ask, QuoteSource::Stream);

        for strategy in self.strategies.bindings_for(&ev.symbol) {
            let Some(mut guard) = lock_strategy(&strategy, &ev.symbol) else {
                continue;
            };
            for trade in guard.trades_mut() {
                trade.mark_to_market(&quote);
            }
        }
    }

    /// 체결 틱 전달.
    pub fn on_agg_trade(&self, ev: &AggTradeEvent) {
        for strategy in self.strategies.bindings_for(&ev.symbol) {
            let Some(mut guard) = lock_strategy(&strategy, &ev.symbol) else {
                continue;
            };
            let outcome = guard.parse_trade(ev.price, ev.quantity, ev.trade_time);
            guard.check_trade(outcome);
        }
    }
}

/// 전략 잠금을 기다리지 않고 시도합니다. 사용 중이면 이번 이벤트에서 건너뜁니다.
///
/// 스트림 세션 태스크를 막지 않기 위해 대기하지 않습니다.
fn lock_strategy<'a>(
    strategy: &'a SharedStrategy,
    symbol: &str,
) -> Option<MutexGuard<'a, dyn Strategy>> {
    let guard = strategy.try_lock();
    if guard.is_none() {
        let err = ExchangeError::State(format!("strategy for {} is busy", symbol));
        error!("Error while looping through strategies: {}", err);
    }
    guard
}

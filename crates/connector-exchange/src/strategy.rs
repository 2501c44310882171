//! 전략 콜백 계약 및 전략 바인딩 레지스트리.
//!
//! 커넥터는 전략의 신호 생성 로직을 알지 못합니다. 전략은 아래 두 콜백만 제공하면 됩니다:
//! - `parse_trade` - 체결 틱(가격, 수량, 타임스탬프)을 받아 캔들 갱신 결과를 반환
//! - `check_trade` - 그 결과를 받아 진입/청산 여부를 판단
//!
//! 각 전략은 정확히 하나의 심볼에 바인딩되며, 자신의 거래 기록을 소유합니다.
//! 커넥터가 쓰는 필드는 거래 기록의 PnL뿐입니다.

use connector_core::{Price, PriceQuote, Quantity};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// 체결 틱 처리 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOutcome {
    /// 현재 캔들이 갱신됨
    SameCandle,
    /// 새 캔들이 시작됨
    NewCandle,
    /// 틱 사이에 비어 있는 캔들이 채워짐
    MissingCandles,
}

/// 포지션 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

/// 거래 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// 전략이 소유하는 거래 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: PositionSide,
    /// 진입 가격 (체결 전이면 None)
    pub entry_price: Option<Price>,
    pub quantity: Quantity,
    pub status: TradeStatus,
    pnl: Decimal,
}

impl TradeRecord {
    pub fn new(side: PositionSide, entry_price: Option<Price>, quantity: Quantity) -> Self {
        Self {
            side,
            entry_price,
            quantity,
            status: TradeStatus::Open,
            pnl: Decimal::ZERO,
        }
    }

    /// 마지막으로 계산된 미실현 손익.
    pub fn pnl(&self) -> Decimal {
        self.pnl
    }

    /// 최우선 호가로 손익을 다시 계산합니다.
    ///
    /// 롱은 bid, 숏은 ask 기준입니다. 열린 거래이면서 진입 가격이 있을 때만 갱신하며,
    /// 갱신했으면 `true`를 반환합니다.
    pub(crate) fn mark_to_market(&mut self, quote: &PriceQuote) -> bool {
        let Some(entry) = self.entry_price else {
            return false;
        };
        if self.status != TradeStatus::Open {
            return false;
        }

        self.pnl = match self.side {
            PositionSide::Long => (quote.bid - entry) * self.quantity,
            PositionSide::Short => (entry - quote.ask) * self.quantity,
        };
        true
    }
}

/// 커넥터가 호출하는 전략 인터페이스.
pub trait Strategy: Send {
    /// 전략이 바인딩된 심볼.
    fn symbol(&self) -> &str;

    /// 체결 틱을 반영합니다.
    fn parse_trade(&mut self, price: Price, quantity: Quantity, timestamp: i64) -> TickOutcome;

    /// `parse_trade` 결과로 거래 여부를 판단합니다.
    fn check_trade(&mut self, outcome: TickOutcome);

    fn trades(&self) -> &[TradeRecord];

    fn trades_mut(&mut self) -> &mut [TradeRecord];
}

/// 레지스트리에 보관되는 전략 핸들.
pub type SharedStrategy = Arc<Mutex<dyn Strategy>>;

/// 전략 바인딩 ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StrategyId(u64);

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "strategy-{}", self.0)
    }
}

struct Binding {
    id: StrategyId,
    symbol: String,
    strategy: SharedStrategy,
}

/// 전략 바인딩 레지스트리.
///
/// 조회는 항상 핸들 목록의 스냅샷을 반환하므로, 디스패치 도중 등록/해제가 일어나도
/// 순회가 깨지지 않습니다.
#[derive(Default)]
pub struct StrategyRegistry {
    bindings: RwLock<Vec<Binding>>,
    next_id: AtomicU64,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 전략을 등록합니다. 등록 시점의 `symbol()`로 바인딩됩니다.
    ///
    /// 호출자는 구체 타입 핸들을 돌려받아 전략 상태에 계속 접근할 수 있습니다.
    pub fn register<S: Strategy + 'static>(&self, strategy: S) -> (StrategyId, Arc<Mutex<S>>) {
        let symbol = strategy.symbol().to_uppercase();
        let handle = Arc::new(Mutex::new(strategy));
        let shared: SharedStrategy = handle.clone();
        let id = StrategyId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);

        self.bindings.write().push(Binding {
            id,
            symbol: symbol.clone(),
            strategy: shared,
        });

        info!(%id, symbol = %symbol, "Strategy registered");
        (id, handle)
    }

    /// 전략 바인딩을 해제합니다.
    pub fn remove(&self, id: StrategyId) -> Option<SharedStrategy> {
        let mut bindings = self.bindings.write();
        let index = bindings.iter().position(|b| b.id == id)?;
        let binding = bindings.remove(index);
        debug!(%id, symbol = %binding.symbol, "Strategy removed");
        Some(binding.strategy)
    }

    /// 심볼에 바인딩된 전략 핸들의 스냅샷.
    pub fn bindings_for(&self, symbol: &str) -> Vec<SharedStrategy> {
        self.bindings
            .read()
            .iter()
            .filter(|b| b.symbol.eq_ignore_ascii_case(symbol))
            .map(|b| Arc::clone(&b.strategy))
            .collect()
    }

    /// 등록된 전략 ID와 심볼 목록.
    pub fn ids(&self) -> Vec<(StrategyId, String)> {
        self.bindings
            .read()
            .iter()
            .map(|b| (b.id, b.symbol.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("bindings", &self.ids())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use connector_core::QuoteSource;
    use rust_decimal_macros::dec;

    /// 틱을 기록만 하는 테스트용 전략.
    pub(crate) struct RecordingStrategy {
        pub symbol: String,
        pub ticks: Vec<(Price, Quantity, i64)>,
        pub checked: Vec<TickOutcome>,
        pub trades: Vec<TradeRecord>,
    }

    impl RecordingStrategy {
        pub fn new(symbol: &str) -> Self {
            Self {
                symbol: symbol.to_string(),
                ticks: Vec::new(),
                checked: Vec::new(),
                trades: Vec::new(),
            }
        }
    }

    impl Strategy for RecordingStrategy {
        fn symbol(&self) -> &str {
            &self.symbol
        }

        fn parse_trade(&mut self, price: Price, quantity: Quantity, timestamp: i64) -> TickOutcome {
            self.ticks.push((price, quantity, timestamp));
            if self.ticks.len() == 1 {
                TickOutcome::NewCandle
            } else {
                TickOutcome::SameCandle
            }
        }

        fn check_trade(&mut self, outcome: TickOutcome) {
            self.checked.push(outcome);
        }

        fn trades(&self) -> &[TradeRecord] {
            &self.trades
        }

        fn trades_mut(&mut self) -> &mut [TradeRecord] {
            &mut self.trades
        }
    }

    fn quote(bid: Decimal, ask: Decimal) -> PriceQuote {
        PriceQuote {
            bid,
            ask,
            version: 1,
            source: QuoteSource::Stream,
        }
    }

    #[test]
    fn test_long_and_short_pnl() {
        let q = quote(dec!(105), dec!(106));

        let mut long = TradeRecord::new(PositionSide::Long, Some(dec!(100)), dec!(2));
        assert!(long.mark_to_market(&q));
        assert_eq!(long.pnl(), dec!(10));

        let mut short = TradeRecord::new(PositionSide::Short, Some(dec!(110)), dec!(0.5));
        assert!(short.mark_to_market(&q));
        assert_eq!(short.pnl(), dec!(2));
    }

    #[test]
    fn test_pnl_skips_closed_or_unfilled() {
        let q = quote(dec!(105), dec!(106));

        let mut pending = TradeRecord::new(PositionSide::Long, None, dec!(1));
        assert!(!pending.mark_to_market(&q));
        assert_eq!(pending.pnl(), Decimal::ZERO);

        let mut closed = TradeRecord::new(PositionSide::Long, Some(dec!(100)), dec!(1));
        closed.status = TradeStatus::Closed;
        assert!(!closed.mark_to_market(&q));
        assert_eq!(closed.pnl(), Decimal::ZERO);
    }

    #[test]
    fn test_registry_binds_by_symbol() {
        let registry = StrategyRegistry::new();
        let (a, _) = registry.register(RecordingStrategy::new("BTCUSDT"));
        let (b, _) = registry.register(RecordingStrategy::new("btcusdt"));
        registry.register(RecordingStrategy::new("ETHUSDT"));

        assert_ne!(a, b);
        assert_eq!(registry.bindings_for("BTCUSDT").len(), 2);
        assert_eq!(registry.bindings_for("ETHUSDT").len(), 1);
        assert!(registry.bindings_for("XRPUSDT").is_empty());

        assert!(registry.remove(a).is_some());
        assert!(registry.remove(a).is_none());
        assert_eq!(registry.bindings_for("BTCUSDT").len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_snapshot_survives_removal() {
        let registry = StrategyRegistry::new();
        let (id, _) = registry.register(RecordingStrategy::new("BTCUSDT"));

        let snapshot = registry.bindings_for("BTCUSDT");
        registry.remove(id);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].lock().symbol(), "BTCUSDT");
    }
}

//! REST 응답 본문 타입.

use chrono::DateTime;
use connector_core::{Balance, Candle, Fill, OrderState, OrderStatus, Side, Timeframe};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// 주문 생성/취소/조회 응답 (선물, 현물 공통).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    order_id: i64,
    symbol: String,
    side: Side,
    status: OrderState,
    #[serde(default)]
    price: Decimal,
    #[serde(default)]
    orig_qty: Decimal,
    #[serde(default)]
    executed_qty: Decimal,
    /// 선물만 제공
    #[serde(default)]
    avg_price: Option<Decimal>,
    /// 현물만 제공
    #[serde(default)]
    cummulative_quote_qty: Option<Decimal>,
}

impl OrderResponse {
    /// 응답을 `OrderStatus`로 변환합니다.
    ///
    /// 평균 체결가가 없으면 누적 체결 금액 / 체결 수량으로 계산합니다.
    pub(crate) fn into_status(self) -> OrderStatus {
        let avg_price = self.avg_price.or_else(|| {
            let quote = self.cummulative_quote_qty?;
            if self.executed_qty.is_zero() {
                None
            } else {
                quote.checked_div(self.executed_qty)
            }
        });

        OrderStatus {
            order_id: self.order_id,
            symbol: self.symbol,
            side: self.side,
            quantity: self.orig_qty,
            price: self.price,
            executed_quantity: self.executed_qty,
            avg_price,
            state: self.status,
        }
    }
}

/// 선물 계좌 응답.
#[derive(Debug, Deserialize)]
pub(crate) struct FuturesAccount {
    assets: Vec<FuturesAsset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturesAsset {
    asset: String,
    wallet_balance: Decimal,
    #[serde(default)]
    initial_margin: Decimal,
    #[serde(default)]
    maint_margin: Decimal,
    #[serde(default)]
    margin_balance: Decimal,
    #[serde(default)]
    unrealized_profit: Decimal,
}

impl FuturesAccount {
    pub(crate) fn into_balances(self) -> Vec<Balance> {
        self.assets
            .into_iter()
            .map(|a| Balance {
                asset: a.asset,
                wallet_balance: a.wallet_balance,
                initial_margin: a.initial_margin,
                maintenance_margin: a.maint_margin,
                margin_balance: a.margin_balance,
                unrealized_pnl: a.unrealized_profit,
            })
            .collect()
    }
}

/// 현물 계좌 응답.
#[derive(Debug, Deserialize)]
pub(crate) struct SpotAccount {
    balances: Vec<SpotBalance>,
}

#[derive(Debug, Deserialize)]
struct SpotBalance {
    asset: String,
    free: Decimal,
    locked: Decimal,
}

impl SpotAccount {
    pub(crate) fn into_balances(self) -> Vec<Balance> {
        self.balances
            .into_iter()
            .map(|b| Balance::spot(b.asset, b.free, b.locked))
            .collect()
    }
}

/// REST book ticker 응답.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookTickerResponse {
    pub symbol: String,
    pub bid_price: Decimal,
    pub ask_price: Decimal,
}

/// 체결 내역 항목.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TradeFill {
    order_id: i64,
    price: Decimal,
    qty: Decimal,
}

impl From<TradeFill> for Fill {
    fn from(f: TradeFill) -> Self {
        Fill {
            order_id: f.order_id,
            price: f.price,
            quantity: f.qty,
        }
    }
}

/// kline 배열 한 행을 캔들로 변환합니다.
///
/// 행 형식: `[openTime, open, high, low, close, volume, closeTime, ...]`
pub(crate) fn parse_kline(symbol: &str, timeframe: Timeframe, row: &[Value]) -> Option<Candle> {
    let decimal_at = |i: usize| -> Option<Decimal> { row.get(i)?.as_str()?.parse().ok() };

    Some(Candle {
        symbol: symbol.to_string(),
        timeframe,
        open_time: DateTime::from_timestamp_millis(row.first()?.as_i64()?)?,
        open: decimal_at(1)?,
        high: decimal_at(2)?,
        low: decimal_at(3)?,
        close: decimal_at(4)?,
        volume: decimal_at(5)?,
    })
}

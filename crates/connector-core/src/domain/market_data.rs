//! 시장 데이터 구조체.
//!
//! - `PriceQuote` - 종목별 최우선 매수/매도 호가
//! - `Candle` - 과거 캔들스틱

use crate::types::{Price, Quantity, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시세를 마지막으로 기록한 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    /// REST book ticker 스냅샷
    Rest,
    /// 스트리밍 bookTicker 이벤트
    Stream,
}

/// 최우선 호가.
///
/// bid/ask는 항상 한 번의 쓰기로 함께 갱신됩니다.
/// `version`은 가격 캐시 전체에서 단조 증가하는 쓰기 순번입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// 최우선 매수 호가
    pub bid: Price,
    /// 최우선 매도 호가
    pub ask: Price,
    /// 쓰기 순번
    pub version: u64,
    /// 출처
    pub source: QuoteSource,
}

impl PriceQuote {
    /// 스프레드를 반환합니다.
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

/// 캔들스틱(OHLCV) 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 종목 심볼
    pub symbol: String,
    /// 타임프레임
    pub timeframe: Timeframe,
    /// 시작 시간
    pub open_time: DateTime<Utc>,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Quantity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_spread() {
        let quote = PriceQuote {
            bid: dec!(100),
            ask: dec!(101),
            version: 1,
            source: QuoteSource::Stream,
        };
        assert_eq!(quote.spread(), dec!(1));
    }
}

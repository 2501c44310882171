//! 거래 종목과 종목별 거래 규칙.

use crate::types::{quantize, Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 거래소 상품 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    /// USDⓈ-M 선물
    BinanceFutures,
    /// 현물
    BinanceSpot,
}

impl Venue {
    /// 로그와 설정에 쓰는 플랫폼 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::BinanceFutures => "binance_futures",
            Venue::BinanceSpot => "binance_spot",
        }
    }

    pub fn is_futures(&self) -> bool {
        matches!(self, Venue::BinanceFutures)
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 거래 가능한 종목.
///
/// 세션 동안 불변이며, 시작 시 exchange-info 스냅샷에서 한 번 로드됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// 심볼 (예: "BTCUSDT")
    pub symbol: String,
    /// 기초 자산 (예: "BTC")
    pub base_asset: String,
    /// 호가 자산 (예: "USDT")
    pub quote_asset: String,
    /// 가격 소수점 자릿수
    pub price_decimals: u32,
    /// 수량 소수점 자릿수
    pub quantity_decimals: u32,
    /// 최소 가격 증분
    pub tick_size: Decimal,
    /// 최소 수량 증분
    pub lot_size: Decimal,
    /// 상품 유형
    pub venue: Venue,
}

impl Instrument {
    /// 가격을 `tick_size` 배수로 양자화합니다. 범위를 넘으면 `None`.
    pub fn quantize_price(&self, price: Price) -> Option<Price> {
        quantize(price, self.tick_size)
    }

    /// 수량을 `lot_size` 배수로 양자화합니다.
    pub fn quantize_quantity(&self, quantity: Quantity) -> Option<Quantity> {
        quantize(quantity, self.lot_size)
    }

    /// 소수점 자릿수에 해당하는 증분 (`10^-decimals`).
    pub fn increment_from_decimals(decimals: u32) -> Decimal {
        Decimal::new(1, decimals.min(28))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btcusdt() -> Instrument {
        Instrument {
            symbol: "BTCUSDT".to_string(),
            base_asset: "BTC".to_string(),
            quote_asset: "USDT".to_string(),
            price_decimals: 2,
            quantity_decimals: 3,
            tick_size: dec!(0.01),
            lot_size: dec!(0.001),
            venue: Venue::BinanceFutures,
        }
    }

    #[test]
    fn test_quantize_order_values() {
        let instrument = btcusdt();
        assert_eq!(instrument.quantize_quantity(dec!(1.0004)), Some(dec!(1.0)));
        assert_eq!(instrument.quantize_price(dec!(50000.006)), Some(dec!(50000.01)));
        assert_eq!(instrument.quantize_quantity(Decimal::MAX), None);
    }

    #[test]
    fn test_increment_from_decimals() {
        assert_eq!(Instrument::increment_from_decimals(0), dec!(1));
        assert_eq!(Instrument::increment_from_decimals(3), dec!(0.001));
    }
}

//! 주문 타입 및 주문 상태.
//!
//! 이 모듈은 커넥터의 주문 관련 타입을 정의합니다:
//! - `Side` - 주문 방향 (매수/매도)
//! - `OrderType` - 주문 유형
//! - `TimeInForce` - 주문 유효 기간
//! - `OrderState` - 거래소가 보고한 주문 생애주기 상태
//! - `OrderStatus` - REST 응답에서 생성되는 주문 상태 값 객체
//! - `Fill` - 개별 체결 기록

use crate::types::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 주문 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 거래소 파라미터 문자열.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// 주문 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// 시장가 주문
    Market,
    /// 지정가 주문
    Limit,
    /// 지정가 스톱 주문 (선물)
    Stop,
    /// 시장가 스톱 주문 (선물)
    StopMarket,
    /// 지정가 익절 주문
    TakeProfit,
    /// 시장가 익절 주문 (선물)
    TakeProfitMarket,
}

impl OrderType {
    /// 거래소 파라미터 문자열.
    pub fn as_wire(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::Stop => "STOP",
            OrderType::StopMarket => "STOP_MARKET",
            OrderType::TakeProfit => "TAKE_PROFIT",
            OrderType::TakeProfitMarket => "TAKE_PROFIT_MARKET",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// 주문 유효 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// 취소될 때까지 유효 (Good Till Cancelled)
    GTC,
    /// 즉시 체결 또는 취소 (Immediate Or Cancel)
    IOC,
    /// 전량 체결 또는 취소 (Fill Or Kill)
    FOK,
    /// 메이커 전용 (Good Till Crossing, 선물)
    GTX,
}

impl TimeInForce {
    pub fn as_wire(&self) -> &'static str {
        match self {
            TimeInForce::GTC => "GTC",
            TimeInForce::IOC => "IOC",
            TimeInForce::FOK => "FOK",
            TimeInForce::GTX => "GTX",
        }
    }
}

/// 거래소가 보고한 주문 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
    /// 알 수 없는 상태 문자열
    #[serde(other)]
    Unknown,
}

/// 거래소에서 반환하는 주문 상태.
///
/// 각 REST 응답에서 새로 생성되며 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatus {
    /// 거래소 주문 ID
    pub order_id: i64,
    /// 종목 심볼
    pub symbol: String,
    /// 주문 방향
    pub side: Side,
    /// 주문 수량
    pub quantity: Quantity,
    /// 주문 가격 (시장가 주문은 0)
    pub price: Price,
    /// 체결된 수량
    pub executed_quantity: Quantity,
    /// 평균 체결 가격 (알 수 없는 경우 None)
    pub avg_price: Option<Price>,
    /// 생애주기 상태
    pub state: OrderState,
}

/// 개별 체결 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// 체결이 속한 주문 ID
    pub order_id: i64,
    /// 체결 가격
    pub price: Price,
    /// 체결 수량
    pub quantity: Quantity,
}

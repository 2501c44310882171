//! 수신 스트리밍 메시지 파싱.

use crate::error::{ExchangeError, ExchangeResult};
use connector_core::{Price, Quantity};
use serde::Deserialize;
use serde_json::Value;

/// 최우선 호가 이벤트 (`bookTicker`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookTickerEvent {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "b")]
    pub bid: Price,
    #[serde(rename = "a")]
    pub ask: Price,
}

/// 집계 체결 이벤트 (`aggTrade`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AggTradeEvent {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "p")]
    pub price: Price,
    #[serde(rename = "q")]
    pub quantity: Quantity,
    /// 체결 시간 (밀리초)
    #[serde(rename = "T")]
    pub trade_time: i64,
}

/// 파싱된 스트림 메시지.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    BookTicker(BookTickerEvent),
    AggTrade(AggTradeEvent),
    /// 구독 응답 등 이벤트 타입이 없는 제어 메시지
    Control(Value),
    /// 처리하지 않는 이벤트 타입
    Ignored(String),
}

/// 텍스트 프레임을 파싱합니다.
///
/// 현물 `bookTicker` 스트림은 `"e"` 필드 없이 `u`/`s`/`b`/`a`만 보내므로 이 형태도
/// 호가 이벤트로 인식합니다.
pub fn parse_stream_message(text: &str) -> ExchangeResult<StreamEvent> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ExchangeError::Protocol(format!("invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(ExchangeError::Protocol(format!("expected object: {}", text)));
    }

    let event_type = value.get("e").and_then(Value::as_str).map(str::to_owned);

    match event_type.as_deref() {
        Some("bookTicker") => decode(value).map(StreamEvent::BookTicker),
        Some("aggTrade") => decode(value).map(StreamEvent::AggTrade),
        Some(other) => Ok(StreamEvent::Ignored(other.to_string())),
        None if is_spot_book_ticker(&value) => decode(value).map(StreamEvent::BookTicker),
        None => Ok(StreamEvent::Control(value)),
    }
}

fn is_spot_book_ticker(value: &Value) -> bool {
    ["u", "s", "b", "a"].iter().all(|k| value.get(k).is_some())
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> ExchangeResult<T> {
    serde_json::from_value(value).map_err(|e| ExchangeError::Protocol(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_futures_book_ticker() {
        let text = r#"{"e":"bookTicker","u":400900217,"E":1568014460893,"T":1568014460891,
            "s":"BNBUSDT","b":"25.35190000","B":"31.21000000","a":"25.36520000","A":"40.66000000"}"#;

        match parse_stream_message(text).unwrap() {
            StreamEvent::BookTicker(ev) => {
                assert_eq!(ev.symbol, "BNBUSDT");
                assert_eq!(ev.bid, dec!(25.3519));
                assert_eq!(ev.ask, dec!(25.3652));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_spot_book_ticker_without_event_type() {
        let text = r#"{"u":400900217,"s":"BNBUSDT","b":"25.35","B":"31.21","a":"25.36","A":"40.66"}"#;
        assert!(matches!(
            parse_stream_message(text).unwrap(),
            StreamEvent::BookTicker(_)
        ));
    }

    #[test]
    fn test_parse_agg_trade() {
        let text = r#"{"e":"aggTrade","E":123456789,"s":"BTCUSDT","a":5933014,"p":"0.001",
            "q":"100","f":100,"l":105,"T":123456785,"m":true}"#;

        match parse_stream_message(text).unwrap() {
            StreamEvent::AggTrade(ev) => {
                assert_eq!(ev.symbol, "BTCUSDT");
                assert_eq!(ev.price, dec!(0.001));
                assert_eq!(ev.quantity, dec!(100));
                assert_eq!(ev.trade_time, 123456785);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_subscription_ack_is_control() {
        let event = parse_stream_message(r#"{"result":null,"id":3}"#).unwrap();
        assert!(matches!(event, StreamEvent::Control(_)));
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let event = parse_stream_message(r#"{"e":"markPriceUpdate","s":"BTCUSDT"}"#).unwrap();
        assert_eq!(event, StreamEvent::Ignored("markPriceUpdate".into()));
    }

    #[test]
    fn test_malformed_messages_are_protocol_errors() {
        assert!(matches!(
            parse_stream_message("not json"),
            Err(ExchangeError::Protocol(_))
        ));
        assert!(matches!(
            parse_stream_message("[1,2]"),
            Err(ExchangeError::Protocol(_))
        ));
        assert!(matches!(
            parse_stream_message(r#"{"e":"bookTicker","s":"BTCUSDT","b":"abc","a":"1"}"#),
            Err(ExchangeError::Protocol(_))
        ));
    }
}

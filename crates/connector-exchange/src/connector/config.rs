//! Binance 연결 설정 및 상품별 엔드포인트.

use connector_core::{ExchangeSettings, Venue};
use secrecy::SecretString;
use std::fmt;
use std::time::Duration;

/// 상품 유형별 REST 엔드포인트 경로.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub exchange_info: &'static str,
    pub server_time: &'static str,
    pub account: &'static str,
    pub order: &'static str,
    pub klines: &'static str,
    pub book_ticker: &'static str,
    /// 체결 내역 (현물 전용)
    pub my_trades: &'static str,
}

const FUTURES_ENDPOINTS: Endpoints = Endpoints {
    exchange_info: "/fapi/v1/exchangeInfo",
    server_time: "/fapi/v1/time",
    account: "/fapi/v2/account",
    order: "/fapi/v1/order",
    klines: "/fapi/v1/klines",
    book_ticker: "/fapi/v1/ticker/bookTicker",
    my_trades: "/fapi/v1/userTrades",
};

const SPOT_ENDPOINTS: Endpoints = Endpoints {
    exchange_info: "/api/v3/exchangeInfo",
    server_time: "/api/v3/time",
    account: "/api/v3/account",
    order: "/api/v3/order",
    klines: "/api/v3/klines",
    book_ticker: "/api/v3/ticker/bookTicker",
    my_trades: "/api/v3/myTrades",
};

impl Endpoints {
    pub fn for_venue(venue: Venue) -> Self {
        match venue {
            Venue::BinanceFutures => FUTURES_ENDPOINTS,
            Venue::BinanceSpot => SPOT_ENDPOINTS,
        }
    }
}

/// Binance 커넥터 설정.
#[derive(Clone)]
pub struct BinanceConfig {
    /// API 키
    pub api_key: String,
    /// API 시크릿
    pub api_secret: SecretString,
    /// 상품 유형
    pub venue: Venue,
    /// 테스트넷 사용
    pub testnet: bool,
    /// REST 기본 URL 재정의
    pub rest_base_url: Option<String>,
    /// WebSocket URL 재정의
    pub ws_url: Option<String>,
    /// 요청 타임아웃
    pub timeout: Duration,
    /// 재연결 대기 시간
    pub reconnect_delay: Duration,
    /// 기본 구독 심볼
    pub default_symbol: String,
    /// 주문 수량 계산에 쓰는 증거금 자산
    pub margin_asset: String,
    /// 과거 캔들 요청 개수
    pub candle_limit: u32,
}

impl fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chars: Vec<char> = self.api_key.chars().collect();
        let masked_key = if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("BinanceConfig")
            .field("api_key", &masked_key)
            .field("api_secret", &"***REDACTED***")
            .field("venue", &self.venue)
            .field("testnet", &self.testnet)
            .field("rest_base_url", &self.rest_base_url())
            .field("ws_url", &self.ws_url())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BinanceConfig {
    /// 기본 설정으로 새 설정을 생성합니다.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>, venue: Venue) -> Self {
        Self::from_settings(api_key, api_secret, &ExchangeSettings::default()).with_venue(venue)
    }

    /// 파일/환경 설정과 자격증명으로 생성합니다.
    pub fn from_settings(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        settings: &ExchangeSettings,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
            venue: if settings.futures {
                Venue::BinanceFutures
            } else {
                Venue::BinanceSpot
            },
            testnet: settings.testnet,
            rest_base_url: settings.rest_base_url.clone(),
            ws_url: settings.ws_url.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            reconnect_delay: Duration::from_millis(settings.reconnect_delay_ms),
            default_symbol: settings.default_symbol.clone(),
            margin_asset: settings.margin_asset.clone(),
            candle_limit: settings.candle_limit,
        }
    }

    /// 환경 변수의 자격증명과 설정으로 생성합니다.
    ///
    /// 테스트넷이면 `BINANCE_TESTNET_API_KEY`/`BINANCE_TESTNET_API_SECRET`,
    /// 아니면 `BINANCE_API_KEY`/`BINANCE_API_SECRET`을 읽습니다. 없으면 `None`.
    pub fn from_env(settings: &ExchangeSettings) -> Option<Self> {
        let (key_var, secret_var) = if settings.testnet {
            ("BINANCE_TESTNET_API_KEY", "BINANCE_TESTNET_API_SECRET")
        } else {
            ("BINANCE_API_KEY", "BINANCE_API_SECRET")
        };

        let api_key = std::env::var(key_var).ok()?;
        let api_secret = std::env::var(secret_var).ok()?;
        Some(Self::from_settings(api_key, api_secret, settings))
    }

    pub fn with_venue(mut self, venue: Venue) -> Self {
        self.venue = venue;
        self
    }

    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// REST/WebSocket URL을 재정의합니다.
    pub fn with_urls(mut self, rest_base_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        self.rest_base_url = Some(rest_base_url.into());
        self.ws_url = Some(ws_url.into());
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_default_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.default_symbol = symbol.into();
        self
    }

    /// REST 기본 URL.
    pub fn rest_base_url(&self) -> String {
        if let Some(url) = &self.rest_base_url {
            return url.clone();
        }
        match (self.venue, self.testnet) {
            (Venue::BinanceFutures, false) => "https://fapi.binance.com",
            (Venue::BinanceFutures, true) => "https://testnet.binancefuture.com",
            (Venue::BinanceSpot, false) => "https://api.binance.com",
            (Venue::BinanceSpot, true) => "https://testnet.binance.vision",
        }
        .to_string()
    }

    /// WebSocket URL.
    pub fn ws_url(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.clone();
        }
        match (self.venue, self.testnet) {
            (Venue::BinanceFutures, false) => "wss://fstream.binance.com/ws",
            (Venue::BinanceFutures, true) => "wss://stream.binancefuture.com/ws",
            (Venue::BinanceSpot, false) => "wss://stream.binance.com:9443/ws",
            (Venue::BinanceSpot, true) => "wss://testnet.binance.vision/ws",
        }
        .to_string()
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::for_venue(self.venue)
    }
}

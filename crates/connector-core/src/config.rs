//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → `CONNECTOR__` 접두사 환경 변수 순으로 덮어씁니다.
//! API 자격증명은 이 설정에 포함되지 않습니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 커넥터 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConnectorSettings {
    /// 거래소 연결 설정
    #[serde(default)]
    pub exchange: ExchangeSettings,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// 거래소 연결 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExchangeSettings {
    /// 선물(true) 또는 현물(false)
    #[serde(default = "default_true")]
    pub futures: bool,
    /// 테스트넷 사용
    #[serde(default)]
    pub testnet: bool,
    /// REST 기본 URL 재정의
    #[serde(default)]
    pub rest_base_url: Option<String>,
    /// WebSocket URL 재정의
    #[serde(default)]
    pub ws_url: Option<String>,
    /// REST 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// WebSocket 재연결 대기 (밀리초)
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// 연결 시 항상 구독하는 기본 종목
    #[serde(default = "default_symbol")]
    pub default_symbol: String,
    /// 주문 수량 계산에 쓰는 증거금 자산
    #[serde(default = "default_margin_asset")]
    pub margin_asset: String,
    /// 과거 캔들 요청 개수
    #[serde(default = "default_candle_limit")]
    pub candle_limit: u32,
}

fn default_true() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_reconnect_delay_ms() -> u64 {
    2000
}
fn default_symbol() -> String {
    "BTCUSDT".to_string()
}
fn default_margin_asset() -> String {
    "USDT".to_string()
}
fn default_candle_limit() -> u32 {
    1000
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            futures: true,
            testnet: false,
            rest_base_url: None,
            ws_url: None,
            timeout_secs: default_timeout_secs(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            default_symbol: default_symbol(),
            margin_asset: default_margin_asset(),
            candle_limit: default_candle_limit(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ConnectorSettings {
    /// 설정 파일(선택)과 환경 변수에서 설정을 로드합니다.
    ///
    /// `path`가 `None`이거나 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.as_ref()).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("CONNECTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// 기본 경로(`config/connector.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(Some("config/connector.toml"))
    }
}

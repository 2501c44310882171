//! 거래소 에러 타입.
//!
//! 내부 계층은 `ExchangeResult`를 반환하고, 공개 연산은 경계에서
//! 에러를 로그로 남긴 뒤 `None`(또는 빈 컬렉션)으로 변환합니다.

use thiserror::Error;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 거래소 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러 (DNS, 연결 거부 등)
    #[error("Transport error: {0}")]
    Transport(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 2xx가 아닌 HTTP 응답
    #[error("Venue error (HTTP {status}): {body}")]
    Venue { status: u16, body: String },

    /// 응답 본문 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    Parse(String),

    /// 예상하지 못한 스트리밍 메시지 형태
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// WebSocket 에러
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// 소켓이 열려 있지 않음
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// 공유 상태 접근 실패
    #[error("State error: {0}")]
    State(String),

    /// 잘못된 입력
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ExchangeError {
    /// 전송 계층(연결/타임아웃) 에러인지 확인.
    pub fn is_transport(&self) -> bool {
        matches!(self, ExchangeError::Transport(_) | ExchangeError::Timeout(_))
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_decode() {
            ExchangeError::Parse(err.to_string())
        } else {
            ExchangeError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::Parse(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ExchangeError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ExchangeError::WebSocket(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(ExchangeError::Transport("refused".into()).is_transport());
        assert!(ExchangeError::Timeout("10s".into()).is_transport());
        assert!(!ExchangeError::Venue {
            status: 400,
            body: "{}".into()
        }
        .is_transport());
    }

    #[test]
    fn test_venue_error_display() {
        let err = ExchangeError::Venue {
            status: 400,
            body: r#"{"code":-1013,"msg":"Invalid quantity."}"#.into(),
        };
        assert!(err.to_string().contains("HTTP 400"));
    }
}

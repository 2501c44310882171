//! 거래소 REST 클라이언트.
//!
//! 모든 요청에 `X-MBX-APIKEY` 헤더를 붙이고, 서명이 필요한 요청에는
//! 서버 시간 기준 `timestamp`와 `signature`를 마지막 두 파라미터로 추가합니다.
//!
//! 공개 메서드(`get`, `post`, `delete`)는 실패를 호출자에게 전파하지 않습니다.
//! 전송 실패와 2xx가 아닌 응답은 로그로 남기고 `None`을 반환합니다.

use crate::error::{ExchangeError, ExchangeResult};
use crate::signer::{Params, RequestSigner};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

/// 요청 보안 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// 서명 불필요
    Public,
    /// `timestamp` + `signature` 필요
    Signed,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerTime {
    server_time: i64,
}

/// 서명 및 응답 처리를 담당하는 REST 클라이언트.
pub struct RestClient {
    http: Client,
    base_url: String,
    api_key: String,
    signer: RequestSigner,
    time_endpoint: &'static str,
}

impl RestClient {
    /// 새 REST 클라이언트를 생성합니다.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::Transport`를 반환합니다.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        signer: RequestSigner,
        time_endpoint: &'static str,
        timeout: Duration,
    ) -> ExchangeResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::Transport(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            signer,
            time_endpoint,
        })
    }

    /// REST 기본 URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET 요청.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Params,
        security: Security,
    ) -> Option<T> {
        self.request_logged(Method::GET, endpoint, params, security)
            .await
    }

    /// POST 요청.
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Params,
        security: Security,
    ) -> Option<T> {
        self.request_logged(Method::POST, endpoint, params, security)
            .await
    }

    /// DELETE 요청.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Params,
        security: Security,
    ) -> Option<T> {
        self.request_logged(Method::DELETE, endpoint, params, security)
            .await
    }

    /// 거래소 서버 시간(밀리초).
    pub async fn server_time(&self) -> Option<i64> {
        match self.fetch_server_time().await {
            Ok(ts) => Some(ts),
            Err(e) => {
                log_failure(&Method::GET, self.time_endpoint, &e);
                None
            }
        }
    }

    async fn request_logged<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: Params,
        security: Security,
    ) -> Option<T> {
        match self.request(method.clone(), endpoint, params, security).await {
            Ok(value) => Some(value),
            Err(e) => {
                log_failure(&method, endpoint, &e);
                None
            }
        }
    }

    async fn fetch_server_time(&self) -> ExchangeResult<i64> {
        let time: ServerTime = self
            .send(Method::GET, self.time_endpoint, Vec::new())
            .await?;
        Ok(time.server_time)
    }

    /// 요청을 만들고 보낸 뒤 응답 본문을 역직렬화합니다.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        mut params: Params,
        security: Security,
    ) -> ExchangeResult<T> {
        if security == Security::Signed {
            let timestamp = self.fetch_server_time().await?;
            params.push(("timestamp", timestamp.to_string()));
            let signature = self.signer.sign(&params);
            params.push(("signature", signature));
        }

        debug!(%method, endpoint, signed = security == Security::Signed, "REST request");
        self.send(method, endpoint, params).await
    }

    /// 파라미터를 그대로 인코딩해 보냅니다. 서명하지 않습니다.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: Params,
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let query = RequestSigner::encode(&params);

        let builder = if method == Method::POST {
            self.http
                .post(&url)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(query)
        } else {
            let full_url = if query.is_empty() {
                url
            } else {
                format!("{}?{}", url, query)
            };
            self.http.request(method, &full_url)
        };

        let response = builder.header("X-MBX-APIKEY", &self.api_key).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                ExchangeError::Parse(format!("{} - Body: {}", e, body))
            })
        } else {
            Err(ExchangeError::Venue {
                status: status.as_u16(),
                body,
            })
        }
    }
}

fn log_failure(method: &Method, endpoint: &str, err: &ExchangeError) {
    match err {
        ExchangeError::Venue { status, body } => {
            error!(
                %method,
                endpoint,
                status,
                body = %body,
                "Error while making {} request to {}: {} (error code {})",
                method,
                endpoint,
                body,
                status
            );
        }
        e if e.is_transport() => {
            error!(
                %method,
                endpoint,
                "Connection error while making {} request to {}: {}",
                method,
                endpoint,
                e
            );
        }
        e => {
            error!(%method, endpoint, "Failed {} request to {}: {}", method, endpoint, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use secrecy::SecretString;

    fn client(base_url: &str) -> RestClient {
        RestClient::new(
            base_url,
            "test-key",
            RequestSigner::new(SecretString::from("test-secret".to_string())),
            "/fapi/v1/time",
            Duration::from_secs(5),
        )
        .expect("테스트용 클라이언트 생성 실패")
    }

    #[tokio::test]
    async fn test_public_get_decodes_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fapi/v1/ticker/bookTicker")
            .match_query(Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()))
            .match_header("X-MBX-APIKEY", "test-key")
            .with_status(200)
            .with_body(r#"{"symbol":"BTCUSDT","bidPrice":"1.0","askPrice":"2.0"}"#)
            .create_async()
            .await;

        let body: Option<serde_json::Value> = client(&server.url())
            .get(
                "/fapi/v1/ticker/bookTicker",
                vec![("symbol", "BTCUSDT".to_string())],
                Security::Public,
            )
            .await;

        mock.assert_async().await;
        assert_eq!(body.unwrap()["bidPrice"], "1.0");
    }

    #[tokio::test]
    async fn test_signed_request_appends_timestamp_and_signature_last() {
        let mut server = mockito::Server::new_async().await;
        let _time = server
            .mock("GET", "/fapi/v1/time")
            .with_status(200)
            .with_body(r#"{"serverTime":1700000000000}"#)
            .create_async()
            .await;

        let signer = RequestSigner::new(SecretString::from("test-secret".to_string()));
        let expected_signature = signer.sign(&[
            ("symbol", "BTCUSDT"),
            ("orderId", "42"),
            ("timestamp", "1700000000000"),
        ]);
        let expected_query = format!(
            "symbol=BTCUSDT&orderId=42&timestamp=1700000000000&signature={}",
            expected_signature
        );

        let order = server
            .mock("DELETE", "/fapi/v1/order")
            .match_query(Matcher::Exact(expected_query))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let body: Option<serde_json::Value> = client(&server.url())
            .delete(
                "/fapi/v1/order",
                vec![
                    ("symbol", "BTCUSDT".to_string()),
                    ("orderId", "42".to_string()),
                ],
                Security::Signed,
            )
            .await;

        order.assert_async().await;
        assert!(body.is_some());
    }

    #[tokio::test]
    async fn test_server_time_is_fetched_once_per_signed_request() {
        let mut server = mockito::Server::new_async().await;
        let time = server
            .mock("GET", "/fapi/v1/time")
            .with_status(200)
            .with_body(r#"{"serverTime":1700000000000}"#)
            .expect(2)
            .create_async()
            .await;
        let _account = server
            .mock("GET", "/fapi/v2/account")
            .match_query(Matcher::UrlEncoded("timestamp".into(), "1700000000000".into()))
            .with_status(200)
            .with_body(r#"{"assets":[]}"#)
            .create_async()
            .await;

        let client = client(&server.url());
        assert_eq!(client.server_time().await, Some(1700000000000));

        let body: Option<serde_json::Value> = client
            .get("/fapi/v2/account", Vec::new(), Security::Signed)
            .await;

        assert!(body.is_some());
        time.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_returns_none() {
        let mut server = mockito::Server::new_async().await;
        let _info = server
            .mock("GET", "/fapi/v1/exchangeInfo")
            .with_status(418)
            .with_body(r#"{"code":-1003,"msg":"banned"}"#)
            .create_async()
            .await;

        let body: Option<serde_json::Value> = client(&server.url())
            .get("/fapi/v1/exchangeInfo", Vec::new(), Security::Public)
            .await;

        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_signed_request_without_server_time_returns_none() {
        let mut server = mockito::Server::new_async().await;
        let _time = server
            .mock("GET", "/fapi/v1/time")
            .with_status(503)
            .create_async()
            .await;
        let account = server
            .mock("GET", "/fapi/v2/account")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let body: Option<serde_json::Value> = client(&server.url())
            .get("/fapi/v2/account", Vec::new(), Security::Signed)
            .await;

        assert!(body.is_none());
        account.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_failure_returns_none() {
        // 아무도 듣지 않는 포트
        let body: Option<serde_json::Value> = client("http://127.0.0.1:1")
            .get("/fapi/v1/time", Vec::new(), Security::Public)
            .await;
        assert!(body.is_none());
    }
}

//! 스트리밍 연결 관리자.
//!
//! 전용 태스크에서 재연결 루프를 돌립니다.
//!
//! ```text
//! Connecting → Open → Closed → (reconnect_delay) → Connecting ...
//!                                   └─ 취소 토큰 → Stopped
//! ```
//!
//! 연결이 열리면 구독 레지스트리에 송신 채널을 붙여 기록된 구독을 모두 다시 보내고,
//! 기본 심볼의 `bookTicker` 구독을 보장합니다. 수신한 텍스트 프레임은
//! `StrategyDispatcher`로 전달됩니다.

use crate::dispatch::StrategyDispatcher;
use crate::error::ExchangeResult;
use crate::log_sink::LogSink;
use crate::subscription::{Channel, SubscriptionRegistry};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 스트리밍 연결 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// 연결 시도 중
    Connecting,
    /// 연결됨
    Open,
    /// 연결 끊김, 재연결 대기 중
    Closed,
    /// 종료됨 (재연결하지 않음)
    Stopped,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// 스트림 연결 설정.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// WebSocket 엔드포인트
    pub url: String,
    /// 연결 종료 후 재연결까지 대기 시간
    pub reconnect_delay: Duration,
    /// 항상 `bookTicker`로 구독되는 기본 심볼
    pub default_symbol: String,
}

/// 재연결 루프를 소유하는 스트림 관리자.
pub struct StreamManager {
    config: StreamConfig,
    subscriptions: Arc<SubscriptionRegistry>,
    dispatcher: StrategyDispatcher,
    log: Arc<dyn LogSink>,
    shutdown: CancellationToken,
    state: watch::Sender<ConnectionState>,
}

impl StreamManager {
    pub fn new(
        config: StreamConfig,
        subscriptions: Arc<SubscriptionRegistry>,
        dispatcher: StrategyDispatcher,
        log: Arc<dyn LogSink>,
        shutdown: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Closed);
        Self {
            config,
            subscriptions,
            dispatcher,
            log,
            shutdown,
            state,
        }
    }

    /// 연결 상태 구독.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// 별도 태스크에서 재연결 루프를 시작합니다.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// 취소될 때까지 연결을 유지합니다.
    pub async fn run(self) {
        info!(url = %self.config.url, "Starting stream manager");

        loop {
            // 취소는 반복마다 한 번 확인한다. 진행 중인 연결 시도는 중단하지 않는다.
            if self.shutdown.is_cancelled() {
                break;
            }

            self.set_state(ConnectionState::Connecting);
            if let Err(e) = self.session().await {
                error!("Binance connection error: {}", e);
            }

            self.subscriptions.detach();
            self.set_state(ConnectionState::Closed);

            if self.shutdown.is_cancelled() {
                break;
            }
            warn!("Binance Websocket connection closed");

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }

        self.set_state(ConnectionState::Stopped);
        info!("Stream manager stopped");
    }

    /// 한 번의 연결 수명.
    async fn session(&self) -> ExchangeResult<()> {
        let (ws, _) = connect_async(self.config.url.as_str()).await?;
        let (mut write, mut read) = ws.split();

        self.set_state(ConnectionState::Open);
        self.log.append("Binance connection opened");

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        self.subscriptions.attach(outbound_tx);
        if !self.config.default_symbol.is_empty() {
            self.subscriptions
                .subscribe(Channel::BookTicker, &[self.config.default_symbol.as_str()]);
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("Closing stream on shutdown");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
                Some(msg) = outbound_rx.recv() => {
                    write.send(msg).await?;
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.dispatcher.handle_text(&text),
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!(?frame, "Stream closed by server");
                            return Ok(());
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(()),
                        _ => {}
                    }
                }
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Stream state changed");
        }
    }
}

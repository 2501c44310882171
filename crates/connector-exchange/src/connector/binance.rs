//! Binance 커넥터.
//!
//! 생성 시 종목 목록과 잔고를 로드하고, 곧바로 스트리밍 연결 관리자를 별도 태스크로
//! 시작합니다. REST 호출은 호출자의 태스크에서 실행되며 스트리밍 경로를 막지 않습니다.
//!
//! 공개 연산은 실패를 전파하지 않습니다. 실패는 로그로 남고 `None`(또는 빈 컬렉션)이
//! 반환됩니다.

use super::config::{BinanceConfig, Endpoints};
use super::wire::{parse_kline, BookTickerResponse, FuturesAccount, SpotAccount};
use crate::dispatch::StrategyDispatcher;
use crate::error::ExchangeResult;
use crate::instruments::InstrumentRegistry;
use crate::log_sink::LogSink;
use crate::price_cache::PriceCache;
use crate::rest::{RestClient, Security};
use crate::signer::RequestSigner;
use crate::strategy::StrategyRegistry;
use crate::subscription::{Channel, SubscribeCommand, SubscriptionRegistry};
use crate::websocket::{ConnectionState, StreamConfig, StreamManager};
use connector_core::{Balance, Candle, Instrument, PriceQuote, QuoteSource, Timeframe, Venue};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Binance 선물/현물 커넥터.
pub struct BinanceConnector {
    pub(super) config: BinanceConfig,
    pub(super) endpoints: Endpoints,
    pub(super) rest: RestClient,
    instruments: InstrumentRegistry,
    balances: RwLock<HashMap<String, Balance>>,
    prices: Arc<PriceCache>,
    subscriptions: Arc<SubscriptionRegistry>,
    strategies: Arc<StrategyRegistry>,
    pub(super) log: Arc<dyn LogSink>,
    shutdown: CancellationToken,
    state: watch::Receiver<ConnectionState>,
    stream_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl BinanceConnector {
    /// 커넥터를 생성하고 스트리밍 연결을 시작합니다.
    ///
    /// 종목/잔고 로드 실패는 치명적이지 않으며 빈 상태로 시작합니다.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 에러를 반환합니다.
    pub async fn connect(config: BinanceConfig, log: Arc<dyn LogSink>) -> ExchangeResult<Self> {
        let endpoints = config.endpoints();
        let rest = RestClient::new(
            config.rest_base_url(),
            config.api_key.clone(),
            RequestSigner::new(config.api_secret.clone()),
            endpoints.server_time,
            config.timeout,
        )?;

        info!(venue = %config.venue, testnet = config.testnet, base_url = rest.base_url(), "Connecting");

        let instruments =
            InstrumentRegistry::load(&rest, endpoints.exchange_info, config.venue).await;

        let prices = Arc::new(PriceCache::new());
        let subscriptions = Arc::new(SubscriptionRegistry::new());
        let strategies = Arc::new(StrategyRegistry::new());
        let shutdown = CancellationToken::new();

        let stream = StreamManager::new(
            StreamConfig {
                url: config.ws_url(),
                reconnect_delay: config.reconnect_delay,
                default_symbol: config.default_symbol.clone(),
            },
            Arc::clone(&subscriptions),
            StrategyDispatcher::new(Arc::clone(&prices), Arc::clone(&strategies)),
            Arc::clone(&log),
            shutdown.clone(),
        );
        let state = stream.state();

        let connector = Self {
            config,
            endpoints,
            rest,
            instruments,
            balances: RwLock::new(HashMap::new()),
            prices,
            subscriptions,
            strategies,
            log,
            shutdown,
            state,
            stream_task: parking_lot::Mutex::new(None),
        };

        connector.get_balances().await;
        *connector.stream_task.lock() = Some(stream.spawn());

        connector
            .log
            .append(&format!("{} connector initialized", connector.venue()));
        Ok(connector)
    }

    pub fn venue(&self) -> Venue {
        self.config.venue
    }

    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    /// 거래 가능한 종목 목록.
    pub fn contracts(&self) -> &InstrumentRegistry {
        &self.instruments
    }

    /// 심볼로 종목을 조회합니다.
    pub fn instrument(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.get(symbol)
    }

    /// 계좌 잔고를 조회합니다. 성공하면 잔고 스냅샷도 갱신합니다.
    pub async fn get_balances(&self) -> Option<HashMap<String, Balance>> {
        let balances = if self.venue().is_futures() {
            self.rest
                .get::<FuturesAccount>(self.endpoints.account, Vec::new(), Security::Signed)
                .await?
                .into_balances()
        } else {
            self.rest
                .get::<SpotAccount>(self.endpoints.account, Vec::new(), Security::Signed)
                .await?
                .into_balances()
        };

        let balances: HashMap<String, Balance> = balances
            .into_iter()
            .map(|b| (b.asset.clone(), b))
            .collect();

        debug!(assets = balances.len(), "Balances refreshed");
        *self.balances.write() = balances.clone();
        Some(balances)
    }

    /// 마지막으로 조회한 잔고 스냅샷.
    pub fn balances(&self) -> HashMap<String, Balance> {
        self.balances.read().clone()
    }

    /// 과거 캔들을 조회합니다. 실패하면 빈 목록입니다.
    pub async fn get_historical_candles(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
    ) -> Vec<Candle> {
        let params = vec![
            ("symbol", instrument.symbol.clone()),
            ("interval", timeframe.as_interval().to_string()),
            ("limit", self.config.candle_limit.to_string()),
        ];

        let Some(rows) = self
            .rest
            .get::<Vec<Vec<Value>>>(self.endpoints.klines, params, Security::Public)
            .await
        else {
            return Vec::new();
        };

        let total = rows.len();
        let candles: Vec<Candle> = rows
            .iter()
            .filter_map(|row| parse_kline(&instrument.symbol, timeframe, row))
            .collect();

        if candles.len() != total {
            warn!(
                symbol = %instrument.symbol,
                skipped = total - candles.len(),
                "Skipped malformed kline rows"
            );
        }
        candles
    }

    /// REST로 최우선 호가를 조회하고 가격 캐시에 기록합니다.
    pub async fn get_bid_ask(&self, instrument: &Instrument) -> Option<PriceQuote> {
        let ticker: BookTickerResponse = self
            .rest
            .get(
                self.endpoints.book_ticker,
                vec![("symbol", instrument.symbol.clone())],
                Security::Public,
            )
            .await?;

        Some(self.prices.update(
            &ticker.symbol,
            ticker.bid_price,
            ticker.ask_price,
            QuoteSource::Rest,
        ))
    }

    /// 가격 캐시 스냅샷.
    pub fn prices(&self) -> HashMap<String, PriceQuote> {
        self.prices.snapshot()
    }

    /// 심볼의 캐시된 시세.
    pub fn price(&self, symbol: &str) -> Option<PriceQuote> {
        self.prices.get(symbol)
    }

    /// 채널에 종목들을 구독합니다. 이미 구독 중인 종목은 건너뜁니다.
    pub fn subscribe_channel<S: AsRef<str>>(
        &self,
        symbols: &[S],
        channel: Channel,
    ) -> Option<SubscribeCommand> {
        let command = self.subscriptions.subscribe(channel, symbols)?;
        if self.subscriptions.is_attached() {
            self.log.append(&format!(
                "{}: subscribing to {}",
                self.venue(),
                command.params.join(",")
            ));
        } else {
            self.log.append(&format!(
                "{}: {} will be subscribed once the stream connects",
                self.venue(),
                command.params.join(",")
            ));
        }
        Some(command)
    }

    /// 구독 레지스트리.
    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    /// 전략 바인딩 레지스트리.
    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    /// 현재 스트리밍 연결 상태.
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// 연결 상태 변경 구독.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// 스트리밍 연결을 종료하고 태스크가 끝날 때까지 기다립니다.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let task = self.stream_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Stream task ended abnormally: {}", e);
            }
        }
        info!(venue = %self.venue(), "Connector shut down");
    }
}

impl Drop for BinanceConnector {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

//! 스트리밍 구독 레지스트리.
//!
//! 채널별로 구독 중인 심볼 목록(삽입 순서 = 전송 순서)을 기록합니다.
//! 호출자 컨텍스트의 `subscribe`와 재연결 시 replay가 같은 레지스트리를 공유하며,
//! 소켓이 열려 있는 동안에는 송신 채널(`outbound`)도 함께 보관합니다.
//!
//! 송신 채널 연결과 replay는 하나의 잠금 안에서 일어나므로, replay 도중의
//! `subscribe` 호출이 같은 스트림을 두 번 보내는 일은 없습니다.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// 한 번의 구독 호출에서 권장되는 최대 종목 수.
pub const MAX_INSTRUMENTS_PER_CALL: usize = 200;

/// 스트리밍 채널.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// 최우선 호가
    BookTicker,
    /// 집계 체결
    AggTrade,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::BookTicker, Channel::AggTrade];

    /// 스트림 이름에 쓰이는 채널 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::BookTicker => "bookTicker",
            Channel::AggTrade => "aggTrade",
        }
    }

    /// `symbol@channel` 스트림 이름.
    pub fn stream_name(&self, symbol: &str) -> String {
        format!("{}@{}", symbol.to_lowercase(), self.as_str())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown channel: {}", s))
    }
}

/// 거래소로 보내는 구독 명령.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeCommand {
    pub method: &'static str,
    pub params: Vec<String>,
    pub id: u64,
}

#[derive(Debug, Default)]
struct Inner {
    channels: BTreeMap<Channel, Vec<String>>,
    outbound: Option<UnboundedSender<Message>>,
    last_id: u64,
}

impl Inner {
    fn command(&mut self, params: Vec<String>) -> SubscribeCommand {
        self.last_id += 1;
        SubscribeCommand {
            method: "SUBSCRIBE",
            params,
            id: self.last_id,
        }
    }

    fn send(&self, command: &SubscribeCommand) {
        let Some(outbound) = &self.outbound else {
            warn!(
                id = command.id,
                "Socket not open, subscription recorded for replay: {:?}", command.params
            );
            return;
        };

        let json = match serde_json::to_string(command) {
            Ok(json) => json,
            Err(e) => {
                error!(id = command.id, "Failed to encode subscribe command: {}", e);
                return;
            }
        };

        if outbound.send(Message::Text(json.into())).is_err() {
            warn!(id = command.id, "Socket writer gone, subscribe command dropped");
        } else {
            debug!(id = command.id, streams = command.params.len(), "Subscribe command queued");
        }
    }
}

/// 채널별 구독 상태.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    inner: Mutex<Inner>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 채널에 종목들을 구독합니다.
    ///
    /// 이미 구독 중인 종목은 건너뛰며, 새로 추가된 스트림이 없으면 아무것도 보내지 않습니다.
    /// 빈 목록은 채널 단위 구독 명령을 보냅니다. 만들어진 명령을 반환합니다.
    pub fn subscribe<S: AsRef<str>>(
        &self,
        channel: Channel,
        symbols: &[S],
    ) -> Option<SubscribeCommand> {
        if symbols.len() > MAX_INSTRUMENTS_PER_CALL {
            warn!(
                %channel,
                count = symbols.len(),
                "Subscribing to more than {} instruments at once",
                MAX_INSTRUMENTS_PER_CALL
            );
        }

        let mut inner = self.inner.lock();

        let params = if symbols.is_empty() {
            vec![channel.as_str().to_string()]
        } else {
            let recorded = inner.channels.entry(channel).or_default();
            let mut params = Vec::new();
            for symbol in symbols {
                let symbol = symbol.as_ref().to_uppercase();
                if recorded.contains(&symbol) {
                    continue;
                }
                params.push(channel.stream_name(&symbol));
                recorded.push(symbol);
            }
            params
        };

        if params.is_empty() {
            debug!(%channel, "All instruments already subscribed");
            return None;
        }

        let command = inner.command(params);
        inner.send(&command);
        Some(command)
    }

    /// 소켓 송신 채널을 연결하고 기록된 모든 구독을 다시 보냅니다.
    ///
    /// 채널마다 최대 `MAX_INSTRUMENTS_PER_CALL`개씩 묶어 보내며, 보낸 명령들을 반환합니다.
    pub fn attach(&self, outbound: UnboundedSender<Message>) -> Vec<SubscribeCommand> {
        let mut inner = self.inner.lock();
        inner.outbound = Some(outbound);

        let batches: Vec<Vec<String>> = inner
            .channels
            .iter()
            .flat_map(|(channel, symbols)| {
                symbols
                    .chunks(MAX_INSTRUMENTS_PER_CALL)
                    .map(|chunk| chunk.iter().map(|s| channel.stream_name(s)).collect())
                    .collect::<Vec<_>>()
            })
            .collect();

        let commands: Vec<SubscribeCommand> = batches
            .into_iter()
            .map(|params| inner.command(params))
            .collect();
        for command in &commands {
            inner.send(command);
        }

        if !commands.is_empty() {
            info!(commands = commands.len(), "Replayed subscriptions");
        }
        commands
    }

    /// 소켓 송신 채널을 해제합니다. 기록된 구독은 유지됩니다.
    pub fn detach(&self) {
        self.inner.lock().outbound = None;
    }

    /// 소켓이 연결되어 있는지 확인.
    pub fn is_attached(&self) -> bool {
        self.inner.lock().outbound.is_some()
    }

    /// 채널의 구독 심볼 목록 (삽입 순서).
    pub fn symbols(&self, channel: Channel) -> Vec<String> {
        self.inner
            .lock()
            .channels
            .get(&channel)
            .cloned()
            .unwrap_or_default()
    }

    /// 채널에 심볼이 구독되어 있는지 확인.
    pub fn contains(&self, channel: Channel, symbol: &str) -> bool {
        self.inner
            .lock()
            .channels
            .get(&channel)
            .is_some_and(|symbols| symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn drain(rx: &mut UnboundedReceiver<Message>) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            if let Message::Text(text) = msg {
                out.push(serde_json::from_str(text.as_str()).unwrap());
            }
        }
        out
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.attach(tx);

        let first = registry.subscribe(Channel::BookTicker, &["BTCUSDT"]);
        let second = registry.subscribe(Channel::BookTicker, &["BTCUSDT"]);

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(registry.symbols(Channel::BookTicker), vec!["BTCUSDT"]);

        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["method"], "SUBSCRIBE");
        assert_eq!(sent[0]["params"][0], "btcusdt@bookTicker");
    }

    #[test]
    fn test_partial_overlap_sends_only_new_streams() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe(Channel::AggTrade, &["BTCUSDT"]);

        let command = registry
            .subscribe(Channel::AggTrade, &["BTCUSDT", "ETHUSDT"])
            .unwrap();
        assert_eq!(command.params, vec!["ethusdt@aggTrade"]);
        assert_eq!(registry.symbols(Channel::AggTrade), vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_empty_list_sends_bare_channel() {
        let registry = SubscriptionRegistry::new();
        let command = registry.subscribe::<&str>(Channel::BookTicker, &[]).unwrap();

        assert_eq!(command.params, vec!["bookTicker"]);
        assert!(registry.symbols(Channel::BookTicker).is_empty());
    }

    #[test]
    fn test_large_list_is_advisory_only() {
        let registry = SubscriptionRegistry::new();
        let symbols: Vec<String> = (0..250).map(|i| format!("SYM{}USDT", i)).collect();

        let command = registry.subscribe(Channel::BookTicker, symbols.as_slice()).unwrap();
        assert_eq!(command.params.len(), 250);
    }

    #[test]
    fn test_request_ids_increase() {
        let registry = SubscriptionRegistry::new();
        let a = registry.subscribe(Channel::BookTicker, &["A"]).unwrap();
        let b = registry.subscribe(Channel::BookTicker, &["B"]).unwrap();
        let c = registry.subscribe(Channel::AggTrade, &["A"]).unwrap();

        assert!(a.id < b.id && b.id < c.id);
    }

    #[test]
    fn test_send_without_socket_still_records() {
        let registry = SubscriptionRegistry::new();
        assert!(!registry.is_attached());

        registry.subscribe(Channel::BookTicker, &["ethusdt"]);
        assert!(registry.contains(Channel::BookTicker, "ETHUSDT"));
    }

    #[test]
    fn test_attach_replays_each_stream_once() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe(Channel::BookTicker, &["BTCUSDT", "ETHUSDT"]);
        registry.subscribe(Channel::AggTrade, &["BTCUSDT"]);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let replayed = registry.attach(tx);
        assert_eq!(replayed.len(), 2);

        let sent = drain(&mut rx);
        let streams: Vec<String> = sent
            .iter()
            .flat_map(|m| m["params"].as_array().unwrap().clone())
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            streams,
            vec!["btcusdt@bookTicker", "ethusdt@bookTicker", "btcusdt@aggTrade"]
        );

        // 재연결 시 다시 정확히 한 번씩
        registry.detach();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.attach(tx);
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[test]
    fn test_replay_on_empty_registry_sends_nothing() {
        let registry = SubscriptionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(registry.attach(tx).is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("bookticker".parse::<Channel>().unwrap(), Channel::BookTicker);
        assert_eq!("aggTrade".parse::<Channel>().unwrap(), Channel::AggTrade);
        assert!("depth".parse::<Channel>().is_err());
    }
}

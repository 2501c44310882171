//! 재연결 replay 통합 테스트 (로컬 WebSocket 서버 사용).

use connector_exchange::{
    Channel, ConnectionState, MemoryLog, PriceCache, StrategyDispatcher, StrategyRegistry,
    StreamConfig, StreamManager, SubscriptionRegistry,
};
use futures::{SinkExt, StreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tokio_util::sync::CancellationToken;

struct Harness {
    subscriptions: Arc<SubscriptionRegistry>,
    prices: Arc<PriceCache>,
    shutdown: CancellationToken,
    manager: Option<StreamManager>,
}

fn harness(url: String) -> Harness {
    let subscriptions = Arc::new(SubscriptionRegistry::new());
    let prices = Arc::new(PriceCache::new());
    let shutdown = CancellationToken::new();

    let manager = StreamManager::new(
        StreamConfig {
            url,
            reconnect_delay: Duration::from_millis(50),
            default_symbol: "BTCUSDT".to_string(),
        },
        Arc::clone(&subscriptions),
        StrategyDispatcher::new(Arc::clone(&prices), Arc::new(StrategyRegistry::new())),
        Arc::new(MemoryLog::new()),
        shutdown.clone(),
    );

    Harness {
        subscriptions,
        prices,
        shutdown,
        manager: Some(manager),
    }
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (tcp, _) = timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("client did not connect")
        .unwrap();
    accept_async(tcp).await.unwrap()
}

/// 다음 텍스트 프레임 하나를 JSON으로 읽습니다. 시간 안에 없으면 None.
async fn next_command(
    ws: &mut WebSocketStream<TcpStream>,
    wait: Duration,
) -> Option<serde_json::Value> {
    loop {
        match timeout(wait, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return Some(serde_json::from_str(&text).unwrap()),
            Ok(Some(Ok(_))) => continue,
            _ => return None,
        }
    }
}

fn streams(commands: &[serde_json::Value]) -> Vec<String> {
    commands
        .iter()
        .flat_map(|c| c["params"].as_array().cloned().unwrap_or_default())
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn reconnect_replays_every_subscription_once() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let mut h = harness(url);

    h.subscriptions.subscribe(Channel::BookTicker, &["ETHUSDT"]);
    h.subscriptions.subscribe(Channel::AggTrade, &["BTCUSDT"]);

    let manager = h.manager.take().unwrap();
    let mut state = manager.state();
    let task = manager.spawn();

    // 첫 연결: replay 2건 + 기본 심볼 1건
    let mut ws = accept(&listener).await;
    let mut first = Vec::new();
    for _ in 0..3 {
        first.push(next_command(&mut ws, Duration::from_secs(5)).await.expect("subscribe"));
    }
    assert!(first.iter().all(|c| c["method"] == "SUBSCRIBE"));
    assert_eq!(
        streams(&first).into_iter().collect::<BTreeSet<_>>(),
        BTreeSet::from([
            "ethusdt@bookTicker".to_string(),
            "btcusdt@aggTrade".to_string(),
            "btcusdt@bookTicker".to_string(),
        ])
    );
    let ids: Vec<u64> = first.iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    ws.send(Message::Text(
        r#"{"e":"bookTicker","s":"ETHUSDT","b":"2000.5","a":"2000.6"}"#.into(),
    ))
    .await
    .unwrap();
    timeout(Duration::from_secs(5), async {
        while h.prices.get("ETHUSDT").is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("quote never arrived");

    // 서버 측에서 연결을 끊는다
    ws.close(None).await.unwrap();
    drop(ws);

    // 두 번째 연결: 모든 구독이 정확히 한 번씩
    let mut ws = accept(&listener).await;
    let mut second = Vec::new();
    while let Some(cmd) = next_command(&mut ws, Duration::from_millis(500)).await {
        second.push(cmd);
    }
    let mut replayed = streams(&second);
    replayed.sort();
    assert_eq!(
        replayed,
        vec!["btcusdt@aggTrade", "btcusdt@bookTicker", "ethusdt@bookTicker"]
    );

    timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ConnectionState::Open),
    )
    .await
    .unwrap()
    .unwrap();

    h.shutdown.cancel();
    timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    assert_eq!(*state.borrow(), ConnectionState::Stopped);
}

#[tokio::test]
async fn empty_registry_still_gets_default_symbol() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let mut h = harness(url);

    let task = h.manager.take().unwrap().spawn();

    let mut ws = accept(&listener).await;
    let cmd = next_command(&mut ws, Duration::from_secs(5)).await.expect("default subscribe");
    assert_eq!(streams(&[cmd]), vec!["btcusdt@bookTicker"]);
    assert!(next_command(&mut ws, Duration::from_millis(300)).await.is_none());

    assert_eq!(h.subscriptions.symbols(Channel::BookTicker), vec!["BTCUSDT"]);

    h.shutdown.cancel();
    timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn subscribe_while_open_goes_straight_to_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let mut h = harness(url);

    let task = h.manager.take().unwrap().spawn();
    let mut ws = accept(&listener).await;
    next_command(&mut ws, Duration::from_secs(5)).await.expect("default subscribe");

    h.subscriptions.subscribe(Channel::AggTrade, &["SOLUSDT", "SOLUSDT"]);
    h.subscriptions.subscribe(Channel::AggTrade, &["SOLUSDT"]);

    let cmd = next_command(&mut ws, Duration::from_secs(5)).await.expect("subscribe");
    assert_eq!(streams(&[cmd]), vec!["solusdt@aggTrade"]);
    assert!(next_command(&mut ws, Duration::from_millis(300)).await.is_none());

    h.shutdown.cancel();
    timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

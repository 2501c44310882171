//! 종목별 최우선 호가 캐시.
//!
//! REST 스냅샷과 스트리밍 bookTicker가 모두 이 캐시에 씁니다 (생성 또는 갱신).
//! bid/ask 쌍은 하나의 쓰기 잠금 안에서 통째로 교체되므로, 읽는 쪽은 항상
//! 온전한 이전 값 또는 온전한 새 값만 봅니다. 일관성 모델은 마지막 쓰기 우선이며,
//! 각 쓰기는 캐시 전체에서 단조 증가하는 `version`을 부여받습니다.

use connector_core::{Price, PriceQuote, QuoteSource};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Inner {
    quotes: HashMap<String, PriceQuote>,
    last_version: u64,
}

/// 스레드 안전한 가격 캐시.
#[derive(Debug, Default)]
pub struct PriceCache {
    inner: RwLock<Inner>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 심볼의 bid/ask를 원자적으로 기록하고 기록된 시세를 반환합니다.
    pub fn update(&self, symbol: &str, bid: Price, ask: Price, source: QuoteSource) -> PriceQuote {
        let mut inner = self.inner.write();
        inner.last_version += 1;

        let quote = PriceQuote {
            bid,
            ask,
            version: inner.last_version,
            source,
        };

        match inner.quotes.get_mut(symbol) {
            Some(existing) => *existing = quote,
            None => {
                inner.quotes.insert(symbol.to_string(), quote);
            }
        }

        quote
    }

    /// 심볼의 현재 시세.
    pub fn get(&self, symbol: &str) -> Option<PriceQuote> {
        self.inner.read().quotes.get(symbol).copied()
    }

    /// 전체 캐시의 복사본.
    pub fn snapshot(&self) -> HashMap<String, PriceQuote> {
        self.inner.read().quotes.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

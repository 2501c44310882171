//! 종목 레지스트리.
//!
//! 시작 시 exchange-info 스냅샷을 한 번 로드해 심볼 → `Instrument` 맵을 만듭니다.
//! 로드에 실패하면 빈 레지스트리를 반환합니다 ("아직 거래 불가" 상태).

use crate::rest::{RestClient, Security};
use connector_core::{Instrument, Venue};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub(crate) struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    #[serde(default)]
    base_asset: String,
    #[serde(default)]
    quote_asset: String,
    #[serde(default)]
    price_precision: Option<u32>,
    #[serde(default)]
    quantity_precision: Option<u32>,
    #[serde(default)]
    base_asset_precision: Option<u32>,
    #[serde(default)]
    quote_precision: Option<u32>,
    #[serde(default)]
    filters: Vec<SymbolFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER")]
    Price {
        #[serde(rename = "tickSize")]
        tick_size: Decimal,
    },
    #[serde(rename = "LOT_SIZE")]
    LotSize {
        #[serde(rename = "stepSize")]
        step_size: Decimal,
    },
    #[serde(other)]
    Other,
}

impl SymbolInfo {
    fn into_instrument(self, venue: Venue) -> Instrument {
        let tick_filter = self.filters.iter().find_map(|f| match f {
            SymbolFilter::Price { tick_size } if !tick_size.is_zero() => Some(tick_size.normalize()),
            _ => None,
        });
        let lot_filter = self.filters.iter().find_map(|f| match f {
            SymbolFilter::LotSize { step_size } if !step_size.is_zero() => {
                Some(step_size.normalize())
            }
            _ => None,
        });

        let price_decimals = self
            .price_precision
            .or(self.quote_precision)
            .or_else(|| tick_filter.map(|t| t.scale()))
            .unwrap_or(8);
        let quantity_decimals = self
            .quantity_precision
            .or(self.base_asset_precision)
            .or_else(|| lot_filter.map(|l| l.scale()))
            .unwrap_or(8);

        Instrument {
            tick_size: tick_filter
                .unwrap_or_else(|| Instrument::increment_from_decimals(price_decimals)),
            lot_size: lot_filter
                .unwrap_or_else(|| Instrument::increment_from_decimals(quantity_decimals)),
            symbol: self.symbol,
            base_asset: self.base_asset,
            quote_asset: self.quote_asset,
            price_decimals,
            quantity_decimals,
            venue,
        }
    }
}

/// 심볼 → 종목 맵. 세션 동안 불변이며 복제 비용이 낮습니다.
#[derive(Debug, Clone, Default)]
pub struct InstrumentRegistry {
    instruments: Arc<HashMap<String, Instrument>>,
}

impl InstrumentRegistry {
    /// REST exchange-info 엔드포인트에서 종목 목록을 로드합니다.
    pub async fn load(rest: &RestClient, endpoint: &str, venue: Venue) -> Self {
        let info: Option<ExchangeInfo> = rest.get(endpoint, Vec::new(), Security::Public).await;

        match info {
            Some(info) => {
                let registry = Self::from_exchange_info(info, venue);
                info!(count = registry.len(), %venue, "Instruments loaded");
                registry
            }
            None => {
                error!(%venue, "Failed to load instruments, trading is unavailable until restart");
                Self::default()
            }
        }
    }

    pub(crate) fn from_exchange_info(info: ExchangeInfo, venue: Venue) -> Self {
        Self::from_instruments(info.symbols.into_iter().map(|s| s.into_instrument(venue)))
    }

    /// 종목 목록에서 레지스트리를 생성합니다.
    pub fn from_instruments(instruments: impl IntoIterator<Item = Instrument>) -> Self {
        let map = instruments
            .into_iter()
            .map(|i| (i.symbol.clone(), i))
            .collect();
        Self {
            instruments: Arc::new(map),
        }
    }

    /// 심볼로 종목을 조회합니다.
    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.get(symbol)
    }

    /// 전체 종목 맵.
    pub fn all(&self) -> &HashMap<String, Instrument> {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

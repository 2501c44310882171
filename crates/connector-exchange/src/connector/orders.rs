//! 주문 생애주기 연산.
//!
//! 수량은 `lot_size`, 가격은 `tick_size` 배수로 양자화한 뒤 서명된 요청으로 보냅니다.

use super::binance::BinanceConnector;
use super::wire::{OrderResponse, TradeFill};
use crate::rest::Security;
use crate::signer::Params;
use connector_core::{
    weighted_average_price, Fill, Instrument, OrderStatus, OrderType, Price, Quantity, Side,
    TimeInForce,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

impl BinanceConnector {
    /// 주문을 생성합니다.
    pub async fn place_order(
        &self,
        instrument: &Instrument,
        order_type: OrderType,
        quantity: Quantity,
        side: Side,
        price: Option<Price>,
        time_in_force: Option<TimeInForce>,
    ) -> Option<OrderStatus> {
        let Some(wire_quantity) = instrument.quantize_quantity(quantity) else {
            warn!(symbol = %instrument.symbol, %quantity, "Order quantity out of range");
            return None;
        };
        let mut params: Params = vec![
            ("symbol", instrument.symbol.clone()),
            ("side", side.as_wire().to_string()),
            ("quantity", wire_quantity.to_string()),
            ("type", order_type.as_wire().to_string()),
        ];
        if let Some(price) = price {
            let Some(wire_price) = instrument.quantize_price(price) else {
                warn!(symbol = %instrument.symbol, %price, "Order price out of range");
                return None;
            };
            params.push(("price", wire_price.to_string()));
        }
        if let Some(tif) = time_in_force {
            params.push(("timeInForce", tif.as_wire().to_string()));
        }

        let status = self
            .rest
            .post::<OrderResponse>(self.endpoints.order, params, Security::Signed)
            .await?
            .into_status();

        self.log.append(&format!(
            "{} {} {} order placed on {} (id {})",
            self.venue(),
            side,
            order_type,
            instrument.symbol,
            status.order_id
        ));
        Some(status)
    }

    /// 주문을 취소합니다.
    ///
    /// 현물 취소 응답에는 평균 체결가가 없으므로, 체결 내역에서 수량 가중 평균가를
    /// 계산해 `tick_size`로 양자화한 값을 채웁니다.
    pub async fn cancel_order(&self, instrument: &Instrument, order_id: i64) -> Option<OrderStatus> {
        let params: Params = vec![
            ("orderId", order_id.to_string()),
            ("symbol", instrument.symbol.clone()),
        ];

        let mut status = self
            .rest
            .delete::<OrderResponse>(self.endpoints.order, params, Security::Signed)
            .await?
            .into_status();

        if !self.venue().is_futures() {
            match self.execution_price(instrument, order_id).await {
                Some(avg) => status.avg_price = Some(avg),
                None => warn!(
                    symbol = %instrument.symbol,
                    order_id,
                    "Could not fetch fills, average price left as reported"
                ),
            }
        }

        self.log.append(&format!(
            "{} order {} on {} canceled",
            self.venue(),
            order_id,
            instrument.symbol
        ));
        Some(status)
    }

    /// 주문 상태를 조회합니다.
    pub async fn get_order_status(
        &self,
        instrument: &Instrument,
        order_id: i64,
    ) -> Option<OrderStatus> {
        let params: Params = vec![
            ("symbol", instrument.symbol.clone()),
            ("orderId", order_id.to_string()),
        ];

        self.rest
            .get::<OrderResponse>(self.endpoints.order, params, Security::Signed)
            .await
            .map(OrderResponse::into_status)
    }

    /// 주문의 체결 내역.
    pub async fn get_fills(&self, instrument: &Instrument, order_id: i64) -> Option<Vec<Fill>> {
        let params: Params = vec![
            ("symbol", instrument.symbol.clone()),
            ("orderId", order_id.to_string()),
        ];

        let fills = self
            .rest
            .get::<Vec<TradeFill>>(self.endpoints.my_trades, params, Security::Signed)
            .await?;

        Some(
            fills
                .into_iter()
                .map(Fill::from)
                .filter(|f| f.order_id == order_id)
                .collect(),
        )
    }

    /// 체결 내역의 수량 가중 평균가 (`tick_size` 양자화).
    async fn execution_price(&self, instrument: &Instrument, order_id: i64) -> Option<Price> {
        let fills = self.get_fills(instrument, order_id).await?;
        let avg = weighted_average_price(fills.iter().map(|f| (f.price, f.quantity)))?;
        instrument.quantize_price(avg)
    }

    /// 잔고 비율로 주문 수량을 계산합니다.
    ///
    /// `(증거금 자산 잔고 × balance_pct / 100) / price`를 `lot_size`로 양자화합니다.
    /// 잔고 조회에 실패하거나 증거금 자산이 없으면 `None`입니다.
    pub async fn get_trade_size(
        &self,
        instrument: &Instrument,
        price: Price,
        balance_pct: Decimal,
    ) -> Option<Quantity> {
        if price <= Decimal::ZERO {
            warn!(symbol = %instrument.symbol, %price, "Cannot size a trade at a non-positive price");
            return None;
        }

        let balances = self.get_balances().await?;
        let Some(balance) = balances.get(&self.config.margin_asset) else {
            warn!(asset = %self.config.margin_asset, "Margin asset missing from balances");
            return None;
        };

        let wallet = balance.wallet_balance;
        let Some(size) = wallet
            .checked_mul(balance_pct)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|v| v.checked_div(price))
            .and_then(|v| instrument.quantize_quantity(v))
        else {
            warn!(
                symbol = %instrument.symbol,
                balance = %wallet,
                %balance_pct,
                %price,
                "Trade size out of range"
            );
            return None;
        };

        info!(
            venue = %self.venue(),
            asset = %self.config.margin_asset,
            balance = %wallet,
            trade_size = %size,
            "Trade size computed"
        );
        Some(size)
    }
}

//! 잔고 조회와 주문 수량 계산.

use super::find_instrument;
use anyhow::{Context, Result};
use connector_core::{Balance, Price};
use connector_exchange::BinanceConnector;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// 잔고를 새로 조회해 출력합니다. 잔고가 0인 자산은 생략합니다.
pub async fn print_balances(connector: &BinanceConnector) -> Result<()> {
    let balances = connector
        .get_balances()
        .await
        .context("Failed to fetch balances")?;

    print!("{}", format_balances(&balances));
    Ok(())
}

fn format_balances(balances: &HashMap<String, Balance>) -> String {
    let mut rows: Vec<&Balance> = balances
        .values()
        .filter(|b| !b.wallet_balance.is_zero())
        .collect();
    rows.sort_by(|a, b| a.asset.cmp(&b.asset));

    let mut out = format!(
        "{:<8} {:>18} {:>18} {:>18} {:>18}\n",
        "ASSET", "WALLET", "MARGIN", "AVAILABLE", "UNREALIZED"
    );
    for b in rows {
        out.push_str(&format!(
            "{:<8} {:>18} {:>18} {:>18} {:>18}\n",
            b.asset,
            b.wallet_balance,
            b.margin_balance,
            b.available(),
            b.unrealized_pnl
        ));
    }
    out
}

/// 잔고 비율로 계산한 주문 수량을 출력합니다.
pub async fn print_trade_size(
    connector: &BinanceConnector,
    symbol: &str,
    price: Option<Price>,
    balance_pct: Decimal,
) -> Result<Decimal> {
    let instrument = find_instrument(connector, symbol)?;

    let price = match price {
        Some(price) => price,
        None => {
            connector
                .get_bid_ask(&instrument)
                .await
                .with_context(|| format!("No price available for {}", instrument.symbol))?
                .ask
        }
    };

    let size = connector
        .get_trade_size(&instrument, price, balance_pct)
        .await
        .with_context(|| format!("Could not compute trade size for {}", instrument.symbol))?;

    println!(
        "{} @ {} ({}% of {}): {}",
        instrument.symbol,
        price,
        balance_pct,
        connector.config().margin_asset,
        size
    );
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_balances_skips_empty_and_sorts() {
        let balances: HashMap<String, Balance> = [
            Balance::spot("USDT", dec!(900), dec!(100)),
            Balance::spot("BTC", dec!(0.5), dec!(0)),
            Balance::spot("ETH", dec!(0), dec!(0)),
        ]
        .into_iter()
        .map(|b| (b.asset.clone(), b))
        .collect();

        let table = format_balances(&balances);
        let assets: Vec<&str> = table
            .lines()
            .skip(1)
            .filter_map(|l| l.split_whitespace().next())
            .collect();
        assert_eq!(assets, vec!["BTC", "USDT"]);
        assert!(table.contains("1000"));
    }
}

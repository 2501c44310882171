//! 과거 캔들 조회.

use super::find_instrument;
use anyhow::Result;
use connector_core::{Candle, Timeframe};
use connector_exchange::BinanceConnector;
use tracing::info;

/// 캔들을 조회해 표로 출력합니다. 출력한 캔들 수를 반환합니다.
pub async fn print_candles(
    connector: &BinanceConnector,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<usize> {
    let instrument = find_instrument(connector, symbol)?;
    let candles = connector
        .get_historical_candles(&instrument, timeframe)
        .await;

    if candles.is_empty() {
        anyhow::bail!("No candles returned for {} {}", instrument.symbol, timeframe);
    }

    info!(symbol = %instrument.symbol, %timeframe, count = candles.len(), "Candles fetched");
    print!("{}", format_candles(&candles));
    Ok(candles.len())
}

fn format_candles(candles: &[Candle]) -> String {
    let mut out = format!(
        "{:<17} {:>14} {:>14} {:>14} {:>14} {:>16}\n",
        "OPEN TIME", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"
    );
    for c in candles {
        out.push_str(&format!(
            "{:<17} {:>14} {:>14} {:>14} {:>14} {:>16}\n",
            c.open_time.format("%Y-%m-%d %H:%M"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        ));
    }
    out
}

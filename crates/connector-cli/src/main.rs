//! Binance 커넥터 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 선물 bookTicker 스트리밍 (Ctrl-C로 종료)
//! connector stream -s BTCUSDT,ETHUSDT
//!
//! # 현물 테스트넷 aggTrade 스트리밍
//! connector --spot --testnet stream -s ETHUSDT -c aggTrade
//!
//! # 1시간봉 조회
//! connector candles -s BTCUSDT -i 1h
//!
//! # 잔고 10%로 살 수 있는 수량
//! connector trade-size -s BTCUSDT --pct 10
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use connector_cli::commands::{
    account::{print_balances, print_trade_size},
    connect,
    market::print_candles,
    stream::{run_stream, StreamOptions},
    ConnectOptions,
};
use connector_core::{init_logging, ConnectorSettings, LogConfig, Timeframe};
use connector_exchange::{Channel, MemoryLog, TracingLog};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "connector")]
#[command(about = "Binance futures/spot connector CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (기본: config/connector.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 테스트넷 사용
    #[arg(long, global = true)]
    testnet: bool,

    /// 현물 시장 사용 (기본: 선물)
    #[arg(long, global = true)]
    spot: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 실시간 시세 스트리밍 (Ctrl-C로 종료)
    Stream {
        /// 구독할 종목 (쉼표 구분)
        #[arg(short, long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,

        /// 채널 (bookTicker, aggTrade)
        #[arg(short, long, default_value = "bookTicker")]
        channel: Channel,

        /// 출력 주기 (초)
        #[arg(long, default_value_t = 2)]
        every: u64,
    },

    /// 과거 캔들 조회
    Candles {
        /// 종목 심볼
        #[arg(short, long)]
        symbol: String,

        /// 타임프레임 (1m, 5m, 15m, 30m, 1h, 4h, 1d, 1w, 1M)
        #[arg(short, long, default_value = "1h")]
        interval: Timeframe,
    },

    /// 계좌 잔고 조회
    Balances,

    /// 잔고 비율로 주문 수량 계산
    TradeSize {
        /// 종목 심볼
        #[arg(short, long)]
        symbol: String,

        /// 기준 가격 (생략 시 현재 매도 호가)
        #[arg(short, long)]
        price: Option<Decimal>,

        /// 사용할 잔고 비율 (%)
        #[arg(long, default_value = "10")]
        pct: Decimal,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => ConnectorSettings::load(Some(path)),
        None => ConnectorSettings::load_default(),
    }
    .context("Failed to load settings")?;

    init_logging(LogConfig::from_settings(&settings.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let options = ConnectOptions {
        testnet: cli.testnet,
        spot: cli.spot,
    };

    match cli.command {
        Commands::Stream {
            symbols,
            channel,
            every,
        } => {
            let log = Arc::new(MemoryLog::new());
            let connector = connect(&settings, &options, log.clone()).await?;
            info!(venue = %connector.venue(), "Streaming {} on {}", symbols.join(","), channel);

            run_stream(
                &connector,
                &log,
                StreamOptions {
                    symbols,
                    channel,
                    interval: Duration::from_secs(every.max(1)),
                },
            )
            .await?;
        }
        Commands::Candles { symbol, interval } => {
            let connector = connect(&settings, &options, Arc::new(TracingLog)).await?;
            print_candles(&connector, &symbol, interval).await?;
            connector.shutdown().await;
        }
        Commands::Balances => {
            let connector = connect(&settings, &options, Arc::new(TracingLog)).await?;
            print_balances(&connector).await?;
            connector.shutdown().await;
        }
        Commands::TradeSize { symbol, price, pct } => {
            let connector = connect(&settings, &options, Arc::new(TracingLog)).await?;
            print_trade_size(&connector, &symbol, price, pct).await?;
            connector.shutdown().await;
        }
    }

    Ok(())
}

//! 과거 캔들 조회용 타임프레임.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 캔들스틱 타임프레임 (거래소 kline 간격).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    M1,
    M3,
    M5,
    M15,
    M30,
    H1,
    H2,
    H4,
    H6,
    H8,
    H12,
    D1,
    D3,
    W1,
    /// 월봉
    MN1,
}

const INTERVALS: [(Timeframe, &str); 15] = [
    (Timeframe::M1, "1m"),
    (Timeframe::M3, "3m"),
    (Timeframe::M5, "5m"),
    (Timeframe::M15, "15m"),
    (Timeframe::M30, "30m"),
    (Timeframe::H1, "1h"),
    (Timeframe::H2, "2h"),
    (Timeframe::H4, "4h"),
    (Timeframe::H6, "6h"),
    (Timeframe::H8, "8h"),
    (Timeframe::H12, "12h"),
    (Timeframe::D1, "1d"),
    (Timeframe::D3, "3d"),
    (Timeframe::W1, "1w"),
    (Timeframe::MN1, "1M"),
];

impl Timeframe {
    /// 거래소 `interval` 파라미터 문자열.
    pub fn as_interval(&self) -> &'static str {
        INTERVALS
            .iter()
            .find(|(tf, _)| tf == self)
            .map(|(_, s)| *s)
            .unwrap_or("1m")
    }

    /// `interval` 문자열에서 파싱합니다. 월봉 `1M`만 대소문자를 구분합니다.
    pub fn from_interval(s: &str) -> Option<Self> {
        INTERVALS
            .iter()
            .find(|(_, interval)| *interval == s)
            .map(|(tf, _)| *tf)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_interval())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_interval(s).ok_or_else(|| format!("Invalid timeframe: {}", s))
    }
}

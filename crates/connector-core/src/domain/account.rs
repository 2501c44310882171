//! 계좌 잔고.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 자산별 잔고.
///
/// 명시적인 REST 호출 결과로만 생성되며 호출 이후에는 캐시되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// 자산 이름 (예: "USDT")
    pub asset: String,
    /// 지갑 잔고
    pub wallet_balance: Decimal,
    /// 개시 증거금
    pub initial_margin: Decimal,
    /// 유지 증거금
    pub maintenance_margin: Decimal,
    /// 증거금 잔고 (지갑 잔고 + 미실현 손익)
    pub margin_balance: Decimal,
    /// 미실현 손익
    pub unrealized_pnl: Decimal,
}

impl Balance {
    /// 현물 잔고(`free`, `locked`)에서 생성합니다. 증거금 항목은 0입니다.
    pub fn spot(asset: impl Into<String>, free: Decimal, locked: Decimal) -> Self {
        let total = free + locked;
        Self {
            asset: asset.into(),
            wallet_balance: total,
            initial_margin: Decimal::ZERO,
            maintenance_margin: Decimal::ZERO,
            margin_balance: total,
            unrealized_pnl: Decimal::ZERO,
        }
    }

    /// 사용 가능한 증거금 (증거금 잔고 - 개시 증거금).
    pub fn available(&self) -> Decimal {
        self.margin_balance - self.initial_margin
    }
}

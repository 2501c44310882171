//! 거래소 정밀도 규칙을 위한 Decimal 유틸리티.
//!
//! 주문 가격/수량은 거래소가 정한 증분(`tick_size`, `lot_size`)의 배수여야 합니다.
//! 이 모듈은 값을 가장 가까운 배수로 맞추는 양자화와,
//! 체결 목록에서 수량 가중 평균 체결가를 계산하는 기능을 제공합니다.

use rust_decimal::{Decimal, RoundingStrategy};

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 주문 수량을 위한 타입.
pub type Quantity = Decimal;

/// 양자화 후 유지하는 최대 소수점 자릿수.
pub const WIRE_DECIMALS: u32 = 8;

/// 값을 `step`의 가장 가까운 배수로 양자화합니다.
///
/// 배수 선택은 은행가 반올림(half-to-even)을 따르고, 결과는 `step`의 소수점 자릿수
/// (최대 8자리)로 표기됩니다. `step`이 0 이하이면 8자리 반올림만 적용합니다.
/// 연산이 Decimal 범위를 넘으면 `None`입니다.
///
/// # Examples
///
/// ```
/// use connector_core::quantize;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(quantize(dec!(1.0004), dec!(0.001)).unwrap().to_string(), "1.000");
/// assert_eq!(quantize(dec!(50000.006), dec!(0.01)), Some(dec!(50000.01)));
/// assert_eq!(quantize(rust_decimal::Decimal::MAX, dec!(0.001)), None);
/// ```
pub fn quantize(value: Decimal, step: Decimal) -> Option<Decimal> {
    if step <= Decimal::ZERO {
        return Some(round_wire(value));
    }

    let steps = value
        .checked_div(step)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let scale = step.normalize().scale().min(WIRE_DECIMALS);

    let mut quantized = steps
        .checked_mul(step)?
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);
    quantized.rescale(scale);
    Some(quantized)
}

/// 소수점 8자리로 반올림하고 불필요한 0을 제거합니다.
pub fn round_wire(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(WIRE_DECIMALS, RoundingStrategy::MidpointNearestEven)
        .normalize()
}

/// 수량 가중 평균 가격을 계산합니다.
///
/// `Σ(price × qty / total_qty)` 를 반환하며, 총 수량이 0이면 0을 반환합니다.
/// 합계가 Decimal 범위를 넘으면 `None`입니다.
pub fn weighted_average_price<I>(fills: I) -> Option<Decimal>
where
    I: IntoIterator<Item = (Price, Quantity)>,
    I::IntoIter: Clone,
{
    let mut fills = fills.into_iter();
    let total = fills
        .clone()
        .try_fold(Decimal::ZERO, |acc, (_, qty)| acc.checked_add(qty))?;

    if total.is_zero() {
        return Some(Decimal::ZERO);
    }

    fills.try_fold(Decimal::ZERO, |acc, (price, qty)| {
        acc.checked_add(price.checked_mul(qty.checked_div(total)?)?)
    })
}

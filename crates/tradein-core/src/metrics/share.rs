use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::records::TradeInRecord;
use crate::types::{Money, Percent};

/// Safe percentage: returns Decimal::ZERO when the denominator is zero.
pub(crate) fn safe_pct(numerator: Decimal, denominator: Decimal) -> Percent {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator * dec!(100) / denominator
    }
}

/// Share of combined Maple + Cashify transactions captured by Maple.
///
/// The same formula serves every attribution level; callers choose what
/// the two counts cover.
pub fn market_share(maple_count: usize, cashify_count: usize) -> Percent {
    safe_pct(
        Decimal::from(maple_count),
        Decimal::from(maple_count + cashify_count),
    )
}

/// Maple acquisitions as a percentage of the monthly target. A target of 0
/// (vacant position) yields 0.
pub fn target_attainment(maple_count: usize, target: u32) -> Percent {
    safe_pct(Decimal::from(maple_count), Decimal::from(target))
}

/// Target minus achievement; negative when the target was exceeded.
pub fn shortfall(target: u32, maple_count: usize) -> i64 {
    i64::from(target) - maple_count as i64
}

/// Arithmetic mean, `None` when there are no values or the running sum
/// leaves the Decimal range.
pub(crate) fn checked_mean<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut sum = Decimal::ZERO;
    let mut n = 0u64;
    for v in values {
        match sum.checked_add(v) {
            Some(next) => sum = next,
            None => {
                warn!(after = n, "sum overflowed Decimal range; mean left undefined");
                return None;
            }
        }
        n += 1;
    }
    if n == 0 {
        None
    } else {
        sum.checked_div(Decimal::from(n))
    }
}

/// Mean device value over the records that carry one.
pub fn mean_device_value<'a, I>(records: I) -> Option<Money>
where
    I: IntoIterator<Item = &'a TradeInRecord>,
{
    checked_mean(records.into_iter().filter_map(|r| r.device_value))
}

/// Mean Maple value minus mean Cashify value over the same scope; 0 when
/// either side has no values or the difference is out of range.
pub fn average_price_differential<'a, A, B>(maple: A, cashify: B) -> Money
where
    A: IntoIterator<Item = &'a TradeInRecord>,
    B: IntoIterator<Item = &'a TradeInRecord>,
{
    match (mean_device_value(maple), mean_device_value(cashify)) {
        (Some(m), Some(c)) => m.checked_sub(c).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

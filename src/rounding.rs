// src/rounding.rs
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

// Half-up rounding on non-negative quantities; negatives and garbage clamp to 0.

pub fn round_half_up(value: Decimal) -> u32 {
    if value <= dec!(0) {
        return 0;
    }
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(u32::MAX)
}

pub fn round_half_up_f64(value: f64) -> u32 {
    round_half_up(to_decimal(value))
}

/// `round(numerator / denominator)`, or 0 when there is nothing to divide by.
pub fn rounded_share(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    round_half_up(Decimal::from(numerator) / Decimal::from(denominator))
}

/// Converts a stored float to `Decimal`, mapping NaN/infinity to zero.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Splits a day count into (morning, afternoon) with the odd person going
/// to the afternoon.
pub fn split_halves(total: u32) -> (u32, u32) {
    let morning = total / 2;
    (morning, total - morning)
}

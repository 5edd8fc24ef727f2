//! Shared rounding rules.
//!
//! All tax amounts are whole KRW; rates are kept at a fixed number of decimal
//! places so values survive save/load cycles bit-identically. Both use
//! half-up (away from zero) rounding, the convention of the tax office.

use rust_decimal::Decimal;

/// Decimal places kept for bracket rates and the urban-area surtax rate.
pub const BRACKET_RATE_DP: u32 = 4;

/// Decimal places kept for the education rate and fair-market ratios.
pub const RATIO_DP: u32 = 3;

/// Rounds a tax amount to whole won, half-up.
pub fn round_won(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a percentage to `dp` decimal places, half-up.
pub fn round_rate(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

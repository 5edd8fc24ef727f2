use rust_decimal::Decimal;

use crate::calculations::common::round_won;
use crate::models::RateBracket;

/// Computes a progressive (bracketed) tax for `taxable_base`.
///
/// The active bracket is the one whose range contains the base:
/// `lower_bound < taxable_base` and, unless the bracket is unbounded,
/// `taxable_base <= upper_bound`. The tax is the bracket's flat base amount
/// plus its marginal rate applied to the excess over the lower bound, rounded
/// to whole won.
///
/// Returns zero for a non-positive base or when no bracket matches.
pub fn progressive_tax(
    taxable_base: Decimal,
    brackets: &[RateBracket],
) -> Decimal {
    if taxable_base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let Some(bracket) = brackets.iter().find(|b| {
        taxable_base > b.lower_bound
            && b.upper_bound.is_none_or(|upper| taxable_base <= upper)
    }) else {
        return Decimal::ZERO;
    };

    let marginal = (taxable_base - bracket.lower_bound) * bracket.rate_percent
        / Decimal::ONE_HUNDRED;

    round_won(bracket.base_amount + marginal)
}

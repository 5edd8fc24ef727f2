//! Built-in rate set.
//!
//! Used to seed a fresh data directory and whenever a year is added without
//! a base year to copy. The figures are the standard Local Tax Act
//! schedules: whole-won bracket bases, percentage rates.

use std::collections::BTreeMap;

use proptax_core::{AssetType, RateBracket, RateTable, TaxationType, YearRates};
use rust_decimal::Decimal;

fn pct(
    mantissa: i64,
    scale: u32,
) -> Decimal {
    Decimal::new(mantissa, scale)
}

fn bracket(
    lower: i64,
    upper: Option<i64>,
    base: i64,
    rate: Decimal,
) -> RateBracket {
    RateBracket {
        lower_bound: Decimal::from(lower),
        upper_bound: upper.map(Decimal::from),
        base_amount: Decimal::from(base),
        rate_percent: rate,
    }
}

/// Housing, general regime: 0.1% up to 60M, then 0.15% / 0.25% / 0.4%.
fn housing_brackets() -> Vec<RateBracket> {
    vec![
        bracket(0, Some(60_000_000), 0, pct(1, 1)),
        bracket(60_000_000, Some(150_000_000), 60_000, pct(15, 2)),
        bracket(150_000_000, Some(300_000_000), 195_000, pct(25, 2)),
        bracket(300_000_000, None, 570_000, pct(4, 1)),
    ]
}

/// Buildings, general regime: flat 0.25%.
fn building_brackets() -> Vec<RateBracket> {
    vec![bracket(0, None, 0, pct(25, 2))]
}

/// Land, aggregated regime: 0.2% / 0.3% / 0.5%.
fn land_aggregated_brackets() -> Vec<RateBracket> {
    vec![
        bracket(0, Some(50_000_000), 0, pct(2, 1)),
        bracket(50_000_000, Some(100_000_000), 100_000, pct(3, 1)),
        bracket(100_000_000, None, 250_000, pct(5, 1)),
    ]
}

/// Land, separately assessed regime: 0.2% / 0.3% / 0.4%.
fn land_separately_assessed_brackets() -> Vec<RateBracket> {
    vec![
        bracket(0, Some(200_000_000), 0, pct(2, 1)),
        bracket(200_000_000, Some(1_000_000_000), 400_000, pct(3, 1)),
        bracket(1_000_000_000, None, 2_800_000, pct(4, 1)),
    ]
}

/// Land, separate taxation regime: flat 0.2%.
fn land_separately_taxed_brackets() -> Vec<RateBracket> {
    vec![bracket(0, None, 0, pct(2, 1))]
}

/// Regional resource tax (fire-service portion), asset-type independent.
fn regional_resource_brackets() -> Vec<RateBracket> {
    vec![
        bracket(0, Some(6_000_000), 0, pct(4, 2)),
        bracket(6_000_000, Some(13_000_000), 2_400, pct(5, 2)),
        bracket(13_000_000, Some(26_000_000), 5_900, pct(6, 2)),
        bracket(26_000_000, Some(39_000_000), 13_700, pct(8, 2)),
        bracket(39_000_000, Some(64_000_000), 24_100, pct(1, 1)),
        bracket(64_000_000, None, 49_100, pct(12, 2)),
    ]
}

/// The complete default rate set for one year.
pub fn default_year_rates() -> YearRates {
    YearRates {
        property_tax: BTreeMap::from([
            (
                AssetType::Land,
                BTreeMap::from([
                    (
                        TaxationType::AggregatedTaxed,
                        land_aggregated_brackets(),
                    ),
                    (
                        TaxationType::SeparatelyAssessed,
                        land_separately_assessed_brackets(),
                    ),
                    (TaxationType::SeparatelyTaxed, land_separately_taxed_brackets()),
                ]),
            ),
            (
                AssetType::Building,
                BTreeMap::from([(TaxationType::Other, building_brackets())]),
            ),
            (
                AssetType::Housing,
                BTreeMap::from([(TaxationType::Other, housing_brackets())]),
            ),
        ]),
        urban_area_rate: pct(14, 2),
        education_rate: Decimal::from(20),
        regional_resource: regional_resource_brackets(),
        fair_market_ratio: BTreeMap::from([
            (AssetType::Land, Decimal::from(70)),
            (AssetType::Building, Decimal::from(70)),
            (AssetType::Housing, Decimal::from(60)),
        ]),
    }
}

/// A rate table seeded with the defaults for a single year.
pub fn default_rate_table(year: i32) -> RateTable {
    BTreeMap::from([(year, default_year_rates())])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptax_core::validate_brackets;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn every_default_schedule_is_valid() {
        let rates = default_year_rates();

        for (asset_type, by_taxation) in &rates.property_tax {
            for (taxation_type, brackets) in by_taxation {
                assert_eq!(
                    validate_brackets(brackets),
                    Vec::<String>::new(),
                    "invalid default schedule for {asset_type:?}/{taxation_type:?}"
                );
            }
        }
        assert_eq!(validate_brackets(&rates.regional_resource), Vec::<String>::new());
    }

    #[test]
    fn every_asset_type_has_its_legal_taxation_schedules() {
        let rates = default_year_rates();

        for asset_type in AssetType::ALL {
            for taxation_type in asset_type.taxation_types() {
                assert!(
                    rates.brackets(asset_type, *taxation_type).is_some(),
                    "missing default schedule for {asset_type:?}/{taxation_type:?}"
                );
            }
            assert!(rates.ratio(asset_type).is_some());
        }
    }

    #[test]
    fn default_surtax_rates_match_the_statute() {
        let rates = default_year_rates();

        assert_eq!(rates.urban_area_rate, dec!(0.14));
        assert_eq!(rates.education_rate, dec!(20));
    }

    #[test]
    fn bracket_bases_are_consistent_at_the_boundaries() {
        // Each bracket's base amount must equal the tax accumulated through
        // the previous brackets, otherwise the schedule jumps at a boundary.
        let rates = default_year_rates();
        let mut schedules: Vec<&Vec<RateBracket>> = rates
            .property_tax
            .values()
            .flat_map(|by_taxation| by_taxation.values())
            .collect();
        schedules.push(&rates.regional_resource);

        for schedule in schedules {
            for pair in schedule.windows(2) {
                let span = pair[0].upper_bound.unwrap() - pair[0].lower_bound;
                let accumulated =
                    pair[0].base_amount + span * pair[0].rate_percent / dec!(100);
                assert_eq!(
                    accumulated, pair[1].base_amount,
                    "base mismatch between brackets at {}",
                    pair[1].lower_bound
                );
            }
        }
    }
}

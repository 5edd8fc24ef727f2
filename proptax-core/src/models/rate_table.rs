use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset::{AssetType, TaxationType};
use super::rate_bracket::RateBracket;

/// The complete rate set for one tax year: progressive property-tax schedules
/// per asset and taxation type, the two flat surtax rates, the asset-type
/// independent regional resource schedule, and the fair-market-value ratios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRates {
    pub property_tax: BTreeMap<AssetType, BTreeMap<TaxationType, Vec<RateBracket>>>,

    /// Urban-area surtax percentage, applied to the taxable base of assets
    /// flagged as urban.
    pub urban_area_rate: Decimal,

    /// Local education tax percentage, applied to the property-tax amount.
    pub education_rate: Decimal,

    pub regional_resource: Vec<RateBracket>,

    /// Percentage of the assessed value that forms the taxable base.
    pub fair_market_ratio: BTreeMap<AssetType, Decimal>,
}

impl YearRates {
    pub fn brackets(
        &self,
        asset_type: AssetType,
        taxation_type: TaxationType,
    ) -> Option<&[RateBracket]> {
        self.property_tax
            .get(&asset_type)
            .and_then(|by_taxation| by_taxation.get(&taxation_type))
            .map(Vec::as_slice)
    }

    pub fn ratio(
        &self,
        asset_type: AssetType,
    ) -> Option<Decimal> {
        self.fair_market_ratio.get(&asset_type).copied()
    }
}

/// All rate data, keyed by year. Year keys are strings only at the JSON
/// boundary; in memory they are plain integers.
pub type RateTable = BTreeMap<i32, YearRates>;

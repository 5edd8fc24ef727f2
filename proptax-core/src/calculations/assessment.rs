//! Per-asset property-tax assessment.
//!
//! One assessment covers the four components levied on a property for a
//! year: the progressive property tax itself, the urban-area surtax, the
//! local education tax and the regional resource tax. The computation order
//! and the bases each component is levied on follow the Local Tax Act:
//! the urban-area surtax is a percentage of the **taxable base**, while the
//! education tax is a percentage of the **property-tax amount**. That
//! asymmetry is statutory, not an implementation accident.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use rust_decimal_macros::dec;
//! use proptax_core::calculations::TaxAssessment;
//! use proptax_core::{Asset, AssetType, RateBracket, TaxationType, YearRates, YearSnapshot};
//!
//! let rates = YearRates {
//!     property_tax: BTreeMap::from([(
//!         AssetType::Housing,
//!         BTreeMap::from([(
//!             TaxationType::Other,
//!             vec![
//!                 RateBracket {
//!                     lower_bound: dec!(0),
//!                     upper_bound: Some(dec!(60_000_000)),
//!                     base_amount: dec!(0),
//!                     rate_percent: dec!(0.1),
//!                 },
//!                 RateBracket {
//!                     lower_bound: dec!(60_000_000),
//!                     upper_bound: None,
//!                     base_amount: dec!(60_000),
//!                     rate_percent: dec!(0.15),
//!                 },
//!             ],
//!         )]),
//!     )]),
//!     urban_area_rate: dec!(0.14),
//!     education_rate: dec!(20),
//!     regional_resource: vec![RateBracket {
//!         lower_bound: dec!(0),
//!         upper_bound: None,
//!         base_amount: dec!(0),
//!         rate_percent: dec!(0.04),
//!     }],
//!     fair_market_ratio: BTreeMap::from([(AssetType::Housing, dec!(60))]),
//! };
//!
//! let asset = Asset {
//!     asset_id: "A-001".to_string(),
//!     name: "사택".to_string(),
//!     asset_type: AssetType::Housing,
//!     detail_type: "아파트".to_string(),
//!     taxation_type: TaxationType::Other,
//!     urban_area: false,
//!     group_id: "HQ".to_string(),
//!     province: "서울특별시".to_string(),
//!     city: "강남구".to_string(),
//!     address: "테헤란로 1".to_string(),
//!     area: dec!(84.5),
//!     yearly: BTreeMap::from([(
//!         2024,
//!         YearSnapshot {
//!             applicable_year: 2024,
//!             published_land_price: dec!(0),
//!             standard_market_value: dec!(100_000_000),
//!             building_market_value: None,
//!             reduction_rate: dec!(0),
//!             surcharge_rate: dec!(0),
//!             valid_through: None,
//!         },
//!     )]),
//! };
//!
//! let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();
//! assert_eq!(result.taxable_base, dec!(60_000_000));
//! assert_eq!(result.property_tax, dec!(60_000));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::round_won;
use crate::calculations::progressive::progressive_tax;
use crate::models::{Asset, AssetCalculation, AssetType, YearRates};

/// Assessor bound to one year's rate set.
#[derive(Debug, Clone)]
pub struct TaxAssessment<'a> {
    rates: &'a YearRates,
}

impl<'a> TaxAssessment<'a> {
    pub fn new(rates: &'a YearRates) -> Self {
        Self { rates }
    }

    /// Computes the itemized liability of `asset` for `year`.
    ///
    /// Returns `None` when the asset carries no valuation snapshot for the
    /// year; a missing schedule or ratio inside the rate set degrades to a
    /// zero component instead, so a partially configured year still yields a
    /// result.
    pub fn assess(
        &self,
        asset: &Asset,
        year: i32,
    ) -> Option<AssetCalculation> {
        let snapshot = asset.yearly.get(&year)?;
        let mut steps = Vec::new();

        // 1. Assessed base: housing may carry a separate building valuation.
        let base_amount = match (asset.asset_type, snapshot.building_market_value) {
            (AssetType::Housing, Some(building)) => {
                steps.push(format!("base amount {building} won (building market value)"));
                building
            }
            _ => {
                steps.push(format!(
                    "base amount {} won (standard market value)",
                    snapshot.standard_market_value
                ));
                snapshot.standard_market_value
            }
        };

        // 2. Fair-market-value ratio.
        let ratio = self
            .rates
            .ratio(asset.asset_type)
            .unwrap_or(Decimal::ONE_HUNDRED);
        let before_reduction = round_won(base_amount * ratio / Decimal::ONE_HUNDRED);
        steps.push(format!(
            "fair-market ratio {ratio}% applied: {before_reduction} won"
        ));

        // 3. Reduction. Logged even when zero so the trail shows it was
        // considered.
        let taxable_base = if snapshot.reduction_rate > Decimal::ZERO {
            round_won(
                before_reduction * (Decimal::ONE_HUNDRED - snapshot.reduction_rate)
                    / Decimal::ONE_HUNDRED,
            )
        } else {
            before_reduction
        };
        steps.push(format!(
            "reduction {}% applied: taxable base {taxable_base} won",
            snapshot.reduction_rate
        ));

        // 4. Progressive property tax.
        let taxation_type = asset.normalized_taxation();
        let brackets = self
            .rates
            .brackets(asset.asset_type, taxation_type)
            .unwrap_or(&[]);
        let property_tax = progressive_tax(taxable_base, brackets);
        steps.push(format!(
            "property tax ({} / {}): {property_tax} won",
            asset.asset_type.as_str(),
            taxation_type.as_str()
        ));

        // 5. Urban-area surtax, levied on the taxable base.
        let urban_area_tax = if asset.urban_area {
            round_won(taxable_base * self.rates.urban_area_rate / Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };
        steps.push(format!(
            "urban-area tax ({}%, urban={}): {urban_area_tax} won",
            self.rates.urban_area_rate,
            if asset.urban_area { "Y" } else { "N" }
        ));

        // 6. Education tax, levied on the property-tax amount.
        let education_tax =
            round_won(property_tax * self.rates.education_rate / Decimal::ONE_HUNDRED);
        steps.push(format!(
            "education tax ({}% of property tax): {education_tax} won",
            self.rates.education_rate
        ));

        // 7. Regional resource tax. Land is exempt by law.
        let regional_resource_tax =
            self.regional_resource_tax(asset, taxable_base, snapshot.surcharge_rate, &mut steps);

        // 8. Total.
        let total_tax = property_tax + urban_area_tax + education_tax + regional_resource_tax;
        steps.push(format!("total {total_tax} won"));

        Some(AssetCalculation {
            asset_id: asset.asset_id.clone(),
            asset_name: asset.name.clone(),
            base_amount,
            taxable_base,
            property_tax,
            urban_area_tax,
            education_tax,
            regional_resource_tax,
            total_tax,
            steps,
        })
    }

    fn regional_resource_tax(
        &self,
        asset: &Asset,
        taxable_base: Decimal,
        surcharge_rate: Decimal,
        steps: &mut Vec<String>,
    ) -> Decimal {
        if asset.asset_type == AssetType::Land {
            steps.push("regional resource tax: 0 won (land is exempt)".to_string());
            return Decimal::ZERO;
        }

        let mut regional = progressive_tax(taxable_base, &self.rates.regional_resource);
        steps.push(format!("regional resource tax: {regional} won"));

        if surcharge_rate > Decimal::ZERO {
            let surcharge = round_won(regional * surcharge_rate / Decimal::ONE_HUNDRED);
            regional += surcharge;
            steps.push(format!(
                "regional resource surcharge {surcharge_rate}%: +{surcharge} won"
            ));
        }

        regional
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{RateBracket, TaxationType, YearSnapshot};

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

    fn test_rates() -> YearRates {
        YearRates {
            property_tax: BTreeMap::from([
                (
                    AssetType::Housing,
                    BTreeMap::from([(
                        TaxationType::Other,
                        vec![
                            bracket(0, Some(60_000_000), 0, dec!(0.1)),
                            bracket(60_000_000, Some(150_000_000), 60_000, dec!(0.15)),
                            bracket(150_000_000, Some(300_000_000), 195_000, dec!(0.25)),
                            bracket(300_000_000, None, 570_000, dec!(0.4)),
                        ],
                    )]),
                ),
                (
                    AssetType::Land,
                    BTreeMap::from([(
                        TaxationType::AggregatedTaxed,
                        vec![
                            bracket(0, Some(50_000_000), 0, dec!(0.2)),
                            bracket(50_000_000, Some(100_000_000), 100_000, dec!(0.3)),
                            bracket(100_000_000, None, 250_000, dec!(0.5)),
                        ],
                    )]),
                ),
            ]),
            urban_area_rate: dec!(0.14),
            education_rate: dec!(20),
            regional_resource: vec![
                bracket(0, Some(6_000_000), 0, dec!(0.04)),
                bracket(6_000_000, Some(13_000_000), 2_400, dec!(0.05)),
                bracket(13_000_000, Some(26_000_000), 5_900, dec!(0.06)),
                bracket(26_000_000, Some(39_000_000), 13_700, dec!(0.08)),
                bracket(39_000_000, Some(64_000_000), 24_100, dec!(0.1)),
                bracket(64_000_000, None, 49_100, dec!(0.12)),
            ],
            fair_market_ratio: BTreeMap::from([
                (AssetType::Land, dec!(70)),
                (AssetType::Building, dec!(70)),
                (AssetType::Housing, dec!(60)),
            ]),
        }
    }

    fn snapshot(year: i32) -> YearSnapshot {
        YearSnapshot {
            applicable_year: year,
            published_land_price: dec!(0),
            standard_market_value: dec!(850_000_000),
            building_market_value: None,
            reduction_rate: dec!(0),
            surcharge_rate: dec!(0),
            valid_through: None,
        }
    }

    fn housing_asset() -> Asset {
        Asset {
            asset_id: "A-001".to_string(),
            name: "사택 101동".to_string(),
            asset_type: AssetType::Housing,
            detail_type: "아파트".to_string(),
            taxation_type: TaxationType::Other,
            urban_area: true,
            group_id: "HQ".to_string(),
            province: "서울특별시".to_string(),
            city: "강남구".to_string(),
            address: "테헤란로 1".to_string(),
            area: dec!(84.5),
            yearly: BTreeMap::from([(2024, snapshot(2024))]),
        }
    }

    #[test]
    fn urban_housing_full_breakdown() {
        // 850M × 60% = 510M taxable base, top housing bracket:
        // property 570,000 + 210M × 0.4% = 1,410,000
        // urban 510M × 0.14% = 714,000
        // education 1,410,000 × 20% = 282,000
        // regional 49,100 + 446M × 0.12% = 584,300
        let rates = test_rates();
        let asset = housing_asset();

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        assert_eq!(result.base_amount, dec!(850_000_000));
        assert_eq!(result.taxable_base, dec!(510_000_000));
        assert_eq!(result.property_tax, dec!(1_410_000));
        assert_eq!(result.urban_area_tax, dec!(714_000));
        assert_eq!(result.education_tax, dec!(282_000));
        assert_eq!(result.regional_resource_tax, dec!(584_300));
        assert_eq!(result.total_tax, dec!(2_990_300));
    }

    #[test]
    fn missing_snapshot_returns_none() {
        let rates = test_rates();
        let asset = housing_asset();

        assert_eq!(TaxAssessment::new(&rates).assess(&asset, 2023), None);
    }

    #[test]
    fn building_market_value_replaces_standard_value_for_housing() {
        let rates = test_rates();
        let mut asset = housing_asset();
        asset.yearly.get_mut(&2024).unwrap().building_market_value = Some(dec!(100_000_000));

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        assert_eq!(result.base_amount, dec!(100_000_000));
        assert_eq!(result.taxable_base, dec!(60_000_000));
    }

    #[test]
    fn non_urban_asset_pays_no_urban_surtax() {
        let rates = test_rates();
        let mut asset = housing_asset();
        asset.urban_area = false;

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        assert_eq!(result.urban_area_tax, dec!(0));
        assert_eq!(result.total_tax, dec!(2_276_300));
    }

    #[test]
    fn urban_surtax_is_levied_on_the_taxable_base_not_the_tax() {
        let rates = test_rates();
        let asset = housing_asset();

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        // 0.14% of the 510M base, not of the 1,410,000 property tax.
        assert_eq!(result.urban_area_tax, dec!(714_000));
    }

    #[test]
    fn reduction_shrinks_the_taxable_base() {
        let rates = test_rates();
        let mut asset = housing_asset();
        asset.yearly.get_mut(&2024).unwrap().reduction_rate = dec!(50);

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        assert_eq!(result.taxable_base, dec!(255_000_000));
        // 195,000 + 105M × 0.25% = 457,500
        assert_eq!(result.property_tax, dec!(457_500));
    }

    #[test]
    fn zero_reduction_is_still_logged() {
        let rates = test_rates();
        let asset = housing_asset();

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        assert!(
            result.steps.iter().any(|s| s.contains("reduction 0%")),
            "steps: {:?}",
            result.steps
        );
    }

    #[test]
    fn land_is_exempt_from_regional_resource_tax() {
        let rates = test_rates();
        let mut asset = housing_asset();
        asset.asset_type = AssetType::Land;
        asset.taxation_type = TaxationType::AggregatedTaxed;

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        assert_eq!(result.regional_resource_tax, dec!(0));
    }

    #[test]
    fn surcharge_adds_to_the_regional_tax_once() {
        let rates = test_rates();
        let mut asset = housing_asset();
        asset.yearly.get_mut(&2024).unwrap().surcharge_rate = dec!(50);

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        // 584,300 + 50% = 876,450
        assert_eq!(result.regional_resource_tax, dec!(876_450));
    }

    #[test]
    fn invalid_taxation_type_is_assessed_under_the_category_default() {
        let rates = test_rates();
        let mut asset = housing_asset();
        asset.asset_type = AssetType::Land;
        asset.taxation_type = TaxationType::Other; // invalid for land

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        // Falls back to 종합합산: 250,000 + (595M − 100M) × 0.5% = 2,725,000
        assert_eq!(result.taxable_base, dec!(595_000_000));
        assert_eq!(result.property_tax, dec!(2_725_000));
    }

    #[test]
    fn steps_follow_the_statutory_order() {
        let rates = test_rates();
        let asset = housing_asset();

        let result = TaxAssessment::new(&rates).assess(&asset, 2024).unwrap();

        let markers = [
            "base amount",
            "fair-market ratio",
            "reduction",
            "property tax",
            "urban-area tax",
            "education tax",
            "regional resource tax",
            "total",
        ];
        let mut position = 0;
        for marker in markers {
            let found = result.steps[position..]
                .iter()
                .position(|s| s.contains(marker));
            assert!(found.is_some(), "missing step '{marker}': {:?}", result.steps);
            position += found.unwrap() + 1;
        }
    }
}

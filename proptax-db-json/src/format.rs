//! On-disk layout of the rates file.
//!
//! The file groups data by table first and year second (the layout the rest
//! of the tooling around these files expects), while the in-memory model is
//! year-first. The Korean table names and the sentinel upper bound are
//! preserved; year keys are JSON strings and become integers on load.

use std::collections::BTreeMap;

use proptax_core::{AssetType, RateBracket, RateTable, TaxationType, YearRates};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::defaults::default_year_rates;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SingleRate {
    #[serde(rename = "비율")]
    pub rate: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RatesFile {
    #[serde(rename = "재산세", default)]
    property_tax: BTreeMap<i32, BTreeMap<AssetType, BTreeMap<TaxationType, Vec<RateBracket>>>>,

    #[serde(rename = "재산세_도시지역분", default)]
    urban_area: BTreeMap<i32, SingleRate>,

    #[serde(rename = "지방교육세", default)]
    education: BTreeMap<i32, SingleRate>,

    #[serde(rename = "지역자원시설세", default)]
    regional_resource: BTreeMap<i32, Vec<RateBracket>>,

    #[serde(rename = "공정시장가액비율", default)]
    fair_market_ratio: BTreeMap<i32, BTreeMap<AssetType, Decimal>>,
}

impl RatesFile {
    pub fn from_table(table: &RateTable) -> Self {
        let mut file = RatesFile::default();
        for (year, rates) in table {
            file.property_tax.insert(*year, rates.property_tax.clone());
            file.urban_area.insert(
                *year,
                SingleRate {
                    rate: rates.urban_area_rate,
                },
            );
            file.education.insert(
                *year,
                SingleRate {
                    rate: rates.education_rate,
                },
            );
            file.regional_resource
                .insert(*year, rates.regional_resource.clone());
            file.fair_market_ratio
                .insert(*year, rates.fair_market_ratio.clone());
        }
        file
    }

    /// Rebuilds the year-first table. A year that appears in some tables but
    /// not others gets the defaults for the missing components, so a
    /// hand-edited or partially written file still loads.
    pub fn into_table(self) -> RateTable {
        let mut years: Vec<i32> = Vec::new();
        for year in self
            .property_tax
            .keys()
            .chain(self.urban_area.keys())
            .chain(self.education.keys())
            .chain(self.regional_resource.keys())
            .chain(self.fair_market_ratio.keys())
        {
            if !years.contains(year) {
                years.push(*year);
            }
        }

        let mut table = RateTable::new();
        for year in years {
            let mut rates: YearRates = default_year_rates();
            if let Some(property_tax) = self.property_tax.get(&year) {
                rates.property_tax = property_tax.clone();
            }
            if let Some(urban) = self.urban_area.get(&year) {
                rates.urban_area_rate = urban.rate;
            }
            if let Some(education) = self.education.get(&year) {
                rates.education_rate = education.rate;
            }
            if let Some(regional) = self.regional_resource.get(&year) {
                rates.regional_resource = regional.clone();
            }
            if let Some(ratio) = self.fair_market_ratio.get(&year) {
                rates.fair_market_ratio = ratio.clone();
            }
            table.insert(year, rates);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::defaults::default_rate_table;

    #[test]
    fn table_round_trips_through_the_file_layout() {
        let table = default_rate_table(2024);

        let file = RatesFile::from_table(&table);
        let json = serde_json::to_string_pretty(&file).unwrap();
        let reloaded: RatesFile = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded.into_table(), table);
    }

    #[test]
    fn file_uses_the_korean_table_names() {
        let file = RatesFile::from_table(&default_rate_table(2024));

        let json = serde_json::to_string_pretty(&file).unwrap();

        for table_name in [
            "재산세",
            "재산세_도시지역분",
            "지방교육세",
            "지역자원시설세",
            "공정시장가액비율",
        ] {
            assert!(json.contains(table_name), "missing table {table_name}");
        }
        assert!(json.contains("\"비율\""));
    }

    #[test]
    fn year_keys_are_strings_on_disk() {
        let file = RatesFile::from_table(&default_rate_table(2024));

        let json = serde_json::to_string(&file).unwrap();

        assert!(json.contains("\"2024\""), "got {json}");
    }

    #[test]
    fn unbounded_brackets_are_written_as_the_sentinel() {
        let file = RatesFile::from_table(&default_rate_table(2024));

        let json = serde_json::to_string(&file).unwrap();

        assert!(json.contains("1000000000000"), "got {json}");
    }

    #[test]
    fn partial_year_is_filled_from_the_defaults() {
        let json = r#"{"재산세_도시지역분": {"2025": {"비율": 0.2}}}"#;

        let file: RatesFile = serde_json::from_str(json).unwrap();
        let table = file.into_table();

        let rates = &table[&2025];
        assert_eq!(rates.urban_area_rate, dec!(0.2));
        // Missing components fall back to the defaults.
        assert_eq!(rates.education_rate, dec!(20));
        assert!(!rates.regional_resource.is_empty());
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{Datelike, Utc};
use proptax_core::calculations::common::{BRACKET_RATE_DP, RATIO_DP, round_rate};
use proptax_core::{
    Asset, AssetType, CalculationRecord, PropertyTaxStore, RateBracket, RateTable, StoreError,
    TaxationType, YearRates, validate_brackets,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::defaults::{default_rate_table, default_year_rates};
use crate::format::RatesFile;

const RATES_FILE: &str = "property_tax_rates.json";
const ASSETS_FILE: &str = "property_tax_assets.json";
const CALCULATIONS_FILE: &str = "property_tax_calculations.json";

/// Oldest year the store accepts rate data for. The upper limit is the
/// current year plus ten.
pub const MIN_RATE_YEAR: i32 = 2020;

/// Flat-file [`PropertyTaxStore`] keeping one JSON document per table.
///
/// Mutations follow a persist-then-commit discipline: the updated table is
/// written to disk first and only swapped into memory when the write
/// succeeded, so a failed save leaves both the file and the in-memory state
/// consistent.
pub struct JsonStore {
    data_dir: PathBuf,
    rates: RateTable,
    assets: BTreeMap<String, Asset>,
    calculations: BTreeMap<String, CalculationRecord>,
}

impl JsonStore {
    /// Opens (or seeds) the store under `data_dir`.
    ///
    /// Missing or unreadable files are replaced: the rates file with the
    /// built-in defaults for the current year, the other two with empty
    /// tables. Unreadable files are logged as warnings, never errors.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|error| {
            StoreError::Io(format!(
                "cannot create data directory '{}': {error}",
                data_dir.display()
            ))
        })?;

        let mut store = Self {
            data_dir,
            rates: RateTable::new(),
            assets: BTreeMap::new(),
            calculations: BTreeMap::new(),
        };

        store.rates = match store.load::<RatesFile>(RATES_FILE) {
            Some(file) => file.into_table(),
            None => RateTable::new(),
        };
        if store.rates.is_empty() {
            let table = default_rate_table(Utc::now().year());
            store.write_json(RATES_FILE, &RatesFile::from_table(&table))?;
            info!("seeded default rate tables");
            store.rates = table;
        }

        store.assets = match store.load::<BTreeMap<String, Asset>>(ASSETS_FILE) {
            Some(assets) => assets,
            None => {
                let assets = BTreeMap::new();
                store.write_json(ASSETS_FILE, &assets)?;
                assets
            }
        };

        store.calculations =
            match store.load::<BTreeMap<String, CalculationRecord>>(CALCULATIONS_FILE) {
                Some(calculations) => calculations,
                None => {
                    let calculations = BTreeMap::new();
                    store.write_json(CALCULATIONS_FILE, &calculations)?;
                    calculations
                }
            };

        Ok(store)
    }

    pub fn data_dir(&self) -> &std::path::Path {
        &self.data_dir
    }

    fn load<T: DeserializeOwned>(
        &self,
        file: &str,
    ) -> Option<T> {
        let path = self.data_dir.join(file);
        if !path.exists() {
            return None;
        }
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, file, "unreadable data file, falling back to defaults");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%error, file, "corrupt data file, falling back to defaults");
                None
            }
        }
    }

    fn write_json<T: Serialize>(
        &self,
        file: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let path = self.data_dir.join(file);
        let json = serde_json::to_string_pretty(value)
            .map_err(|error| StoreError::Io(format!("cannot serialize {file}: {error}")))?;
        fs::write(&path, json).map_err(|error| {
            StoreError::Io(format!("cannot write '{}': {error}", path.display()))
        })
    }

    fn persist_rates(
        &self,
        table: &RateTable,
    ) -> Result<(), StoreError> {
        self.write_json(RATES_FILE, &RatesFile::from_table(table))
    }

    fn persist_assets(
        &self,
        assets: &BTreeMap<String, Asset>,
    ) -> Result<(), StoreError> {
        self.write_json(ASSETS_FILE, assets)
    }

    fn persist_calculations(
        &self,
        calculations: &BTreeMap<String, CalculationRecord>,
    ) -> Result<(), StoreError> {
        self.write_json(CALCULATIONS_FILE, calculations)
    }

    fn normalize_taxation(asset: &mut Asset) {
        let normalized = asset.normalized_taxation();
        if normalized != asset.taxation_type {
            warn!(
                asset_id = %asset.asset_id,
                declared = asset.taxation_type.as_str(),
                corrected = normalized.as_str(),
                "taxation type corrected to the category default"
            );
            asset.taxation_type = normalized;
        }
    }

    fn rate_in_range(
        rate: Decimal,
        what: &str,
    ) -> Result<(), StoreError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
            return Err(StoreError::Validation(vec![format!(
                "{what} {rate}% is outside 0-100%"
            )]));
        }
        Ok(())
    }

    fn year_entry<'a>(
        next: &'a mut RateTable,
        year: i32,
    ) -> Result<&'a mut YearRates, StoreError> {
        next.get_mut(&year)
            .ok_or_else(|| StoreError::NotFound(format!("year {year}")))
    }
}

impl PropertyTaxStore for JsonStore {
    fn available_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rates.keys().copied().collect();
        for asset in self.assets.values() {
            for year in asset.yearly.keys() {
                if !years.contains(year) {
                    years.push(*year);
                }
            }
        }
        if years.is_empty() {
            years.push(Utc::now().year());
        }
        years.sort_unstable_by(|a, b| b.cmp(a));
        years
    }

    fn add_year(
        &mut self,
        new_year: i32,
        base_year: Option<i32>,
    ) -> Result<(), StoreError> {
        let max_year = Utc::now().year() + 10;
        if new_year < MIN_RATE_YEAR || new_year > max_year {
            return Err(StoreError::Validation(vec![format!(
                "year {new_year} is outside {MIN_RATE_YEAR}-{max_year}"
            )]));
        }
        if self.rates.contains_key(&new_year) {
            return Err(StoreError::Conflict(format!(
                "year {new_year} already has rate data"
            )));
        }

        let rates = match base_year {
            Some(base) => self
                .rates
                .get(&base)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("base year {base}")))?,
            None => default_year_rates(),
        };

        let mut next = self.rates.clone();
        next.insert(new_year, rates);
        self.persist_rates(&next)?;
        self.rates = next;
        info!(year = new_year, base_year, "rate year added");
        Ok(())
    }

    fn delete_year(
        &mut self,
        year: i32,
    ) -> Result<(), StoreError> {
        if !self.rates.contains_key(&year) {
            return Err(StoreError::NotFound(format!("year {year}")));
        }
        if self.rates.len() == 1 {
            return Err(StoreError::Dependency(format!(
                "cannot delete year {year}: it is the only remaining rate year"
            )));
        }

        let mut blockers = Vec::new();
        for asset in self.assets.values() {
            if asset.yearly.contains_key(&year) {
                blockers.push(format!("asset '{}' has data for {year}", asset.asset_id));
            }
        }
        for (key, record) in &self.calculations {
            if record.calculation.year == year {
                blockers.push(format!("calculation '{key}' references {year}"));
            }
        }
        if !blockers.is_empty() {
            return Err(StoreError::Dependency(format!(
                "cannot delete year {year}: {}",
                blockers.join(", ")
            )));
        }

        let mut next = self.rates.clone();
        next.remove(&year);
        self.persist_rates(&next)?;
        self.rates = next;
        info!(year, "rate year deleted");
        Ok(())
    }

    fn year_rates(
        &self,
        year: i32,
    ) -> Option<YearRates> {
        self.rates.get(&year).cloned()
    }

    fn update_property_tax_brackets(
        &mut self,
        year: i32,
        asset_type: AssetType,
        taxation_type: TaxationType,
        brackets: Vec<RateBracket>,
    ) -> Result<(), StoreError> {
        let mut problems = validate_brackets(&brackets);
        if !taxation_type.valid_for(asset_type) {
            problems.push(format!(
                "taxation type {} is not valid for {}",
                taxation_type.as_str(),
                asset_type.as_str()
            ));
        }
        if !problems.is_empty() {
            return Err(StoreError::Validation(problems));
        }

        let mut brackets = brackets;
        for bracket in &mut brackets {
            bracket.rate_percent = round_rate(bracket.rate_percent, BRACKET_RATE_DP);
        }

        let mut next = self.rates.clone();
        Self::year_entry(&mut next, year)?
            .property_tax
            .entry(asset_type)
            .or_default()
            .insert(taxation_type, brackets);
        self.persist_rates(&next)?;
        self.rates = next;
        info!(
            year,
            asset_type = asset_type.as_str(),
            taxation_type = taxation_type.as_str(),
            "property tax schedule replaced"
        );
        Ok(())
    }

    fn update_urban_area_rate(
        &mut self,
        year: i32,
        rate: Decimal,
    ) -> Result<(), StoreError> {
        Self::rate_in_range(rate, "urban-area rate")?;
        let mut next = self.rates.clone();
        Self::year_entry(&mut next, year)?.urban_area_rate = round_rate(rate, BRACKET_RATE_DP);
        self.persist_rates(&next)?;
        self.rates = next;
        Ok(())
    }

    fn update_education_rate(
        &mut self,
        year: i32,
        rate: Decimal,
    ) -> Result<(), StoreError> {
        Self::rate_in_range(rate, "education rate")?;
        let mut next = self.rates.clone();
        Self::year_entry(&mut next, year)?.education_rate = round_rate(rate, RATIO_DP);
        self.persist_rates(&next)?;
        self.rates = next;
        Ok(())
    }

    fn update_regional_brackets(
        &mut self,
        year: i32,
        brackets: Vec<RateBracket>,
    ) -> Result<(), StoreError> {
        let problems = validate_brackets(&brackets);
        if !problems.is_empty() {
            return Err(StoreError::Validation(problems));
        }

        let mut brackets = brackets;
        for bracket in &mut brackets {
            bracket.rate_percent = round_rate(bracket.rate_percent, BRACKET_RATE_DP);
        }

        let mut next = self.rates.clone();
        Self::year_entry(&mut next, year)?.regional_resource = brackets;
        self.persist_rates(&next)?;
        self.rates = next;
        Ok(())
    }

    fn update_fair_market_ratio(
        &mut self,
        year: i32,
        asset_type: AssetType,
        ratio: Decimal,
    ) -> Result<(), StoreError> {
        Self::rate_in_range(ratio, "fair-market ratio")?;
        let mut next = self.rates.clone();
        Self::year_entry(&mut next, year)?
            .fair_market_ratio
            .insert(asset_type, round_rate(ratio, RATIO_DP));
        self.persist_rates(&next)?;
        self.rates = next;
        Ok(())
    }

    fn list_assets(&self) -> Vec<Asset> {
        self.assets.values().cloned().collect()
    }

    fn get_asset(
        &self,
        asset_id: &str,
    ) -> Option<Asset> {
        self.assets.get(asset_id).cloned()
    }

    fn create_asset(
        &mut self,
        asset: Asset,
    ) -> Result<(), StoreError> {
        let problems = asset.validate();
        if !problems.is_empty() {
            return Err(StoreError::Validation(problems));
        }
        if self.assets.contains_key(&asset.asset_id) {
            return Err(StoreError::Conflict(format!(
                "asset '{}' already exists",
                asset.asset_id
            )));
        }

        let mut asset = asset;
        Self::normalize_taxation(&mut asset);

        let mut next = self.assets.clone();
        next.insert(asset.asset_id.clone(), asset);
        self.persist_assets(&next)?;
        self.assets = next;
        Ok(())
    }

    fn update_asset(
        &mut self,
        asset: Asset,
    ) -> Result<(), StoreError> {
        if !self.assets.contains_key(&asset.asset_id) {
            return Err(StoreError::NotFound(format!("asset '{}'", asset.asset_id)));
        }
        let problems = asset.validate();
        if !problems.is_empty() {
            return Err(StoreError::Validation(problems));
        }

        let mut asset = asset;
        Self::normalize_taxation(&mut asset);

        let mut next = self.assets.clone();
        next.insert(asset.asset_id.clone(), asset);
        self.persist_assets(&next)?;
        self.assets = next;
        Ok(())
    }

    fn delete_asset(
        &mut self,
        asset_id: &str,
    ) -> Result<(), StoreError> {
        if !self.assets.contains_key(asset_id) {
            return Err(StoreError::NotFound(format!("asset '{asset_id}'")));
        }

        let mut next = self.assets.clone();
        next.remove(asset_id);
        self.persist_assets(&next)?;
        self.assets = next;
        info!(asset_id, "asset deleted");
        Ok(())
    }

    fn upsert_assets(
        &mut self,
        assets: Vec<Asset>,
    ) -> Result<(usize, usize), StoreError> {
        let mut problems = Vec::new();
        for asset in &assets {
            for problem in asset.validate() {
                problems.push(format!("asset '{}': {problem}", asset.asset_id));
            }
        }
        if !problems.is_empty() {
            return Err(StoreError::Validation(problems));
        }

        let mut next = self.assets.clone();
        let mut created = 0;
        let mut updated = 0;
        for mut asset in assets {
            Self::normalize_taxation(&mut asset);
            if next.insert(asset.asset_id.clone(), asset).is_some() {
                updated += 1;
            } else {
                created += 1;
            }
        }

        self.persist_assets(&next)?;
        self.assets = next;
        info!(created, updated, "assets upserted");
        Ok((created, updated))
    }

    fn save_calculation(
        &mut self,
        record: CalculationRecord,
    ) -> Result<(), StoreError> {
        if record.calculation.calc_key.trim().is_empty() {
            return Err(StoreError::Validation(vec![
                "calc key is required".to_string(),
            ]));
        }

        let mut next = self.calculations.clone();
        next.insert(record.calculation.calc_key.clone(), record);
        self.persist_calculations(&next)?;
        self.calculations = next;
        Ok(())
    }

    fn get_calculation(
        &self,
        calc_key: &str,
    ) -> Option<CalculationRecord> {
        self.calculations.get(calc_key).cloned()
    }

    fn delete_calculation(
        &mut self,
        calc_key: &str,
    ) -> Result<(), StoreError> {
        if !self.calculations.contains_key(calc_key) {
            return Err(StoreError::NotFound(format!("calculation '{calc_key}'")));
        }

        let mut next = self.calculations.clone();
        next.remove(calc_key);
        self.persist_calculations(&next)?;
        self.calculations = next;
        Ok(())
    }

    fn list_calculations(
        &self,
        year: Option<i32>,
        group_id: Option<&str>,
    ) -> Vec<CalculationRecord> {
        self.calculations
            .values()
            .filter(|record| year.is_none_or(|y| record.calculation.year == y))
            .filter(|record| group_id.is_none_or(|g| record.calculation.group_id == g))
            .cloned()
            .collect()
    }
}

//! CSV asset importer.
//!
//! ## CSV Format
//!
//! Headers are matched by name; column order does not matter. Values are
//! whitespace-trimmed. Enum cells accept both the Korean labels and the
//! English names ([`AssetType::parse`] / [`TaxationType::parse`]).
//!
//! | Column                  | Required | Type    | Notes                                  |
//! |-------------------------|----------|---------|----------------------------------------|
//! | `asset_id`              | yes      | string  | registry key; repeated ids merge       |
//! | `name`                  | yes      | string  |                                        |
//! | `asset_type`            | yes      | string  | `토지`, `건축물`, `주택`               |
//! | `detail_type`           | no       | string  |                                        |
//! | `taxation_type`         | no       | string  | defaulted/corrected when missing or invalid |
//! | `urban_area`            | no       | string  | `Y`/`N`; anything else becomes `N`     |
//! | `group_id`              | yes      | string  |                                        |
//! | `province`              | no       | string  |                                        |
//! | `city`                  | no       | string  |                                        |
//! | `address`               | no       | string  |                                        |
//! | `area`                  | yes      | decimal | m², must be positive                   |
//! | `year`                  | yes      | integer | snapshot year, e.g. `2024`             |
//! | `published_land_price`  | no       | decimal |                                        |
//! | `standard_market_value` | yes      | decimal |                                        |
//! | `building_market_value` | no       | decimal | housing only                           |
//! | `reduction_rate`        | no       | decimal | percent, 0-100                         |
//! | `surcharge_rate`        | no       | decimal | percent, 0-100                         |
//! | `valid_through`         | no       | date    | `YYYY-MM-DD`                           |
//!
//! A row whose `asset_id` already exists (in the file or in the store)
//! replaces that asset's snapshot for `year` and refreshes the descriptive
//! fields; snapshots for other years are kept.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use proptax_core::{
    Asset, AssetType, PropertyTaxStore, StoreError, TaxationType, YearSnapshot,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while parsing the CSV file itself. Per-row problems
/// never surface here; they are counted in the [`ImportSummary`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// The CSV is structurally invalid: missing required column, type
    /// mismatch, ragged row.
    #[error("CSV parse error: {0}")]
    Parse(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Parse(err.to_string())
    }
}

/// One row as it appears in the file, before any correction.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetRowRecord {
    pub asset_id: String,
    pub name: String,
    pub asset_type: String,
    #[serde(default)]
    pub detail_type: Option<String>,
    #[serde(default)]
    pub taxation_type: Option<String>,
    #[serde(default)]
    pub urban_area: Option<String>,
    pub group_id: String,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub area: Decimal,
    pub year: i32,
    #[serde(default)]
    pub published_land_price: Option<Decimal>,
    pub standard_market_value: Decimal,
    #[serde(default)]
    pub building_market_value: Option<Decimal>,
    #[serde(default)]
    pub reduction_rate: Option<Decimal>,
    #[serde(default)]
    pub surcharge_rate: Option<Decimal>,
    #[serde(default)]
    pub valid_through: Option<NaiveDate>,
}

/// Outcome of one import run. `warnings` are non-fatal corrections; a failed
/// row is counted in `failed` with its message in `failures` and never
/// reaches the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub warnings: Vec<String>,
    pub failures: Vec<String>,
}

/// Parses asset rows from a CSV reader. Rows are returned in file order.
///
/// # Errors
///
/// [`ImportError::Parse`] when the CSV is structurally invalid or a required
/// field cannot be deserialised.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<AssetRowRecord>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.deserialize() {
        let record: AssetRowRecord = result?;
        records.push(record);
    }
    Ok(records)
}

fn resolve_taxation(
    declared: Option<&str>,
    asset_type: AssetType,
    asset_id: &str,
    row_number: usize,
    warnings: &mut Vec<String>,
) -> TaxationType {
    let default = asset_type.default_taxation();
    let Some(raw) = declared.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return default;
    };
    match TaxationType::parse(raw) {
        Some(parsed) if parsed.valid_for(asset_type) => parsed,
        Some(parsed) => {
            warnings.push(format!(
                "row {row_number} ('{asset_id}'): taxation type '{}' is not valid for {}, \
                 corrected to '{}'",
                parsed.as_str(),
                asset_type.as_str(),
                default.as_str()
            ));
            default
        }
        None => {
            warnings.push(format!(
                "row {row_number} ('{asset_id}'): unknown taxation type '{raw}', \
                 using '{}'",
                default.as_str()
            ));
            default
        }
    }
}

fn resolve_urban_flag(
    declared: Option<&str>,
    asset_id: &str,
    row_number: usize,
    warnings: &mut Vec<String>,
) -> bool {
    match declared.map(str::trim) {
        None | Some("") => false,
        Some("Y") | Some("y") => true,
        Some("N") | Some("n") => false,
        Some(other) => {
            warnings.push(format!(
                "row {row_number} ('{asset_id}'): urban flag '{other}' is not Y/N, using N"
            ));
            false
        }
    }
}

/// Turns one raw row into a storable single-snapshot asset, applying the
/// enum corrections. `Err` means the row fails as a whole.
fn convert_row(
    record: &AssetRowRecord,
    row_number: usize,
    warnings: &mut Vec<String>,
) -> Result<Asset, String> {
    let Some(asset_type) = AssetType::parse(&record.asset_type) else {
        return Err(format!(
            "row {row_number} ('{}'): unknown asset type '{}'",
            record.asset_id, record.asset_type
        ));
    };

    let taxation_type = resolve_taxation(
        record.taxation_type.as_deref(),
        asset_type,
        &record.asset_id,
        row_number,
        warnings,
    );
    let urban_area = resolve_urban_flag(
        record.urban_area.as_deref(),
        &record.asset_id,
        row_number,
        warnings,
    );

    let snapshot = YearSnapshot {
        applicable_year: record.year,
        published_land_price: record.published_land_price.unwrap_or(Decimal::ZERO),
        standard_market_value: record.standard_market_value,
        building_market_value: record.building_market_value,
        reduction_rate: record.reduction_rate.unwrap_or(Decimal::ZERO),
        surcharge_rate: record.surcharge_rate.unwrap_or(Decimal::ZERO),
        valid_through: record.valid_through,
    };

    let asset = Asset {
        asset_id: record.asset_id.clone(),
        name: record.name.clone(),
        asset_type,
        detail_type: record.detail_type.clone().unwrap_or_default(),
        taxation_type,
        urban_area,
        group_id: record.group_id.clone(),
        province: record.province.clone().unwrap_or_default(),
        city: record.city.clone().unwrap_or_default(),
        address: record.address.clone().unwrap_or_default(),
        area: record.area,
        yearly: BTreeMap::from([(record.year, snapshot)]),
    };

    let problems = asset.validate();
    if !problems.is_empty() {
        return Err(format!(
            "row {row_number} ('{}'): {}",
            record.asset_id,
            problems.join("; ")
        ));
    }
    Ok(asset)
}

/// Imports rows into the store: create-or-update by asset id, with a single
/// persist at the end.
///
/// # Errors
///
/// Only the store's persistence error aborts an import; every per-row
/// problem is collected into the returned [`ImportSummary`].
pub fn import<S>(
    store: &mut S,
    records: &[AssetRowRecord],
) -> Result<ImportSummary, StoreError>
where
    S: PropertyTaxStore + ?Sized,
{
    let mut summary = ImportSummary::default();
    let mut batch: BTreeMap<String, Asset> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let row_number = index + 1;
        let mut asset = match convert_row(record, row_number, &mut summary.warnings) {
            Ok(asset) => asset,
            Err(message) => {
                summary.failed += 1;
                summary.failures.push(message);
                continue;
            }
        };

        // Merge with an earlier row for the same id, or with the stored
        // asset: the row's snapshot replaces that year, other years survive.
        if let Some(existing) = batch
            .remove(&asset.asset_id)
            .or_else(|| store.get_asset(&asset.asset_id))
        {
            let mut yearly = existing.yearly;
            yearly.extend(std::mem::take(&mut asset.yearly));
            asset.yearly = yearly;
        }
        batch.insert(asset.asset_id.clone(), asset);
    }

    if !batch.is_empty() {
        let (created, updated) = store.upsert_assets(batch.into_values().collect())?;
        summary.created = created;
        summary.updated = updated;
    }
    Ok(summary)
}

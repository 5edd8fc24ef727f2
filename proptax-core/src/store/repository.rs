use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{
    Asset, AssetType, CalculationRecord, RateBracket, TaxationType, YearRates,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// One or more invariants failed; every problem is listed.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The entity cannot be removed; the message enumerates what still
    /// references it.
    #[error("{0}")]
    Dependency(String),

    #[error("{0} not found")]
    NotFound(String),

    /// The entity already exists.
    #[error("{0}")]
    Conflict(String),

    /// A persistence failure. The in-memory state is unchanged when this is
    /// returned from a mutation.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Single source of truth for rate tables, the asset registry and stored
/// calculation records.
///
/// Every mutating method validates its input, persists the complete table for
/// its domain, and only then updates the in-memory state — a failed persist
/// leaves the store exactly as it was. Reads hand out owned copies; the
/// tables are small.
pub trait PropertyTaxStore {
    // ── years & rates ────────────────────────────────────────────────────

    /// Years present in any rate table or any asset's snapshots, newest
    /// first. Never empty: falls back to the current year.
    fn available_years(&self) -> Vec<i32>;

    /// Registers a new rate year, copying `base_year`'s full rate set when
    /// given, the built-in defaults otherwise.
    fn add_year(
        &mut self,
        new_year: i32,
        base_year: Option<i32>,
    ) -> Result<(), StoreError>;

    /// Removes a rate year. Fails with [`StoreError::Dependency`] when it is
    /// the only year left or when any asset snapshot or stored calculation
    /// still references it.
    fn delete_year(
        &mut self,
        year: i32,
    ) -> Result<(), StoreError>;

    fn year_rates(
        &self,
        year: i32,
    ) -> Option<YearRates>;

    /// Replaces one (asset type, taxation type) bracket schedule atomically.
    fn update_property_tax_brackets(
        &mut self,
        year: i32,
        asset_type: AssetType,
        taxation_type: TaxationType,
        brackets: Vec<RateBracket>,
    ) -> Result<(), StoreError>;

    fn update_urban_area_rate(
        &mut self,
        year: i32,
        rate: Decimal,
    ) -> Result<(), StoreError>;

    fn update_education_rate(
        &mut self,
        year: i32,
        rate: Decimal,
    ) -> Result<(), StoreError>;

    fn update_regional_brackets(
        &mut self,
        year: i32,
        brackets: Vec<RateBracket>,
    ) -> Result<(), StoreError>;

    fn update_fair_market_ratio(
        &mut self,
        year: i32,
        asset_type: AssetType,
        ratio: Decimal,
    ) -> Result<(), StoreError>;

    // ── assets ───────────────────────────────────────────────────────────

    fn list_assets(&self) -> Vec<Asset>;

    fn get_asset(
        &self,
        asset_id: &str,
    ) -> Option<Asset>;

    fn create_asset(
        &mut self,
        asset: Asset,
    ) -> Result<(), StoreError>;

    fn update_asset(
        &mut self,
        asset: Asset,
    ) -> Result<(), StoreError>;

    /// Deletes an asset. Unlike years, assets carry no dependency check;
    /// deletion always succeeds when the id exists.
    fn delete_asset(
        &mut self,
        asset_id: &str,
    ) -> Result<(), StoreError>;

    /// Bulk create-or-replace with a single persist at the end. Returns
    /// `(created, updated)` counts.
    fn upsert_assets(
        &mut self,
        assets: Vec<Asset>,
    ) -> Result<(usize, usize), StoreError>;

    // ── calculation records ──────────────────────────────────────────────

    fn save_calculation(
        &mut self,
        record: CalculationRecord,
    ) -> Result<(), StoreError>;

    fn get_calculation(
        &self,
        calc_key: &str,
    ) -> Option<CalculationRecord>;

    fn delete_calculation(
        &mut self,
        calc_key: &str,
    ) -> Result<(), StoreError>;

    /// Linear scan over the stored records, optionally filtered by year
    /// and/or group.
    fn list_calculations(
        &self,
        year: Option<i32>,
        group_id: Option<&str>,
    ) -> Vec<CalculationRecord>;
}

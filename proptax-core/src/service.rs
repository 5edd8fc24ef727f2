//! Group-level orchestration over a [`PropertyTaxStore`].
//!
//! The store owns the data and the assessment owns the math; what is left is
//! the thin layer that selects a portfolio, aggregates its liabilities and
//! merges a user-supplied finalization into the persisted record.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;

use crate::activity::ActivityLog;
use crate::calculations::TaxAssessment;
use crate::models::{
    AssetCalculation, CalculationRecord, Finalization, GroupCalculation, NewFinalization,
};
use crate::store::{PropertyTaxStore, StoreError};

/// Group selector that matches every asset. The legacy English alias "ALL"
/// is accepted as well.
pub const ALL_GROUPS: &str = "전체";

fn group_matches(
    selector: &str,
    group_id: &str,
) -> bool {
    selector == ALL_GROUPS || selector == "ALL" || selector == group_id
}

/// Assesses a single asset for a year. `None` when the asset is unknown, the
/// year has no rate set, or the asset carries no snapshot for the year.
pub fn calculate_for_asset<S>(
    store: &S,
    asset_id: &str,
    year: i32,
) -> Option<AssetCalculation>
where
    S: PropertyTaxStore + ?Sized,
{
    let asset = store.get_asset(asset_id)?;
    let rates = store.year_rates(year)?;
    TaxAssessment::new(&rates).assess(&asset, year)
}

/// Assesses every asset of a group (or all assets for [`ALL_GROUPS`]) that
/// has a snapshot for `year`, and sums the totals.
///
/// An empty selection or a missing rate year is reported through the
/// result's `error` field with a zero total — callers render "no data"
/// without an error path.
pub fn calculate_for_group<S>(
    store: &S,
    group_id: &str,
    year: i32,
) -> GroupCalculation
where
    S: PropertyTaxStore + ?Sized,
{
    let mut calculation = GroupCalculation {
        calc_key: GroupCalculation::key_for(group_id, year),
        group_id: group_id.to_string(),
        year,
        computed_at: Utc::now(),
        per_asset: Default::default(),
        total_tax: Decimal::ZERO,
        error: None,
    };

    let Some(rates) = store.year_rates(year) else {
        calculation.error = Some(format!("no rate data for year {year}"));
        return calculation;
    };

    let selected: Vec<_> = store
        .list_assets()
        .into_iter()
        .filter(|asset| group_matches(group_id, &asset.group_id))
        .filter(|asset| asset.yearly.contains_key(&year))
        .collect();

    if selected.is_empty() {
        calculation.error = Some(format!(
            "no assets in group '{group_id}' with data for year {year}"
        ));
        return calculation;
    }

    let assessment = TaxAssessment::new(&rates);
    for asset in &selected {
        if let Some(result) = assessment.assess(asset, year) {
            calculation.total_tax += result.total_tax;
            calculation.per_asset.insert(asset.asset_id.clone(), result);
        }
    }

    calculation
}

/// Merges a finalization into a calculation and persists the combined
/// record. This is the only path where computed and human-supplied figures
/// meet; both halves always land in the stored record.
///
/// # Errors
///
/// [`StoreError::Validation`] when the calculation carries an error, the
/// finalizer is blank or the bill amount is negative; any persistence error
/// from the store.
pub fn save_with_finalization<S>(
    store: &mut S,
    activity: &dyn ActivityLog,
    calculation: GroupCalculation,
    finalization: NewFinalization,
) -> Result<CalculationRecord, StoreError>
where
    S: PropertyTaxStore + ?Sized,
{
    let mut problems = Vec::new();

    if let Some(error) = &calculation.error {
        problems.push(format!("calculation cannot be finalized: {error}"));
    }
    if calculation.calc_key != GroupCalculation::key_for(&calculation.group_id, calculation.year) {
        problems.push(format!(
            "calc key '{}' does not match group '{}' and year {}",
            calculation.calc_key, calculation.group_id, calculation.year
        ));
    }
    if finalization.finalized_by.trim().is_empty() {
        problems.push("finalized_by is required".to_string());
    }
    if finalization.bill_amount < Decimal::ZERO {
        problems.push(format!(
            "bill amount {} is negative",
            finalization.bill_amount
        ));
    }
    if !problems.is_empty() {
        return Err(StoreError::Validation(problems));
    }

    let variance = finalization.bill_amount - calculation.total_tax;
    let finalized = Finalization {
        bill_amount: finalization.bill_amount,
        variance,
        final_value: finalization.final_value,
        reason: finalization.reason,
        finalized_by: finalization.finalized_by,
        finalized_at: Utc::now(),
    };
    let details = json!({
        "calc_key": &calculation.calc_key,
        "computed_total": calculation.total_tax,
        "bill_amount": finalized.bill_amount,
        "variance": finalized.variance,
        "finalized_by": &finalized.finalized_by,
    });
    let record = CalculationRecord {
        calculation,
        finalization: Some(finalized),
    };

    store.save_calculation(record.clone())?;
    activity.record("property tax calculation finalized", details);

    Ok(record)
}

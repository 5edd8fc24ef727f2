use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Itemized tax liability of one asset for one year, with the ordered
/// human-readable trail of how each figure was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCalculation {
    pub asset_id: String,
    pub asset_name: String,

    /// Assessed value the calculation started from.
    pub base_amount: Decimal,

    /// Base after the fair-market ratio and any reduction.
    pub taxable_base: Decimal,

    pub property_tax: Decimal,
    pub urban_area_tax: Decimal,
    pub education_tax: Decimal,
    pub regional_resource_tax: Decimal,
    pub total_tax: Decimal,

    pub steps: Vec<String>,
}

/// One group-level calculation run. An empty selection is reported through
/// `error` with a zero total, never as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCalculation {
    pub calc_key: String,
    pub group_id: String,
    pub year: i32,
    pub computed_at: DateTime<Utc>,
    pub per_asset: BTreeMap<String, AssetCalculation>,
    pub total_tax: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GroupCalculation {
    pub fn key_for(
        group_id: &str,
        year: i32,
    ) -> String {
        format!("{group_id}_{year}")
    }
}

/// Reconciliation of a computed total against the externally issued bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finalization {
    pub bill_amount: Decimal,

    /// `bill_amount` minus the computed total.
    pub variance: Decimal,

    /// The amount the team agreed to book.
    pub final_value: Decimal,

    pub reason: String,
    pub finalized_by: String,
    pub finalized_at: DateTime<Utc>,
}

/// User-supplied half of a finalization; variance and timestamp are filled in
/// when the record is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFinalization {
    pub bill_amount: Decimal,
    pub final_value: Decimal,
    pub reason: String,
    pub finalized_by: String,
}

/// The persisted unit: a calculation plus, once reconciled, its finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub calculation: GroupCalculation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalization: Option<Finalization>,
}

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Property category. The serialized form uses the Korean labels carried by
/// the data files and spreadsheet exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetType {
    #[serde(rename = "토지")]
    Land,
    #[serde(rename = "건축물")]
    Building,
    #[serde(rename = "주택")]
    Housing,
}

impl AssetType {
    pub const ALL: [AssetType; 3] = [AssetType::Land, AssetType::Building, AssetType::Housing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Land => "토지",
            Self::Building => "건축물",
            Self::Housing => "주택",
        }
    }

    /// Accepts both the Korean labels and the English names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "토지" | "Land" => Some(Self::Land),
            "건축물" | "Building" => Some(Self::Building),
            "주택" | "Housing" => Some(Self::Housing),
            _ => None,
        }
    }

    /// The taxation type a property of this category falls under when none
    /// (or an invalid one) is given.
    pub fn default_taxation(&self) -> TaxationType {
        match self {
            Self::Land => TaxationType::AggregatedTaxed,
            Self::Building | Self::Housing => TaxationType::Other,
        }
    }

    /// Taxation types that are legal for this category.
    pub fn taxation_types(&self) -> &'static [TaxationType] {
        match self {
            Self::Land => &[
                TaxationType::AggregatedTaxed,
                TaxationType::SeparatelyAssessed,
                TaxationType::SeparatelyTaxed,
            ],
            Self::Building | Self::Housing => &[TaxationType::Other],
        }
    }
}

/// How a property is assessed. Land splits into three aggregation regimes;
/// buildings and housing use the single general regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxationType {
    #[serde(rename = "종합합산")]
    AggregatedTaxed,
    #[serde(rename = "별도합산")]
    SeparatelyAssessed,
    #[serde(rename = "분리과세")]
    SeparatelyTaxed,
    #[serde(rename = "기타")]
    Other,
}

impl TaxationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AggregatedTaxed => "종합합산",
            Self::SeparatelyAssessed => "별도합산",
            Self::SeparatelyTaxed => "분리과세",
            Self::Other => "기타",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "종합합산" | "AggregatedTaxed" => Some(Self::AggregatedTaxed),
            "별도합산" | "SeparatelyAssessed" => Some(Self::SeparatelyAssessed),
            "분리과세" | "SeparatelyTaxed" => Some(Self::SeparatelyTaxed),
            "기타" | "Other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn valid_for(
        &self,
        asset_type: AssetType,
    ) -> bool {
        asset_type.taxation_types().contains(self)
    }
}

/// Valuation figures for one applicable year of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSnapshot {
    pub applicable_year: i32,

    /// Published land price per m² (공시지가).
    pub published_land_price: Decimal,

    /// Standard market value of the property (시가표준액).
    pub standard_market_value: Decimal,

    /// Building portion of a housing valuation. Only meaningful for Housing;
    /// when present it replaces the standard market value as the tax base.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_market_value: Option<Decimal>,

    /// Percentage knocked off the taxable base, 0-100.
    pub reduction_rate: Decimal,

    /// Percentage added on top of the regional resource tax, 0-100.
    pub surcharge_rate: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_through: Option<NaiveDate>,
}

/// A registered property. `asset_id` is the registry key; `yearly` holds one
/// valuation snapshot per applicable year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: String,
    pub name: String,
    pub asset_type: AssetType,
    pub detail_type: String,
    pub taxation_type: TaxationType,
    pub urban_area: bool,
    pub group_id: String,
    pub province: String,
    pub city: String,
    pub address: String,
    pub area: Decimal,
    #[serde(default)]
    pub yearly: BTreeMap<i32, YearSnapshot>,
}

impl Asset {
    /// Checks the registry invariants, returning every problem found.
    /// An empty vector means the asset is storable.
    ///
    /// A taxation type that does not fit the asset type is NOT reported here;
    /// stores correct it to the category default instead (see
    /// [`Asset::normalized_taxation`]).
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.asset_id.trim().is_empty() {
            problems.push("asset_id is required".to_string());
        }
        if self.name.trim().is_empty() {
            problems.push("name is required".to_string());
        }
        if self.area <= Decimal::ZERO {
            problems.push(format!("area must be positive, got {}", self.area));
        }

        for (year, snapshot) in &self.yearly {
            if snapshot.applicable_year != *year {
                problems.push(format!(
                    "snapshot keyed {year} reports applicable year {}",
                    snapshot.applicable_year
                ));
            }
            if snapshot.standard_market_value < Decimal::ZERO {
                problems.push(format!(
                    "{year}: standard market value {} is negative",
                    snapshot.standard_market_value
                ));
            }
            if snapshot.reduction_rate < Decimal::ZERO
                || snapshot.reduction_rate > Decimal::ONE_HUNDRED
            {
                problems.push(format!(
                    "{year}: reduction rate {}% is outside 0-100%",
                    snapshot.reduction_rate
                ));
            }
            if snapshot.surcharge_rate < Decimal::ZERO
                || snapshot.surcharge_rate > Decimal::ONE_HUNDRED
            {
                problems.push(format!(
                    "{year}: surcharge rate {}% is outside 0-100%",
                    snapshot.surcharge_rate
                ));
            }
        }

        problems
    }

    /// The taxation type to store: the declared one when it fits the asset
    /// type, the category default otherwise.
    pub fn normalized_taxation(&self) -> TaxationType {
        if self.taxation_type.valid_for(self.asset_type) {
            self.taxation_type
        } else {
            self.asset_type.default_taxation()
        }
    }
}

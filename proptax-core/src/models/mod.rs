mod asset;
mod calculation;
mod rate_bracket;
mod rate_table;

pub use asset::{Asset, AssetType, TaxationType, YearSnapshot};
pub use calculation::{
    AssetCalculation, CalculationRecord, Finalization, GroupCalculation, NewFinalization,
};
pub use rate_bracket::{RateBracket, UPPER_BOUND_SENTINEL, validate_brackets};
pub use rate_table::{RateTable, YearRates};

//! Property-tax calculation logic.
//!
//! The entry point is [`assessment::TaxAssessment`], which turns one asset's
//! yearly valuation into an itemized liability; [`progressive`] holds the
//! shared bracket walk used by both the property tax and the regional
//! resource tax.

pub mod assessment;
pub mod common;
pub mod progressive;

pub use assessment::TaxAssessment;
pub use progressive::progressive_tax;

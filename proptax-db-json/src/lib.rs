//! JSON flat-file backend for the property-tax store.
//!
//! Three files, one per logical table, live under a data directory:
//! `property_tax_rates.json`, `property_tax_assets.json` and
//! `property_tax_calculations.json`. Every mutation rewrites the complete
//! file for its table. Missing or unreadable files are replaced with the
//! built-in defaults on open (self-healing bootstrap).
//!
//! Writes are last-write-wins with no cross-process locking — the deployment
//! assumption is a single admin team behind a UI that serializes actions.

pub mod defaults;
mod format;
mod store;

pub use store::{JsonStore, MIN_RATE_YEAR};

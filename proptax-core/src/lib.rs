pub mod activity;
pub mod calculations;
pub mod models;
pub mod service;
pub mod store;

pub use activity::{ActivityLog, TracingActivityLog};
pub use models::*;
pub use store::{PropertyTaxStore, StoreError};

pub mod repository;

pub use repository::{PropertyTaxStore, StoreError};

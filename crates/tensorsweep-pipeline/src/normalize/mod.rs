//! Normalizer Adapter: fills each record's normalized value from its raw value.

pub mod adapter;
pub mod methods;

pub use adapter::{normalize_table, normalizer_from_config};
pub use methods::{Clr, Identity, Log1p, TotalSum};

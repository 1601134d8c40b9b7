//! # tensorsweep-storage
//!
//! Everything that touches disk after the input is loaded: the JSON result
//! archive, the CSV fit tables, and the SQLite fit cache. Every file artifact
//! is written to a temporary file in the target directory and renamed into
//! place.

pub mod archive;
pub mod cache;
pub mod tables;

pub use archive::{load_archive, write_archive, Archive, Provenance};
pub use cache::SqliteFitCache;
pub use tables::{write_cv_table, write_fit_table, FitRow};

//! Tidy-Table Loader: delimited file → `TidyTable`.

pub mod reader;
pub mod schema;

pub use reader::TidyTableLoader;
pub use schema::TableSchema;

//! Tabular data model: typed cells and the column-ordered dataset.

mod table;
mod value;

pub use table::Dataset;
pub use value::{CellKey, CellKind, Value, is_null_token, parse_temporal};

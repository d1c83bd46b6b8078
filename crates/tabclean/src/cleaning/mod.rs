//! Column and row cleaning handlers.
//!
//! Each handler computes its result into a scratch buffer and commits it to
//! the dataset only after every check has passed.

mod convert;
mod dedup;
mod missing;
mod normalize;
mod outliers;
mod text;

pub use convert::{ConversionConfig, OnError, TargetType, convert, convert_cell};
pub use dedup::{DedupConfig, DuplicateAction, Keep, KeyColumns, deduplicate};
pub use missing::{MissingStrategy, fill_or_drop};
pub use normalize::{NormalizeConfig, NormalizeMethod, normalize};
pub use outliers::{OutlierAction, OutlierBounds, OutlierConfig, OutlierMethod, detect_and_handle};
pub use text::{TextStep, clean};

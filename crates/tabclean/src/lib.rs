//! tabclean: column-level cleaning engine for in-memory tabular datasets.
//!
//! A caller hands the engine a [`Dataset`] and one operation request naming a
//! column, an operation and its parameters. The engine applies a single
//! transformation and reports what it changed.
//!
//! # Core Principles
//!
//! - **All or nothing**: a failed operation leaves the dataset untouched
//! - **Exact reports**: every report lists the rows it affected
//! - **No I/O**: decoding and encoding files is the caller's job
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tabclean::{CleaningEngine, Dataset, Value};
//!
//! let dataset = Dataset::from_columns(vec![(
//!     "age",
//!     vec![Value::Number(30.0), Value::Missing, Value::Number(40.0)],
//! )])
//! .unwrap();
//!
//! let params = json!({"action": "fill-mean"});
//! let outcome = CleaningEngine::new().apply_operation(
//!     dataset,
//!     Some("age"),
//!     "missing-values",
//!     params.as_object().unwrap(),
//! );
//!
//! assert!(outcome.success);
//! assert_eq!(outcome.dataset.get(1, "age"), Some(&Value::Number(35.0)));
//! ```

pub mod cleaning;
pub mod config;
pub mod dataset;
pub mod error;
pub mod operation;
pub mod profile;
pub mod report;
pub mod stats;
pub mod typing;

mod engine;
mod session;

pub use config::EngineConfig;
pub use dataset::{Dataset, Value};
pub use engine::{CleaningEngine, OperationOutcome};
pub use error::{CleaningError, ErrorKind, Result};
pub use operation::{OperationKind, OperationParams, OperationRequest};
pub use profile::{ColumnProfile, NumericProfile, profile_column, profile_dataset};
pub use report::{StatValue, StatsReport};
pub use session::{CleaningSession, HistoryEntry};
pub use typing::{ColumnType, classify};

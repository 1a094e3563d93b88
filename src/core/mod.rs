//! Core types for the quality gate: check definitions, the ordered
//! registry, declared column kinds, and per-run results.
//!
//! ```text
//! QualityGate
//!     └── CheckRegistry
//!         ├── CheckDefinition (row_count)
//!         ├── CheckDefinition (non_null, per required column)
//!         └── CheckDefinition (duplicate_key, flag checks, ...)
//! ```
//!
//! Every registered [`CheckDefinition`] yields exactly one [`CheckResult`]
//! per run; the [`RunReport`] is the conjunction of those results.

mod check;
mod column;
mod result;

pub use check::{CheckDefinition, CheckKind, CheckRegistry};
pub use column::ColumnKind;
pub use result::{parse_failure_message, CheckResult, RunReport};

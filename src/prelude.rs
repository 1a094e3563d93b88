//! Prelude for commonly used types and traits in quality-gate.

pub use crate::core::{
    CheckDefinition, CheckKind, CheckRegistry, CheckResult, ColumnKind, RunReport,
};
pub use crate::error::{QualityError, Result};
pub use crate::executor::CheckExecutor;
pub use crate::formatters::{HumanFormatter, JsonFormatter, ResultFormatter};
pub use crate::gate::{QualityGate, QualityGateBuilder};
pub use crate::logging::LoggingConfig;
pub use crate::sink::{InMemorySink, JsonlSink, MetricRecord, ResultSink};

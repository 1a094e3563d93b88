//! Error types for the quality gate.
//!
//! The taxonomy keeps three caller-facing failure families apart so pipeline
//! dashboards can distinguish them: configuration defects (engineer error,
//! abort immediately), aggregated data-quality failures (all checks ran,
//! verdict is negative), and sink write failures (storage outage, verdict
//! already determined).

use thiserror::Error;

/// The main error type for the quality gate.
#[derive(Error, Debug)]
pub enum QualityError {
    /// A setup defect: duplicate check name, empty key list, unsupported
    /// declared type for a check kind, or an unregistered table.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A check references a column absent from the dataset schema.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound {
        /// Name of the missing column
        column: String,
    },

    /// The terminal, aggregated data-quality failure for a run. Carries one
    /// line per failed check, in evaluation order.
    #[error("Data quality checks failed:\n{}", .failures.join("\n"))]
    QualityFailure {
        /// One human-readable line per failed check
        failures: Vec<String>,
    },

    /// Persisting metric records to the result sink failed.
    #[error("Result sink write failed: {message}")]
    SinkWrite {
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from DataFusion query execution.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, QualityError>`.
pub type Result<T> = std::result::Result<T, QualityError>;

impl QualityError {
    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates the terminal aggregated failure from the failing check
    /// messages of a run.
    pub fn quality_failure(failures: Vec<String>) -> Self {
        Self::QualityFailure { failures }
    }

    /// Creates a new sink write error.
    pub fn sink_write(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SinkWrite {
            message: message.into(),
            source,
        }
    }

    /// Returns true for setup defects that abort a run before evaluation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            QualityError::Configuration(_) | QualityError::ColumnNotFound { .. }
        )
    }

    /// Returns true for the aggregated data-quality verdict failure.
    pub fn is_quality_failure(&self) -> bool {
        matches!(self, QualityError::QualityFailure { .. })
    }

    /// Returns true for result sink persistence failures.
    pub fn is_sink_write(&self) -> bool {
        matches!(self, QualityError::SinkWrite { .. })
    }
}

impl From<serde_json::Error> for QualityError {
    fn from(err: serde_json::Error) -> Self {
        QualityError::Serialization(err.to_string())
    }
}

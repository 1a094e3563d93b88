//! Result sink adapters for persisting one record per metric per run.
//!
//! The sink is append-only: a run appends one [`MetricRecord`] per check,
//! tagged with the run timestamp, and never overwrites earlier runs. That
//! makes a write retry idempotent with respect to correctness, so the gate
//! retries locally before surfacing a [`QualityError::SinkWrite`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::core::RunReport;
use crate::error::{QualityError, Result};

/// Default number of append attempts before giving up.
pub const DEFAULT_WRITE_ATTEMPTS: u32 = 3;

/// One persisted metric: the durable record layout of the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// The unique check name within the run
    pub check_name: String,
    /// The metric the check computed
    pub check_value: f64,
    /// The run timestamp, RFC 3339
    pub pipeline_run_time: String,
}

impl MetricRecord {
    /// Produces one record per check result, all tagged with the report's
    /// run timestamp.
    pub fn from_report(report: &RunReport) -> Vec<MetricRecord> {
        let pipeline_run_time = report.run_timestamp.to_rfc3339();
        report
            .results
            .iter()
            .map(|result| MetricRecord {
                check_name: result.check_name.clone(),
                check_value: result.metric,
                pipeline_run_time: pipeline_run_time.clone(),
            })
            .collect()
    }
}

/// A durable, append-only store receiving one record per metric per run.
///
/// Implementations must never overwrite previously appended records.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Appends the records of one run.
    async fn append(&self, records: &[MetricRecord]) -> Result<()>;
}

/// An in-memory sink for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    records: Arc<RwLock<Vec<MetricRecord>>>,
}

impl InMemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record appended so far.
    pub async fn records(&self) -> Vec<MetricRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ResultSink for InMemorySink {
    async fn append(&self, records: &[MetricRecord]) -> Result<()> {
        let mut store = self.records.write().await;
        store.extend_from_slice(records);
        Ok(())
    }
}

/// A sink that appends newline-delimited JSON records to a file.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Creates a sink writing to `path`; the file is created on first
    /// append.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path records are appended to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for JsonlSink {
    async fn append(&self, records: &[MetricRecord]) -> Result<()> {
        let mut lines = String::new();
        for record in records {
            lines.push_str(&serde_json::to_string(record)?);
            lines.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                QualityError::sink_write(
                    format!("cannot open {} for append", self.path.display()),
                    Some(Box::new(e)),
                )
            })?;
        file.write_all(lines.as_bytes()).await.map_err(|e| {
            QualityError::sink_write(
                format!("cannot append to {}", self.path.display()),
                Some(Box::new(e)),
            )
        })?;
        file.flush().await.map_err(|e| {
            QualityError::sink_write(
                format!("cannot flush {}", self.path.display()),
                Some(Box::new(e)),
            )
        })?;
        Ok(())
    }
}

/// Appends `records` with local retry.
///
/// The quality verdict is already determined when this runs and is never
/// re-evaluated here; only the write is retried.
pub async fn persist_with_retry(
    sink: &dyn ResultSink,
    records: &[MetricRecord],
    attempts: u32,
) -> Result<()> {
    let mut last_error = None;
    for attempt in 1..=attempts.max(1) {
        match sink.append(records).await {
            Ok(()) => {
                if attempt > 1 {
                    info!(attempt, "sink append succeeded after retry");
                }
                return Ok(());
            }
            Err(e) => {
                warn!(attempt, error = %e, "sink append failed");
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(Duration::from_millis(50 * u64::from(attempt))).await;
                }
            }
        }
    }
    Err(QualityError::sink_write(
        format!("append failed after {} attempts", attempts.max(1)),
        last_error.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    ))
}

//! The quality gate: configuration validation, check execution, report
//! emission, and fail-fast propagation.

use datafusion::prelude::SessionContext;
use tracing::{debug, info, instrument, warn};

use crate::core::{CheckDefinition, CheckRegistry, RunReport};
use crate::error::{QualityError, Result};
use crate::executor::CheckExecutor;
use crate::formatters::{HumanFormatter, ResultFormatter};
use crate::sink::{persist_with_retry, MetricRecord, ResultSink, DEFAULT_WRITE_ATTEMPTS};

/// A named battery of quality checks run against one registered table.
///
/// # Examples
///
/// ```rust,no_run
/// use quality_gate::core::CheckDefinition;
/// use quality_gate::gate::QualityGate;
/// use quality_gate::sink::InMemorySink;
/// use datafusion::prelude::SessionContext;
///
/// # async fn example() -> quality_gate::error::Result<()> {
/// let gate = QualityGate::builder("orders_silver")
///     .table_name("orders")
///     .check(CheckDefinition::row_count("row_count"))
///     .check(CheckDefinition::non_null("OrderID_nulls", "OrderID"))
///     .check(CheckDefinition::duplicate_key("duplicate_OrderID", ["OrderID"])?)
///     .build()?;
///
/// let ctx = SessionContext::new();
/// // ... register the "orders" table ...
///
/// let sink = InMemorySink::new();
/// let report = gate.enforce(&ctx, &sink).await?;
/// assert!(report.overall_passed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QualityGate {
    name: String,
    table_name: String,
    registry: CheckRegistry,
}

impl QualityGate {
    /// Creates a new builder for constructing a quality gate.
    pub fn builder(name: impl Into<String>) -> QualityGateBuilder {
        QualityGateBuilder::new(name)
    }

    /// Returns the name of the gate.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the table this gate validates.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the registered checks in registration order.
    pub fn checks(&self) -> &[CheckDefinition] {
        self.registry.all()
    }

    /// Runs every check to completion and aggregates the results.
    ///
    /// Configuration is validated against the live schema up front: a
    /// missing column or a kind/type mismatch aborts before any check
    /// evaluates. Data-quality failures never short-circuit; the report is
    /// always complete.
    #[instrument(skip(self, ctx), fields(
        gate.name = %self.name,
        gate.checks = self.registry.len(),
        table = %self.table_name,
    ))]
    pub async fn run(&self, ctx: &SessionContext) -> Result<RunReport> {
        info!(
            gate.name = %self.name,
            gate.checks = self.registry.len(),
            table = %self.table_name,
            "starting quality gate run"
        );

        let provider = ctx
            .table_provider(self.table_name.as_str())
            .await
            .map_err(|e| {
                QualityError::configuration(format!(
                    "table '{}' is not registered: {e}",
                    self.table_name
                ))
            })?;
        let executor = CheckExecutor::new(&self.table_name, provider.schema())?;

        // Setup defects abort before any evaluation.
        for definition in self.registry.all() {
            executor.validate(definition)?;
        }

        let mut results = Vec::with_capacity(self.registry.len());
        for definition in self.registry.all() {
            let result = executor.evaluate(ctx, definition).await?;
            if result.passed {
                debug!(
                    check.name = %result.check_name,
                    check.metric = result.metric,
                    "check passed"
                );
            } else {
                warn!(
                    check.name = %result.check_name,
                    check.metric = result.metric,
                    failure.message = %result.message.as_deref().unwrap_or(""),
                    "check failed"
                );
            }
            results.push(result);
        }

        let report = RunReport::from_results(&self.name, results);
        info!(
            gate.name = %self.name,
            report.passed = report.overall_passed,
            report.checks = report.results.len(),
            "quality gate run complete"
        );
        Ok(report)
    }

    /// Runs the gate, emits the full report, and enforces the verdict.
    ///
    /// The metric mapping is always logged, pass or fail. On failure the
    /// aggregated [`QualityError::QualityFailure`] propagates synchronously
    /// with one line per failed check; nothing is persisted and nothing is
    /// retried. On success one [`MetricRecord`] per check is appended to
    /// the sink, with local write retry.
    pub async fn enforce(&self, ctx: &SessionContext, sink: &dyn ResultSink) -> Result<RunReport> {
        let report = self.run(ctx).await?;

        let rendered = HumanFormatter::new().format(&report)?;
        info!(gate.name = %self.name, report = %rendered, "data quality results");

        if !report.overall_passed {
            return Err(QualityError::quality_failure(report.failure_messages()));
        }

        let records = MetricRecord::from_report(&report);
        persist_with_retry(sink, &records, DEFAULT_WRITE_ATTEMPTS).await?;
        info!(
            gate.name = %self.name,
            records = records.len(),
            "quality report persisted"
        );
        Ok(report)
    }
}

/// Builder for constructing [`QualityGate`] instances.
#[derive(Debug)]
pub struct QualityGateBuilder {
    name: String,
    table_name: String,
    definitions: Vec<CheckDefinition>,
}

impl QualityGateBuilder {
    /// Creates a new builder with the given gate name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: "data".to_string(),
            definitions: Vec::new(),
        }
    }

    /// Sets the table name to validate. Defaults to `data`.
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Adds a check to the gate.
    pub fn check(mut self, definition: CheckDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Adds multiple checks to the gate.
    pub fn checks<I>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = CheckDefinition>,
    {
        self.definitions.extend(definitions);
        self
    }

    /// Builds the gate, registering every check.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on duplicate check names.
    pub fn build(self) -> Result<QualityGate> {
        let mut registry = CheckRegistry::new();
        for definition in self.definitions {
            registry.register(definition)?;
        }
        Ok(QualityGate {
            name: self.name,
            table_name: self.table_name,
            registry,
        })
    }
}

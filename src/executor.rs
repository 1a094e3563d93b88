//! Check execution against a registered DataFusion table.
//!
//! Each check is one full-table aggregation producing a single count, then a
//! pass/fail classification against the kind's fixed threshold. Evaluation
//! is read-only and independent per check, so metrics are identical across
//! repeated runs over the same immutable dataset.

use arrow::array::Int64Array;
use arrow::datatypes::SchemaRef;
use datafusion::prelude::SessionContext;
use tracing::{debug, instrument};

use crate::core::{CheckDefinition, CheckKind, CheckResult, ColumnKind};
use crate::error::{QualityError, Result};
use crate::security::SqlSecurity;

/// Evaluates check definitions against one table of one session context.
///
/// Holds the declared schema so type dispatch and column presence are
/// resolved against declared types, never runtime values.
#[derive(Debug, Clone)]
pub struct CheckExecutor {
    table_name: String,
    schema: SchemaRef,
}

impl CheckExecutor {
    /// Creates an executor for `table_name` with its declared schema.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the table name is not a valid SQL
    /// identifier.
    pub fn new(table_name: impl Into<String>, schema: SchemaRef) -> Result<Self> {
        let table_name = table_name.into();
        SqlSecurity::validate_identifier(&table_name)?;
        Ok(Self { table_name, schema })
    }

    fn has_column(&self, column: &str) -> bool {
        self.schema.column_with_name(column).is_some()
    }

    fn column_kind(&self, column: &str) -> Result<ColumnKind> {
        let (_, field) =
            self.schema
                .column_with_name(column)
                .ok_or_else(|| QualityError::ColumnNotFound {
                    column: column.to_string(),
                })?;
        ColumnKind::from_arrow(column, field.data_type())
    }

    fn single_column<'a>(&self, definition: &'a CheckDefinition) -> Result<&'a str> {
        definition
            .columns()
            .first()
            .map(String::as_str)
            .ok_or_else(|| {
                QualityError::Internal(format!(
                    "check '{}' has no target column",
                    definition.name()
                ))
            })
    }

    /// Validates a definition against the declared schema without running it.
    ///
    /// Missing columns and kind/type mismatches are setup defects and abort
    /// the run before any evaluation; they are never folded into the
    /// failures list.
    pub fn validate(&self, definition: &CheckDefinition) -> Result<()> {
        match definition.kind() {
            CheckKind::RowCount => Ok(()),
            CheckKind::NonNull => {
                self.column_kind(self.single_column(definition)?)?;
                Ok(())
            }
            CheckKind::PositiveNumeric => {
                let column = self.single_column(definition)?;
                match self.column_kind(column)? {
                    ColumnKind::Numeric | ColumnKind::Textual => Ok(()),
                    other => Err(QualityError::configuration(format!(
                        "check '{}': positive_numeric does not apply to {other} column '{column}'",
                        definition.name()
                    ))),
                }
            }
            CheckKind::ValidDate => {
                let column = self.single_column(definition)?;
                match self.column_kind(column)? {
                    ColumnKind::Textual | ColumnKind::Temporal => Ok(()),
                    other => Err(QualityError::configuration(format!(
                        "check '{}': valid_date does not apply to {other} column '{column}'",
                        definition.name()
                    ))),
                }
            }
            CheckKind::DuplicateKey => {
                for column in definition.columns() {
                    self.column_kind(column)?;
                }
                Ok(())
            }
            CheckKind::FlagMustBeFalse => {
                let column = self.single_column(definition)?;
                if definition.is_optional() && !self.has_column(column) {
                    return Ok(());
                }
                match self.column_kind(column)? {
                    ColumnKind::Boolean => Ok(()),
                    other => Err(QualityError::configuration(format!(
                        "check '{}': boolean_flag_must_be_false requires a boolean column, \
                         '{column}' is {other}",
                        definition.name()
                    ))),
                }
            }
        }
    }

    /// Evaluates one definition, producing exactly one result.
    #[instrument(skip(self, ctx), fields(
        check.name = %definition.name(),
        check.kind = %definition.kind().name(),
        table = %self.table_name,
    ))]
    pub async fn evaluate(
        &self,
        ctx: &SessionContext,
        definition: &CheckDefinition,
    ) -> Result<CheckResult> {
        self.validate(definition)?;
        let table = &self.table_name;

        let (count, passed) = match definition.kind() {
            CheckKind::RowCount => {
                let count = self
                    .count_query(ctx, &format!("SELECT COUNT(*) AS violation_count FROM {table}"))
                    .await?;
                (count, count > 0)
            }
            CheckKind::NonNull => {
                let column = self.single_column(definition)?;
                let kind = self.column_kind(column)?;
                let escaped = SqlSecurity::escape_identifier(column)?;
                let predicate = kind.null_predicate(&escaped);
                let count = self.violation_count(ctx, &predicate).await?;
                (count, count == 0)
            }
            CheckKind::PositiveNumeric => {
                let escaped = SqlSecurity::escape_identifier(self.single_column(definition)?)?;
                let predicate = format!(
                    "TRY_CAST({escaped} AS DOUBLE) IS NULL OR TRY_CAST({escaped} AS DOUBLE) <= 0"
                );
                let count = self.violation_count(ctx, &predicate).await?;
                (count, count == 0)
            }
            CheckKind::ValidDate => {
                let escaped = SqlSecurity::escape_identifier(self.single_column(definition)?)?;
                let predicate = format!("TRY_CAST({escaped} AS DATE) IS NULL");
                let count = self.violation_count(ctx, &predicate).await?;
                (count, count == 0)
            }
            CheckKind::DuplicateKey => {
                let mut escaped = Vec::with_capacity(definition.columns().len());
                for column in definition.columns() {
                    escaped.push(SqlSecurity::escape_identifier(column)?);
                }
                let key_list = escaped.join(", ");
                let sql = format!(
                    "SELECT COUNT(*) AS violation_count FROM \
                     (SELECT {key_list} FROM {table} GROUP BY {key_list} HAVING COUNT(*) > 1) \
                     AS duplicate_keys"
                );
                let count = self.count_query(ctx, &sql).await?;
                (count, count == 0)
            }
            CheckKind::FlagMustBeFalse => {
                let column = self.single_column(definition)?;
                if definition.is_optional() && !self.has_column(column) {
                    debug!(
                        check.name = %definition.name(),
                        check.column = %column,
                        "optional flag column absent, passing vacuously"
                    );
                    (0, true)
                } else {
                    let escaped = SqlSecurity::escape_identifier(column)?;
                    let predicate = format!("{escaped} = TRUE");
                    let count = self.violation_count(ctx, &predicate).await?;
                    (count, count == 0)
                }
            }
        };

        debug!(
            check.name = %definition.name(),
            check.metric = count,
            check.passed = passed,
            "check evaluated"
        );

        if passed {
            Ok(CheckResult::passed(definition.name(), count as f64))
        } else {
            Ok(CheckResult::failed(
                definition.name(),
                count as f64,
                definition.kind().failure_message(definition.name(), count),
            ))
        }
    }

    async fn violation_count(&self, ctx: &SessionContext, predicate: &str) -> Result<i64> {
        let table = &self.table_name;
        let sql =
            format!("SELECT COUNT(*) AS violation_count FROM {table} WHERE {predicate}");
        self.count_query(ctx, &sql).await
    }

    async fn count_query(&self, ctx: &SessionContext, sql: &str) -> Result<i64> {
        let df = ctx.sql(sql).await?;
        let batches = df.collect().await?;
        for batch in &batches {
            if batch.num_rows() > 0 {
                let counts = batch
                    .column(0)
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .ok_or_else(|| {
                        QualityError::Internal(
                            "count query did not return an Int64 column".to_string(),
                        )
                    })?;
                return Ok(counts.value(0));
            }
        }
        Err(QualityError::Internal(
            "count query returned no rows".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use datafusion::datasource::MemTable;
    use std::sync::Arc;

    fn orders_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("OrderID", DataType::Int64, true),
            Field::new("OrderDate", DataType::Utf8, true),
            Field::new("ProductCode", DataType::Utf8, true),
            Field::new("Quantity", DataType::Utf8, true),
            Field::new("UnitPrice", DataType::Float64, true),
            Field::new("IsErrorRow", DataType::Boolean, true),
        ]))
    }

    /// Three-row fixture exercising every violation kind: a duplicated
    /// OrderID, a null and an empty ProductCode, a NaN price, a
    /// non-numeric and a negative Quantity, an invalid calendar date, and
    /// one flagged row.
    async fn dirty_orders_context() -> SessionContext {
        let schema = orders_schema();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![Some(1), Some(1), Some(2)])),
                Arc::new(StringArray::from(vec![
                    Some("2023-01-05"),
                    Some("2023-13-40"),
                    Some("2023-02-11"),
                ])),
                Arc::new(StringArray::from(vec![Some("A-100"), None, Some("")])),
                Arc::new(StringArray::from(vec![Some("5"), Some("-1"), Some("abc")])),
                Arc::new(Float64Array::from(vec![
                    Some(9.99),
                    Some(f64::NAN),
                    Some(4.5),
                ])),
                Arc::new(BooleanArray::from(vec![
                    Some(false),
                    Some(true),
                    Some(false),
                ])),
            ],
        )
        .unwrap();

        let ctx = SessionContext::new();
        let provider = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
        ctx.register_table("orders", Arc::new(provider)).unwrap();
        ctx
    }

    async fn empty_orders_context() -> SessionContext {
        let schema = orders_schema();
        let batch = RecordBatch::new_empty(schema.clone());
        let ctx = SessionContext::new();
        let provider = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
        ctx.register_table("orders", Arc::new(provider)).unwrap();
        ctx
    }

    async fn executor_for(ctx: &SessionContext) -> CheckExecutor {
        let provider = ctx.table_provider("orders").await.unwrap();
        CheckExecutor::new("orders", provider.schema()).unwrap()
    }

    #[tokio::test]
    async fn test_row_count_passes_on_non_empty_dataset() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        let result = executor
            .evaluate(&ctx, &CheckDefinition::row_count("row_count"))
            .await
            .unwrap();
        assert!(result.passed);
        assert_eq!(result.metric, 3.0);
    }

    #[tokio::test]
    async fn test_empty_dataset_fails_row_count_and_passes_per_row_checks() {
        let ctx = empty_orders_context().await;
        let executor = executor_for(&ctx).await;

        let row_count = executor
            .evaluate(&ctx, &CheckDefinition::row_count("row_count"))
            .await
            .unwrap();
        assert!(!row_count.passed);
        assert_eq!(row_count.metric, 0.0);
        assert!(row_count.message.as_deref().unwrap().contains("empty"));

        // Every per-row check is vacuous over an empty scan.
        for definition in [
            CheckDefinition::non_null("OrderID_nulls", "OrderID"),
            CheckDefinition::positive_numeric("Quantity_invalid_values", "Quantity"),
            CheckDefinition::valid_date("OrderDate_bad", "OrderDate"),
            CheckDefinition::duplicate_key("duplicate_OrderID", ["OrderID"]).unwrap(),
            CheckDefinition::flag_must_be_false("IsErrorRow_true", "IsErrorRow"),
        ] {
            let result = executor.evaluate(&ctx, &definition).await.unwrap();
            assert!(result.passed, "{} should pass on empty data", result.check_name);
            assert_eq!(result.metric, 0.0);
        }
    }

    #[tokio::test]
    async fn test_non_null_uses_nan_rule_for_numeric_columns() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        // UnitPrice has one NaN and no nulls; the numeric rule counts it.
        let result = executor
            .evaluate(&ctx, &CheckDefinition::non_null("UnitPrice_nulls", "UnitPrice"))
            .await
            .unwrap();
        assert!(!result.passed);
        assert_eq!(result.metric, 1.0);
    }

    #[tokio::test]
    async fn test_non_null_uses_empty_string_rule_for_textual_columns() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        // ProductCode has one null and one empty string.
        let result = executor
            .evaluate(
                &ctx,
                &CheckDefinition::non_null("ProductCode_nulls", "ProductCode"),
            )
            .await
            .unwrap();
        assert!(!result.passed);
        assert_eq!(result.metric, 2.0);
        assert_eq!(
            result.message.as_deref(),
            Some("ProductCode_nulls contains 2 null/blank values")
        );
    }

    #[tokio::test]
    async fn test_positive_numeric_counts_cast_failures_and_non_positives() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        // Quantity is ["5", "-1", "abc"]: one non-positive, one cast failure.
        let result = executor
            .evaluate(
                &ctx,
                &CheckDefinition::positive_numeric("Quantity_invalid_values", "Quantity"),
            )
            .await
            .unwrap();
        assert!(!result.passed);
        assert_eq!(result.metric, 2.0);
    }

    #[tokio::test]
    async fn test_valid_date_counts_unparseable_calendar_dates() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        // "2023-13-40" is not a calendar date.
        let result = executor
            .evaluate(&ctx, &CheckDefinition::valid_date("OrderDate_bad", "OrderDate"))
            .await
            .unwrap();
        assert!(!result.passed);
        assert_eq!(result.metric, 1.0);
    }

    #[tokio::test]
    async fn test_duplicate_key_counts_keys_not_rows() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        // OrderID = [1, 1, 2]: one key appears more than once.
        let result = executor
            .evaluate(
                &ctx,
                &CheckDefinition::duplicate_key("duplicate_OrderID", ["OrderID"]).unwrap(),
            )
            .await
            .unwrap();
        assert!(!result.passed);
        assert_eq!(result.metric, 1.0);
    }

    #[tokio::test]
    async fn test_flag_must_be_false_counts_true_rows() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        let result = executor
            .evaluate(
                &ctx,
                &CheckDefinition::flag_must_be_false("IsErrorRow_true", "IsErrorRow"),
            )
            .await
            .unwrap();
        assert!(!result.passed);
        assert_eq!(result.metric, 1.0);
        assert_eq!(result.message.as_deref(), Some("IsErrorRow_true flagged 1 rows"));
    }

    #[tokio::test]
    async fn test_optional_flag_passes_vacuously_when_column_absent() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        let result = executor
            .evaluate(
                &ctx,
                &CheckDefinition::flag_if_present("IsInvalidCustomer_true", "IsInvalidCustomer"),
            )
            .await
            .unwrap();
        assert!(result.passed);
        assert_eq!(result.metric, 0.0);
    }

    #[tokio::test]
    async fn test_missing_column_is_column_not_found_not_a_data_failure() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        let err = executor
            .evaluate(&ctx, &CheckDefinition::non_null("CustomerKey_nulls", "CustomerKey"))
            .await
            .unwrap_err();
        assert!(matches!(err, QualityError::ColumnNotFound { ref column } if column == "CustomerKey"));
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_kind_type_mismatch_is_configuration_error() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;

        // valid_date on a numeric column
        let err = executor
            .validate(&CheckDefinition::valid_date("OrderID_bad", "OrderID"))
            .unwrap_err();
        assert!(err.is_configuration());

        // boolean flag on a textual column
        let err = executor
            .validate(&CheckDefinition::flag_must_be_false("ProductCode_true", "ProductCode"))
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_evaluation_is_idempotent_over_immutable_data() {
        let ctx = dirty_orders_context().await;
        let executor = executor_for(&ctx).await;
        let definition =
            CheckDefinition::positive_numeric("Quantity_invalid_values", "Quantity");
        let first = executor.evaluate(&ctx, &definition).await.unwrap();
        let second = executor.evaluate(&ctx, &definition).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_executor_rejects_invalid_table_name() {
        let err = CheckExecutor::new("orders; DROP TABLE orders", orders_schema()).unwrap_err();
        assert!(err.is_configuration());
    }
}

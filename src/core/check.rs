//! Check definitions and the ordered check registry.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{QualityError, Result};

/// The kind of a quality check, fixing its metric rule and pass threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Total row count; passes iff the dataset is non-empty.
    RowCount,
    /// Count of null (or NaN / empty-string, by declared kind) values;
    /// passes iff zero.
    NonNull,
    /// Count of values that fail a cast to double or are not positive;
    /// passes iff zero.
    PositiveNumeric,
    /// Count of values that cannot be parsed into a calendar date; passes
    /// iff zero.
    ValidDate,
    /// Count of distinct key-tuples appearing more than once; passes iff
    /// zero.
    DuplicateKey,
    /// Count of rows where a boolean flag column is true; passes iff zero.
    FlagMustBeFalse,
}

impl CheckKind {
    /// Returns the snake_case name of this kind for logging and records.
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::RowCount => "row_count",
            CheckKind::NonNull => "non_null",
            CheckKind::PositiveNumeric => "positive_numeric",
            CheckKind::ValidDate => "valid_date",
            CheckKind::DuplicateKey => "duplicate_key",
            CheckKind::FlagMustBeFalse => "boolean_flag_must_be_false",
        }
    }

    /// Synthesizes the human-readable failure line for a failing check.
    ///
    /// The line always starts with the check name and embeds the violation
    /// count, so [`parse_failure_message`](crate::core::parse_failure_message)
    /// can recover both.
    pub fn failure_message(&self, check_name: &str, count: i64) -> String {
        match self {
            CheckKind::RowCount => {
                format!("{check_name} dataset is empty ({count} rows)")
            }
            CheckKind::NonNull => {
                format!("{check_name} contains {count} null/blank values")
            }
            CheckKind::PositiveNumeric => {
                format!("{check_name} has {count} invalid or non-positive values")
            }
            CheckKind::ValidDate => {
                format!("{check_name} contains {count} invalid date values")
            }
            CheckKind::DuplicateKey => {
                format!("{check_name} found {count} duplicate key tuples")
            }
            CheckKind::FlagMustBeFalse => {
                format!("{check_name} flagged {count} rows")
            }
        }
    }
}

/// A named, immutable quality check to run once per gate execution.
///
/// Definitions are created through the per-kind constructors, which enforce
/// the column shape each kind expects, and live for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDefinition {
    name: String,
    columns: Vec<String>,
    kind: CheckKind,
    optional: bool,
}

impl CheckDefinition {
    fn new(name: impl Into<String>, columns: Vec<String>, kind: CheckKind, optional: bool) -> Self {
        Self {
            name: name.into(),
            columns,
            kind,
            optional,
        }
    }

    /// A check that the dataset has at least one row.
    pub fn row_count(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), CheckKind::RowCount, false)
    }

    /// A check that `column` contains no null (or NaN / empty-string,
    /// depending on its declared kind) values.
    pub fn non_null(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(name, vec![column.into()], CheckKind::NonNull, false)
    }

    /// A check that every value of `column` casts to a double greater than
    /// zero.
    pub fn positive_numeric(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(name, vec![column.into()], CheckKind::PositiveNumeric, false)
    }

    /// A check that every value of `column` parses into a calendar date.
    pub fn valid_date(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(name, vec![column.into()], CheckKind::ValidDate, false)
    }

    /// A check that no key-tuple over `columns` appears more than once.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `columns` is empty.
    pub fn duplicate_key<I, S>(name: impl Into<String>, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(QualityError::configuration(format!(
                "check '{name}': duplicate_key requires at least one key column"
            )));
        }
        Ok(Self::new(name, columns, CheckKind::DuplicateKey, false))
    }

    /// A check that the boolean `column` is false on every row.
    pub fn flag_must_be_false(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(name, vec![column.into()], CheckKind::FlagMustBeFalse, false)
    }

    /// Like [`flag_must_be_false`](Self::flag_must_be_false), but vacuously
    /// passes with metric 0 when the column is absent from the dataset
    /// instead of aborting the run.
    pub fn flag_if_present(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(name, vec![column.into()], CheckKind::FlagMustBeFalse, true)
    }

    /// Returns the unique name of this check.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the target columns in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the kind of this check.
    pub fn kind(&self) -> CheckKind {
        self.kind
    }

    /// Returns true if a missing target column passes vacuously instead of
    /// aborting the run.
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// The ordered collection of checks for one gate run.
///
/// Holds no execution logic. Registration order is preserved because it
/// drives report readability; correctness does not depend on it since
/// checks are mutually independent.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    checks: Vec<CheckDefinition>,
    names: HashSet<String>,
}

impl CheckRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a check definition.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a check with the same name is
    /// already registered. Names become the keys of the result mapping and
    /// must be unique within one run.
    pub fn register(&mut self, definition: CheckDefinition) -> Result<()> {
        if !self.names.insert(definition.name().to_string()) {
            return Err(QualityError::configuration(format!(
                "duplicate check name '{}'",
                definition.name()
            )));
        }
        self.checks.push(definition);
        Ok(())
    }

    /// Returns all checks in registration order.
    pub fn all(&self) -> &[CheckDefinition] {
        &self.checks
    }

    /// Returns the number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

//! Declared column kinds and their null-check predicates.
//!
//! The `non_null` check must branch on the *declared* column type, never on
//! runtime values: not-a-number sentinels are only meaningful for numeric
//! columns and empty-string sentinels only for textual ones. This module
//! folds the Arrow schema type into a closed variant carrying the right
//! predicate for each kind.

use std::fmt;

use arrow::datatypes::DataType;

use crate::error::{QualityError, Result};

/// The declared kind of a dataset column, derived from its Arrow type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer, floating-point or decimal columns
    Numeric,
    /// String columns
    Textual,
    /// Date and timestamp columns
    Temporal,
    /// Boolean columns
    Boolean,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Textual => write!(f, "textual"),
            ColumnKind::Temporal => write!(f, "temporal"),
            ColumnKind::Boolean => write!(f, "boolean"),
        }
    }
}

impl ColumnKind {
    /// Maps the declared Arrow type of `column` to its kind.
    ///
    /// Types outside the closed set are a configuration error, not a data
    /// error: the check battery has no defined semantics for them.
    pub fn from_arrow(column: &str, data_type: &DataType) -> Result<Self> {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => Ok(ColumnKind::Numeric),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Ok(ColumnKind::Textual),
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
                Ok(ColumnKind::Temporal)
            }
            DataType::Boolean => Ok(ColumnKind::Boolean),
            other => Err(QualityError::configuration(format!(
                "column '{column}' has unsupported declared type {other}"
            ))),
        }
    }

    /// Returns the SQL predicate matching a "missing" value for this kind.
    ///
    /// `escaped` must already be a safely escaped column identifier.
    pub fn null_predicate(&self, escaped: &str) -> String {
        match self {
            ColumnKind::Numeric => {
                format!("{escaped} IS NULL OR isnan(CAST({escaped} AS DOUBLE))")
            }
            ColumnKind::Textual => format!("{escaped} IS NULL OR {escaped} = ''"),
            ColumnKind::Temporal | ColumnKind::Boolean => format!("{escaped} IS NULL"),
        }
    }
}

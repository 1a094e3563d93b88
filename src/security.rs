//! SQL identifier hygiene for generated queries.
//!
//! Check evaluation interpolates column and table names into SQL text, so
//! every identifier that reaches a query string is validated and escaped
//! here first.

use crate::error::{QualityError, Result};

/// SQL identifier validation and escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates a SQL identifier without escaping it.
    ///
    /// Accepts identifiers of at most 128 characters that start with a
    /// letter or underscore and continue with letters, digits or
    /// underscores.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.is_empty() {
            return Err(QualityError::configuration(
                "SQL identifier cannot be empty",
            ));
        }
        if identifier.len() > 128 {
            return Err(QualityError::configuration(format!(
                "SQL identifier too long ({} characters, max 128)",
                identifier.len()
            )));
        }
        let mut chars = identifier.chars();
        let first_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !first_ok || !identifier.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(QualityError::configuration(format!(
                "invalid SQL identifier '{identifier}'"
            )));
        }
        Ok(())
    }

    /// Validates and escapes a SQL identifier for interpolation.
    ///
    /// Escaping uses double quotes, which also preserves mixed-case column
    /// names like `OrderID` exactly as declared in the schema.
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }
}

//! Check results and the per-run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The outcome of evaluating one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The name of the check that produced this result
    pub check_name: String,
    /// The scalar metric the check computed (a non-negative count)
    pub metric: f64,
    /// Whether the metric met the kind's fixed pass threshold
    pub passed: bool,
    /// Failure description, present iff the check failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    /// Creates a passing result.
    pub fn passed(check_name: impl Into<String>, metric: f64) -> Self {
        Self {
            check_name: check_name.into(),
            metric,
            passed: true,
            message: None,
        }
    }

    /// Creates a failing result with a human-readable message.
    pub fn failed(check_name: impl Into<String>, metric: f64, message: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            metric,
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// The aggregate outcome of all checks for one gate execution.
///
/// Built once per run by folding every [`CheckResult`] in evaluation order;
/// no result is ever dropped. Terminal: either persisted via the sink or
/// discarded when the run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// The name of the gate that produced this report
    pub gate_name: String,
    /// Every check result, in evaluation order
    pub results: Vec<CheckResult>,
    /// True iff every check passed
    pub overall_passed: bool,
    /// When the run executed
    pub run_timestamp: DateTime<Utc>,
}

impl RunReport {
    /// Folds a sequence of check results into a report.
    pub fn from_results(gate_name: impl Into<String>, results: Vec<CheckResult>) -> Self {
        let overall_passed = results.iter().all(|r| r.passed);
        Self {
            gate_name: gate_name.into(),
            results,
            overall_passed,
            run_timestamp: Utc::now(),
        }
    }

    /// Returns the name→metric mapping in evaluation order.
    pub fn metric_entries(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.results.iter().map(|r| (r.check_name.as_str(), r.metric))
    }

    /// Returns the messages of every failing check, in evaluation order.
    pub fn failure_messages(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| {
                r.message.clone().unwrap_or_else(|| {
                    format!("{} failed with metric {}", r.check_name, r.metric)
                })
            })
            .collect()
    }
}

/// Recovers the check name and violation count embedded in a failure line.
///
/// Failure lines have the form `<check_name> <description with count>`; the
/// name is the first whitespace token and the count the first integer token
/// after it. Returns `None` if the line does not embed a count.
pub fn parse_failure_message(message: &str) -> Option<(&str, u64)> {
    let mut tokens = message.split_whitespace();
    let name = tokens.next()?;
    for token in tokens {
        let digits = token.trim_matches(|c: char| !c.is_ascii_digit());
        if digits.is_empty() {
            continue;
        }
        if let Ok(count) = digits.parse::<u64>() {
            return Some((name, count));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_passed_is_conjunction_of_results() {
        let all_pass = RunReport::from_results(
            "orders_silver",
            vec![
                CheckResult::passed("row_count", 3.0),
                CheckResult::passed("OrderID_nulls", 0.0),
            ],
        );
        assert!(all_pass.overall_passed);
        assert!(all_pass.failure_messages().is_empty());

        let one_fail = RunReport::from_results(
            "orders_silver",
            vec![
                CheckResult::passed("row_count", 3.0),
                CheckResult::failed(
                    "OrderID_nulls",
                    2.0,
                    "OrderID_nulls contains 2 null/blank values",
                ),
            ],
        );
        assert!(!one_fail.overall_passed);
        assert_eq!(one_fail.failure_messages().len(), 1);
    }

    #[test]
    fn test_no_result_is_dropped_even_when_redundant() {
        let report = RunReport::from_results(
            "orders_silver",
            vec![
                CheckResult::failed("dup", 1.0, "dup found 1 duplicate key tuples"),
                CheckResult::failed("dup", 1.0, "dup found 1 duplicate key tuples"),
            ],
        );
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failure_messages().len(), 2);
    }

    #[test]
    fn test_metric_entries_preserve_evaluation_order() {
        let report = RunReport::from_results(
            "orders_silver",
            vec![
                CheckResult::passed("row_count", 3.0),
                CheckResult::passed("Quantity_invalid_values", 0.0),
                CheckResult::passed("duplicate_OrderID", 0.0),
            ],
        );
        let names: Vec<&str> = report.metric_entries().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["row_count", "Quantity_invalid_values", "duplicate_OrderID"]
        );
    }

    #[test]
    fn test_parse_failure_message() {
        assert_eq!(
            parse_failure_message("OrderID_nulls contains 3 null/blank values"),
            Some(("OrderID_nulls", 3))
        );
        assert_eq!(
            parse_failure_message("row_count dataset is empty (0 rows)"),
            Some(("row_count", 0))
        );
        assert_eq!(parse_failure_message("no count in here"), None);
    }

    #[test]
    fn test_report_serializes_with_rfc3339_timestamp() {
        let report = RunReport::from_results("g", vec![CheckResult::passed("row_count", 1.0)]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"run_timestamp\""));
        assert!(json.contains("\"overall_passed\":true"));
        // message is omitted on passing results
        assert!(!json.contains("\"message\""));
    }
}

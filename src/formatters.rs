//! Result formatting utilities.
//!
//! The full metric mapping is rendered regardless of pass/fail; the gate
//! logs it before enforcing the verdict so a failed run still leaves a
//! complete record in the console/log channel.

use std::fmt::Write as _;

use crate::core::RunReport;
use crate::error::Result;

/// Renders a [`RunReport`] into a displayable string.
pub trait ResultFormatter {
    /// Formats the report.
    fn format(&self, report: &RunReport) -> Result<String>;
}

/// Formats a report as JSON, optionally pretty-printed.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a compact JSON formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to pretty-print the output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, report: &RunReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }
}

/// Formats a report as a key-value document for console display.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    /// Creates a new human-readable formatter.
    pub fn new() -> Self {
        Self
    }
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, report: &RunReport) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "DATA QUALITY RESULTS: {}", report.gate_name);
        for result in &report.results {
            let verdict = if result.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "  {:<32} = {:<10} [{verdict}]",
                result.check_name, result.metric
            );
        }
        let overall = if report.overall_passed {
            "PASSED"
        } else {
            "FAILED"
        };
        let _ = writeln!(
            out,
            "Result: {overall} (run at {})",
            report.run_timestamp.to_rfc3339()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CheckResult;

    fn sample_report() -> RunReport {
        RunReport::from_results(
            "orders_silver",
            vec![
                CheckResult::passed("row_count", 3.0),
                CheckResult::failed(
                    "OrderID_nulls",
                    2.0,
                    "OrderID_nulls contains 2 null/blank values",
                ),
            ],
        )
    }

    #[test]
    fn test_json_formatter() {
        let report = sample_report();
        let compact = JsonFormatter::new().format(&report).unwrap();
        assert!(compact.contains("\"gate_name\":\"orders_silver\""));
        assert!(compact.contains("\"overall_passed\":false"));

        let pretty = JsonFormatter::new().with_pretty(true).format(&report).unwrap();
        assert!(pretty.contains('\n'));
        assert!(pretty.contains("\"check_name\": \"row_count\""));
    }

    #[test]
    fn test_human_formatter_renders_all_metrics_regardless_of_verdict() {
        let rendered = HumanFormatter::new().format(&sample_report()).unwrap();
        assert!(rendered.contains("DATA QUALITY RESULTS: orders_silver"));
        assert!(rendered.contains("row_count"));
        assert!(rendered.contains("[PASS]"));
        assert!(rendered.contains("OrderID_nulls"));
        assert!(rendered.contains("[FAIL]"));
        assert!(rendered.contains("Result: FAILED"));
    }
}

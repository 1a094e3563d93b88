//! # Quality Gate - Data Quality Validation for Ingestion Pipelines
//!
//! Quality Gate runs a fixed battery of data-quality checks against a
//! tabular dataset registered in a DataFusion [`SessionContext`], aggregates
//! the metrics into a per-run report, and either halts the pipeline with a
//! single aggregated failure or persists one record per metric to an
//! append-only result sink.
//!
//! [`SessionContext`]: datafusion::prelude::SessionContext
//!
//! ## Overview
//!
//! A gate is a named, ordered collection of [`CheckDefinition`]s. Each check
//! computes one scalar metric via a single full-table aggregation and is
//! classified pass/fail against its kind's fixed threshold:
//!
//! - `row_count`: the dataset must be non-empty
//! - `non_null`: no null values, where "null" follows the declared column
//!   kind (NaN counts for numeric columns, empty strings for textual ones)
//! - `positive_numeric`: every value casts to a double greater than zero
//! - `valid_date`: every value parses into a calendar date
//! - `duplicate_key`: no key-tuple appears more than once
//! - `boolean_flag_must_be_false`: a business-rule flag is never set
//!
//! All checks always run to completion so the report is complete; a failing
//! run terminates with one aggregated error carrying one line per failed
//! check. Setup defects (missing columns, kind/type mismatches, duplicate
//! check names) abort immediately and are surfaced separately from data
//! failures, as are sink write failures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quality_gate::prelude::*;
//! use datafusion::prelude::SessionContext;
//!
//! # async fn example() -> quality_gate::error::Result<()> {
//! let gate = QualityGate::builder("orders_silver")
//!     .table_name("orders")
//!     .check(CheckDefinition::row_count("row_count"))
//!     .check(CheckDefinition::non_null("OrderID_nulls", "OrderID"))
//!     .check(CheckDefinition::positive_numeric("Quantity_invalid_values", "Quantity"))
//!     .check(CheckDefinition::valid_date("OrderDate_bad", "OrderDate"))
//!     .check(CheckDefinition::duplicate_key("duplicate_OrderID", ["OrderID"])?)
//!     .check(CheckDefinition::flag_if_present("IsErrorRow_true", "IsErrorRow"))
//!     .build()?;
//!
//! let ctx = SessionContext::new();
//! // ... register the "orders" table ...
//!
//! let sink = JsonlSink::new("dq_results.jsonl");
//! match gate.enforce(&ctx, &sink).await {
//!     Ok(report) => println!("all {} checks passed", report.results.len()),
//!     Err(e) if e.is_quality_failure() => eprintln!("{e}"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`core`**: check definitions, the ordered registry, declared column
//!   kinds, and per-run results
//! - **`executor`**: SQL metric evaluation per check kind
//! - **`gate`**: orchestration, report emission, and fail-fast propagation
//! - **`sink`**: append-only result persistence adapters
//! - **`formatters`**: JSON and human-readable report rendering
//! - **`logging`**: `tracing` subscriber setup
//! - **`security`**: SQL identifier validation for generated queries

pub mod core;
pub mod error;
pub mod executor;
pub mod formatters;
pub mod gate;
pub mod logging;
pub mod prelude;
pub mod security;
pub mod sink;

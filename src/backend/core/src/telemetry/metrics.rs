//! Metric names and descriptions.
//!
//! The library only records through the `metrics` facade. Installing a
//! recorder (Prometheus or otherwise) is left to the embedding binary.

use metrics::describe_counter;

/// Decisions taken, labelled by `outcome` (`allow`, `deny`, `error`).
pub const DECISIONS_TOTAL: &str = "pathwarden_decisions_total";

/// Errors returned across the HTTP boundary, labelled by `code`.
pub const ERRORS_TOTAL: &str = "pathwarden_errors_total";

/// Register descriptions with whatever recorder is installed.
pub fn describe_metrics() {
    describe_counter!(DECISIONS_TOTAL, "Authorization decisions by outcome");
    describe_counter!(ERRORS_TOTAL, "Authorization errors by error code");
}

//! Telemetry: structured logging and metric descriptions.
//!
//! # Example
//!
//! ```rust,no_run
//! use pathwarden_core::telemetry::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::default()).expect("Failed to initialize logging");
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{build_filter, init_logging, LogFormat, LoggingConfig};
pub use metrics::{describe_metrics, DECISIONS_TOTAL, ERRORS_TOTAL};

//! Crate-level error type for the HTTP boundary.
//!
//! Module errors (`ConfigError`, `EvaluationError`, ...) are converted into
//! [`PathwardenError`], which carries:
//! - a stable machine-readable [`ErrorCode`] with its HTTP status
//! - a generic user-facing message that never names roles or rules
//! - an internal message and source error that are only logged
//!
//! # Usage
//!
//! ```rust,ignore
//! use pathwarden_core::error::{PathwardenError, Result};
//!
//! fn guard(engine: &PolicyEngine, subject: Option<&Subject>) -> Result<()> {
//!     authorize(engine, subject, "/v1/projects", "GET")?;
//!     Ok(())
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, error, warn};

use crate::rbac::error::{AuthorizationError, ConfigError, EvaluationError, PolicyError};
use crate::telemetry::metrics::ERRORS_TOTAL;

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for request-boundary operations.
pub type Result<T> = std::result::Result<T, PathwardenError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No rule grants the request.
    Unauthorized,
    /// The identity layer did not attach a subject.
    MissingSubject,
    /// Evaluation hit an unexpected fault.
    EvaluationFailed,
    /// The policy could not be loaded.
    InvalidPolicy,
    InternalError,
}

impl ErrorCode {
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::Unauthorized => 4010,
            Self::InternalError => 5000,
            Self::MissingSubject => 5001,
            Self::EvaluationFailed => 5002,
            Self::InvalidPolicy => 5003,
        }
    }

    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingSubject
            | Self::EvaluationFailed
            | Self::InvalidPolicy
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::MissingSubject => "MISSING_SUBJECT",
            Self::EvaluationFailed => "EVALUATION_FAILED",
            Self::InvalidPolicy => "INVALID_POLICY",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (affects logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Expected outcomes such as a denied request
    Medium,
    /// Wiring or policy defects
    High,
    Critical,
}

impl ErrorSeverity {
    pub const fn from_code(code: &ErrorCode) -> Self {
        match code {
            ErrorCode::Unauthorized => Self::Medium,
            ErrorCode::MissingSubject | ErrorCode::EvaluationFailed | ErrorCode::InvalidPolicy => {
                Self::High
            }
            ErrorCode::InternalError => Self::Critical,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// Structured error returned across the HTTP boundary.
#[derive(Debug)]
pub struct PathwardenError {
    code: ErrorCode,

    /// Safe to expose to clients
    user_message: Cow<'static, str>,

    /// For logging only
    internal_message: Option<String>,

    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for PathwardenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.user_message)?;
        if let Some(ref internal) = self.internal_message {
            write!(f, " (internal: {})", internal)?;
        }
        Ok(())
    }
}

impl std::error::Error for PathwardenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl PathwardenError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn new(code: ErrorCode, user_message: impl Into<Cow<'static, str>>) -> Self {
        let error = Self {
            code,
            user_message: user_message.into(),
            internal_message: None,
            source: None,
        };
        error.record_metrics();
        error
    }

    /// Create an error with both user and internal messages.
    pub fn with_internal(
        code: ErrorCode,
        user_message: impl Into<Cow<'static, str>>,
        internal_message: impl Into<String>,
    ) -> Self {
        let mut error = Self::new(code, user_message);
        error.internal_message = Some(internal_message.into());
        error
    }

    /// 401 with a generic body.
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized, "Unauthorized")
    }

    /// 500 with a generic body.
    pub fn internal(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_internal(code, "Internal server error", message)
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_deref()
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log this error with appropriate severity.
    pub fn log(&self) {
        let status = self.http_status().as_u16();

        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::High => {
                error!(
                    error_code = %self.code,
                    http_status = status,
                    internal_message = ?self.internal_message,
                    source = ?self.source,
                    "Request blocked by authorization error"
                );
            }
            ErrorSeverity::Medium => {
                warn!(
                    error_code = %self.code,
                    http_status = status,
                    internal_message = ?self.internal_message,
                    "Request denied"
                );
            }
        }
        debug!(user_message = %self.user_message, "Error response prepared");
    }

    fn record_metrics(&self) {
        counter!(ERRORS_TOTAL, "code" => self.code.as_str()).increment(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// API Response
// ═══════════════════════════════════════════════════════════════════════════════

/// Error response for API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false for errors
    pub success: bool,
    pub error: ErrorInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub numeric_code: u32,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<&PathwardenError> for ErrorResponse {
    fn from(error: &PathwardenError) -> Self {
        Self {
            success: false,
            error: ErrorInfo {
                code: error.code,
                numeric_code: error.code.numeric_code(),
                message: error.user_message.to_string(),
                timestamp: chrono::Utc::now(),
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Axum Integration
// ═══════════════════════════════════════════════════════════════════════════════

impl IntoResponse for PathwardenError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.http_status();
        let response = ErrorResponse::from(&self);

        (status, Json(response)).into_response()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

impl From<AuthorizationError> for PathwardenError {
    fn from(error: AuthorizationError) -> Self {
        match error {
            AuthorizationError::MissingSubject => {
                Self::internal(ErrorCode::MissingSubject, error.to_string())
            }
            AuthorizationError::Evaluation(inner) => inner.into(),
        }
    }
}

impl From<EvaluationError> for PathwardenError {
    fn from(error: EvaluationError) -> Self {
        Self::internal(ErrorCode::EvaluationFailed, error.to_string()).with_source(error)
    }
}

impl From<ConfigError> for PathwardenError {
    fn from(error: ConfigError) -> Self {
        Self::internal(ErrorCode::InvalidPolicy, error.to_string()).with_source(error)
    }
}

impl From<PolicyError> for PathwardenError {
    fn from(error: PolicyError) -> Self {
        match error {
            PolicyError::Denied { action, path } => {
                let mut denied = Self::unauthorized();
                denied.internal_message = Some(format!("no rule grants {} {}", action, path));
                denied
            }
            PolicyError::Config(inner) => inner.into(),
            PolicyError::Evaluation(inner) => inner.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

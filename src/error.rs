//! Dashboard error type and exit-code mapping.
//!
//! Every failure is surfaced synchronously to the user-facing layer; there
//! are no retries anywhere. `main.rs` turns these into a message (human) or
//! a structured payload (`--json`) plus a process exit code.

use chrono::NaiveDate;
use thiserror::Error;

/// Top-level error for one dashboard interaction.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The warehouse could not be reached or a query failed. Fatal for the
    /// whole interaction: no partial dashboard is rendered.
    #[error("could not load warehouse data: {0}")]
    Connection(String),

    /// The user picked a start date after the end date. Recoverable by
    /// re-input; no filtering or aggregation runs.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// The active filters matched no rows. Recoverable by re-input; the
    /// aggregation layer must not run on an empty subset.
    #[error("no rows match the selected filters; try widening them")]
    EmptyResult,
}

impl DashboardError {
    /// Stable machine-readable kind for robot-mode output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::InvalidDateRange { .. } => "validation",
            Self::EmptyResult => "empty_result",
        }
    }

    /// Process exit code for the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Connection(_) => 2,
            Self::InvalidDateRange { .. } => 3,
            Self::EmptyResult => 4,
        }
    }

    /// True when re-running with different user input can succeed.
    pub fn retryable(&self) -> bool {
        !matches!(self, Self::Connection(_))
    }
}

impl From<rusqlite::Error> for DashboardError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DashboardError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

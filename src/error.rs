use thiserror::Error;

use crate::models::Metric;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("no records to compute {metric} over")]
    EmptyInput { metric: Metric },

    #[error("need at least {needed} records, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    #[error("{metric} has no variance across {records} records")]
    NoVariance { metric: Metric, records: usize },

    #[error("row {row}: field '{field}' {reason}")]
    Schema {
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyticsError {
    pub fn schema(row: usize, field: &'static str, reason: impl Into<String>) -> Self {
        AnalyticsError::Schema {
            row,
            field,
            reason: reason.into(),
        }
    }

    /// Errors a caller can turn into a "no data" view instead of failing.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            AnalyticsError::EmptyInput { .. }
                | AnalyticsError::InsufficientData { .. }
                | AnalyticsError::NoVariance { .. }
        )
    }
}

//! Error taxonomy for the insight pipeline

use crate::model::EntityKind;
use thiserror::Error;

/// Errors raised by sources, aggregators and sinks
#[derive(Error, Debug)]
pub enum InsightError {
    /// The backing store could not be opened. Fatal for the run.
    #[error("Data source unavailable at {location}: {reason}")]
    SourceUnavailable {
        /// Path or description of the store
        location: String,
        /// Why it could not be opened
        reason: String,
    },

    /// A table was reachable but one of its rows could not be decoded
    #[error("Failed to read {entity} rows: {reason}")]
    TableRead {
        /// The table being read
        entity: EntityKind,
        /// Decode or query failure
        reason: String,
    },

    /// An aggregate that needs at least one row was asked to run on none
    #[error("Cannot compute {aggregate} over zero rows")]
    EmptyInput {
        /// Name of the aggregate that was skipped
        aggregate: &'static str,
    },

    /// A sink failed to produce an artifact
    #[error("Failed to render {chart}: {reason}")]
    Render {
        /// Chart file stem
        chart: String,
        /// Backend failure
        reason: String,
    },

    /// Configuration file unreadable or invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },
}

impl InsightError {
    /// Whether the run must stop when this error occurs
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InsightError::SourceUnavailable { .. }
                | InsightError::TableRead { .. }
                | InsightError::Config { .. }
        )
    }

    pub(crate) fn table_read(entity: EntityKind, reason: impl ToString) -> Self {
        InsightError::TableRead {
            entity,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn render(chart: &str, reason: impl ToString) -> Self {
        InsightError::Render {
            chart: chart.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type InsightResult<T> = std::result::Result<T, InsightError>;

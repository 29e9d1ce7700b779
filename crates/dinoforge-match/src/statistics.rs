//! The statistics persistence seam.
//!
//! Saving statistics never decides whether a match ends. Failures are
//! folded into the end reason as a coded suffix.

use std::future::Future;

use dinoforge_protocol::MatchResult;

/// Result code reported by a statistics store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResultCode {
    Success,
    InvalidData,
    DatabaseError,
    UnexpectedError,
}

impl SaveResultCode {
    /// Suffix appended to the end reason, or `None` on success.
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Success => None,
            Self::InvalidData => Some("[STATS_INVALID_DATA]"),
            Self::DatabaseError => Some("[STATS_DATABASE]"),
            Self::UnexpectedError => Some("[STATS_UNEXPECTED]"),
        }
    }
}

/// A statistics store that failed outright.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatisticsError {
    #[error("statistics database error: {0}")]
    Database(String),

    #[error("statistics store unreachable: {0}")]
    Connection(String),

    #[error("statistics called with a missing argument: {0}")]
    NullArgument(String),

    #[error("statistics operation rejected: {0}")]
    InvalidOperation(String),
}

impl StatisticsError {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Database(_) => "[STATS_DB]",
            Self::Connection(_) => "[STATS_CONNECTION]",
            Self::NullArgument(_) => "[STATS_NULL_ARGUMENT]",
            Self::InvalidOperation(_) => "[STATS_INVALID_OPERATION]",
        }
    }
}

/// Persists the result of a completed match.
///
/// Only called for matches with at least one registered (non-guest)
/// player, and never for aborted matches.
pub trait StatisticsSink: Send + Sync + 'static {
    fn save_match_statistics(
        &self,
        result: &MatchResult,
    ) -> impl Future<Output = Result<SaveResultCode, StatisticsError>> + Send;
}

/// Discards every result.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStatistics;

impl StatisticsSink for NoStatistics {
    async fn save_match_statistics(
        &self,
        _result: &MatchResult,
    ) -> Result<SaveResultCode, StatisticsError> {
        Ok(SaveResultCode::Success)
    }
}

/// Appends the coded suffix for a save outcome to `reason`.
pub(crate) fn annotate_reason(
    reason: &mut String,
    outcome: &Result<SaveResultCode, StatisticsError>,
) {
    let suffix = match outcome {
        Ok(code) => code.suffix(),
        Err(e) => Some(e.suffix()),
    };
    if let Some(suffix) = suffix {
        reason.push(' ');
        reason.push_str(suffix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_reason_success_unchanged() {
        let mut reason = "draw piles exhausted".to_string();
        annotate_reason(&mut reason, &Ok(SaveResultCode::Success));
        assert_eq!(reason, "draw piles exhausted");
    }

    #[test]
    fn test_annotate_reason_connection_failure() {
        let mut reason = "draw piles exhausted".to_string();
        annotate_reason(&mut reason, &Err(StatisticsError::Connection("refused".into())));
        assert_eq!(reason, "draw piles exhausted [STATS_CONNECTION]");
    }

    #[test]
    fn test_annotate_reason_result_codes() {
        let mut reason = String::from("done");
        annotate_reason(&mut reason, &Ok(SaveResultCode::DatabaseError));
        assert!(reason.ends_with("[STATS_DATABASE]"));
    }
}

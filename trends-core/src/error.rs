//! Error taxonomy for the scoring pipeline
//!
//! Every failure is scoped to the smallest unit that owns it: a host
//! (`SampleParseFailed`), a cluster (`NoHostsFound`, `DeadlineExceeded`,
//! `TaskFailed`) or a single backend call (`BackendQueryFailed`).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendsError {
    #[error("backend query failed: {reason} (query: {query})")]
    BackendQueryFailed { query: String, reason: String },

    #[error("no hosts found for {cluster} cluster")]
    NoHostsFound { cluster: String },

    #[error("invalid CPU sample {value:?} for host {host}: {reason}")]
    SampleParseFailed {
        host: String,
        value: String,
        reason: String,
    },

    #[error("scoring deadline of {seconds}s exceeded")]
    DeadlineExceeded { seconds: u64 },

    #[error("scoring task for {cluster} aborted: {reason}")]
    TaskFailed { cluster: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TrendsError {
    pub fn backend(query: impl Into<String>, reason: impl ToString) -> Self {
        TrendsError::BackendQueryFailed {
            query: query.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable identifier used in JSON failure entries.
    pub fn kind(&self) -> &'static str {
        match self {
            TrendsError::BackendQueryFailed { .. } => "backend_query_failed",
            TrendsError::NoHostsFound { .. } => "no_hosts_found",
            TrendsError::SampleParseFailed { .. } => "sample_parse_failed",
            TrendsError::DeadlineExceeded { .. } => "deadline_exceeded",
            TrendsError::TaskFailed { .. } => "task_failed",
            TrendsError::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Only transport-level failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TrendsError::BackendQueryFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, TrendsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_stable() {
        assert_eq!(TrendsError::backend("up", "boom").kind(), "backend_query_failed");
        assert_eq!(
            TrendsError::NoHostsFound { cluster: "nl".into() }.kind(),
            "no_hosts_found"
        );
        assert_eq!(TrendsError::DeadlineExceeded { seconds: 3 }.kind(), "deadline_exceeded");
    }

    #[test]
    fn test_only_backend_errors_retry() {
        assert!(TrendsError::backend("up", "connection reset").is_retryable());
        assert!(!TrendsError::NoHostsFound { cluster: "ld".into() }.is_retryable());
        assert!(!TrendsError::SampleParseFailed {
            host: "esx1".into(),
            value: "NaNx".into(),
            reason: "invalid float literal".into(),
        }
        .is_retryable());
    }

    #[test]
    fn test_display_names_cluster() {
        let err = TrendsError::NoHostsFound { cluster: "sg3".into() };
        assert_eq!(err.to_string(), "no hosts found for sg3 cluster");
    }
}

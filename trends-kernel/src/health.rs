use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use trends_core::RunReport;

#[derive(Debug, Serialize, Deserialize)]
pub struct KernelHealth {
    pub uptime_seconds: u64,
    pub runs_total: u64,
    pub runs_partial: u64,
    pub last_run_at: Option<String>,
    pub last_run_scored: Option<usize>,
    pub last_run_failed: Option<Vec<String>>,
    pub memory_usage_mb: f32,
}

#[derive(Debug, Clone)]
struct LastRun {
    at: OffsetDateTime,
    scored: usize,
    failed: Vec<String>,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    runs_total: Arc<AtomicU64>,
    runs_partial: Arc<AtomicU64>,
    last_run: Arc<Mutex<Option<LastRun>>>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            runs_total: Arc::new(AtomicU64::new(0)),
            runs_partial: Arc::new(AtomicU64::new(0)),
            last_run: Arc::new(Mutex::new(None)),
        }
    }

    /// Enregistre le résultat d'un passage de scoring
    pub fn record_run(&self, report: &RunReport) {
        self.runs_total.fetch_add(1, Ordering::Relaxed);
        if report.is_partial() {
            self.runs_partial.fetch_add(1, Ordering::Relaxed);
        }
        *self.last_run.lock() = Some(LastRun {
            at: OffsetDateTime::now_utc(),
            scored: report.scored.len(),
            failed: report.failures.iter().map(|f| f.cluster.clone()).collect(),
        });
    }

    pub fn get_health(&self) -> KernelHealth {
        let last = self.last_run.lock().clone();
        KernelHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            runs_total: self.runs_total.load(Ordering::Relaxed),
            runs_partial: self.runs_partial.load(Ordering::Relaxed),
            last_run_at: last.as_ref().and_then(|l| l.at.format(&Rfc3339).ok()),
            last_run_scored: last.as_ref().map(|l| l.scored),
            last_run_failed: last.map(|l| l.failed),
            memory_usage_mb: get_memory_usage_mb(),
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn get_memory_usage_mb() -> f32 {
    #[cfg(target_os = "linux")]
    {
        let pid = std::process::id();
        if let Ok(status) = std::fs::read_to_string(format!("/proc/{}/status", pid)) {
            for line in status.lines() {
                if line.starts_with("VmRSS:") {
                    if let Some(kb) = line.split_whitespace().nth(1).and_then(|s| s.parse::<u64>().ok()) {
                        return (kb as f32) / 1024.0; // KB -> MB
                    }
                }
            }
        }
    }

    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use trends_core::{ClusterFailure, TrendsError};
    use uuid::Uuid;

    fn report(failed: &[&str]) -> RunReport {
        RunReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            elapsed: Duration::from_millis(5),
            scored: Vec::new(),
            failures: failed
                .iter()
                .map(|c| ClusterFailure {
                    cluster: c.to_string(),
                    error: TrendsError::NoHostsFound { cluster: c.to_string() },
                })
                .collect(),
        }
    }

    #[test]
    fn test_fresh_tracker_has_no_run() {
        let health = HealthTracker::new().get_health();
        assert_eq!(health.runs_total, 0);
        assert!(health.last_run_at.is_none());
        assert!(health.last_run_failed.is_none());
    }

    #[test]
    fn test_record_runs() {
        let tracker = HealthTracker::new();
        tracker.record_run(&report(&[]));
        tracker.record_run(&report(&["sg3"]));

        let health = tracker.get_health();
        assert_eq!(health.runs_total, 2);
        assert_eq!(health.runs_partial, 1);
        assert_eq!(health.last_run_failed, Some(vec!["sg3".to_string()]));
        assert!(health.last_run_at.is_some());
    }
}

//! Cluster scoring
//!
//! Each host contributes a severity according to the highest CPU threshold
//! its samples crossed over the lookback window:
//!
//! | crossing            | 1 sample | 2+ samples |
//! |---------------------|----------|------------|
//! | > 99.5%             | 38       | 55         |
//! | > 90%               | 20       | 27         |
//! | > 70%               | 8        | 12         |
//!
//! A host that only crossed 70% gets 40 more when its average is above 70%.
//! The 99.5% and 90% branches never receive that bonus; the scoring rubric
//! owners have to decide whether that is intended, so it is kept as is.
//!
//! The cluster score is the sum of contributions divided (integer division)
//! by the number of scored hosts.

use crate::models::{Host, ScoreCard, Tier};

pub const THRESHOLD_70: f64 = 70.0;
pub const THRESHOLD_90: f64 = 90.0;
pub const THRESHOLD_99_5: f64 = 99.5;

const AVERAGE_BONUS: u32 = 40;

/// Which list a host ends up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Over70,
    Over90,
    Over99_5,
}

/// Contribution of a single host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSeverity {
    pub contribution: u32,
    pub crossing: Option<Crossing>,
    pub average: f64,
}

/// Arithmetic mean, 0.0 for an empty series.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Samples strictly above `threshold`.
pub fn count_over(samples: &[f64], threshold: f64) -> usize {
    samples.iter().filter(|&&s| s > threshold).count()
}

pub fn score_host(samples: &[f64]) -> HostSeverity {
    let average = mean(samples);
    let n70 = count_over(samples, THRESHOLD_70);
    let n90 = count_over(samples, THRESHOLD_90);
    let n99_5 = count_over(samples, THRESHOLD_99_5);

    if n70 == 0 {
        return HostSeverity {
            contribution: 0,
            crossing: None,
            average,
        };
    }

    if n99_5 > 0 {
        return HostSeverity {
            contribution: if n99_5 == 1 { 38 } else { 55 },
            crossing: Some(Crossing::Over99_5),
            average,
        };
    }

    if n90 > 0 {
        return HostSeverity {
            contribution: if n90 == 1 { 20 } else { 27 },
            crossing: Some(Crossing::Over90),
            average,
        };
    }

    let mut contribution = if n70 == 1 { 8 } else { 12 };
    if average > THRESHOLD_70 {
        contribution += AVERAGE_BONUS;
    }
    HostSeverity {
        contribution,
        crossing: Some(Crossing::Over70),
        average,
    }
}

/// Scores every host and derives the cluster tier.
///
/// # Panics
///
/// `hosts` must not be empty: discovery and collection fail a cluster
/// before it can reach scoring without hosts.
pub fn score_cluster(hosts: &[Host]) -> ScoreCard {
    assert!(!hosts.is_empty(), "score_cluster called without hosts");

    let mut total: u32 = 0;
    let mut over_70 = Vec::new();
    let mut over_90 = Vec::new();
    let mut over_99_5 = Vec::new();

    for host in hosts {
        let severity = score_host(&host.samples);
        total += severity.contribution;
        match severity.crossing {
            Some(Crossing::Over99_5) => over_99_5.push(host.name.clone()),
            Some(Crossing::Over90) => over_90.push(host.name.clone()),
            Some(Crossing::Over70) => over_70.push(host.name.clone()),
            None => {}
        }
    }

    let score = total / hosts.len() as u32;
    ScoreCard {
        score,
        tier: Tier::from_score(score),
        over_70,
        over_90,
        over_99_5,
    }
}

/// Mean of the per-host averages.
pub fn cluster_average(hosts: &[Host]) -> Option<f64> {
    if hosts.is_empty() {
        return None;
    }
    let per_host: Vec<f64> = hosts.iter().map(|h| mean(&h.samples)).collect();
    Some(mean(&per_host))
}

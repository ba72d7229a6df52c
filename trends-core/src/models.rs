use crate::error::TrendsError;
use serde::{Deserialize, Serialize};

pub const GREEN_MARKER: &str = ":large_green_circle:";
pub const YELLOW_MARKER: &str = ":large_yellow_circle:";
pub const RED_MARKER: &str = ":red_circle:";

/// Health tier derived from a cluster score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Green,
    Yellow,
    Red,
}

impl Tier {
    /// `< 20` green, `20..40` yellow, `>= 40` red.
    pub fn from_score(score: u32) -> Self {
        if score < 20 {
            Tier::Green
        } else if score < 40 {
            Tier::Yellow
        } else {
            Tier::Red
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Tier::Green => GREEN_MARKER,
            Tier::Yellow => YELLOW_MARKER,
            Tier::Red => RED_MARKER,
        }
    }
}

/// One machine of a cluster with its CPU series (percent, chronological)
#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub name: String,
    pub samples: Vec<f64>,
}

impl Host {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }

    pub fn with_samples(name: impl Into<String>, samples: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }
}

/// Result of scoring every host of a cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub score: u32,
    pub tier: Tier,
    pub over_70: Vec<String>,
    pub over_90: Vec<String>,
    pub over_99_5: Vec<String>,
}

/// A host dropped from scoring, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct HostFailure {
    pub host: String,
    pub error: TrendsError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub name: String,
    pub hosts: Vec<Host>,
    pub host_failures: Vec<HostFailure>,
    pub scorecard: Option<ScoreCard>,
    pub average_cpu: Option<f64>,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: Vec::new(),
            host_failures: Vec::new(),
            scorecard: None,
            average_cpu: None,
        }
    }

    pub fn score(&self) -> Option<u32> {
        self.scorecard.as_ref().map(|card| card.score)
    }

    pub fn tier(&self) -> Option<Tier> {
        self.scorecard.as_ref().map(|card| card.tier)
    }

    pub fn display_name(&self) -> String {
        self.name.to_uppercase()
    }
}

/// A cluster that could not be scored during a run
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFailure {
    pub cluster: String,
    pub error: TrendsError,
}

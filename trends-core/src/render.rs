//! Rendering of scored clusters
//!
//! Three outputs share the same inputs and are pure functions of them:
//! - the per-cluster message (Slack-flavoured markdown)
//! - the trends document (`/trends`) and the summary document (`/summary`)
//! - the plain text report printed by the CLI

use crate::models::{Cluster, ClusterFailure, HostFailure, ScoreCard, Tier};
use serde::{Deserialize, Serialize};

pub const TEXT_GREEN: &str =
    "This cluster is considered to be in good status regarding CPU consumption. ";
pub const TEXT_YELLOW: &str =
    "This cluster is considered to be in average status regarding CPU consumption. ";
pub const TEXT_RED: &str =
    "This cluster is considered to be in bad/critical status regarding CPU consumption. ";

impl Tier {
    pub fn opening(self) -> &'static str {
        match self {
            Tier::Green => TEXT_GREEN,
            Tier::Yellow => TEXT_YELLOW,
            Tier::Red => TEXT_RED,
        }
    }
}

/// Message for one cluster. The 70% list is deliberately left out.
pub fn cluster_message(card: &ScoreCard, average_cpu: Option<f64>) -> String {
    let mut message = String::from(card.tier.opening());

    if !card.over_90.is_empty() {
        message.push_str(&format!(
            "There were spikes surpassing the 90% threshold from ({}). ",
            card.over_90.join(", ")
        ));
    }
    if !card.over_99_5.is_empty() {
        message.push_str(&format!(
            "There were spikes reaching 100% CPU usage from ({}). ",
            card.over_99_5.join(", ")
        ));
    }
    if let Some(avg) = average_cpu {
        message.push_str(&format!(
            "The average CPU consumption in this cluster was *{avg:.2}%*."
        ));
    }
    message
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendEntry {
    pub status_emoji: String,
    pub cluster_name: String,
    pub cluster_message: String,
    /// Hosts left out of the score
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_hosts: Vec<DroppedHostEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedHostEntry {
    pub host: String,
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub cluster: String,
    pub error: String,
    pub message: String,
}

/// Body of `GET /trends`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsDocument {
    pub clusters: Vec<TrendEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureEntry>,
}

/// Body of `GET /summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub cluster_states: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureEntry>,
}

fn dropped_host_entries(failures: &[HostFailure]) -> Vec<DroppedHostEntry> {
    failures
        .iter()
        .map(|f| DroppedHostEntry {
            host: f.host.clone(),
            error: f.error.kind().to_string(),
            message: f.error.to_string(),
        })
        .collect()
}

fn failure_entries(failures: &[ClusterFailure]) -> Vec<FailureEntry> {
    failures
        .iter()
        .map(|f| FailureEntry {
            cluster: f.cluster.to_uppercase(),
            error: f.error.kind().to_string(),
            message: f.error.to_string(),
        })
        .collect()
}

pub fn trends_document(scored: &[Cluster], failures: &[ClusterFailure]) -> TrendsDocument {
    let clusters = scored
        .iter()
        .filter_map(|cluster| {
            let card = cluster.scorecard.as_ref()?;
            Some(TrendEntry {
                status_emoji: card.tier.marker().to_string(),
                cluster_name: cluster.display_name(),
                cluster_message: cluster_message(card, cluster.average_cpu),
                dropped_hosts: dropped_host_entries(&cluster.host_failures),
            })
        })
        .collect();

    TrendsDocument {
        clusters,
        failures: failure_entries(failures),
    }
}

/// Groups cluster names by tier: red first, then yellow, then green.
pub fn summary_document(scored: &[Cluster], failures: &[ClusterFailure]) -> SummaryDocument {
    let mut cluster_states = Vec::new();

    for tier in [Tier::Red, Tier::Yellow, Tier::Green] {
        let names: Vec<&str> = scored
            .iter()
            .filter(|c| c.tier() == Some(tier))
            .map(|c| c.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        cluster_states.push(format!(
            "{} *{}*",
            tier.marker(),
            names.join(", ").to_uppercase()
        ));
    }

    SummaryDocument {
        cluster_states,
        failures: failure_entries(failures),
    }
}

/// Plain text output of the CLI.
pub fn text_report(scored: &[Cluster], failures: &[ClusterFailure]) -> String {
    let mut out = String::new();
    for cluster in scored {
        let Some(card) = cluster.scorecard.as_ref() else {
            continue;
        };
        out.push_str(&format!("{} *{}*\n", card.tier.marker(), cluster.display_name()));
        out.push_str(&cluster_message(card, cluster.average_cpu));
        out.push('\n');
        for dropped in &cluster.host_failures {
            out.push_str(&format!(
                "dropped {}: {} ({})\n",
                cluster.display_name(),
                dropped.host,
                dropped.error
            ));
        }
        out.push('\n');
    }
    for failure in failures {
        out.push_str(&format!(
            "could not score {}: {}\n",
            failure.cluster.to_uppercase(),
            failure.error
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrendsError;

    fn card(score: u32, over_90: &[&str], over_99_5: &[&str]) -> ScoreCard {
        ScoreCard {
            score,
            tier: Tier::from_score(score),
            over_70: vec!["quiet-ish".into()],
            over_90: over_90.iter().map(|s| s.to_string()).collect(),
            over_99_5: over_99_5.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn scored(name: &str, score: u32) -> Cluster {
        let mut cluster = Cluster::new(name);
        cluster.scorecard = Some(card(score, &[], &[]));
        cluster
    }

    #[test]
    fn test_green_message_with_average() {
        let msg = cluster_message(&card(5, &[], &[]), Some(12.3456));
        assert_eq!(
            msg,
            "This cluster is considered to be in good status regarding CPU consumption. The average CPU consumption in this cluster was *12.35%*."
        );
    }

    #[test]
    fn test_message_lists_spiking_hosts_but_not_70() {
        let msg = cluster_message(&card(45, &["esx1", "esx2"], &["esx9"]), None);
        assert_eq!(
            msg,
            "This cluster is considered to be in bad/critical status regarding CPU consumption. \
             There were spikes surpassing the 90% threshold from (esx1, esx2). \
             There were spikes reaching 100% CPU usage from (esx9). "
        );
        assert!(!msg.contains("quiet-ish"));
        assert!(!msg.contains("70%"));
    }

    #[test]
    fn test_yellow_opening() {
        assert!(cluster_message(&card(20, &[], &[]), None).starts_with(TEXT_YELLOW));
    }

    #[test]
    fn test_rendering_is_pure() {
        let c = card(33, &["a"], &["b"]);
        assert_eq!(cluster_message(&c, Some(50.0)), cluster_message(&c, Some(50.0)));
    }

    #[test]
    fn test_summary_groups_and_orders_tiers() {
        let clusters = vec![scored("a", 60), scored("b", 25), scored("c", 39), scored("d", 3)];
        let doc = summary_document(&clusters, &[]);
        assert_eq!(
            doc.cluster_states,
            vec![
                ":red_circle: *A*".to_string(),
                ":large_yellow_circle: *B, C*".to_string(),
                ":large_green_circle: *D*".to_string(),
            ]
        );
    }

    #[test]
    fn test_summary_skips_empty_tiers() {
        let doc = summary_document(&[scored("nl", 1), scored("ld7-dta", 0)], &[]);
        assert_eq!(doc.cluster_states, vec![":large_green_circle: *NL, LD7-DTA*"]);
    }

    #[test]
    fn test_summary_json_matches_wire_format() {
        let doc = summary_document(&[scored("hk", 41)], &[]);
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"cluster_states":[":red_circle: *HK*"]}"#
        );
    }

    #[test]
    fn test_failures_are_reported_not_grouped() {
        let failures = vec![ClusterFailure {
            cluster: "sg3".into(),
            error: TrendsError::NoHostsFound { cluster: "sg3".into() },
        }];
        let doc = summary_document(&[scored("jb", 10)], &failures);
        assert_eq!(doc.cluster_states, vec![":large_green_circle: *JB*"]);
        assert_eq!(
            doc.failures,
            vec![FailureEntry {
                cluster: "SG3".into(),
                error: "no_hosts_found".into(),
                message: "no hosts found for sg3 cluster".into(),
            }]
        );
    }

    #[test]
    fn test_trends_document() {
        let mut mi = scored("mi", 22);
        mi.average_cpu = Some(48.0);
        let doc = trends_document(&[mi], &[]);
        assert_eq!(doc.clusters.len(), 1);
        assert_eq!(doc.clusters[0].status_emoji, ":large_yellow_circle:");
        assert_eq!(doc.clusters[0].cluster_name, "MI");
        assert!(doc.clusters[0].cluster_message.ends_with("*48.00%*."));

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("failures").is_none());
        assert_eq!(json["clusters"][0]["cluster_name"], "MI");
    }

    #[test]
    fn test_dropped_hosts_are_rendered() {
        let mut ld7 = scored("ld7", 20);
        ld7.host_failures.push(HostFailure {
            host: "bad".into(),
            error: TrendsError::SampleParseFailed {
                host: "bad".into(),
                value: "N/A".into(),
                reason: "invalid float literal".into(),
            },
        });

        let doc = trends_document(std::slice::from_ref(&ld7), &[]);
        assert_eq!(doc.clusters[0].dropped_hosts.len(), 1);
        assert_eq!(doc.clusters[0].dropped_hosts[0].host, "bad");
        assert_eq!(doc.clusters[0].dropped_hosts[0].error, "sample_parse_failed");

        let text = text_report(&[ld7], &[]);
        assert!(text.contains("dropped LD7: bad ("));
        assert!(text.ends_with(")\n\n"));
    }

    #[test]
    fn test_trends_json_omits_empty_dropped_hosts() {
        let json = serde_json::to_value(trends_document(&[scored("hk", 3)], &[])).unwrap();
        assert!(json["clusters"][0].get("dropped_hosts").is_none());
    }

    #[test]
    fn test_text_report() {
        let failures = vec![ClusterFailure {
            cluster: "hk".into(),
            error: TrendsError::DeadlineExceeded { seconds: 300 },
        }];
        let text = text_report(&[scored("ld", 0)], &failures);
        assert_eq!(
            text,
            format!(
                ":large_green_circle: *LD*\n{TEXT_GREEN}\n\ncould not score HK: scoring deadline of 300s exceeded\n"
            )
        );
    }
}

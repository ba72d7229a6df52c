/*!
Fixtures texte au format rendu par le gateway Prometheus

- `discovery_text` : résultat instant (une ligne par host avec le label esxhostname)
- `matrix_text` : résultat range (header + metadata + une ligne par sample)
*/

use chrono::{DateTime, Utc};

const METRIC: &str = "vsphere_host_cpu_usage_average";
const FIRST_TS: i64 = 1_709_251_200; // 2024-03-01T00:00:00Z

/// Résultat de discovery pour une liste de hosts
pub fn discovery_text(cluster: &str, hosts: &[&str]) -> String {
    hosts
        .iter()
        .map(|host| {
            format!(
                r#"{METRIC}{{clustername="{cluster}", cpu="instance-total", esxhostname="{host}"}} => 12.5 @[{FIRST_TS}.000]"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Résultat de discovery sans aucun label host (cluster vide)
pub fn empty_discovery_text(cluster: &str) -> String {
    format!(r#"{METRIC}{{clustername="{cluster}", cpu="instance-total"}} => 0 @[{FIRST_TS}.000]"#)
}

/// Série CPU d'un host, un point par minute
pub fn matrix_text(samples: &[f64]) -> String {
    let mut lines = vec![
        "{} =>".to_string(),
        format!("# points={} step=60s", samples.len()),
    ];
    lines.extend(
        samples
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{} @[{}.000]", v, FIRST_TS + 60 * i as i64)),
    );
    lines.join("\n")
}

/// Série CPU contenant une valeur non numérique
pub fn corrupted_matrix_text(good: &[f64], bad: &str) -> String {
    let mut text = matrix_text(good);
    text.push_str(&format!("\n{bad} @[{FIRST_TS}.000]"));
    text
}

pub fn first_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(FIRST_TS, 0).unwrap_or_default()
}

/// `n` samples constants à `value`
pub fn flat(value: f64, n: usize) -> Vec<f64> {
    vec![value; n]
}

/// Série calme avec `spikes` pics à `peak`
pub fn with_spikes(base: f64, n: usize, peak: f64, spikes: usize) -> Vec<f64> {
    let mut samples = flat(base, n);
    for slot in samples.iter_mut().take(spikes) {
        *slot = peak;
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use trends_core::collector::parse_samples;
    use trends_core::discovery::parse_hosts;

    #[test]
    fn test_fixtures_parse_back() {
        let text = discovery_text("ld", &["esx01", "esx02"]);
        assert_eq!(parse_hosts(&text), vec!["esx01", "esx02"]);
        assert!(parse_hosts(&empty_discovery_text("ld")).is_empty());

        let samples = with_spikes(10.0, 5, 95.0, 2);
        assert_eq!(samples, vec![95.0, 95.0, 10.0, 10.0, 10.0]);
        assert_eq!(parse_samples(&matrix_text(&samples), "esx01").unwrap(), samples);
    }

    #[test]
    fn test_corrupted_series_fails_parsing() {
        let text = corrupted_matrix_text(&[1.0], "oops");
        assert!(parse_samples(&text, "esx01").is_err());
    }
}

//! Prometheus / Thanos HTTP API client
//!
//! Issues `GET /api/v1/query` and `GET /api/v1/query_range` and renders the
//! JSON answer into the raw text shape consumed by discovery and collection.

use super::{MetricsGateway, QueryRange};
use crate::error::{Result, TrendsError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::debug;

/// Raw API envelope (`status` + `data` or `errorType`/`error`)
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    data: Option<QueryData>,
    #[serde(rename = "errorType")]
    error_type: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
enum QueryData {
    Vector(Vec<InstantSeries>),
    Matrix(Vec<RangeSeries>),
    Scalar(SamplePair),
    String(SamplePair),
}

#[derive(Debug, Deserialize)]
struct InstantSeries {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    value: SamplePair,
}

#[derive(Debug, Deserialize)]
struct RangeSeries {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    #[serde(default)]
    values: Vec<SamplePair>,
}

/// `[<unix seconds>, "<value>"]`
#[derive(Debug, Deserialize)]
struct SamplePair(f64, String);

pub struct PrometheusGateway {
    client: reqwest::Client,
    base_url: String,
}

impl PrometheusGateway {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TrendsError::InvalidConfig(format!("http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, query: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} query={}", url, query);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| TrendsError::backend(query, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TrendsError::backend(query, e))?;

        // Prometheus renvoie aussi un JSON d'erreur sur les 4xx/5xx
        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(api) => render_response(query, api),
            Err(_) if !status.is_success() => {
                Err(TrendsError::backend(query, format!("HTTP {status}")))
            }
            Err(e) => Err(TrendsError::backend(query, format!("undecodable response: {e}"))),
        }
    }
}

#[async_trait]
impl MetricsGateway for PrometheusGateway {
    async fn instant_query(&self, query: &str) -> Result<String> {
        let params = [
            ("query", query.to_string()),
            ("time", unix_seconds(Utc::now())),
        ];
        self.get("/api/v1/query", query, &params).await
    }

    async fn range_query(&self, query: &str, range: &QueryRange) -> Result<String> {
        let params = [
            ("query", query.to_string()),
            ("start", unix_seconds(range.start)),
            ("end", unix_seconds(range.end)),
            ("step", format!("{}", range.step.as_secs_f64())),
        ];
        self.get("/api/v1/query_range", query, &params).await
    }
}

fn unix_seconds(t: DateTime<Utc>) -> String {
    format!("{:.3}", t.timestamp_millis() as f64 / 1000.0)
}

fn render_response(query: &str, api: ApiResponse) -> Result<String> {
    if api.status != "success" {
        let reason = match (api.error_type, api.error) {
            (Some(kind), Some(msg)) => format!("{kind}: {msg}"),
            (None, Some(msg)) => msg,
            (Some(kind), None) => kind,
            (None, None) => format!("status {}", api.status),
        };
        return Err(TrendsError::backend(query, reason));
    }

    let data = api
        .data
        .ok_or_else(|| TrendsError::backend(query, "success response without data"))?;

    Ok(match data {
        QueryData::Vector(series) => render_vector(&series),
        QueryData::Matrix(series) => render_matrix(&series),
        QueryData::Scalar(pair) | QueryData::String(pair) => render_pair(&pair),
    })
}

fn render_vector(series: &[InstantSeries]) -> String {
    series
        .iter()
        .map(|s| format!("{} => {}", format_metric(&s.metric), render_pair(&s.value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_matrix(series: &[RangeSeries]) -> String {
    let mut out = String::new();
    for (i, s) in series.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{} =>\n# points={}", format_metric(&s.metric), s.values.len());
        if let Some(step) = infer_step(&s.values) {
            let _ = write!(out, " step={step}s");
        }
        for pair in &s.values {
            out.push('\n');
            out.push_str(&render_pair(pair));
        }
    }
    out
}

fn render_pair(pair: &SamplePair) -> String {
    format!("{} @[{:.3}]", pair.1, pair.0)
}

fn infer_step(values: &[SamplePair]) -> Option<f64> {
    match values {
        [first, second, ..] => Some(second.0 - first.0),
        _ => None,
    }
}

/// `name{k="v", ...}` with labels sorted by key, like the Prometheus client.
fn format_metric(metric: &BTreeMap<String, String>) -> String {
    let name = metric.get("__name__").map(String::as_str).unwrap_or_default();
    let labels: Vec<String> = metric
        .iter()
        .filter(|(k, _)| k.as_str() != "__name__")
        .map(|(k, v)| format!("{k}={v:?}"))
        .collect();
    format!("{}{{{}}}", name, labels.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> ApiResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_vector_rendering_keeps_host_label() {
        let api = decode(
            r#"{"status":"success","data":{"resultType":"vector","result":[
                {"metric":{"__name__":"vsphere_host_cpu_usage_average","esxhostname":"esx01.ld","clustername":"ld","cpu":"instance-total"},"value":[1709900000.5,"12.5"]},
                {"metric":{"__name__":"vsphere_host_cpu_usage_average","esxhostname":"esx02.ld","clustername":"ld","cpu":"instance-total"},"value":[1709900000.5,"40"]}
            ]}}"#,
        );
        let text = render_response("q", api).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"vsphere_host_cpu_usage_average{clustername="ld", cpu="instance-total", esxhostname="esx01.ld"} => 12.5 @[1709900000.500]"#
        );
        assert!(lines[1].contains(r#"esxhostname="esx02.ld""#));
    }

    #[test]
    fn test_matrix_rendering_has_two_header_lines() {
        let api = decode(
            r#"{"status":"success","data":{"resultType":"matrix","result":[
                {"metric":{},"values":[[1709900000,"10.5"],[1709900060,"71"],[1709900120,"99.9"]]}
            ]}}"#,
        );
        let text = render_response("q", api).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "{} =>");
        assert_eq!(lines[1], "# points=3 step=60s");
        assert_eq!(&lines[2..], &["10.5 @[1709900000.000]", "71 @[1709900060.000]", "99.9 @[1709900120.000]"]);
    }

    #[test]
    fn test_empty_matrix_renders_nothing() {
        let api = decode(r#"{"status":"success","data":{"resultType":"matrix","result":[]}}"#);
        assert_eq!(render_response("q", api).unwrap(), "");
    }

    #[test]
    fn test_error_status_is_backend_failure() {
        let api = decode(r#"{"status":"error","errorType":"bad_data","error":"parse error at char 4"}"#);
        let err = render_response("max(", api).unwrap_err();
        assert_eq!(
            err,
            TrendsError::BackendQueryFailed {
                query: "max(".into(),
                reason: "bad_data: parse error at char 4".into(),
            }
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let gw = PrometheusGateway::new("http://thanos.local:9090/", Duration::from_secs(5)).unwrap();
        assert_eq!(gw.base_url(), "http://thanos.local:9090");
    }
}

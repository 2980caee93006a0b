use crate::error::FacadeError;
use prometheus::proto::{MetricFamily, MetricType};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content type of the text exposition format.
pub fn text_content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

/// Render metric families in prometheus text exposition format.
pub fn render_text(families: &[MetricFamily]) -> Result<String, FacadeError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| FacadeError::Encoding(e.to_string()))
}

/// One metric family as served by `/jsonmetrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricJson {
    pub name: String,
    pub help: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub values: Vec<SampleJson>,
    pub aggregator: String,
}

/// One sample of a family. Histogram and summary samples carry the series
/// name they expand to (`_bucket`, `_sum`, `_count`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleJson {
    pub value: f64,
    pub labels: BTreeMap<String, String>,
    #[serde(rename = "metricName", default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
}

pub fn to_json(families: &[MetricFamily]) -> Vec<MetricJson> {
    families.iter().map(family_to_json).collect()
}

fn family_to_json(mf: &MetricFamily) -> MetricJson {
    let name = mf.get_name();
    let mut values = Vec::new();

    for m in mf.get_metric() {
        let labels: BTreeMap<String, String> = m
            .get_label()
            .iter()
            .map(|l| (l.get_name().to_string(), l.get_value().to_string()))
            .collect();

        match mf.get_field_type() {
            MetricType::COUNTER => values.push(plain(m.get_counter().get_value(), labels)),
            MetricType::GAUGE => values.push(plain(m.get_gauge().get_value(), labels)),
            MetricType::UNTYPED => values.push(plain(m.get_untyped().get_value(), labels)),
            MetricType::HISTOGRAM => {
                let h = m.get_histogram();
                for b in h.get_bucket() {
                    let mut with_le = labels.clone();
                    with_le.insert("le".into(), format_bound(b.get_upper_bound()));
                    values.push(series(
                        b.get_cumulative_count() as f64,
                        with_le,
                        format!("{name}_bucket"),
                    ));
                }
                let mut inf = labels.clone();
                inf.insert("le".into(), "+Inf".into());
                values.push(series(h.get_sample_count() as f64, inf, format!("{name}_bucket")));
                values.push(series(h.get_sample_sum(), labels.clone(), format!("{name}_sum")));
                values.push(series(h.get_sample_count() as f64, labels, format!("{name}_count")));
            }
            MetricType::SUMMARY => {
                let s = m.get_summary();
                for q in s.get_quantile() {
                    let mut with_q = labels.clone();
                    with_q.insert("quantile".into(), q.get_quantile().to_string());
                    values.push(plain(q.get_value(), with_q));
                }
                values.push(series(s.get_sample_sum(), labels.clone(), format!("{name}_sum")));
                values.push(series(s.get_sample_count() as f64, labels, format!("{name}_count")));
            }
        }
    }

    MetricJson {
        name: name.to_string(),
        help: mf.get_help().to_string(),
        kind: type_name(mf.get_field_type()).to_string(),
        values,
        aggregator: "sum".to_string(),
    }
}

fn plain(value: f64, labels: BTreeMap<String, String>) -> SampleJson {
    SampleJson { value, labels, metric_name: None }
}

fn series(value: f64, labels: BTreeMap<String, String>, metric_name: String) -> SampleJson {
    SampleJson { value, labels, metric_name: Some(metric_name) }
}

fn format_bound(b: f64) -> String {
    if b.is_infinite() { "+Inf".to_string() } else { b.to_string() }
}

fn type_name(t: MetricType) -> &'static str {
    match t {
        MetricType::COUNTER => "counter",
        MetricType::GAUGE => "gauge",
        MetricType::HISTOGRAM => "histogram",
        MetricType::SUMMARY => "summary",
        MetricType::UNTYPED => "untyped",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Counter, Gauge, Histogram, HistogramOpts, Opts, Registry};

    #[test]
    fn render_empty_registry_returns_empty_string() {
        let registry = Registry::new();
        let output = render_text(&registry.gather()).unwrap();
        assert!(output.is_empty(), "Empty registry should produce no output, got: {output:?}");
    }

    #[test]
    fn render_registry_with_counter_contains_metric_name() {
        let registry = Registry::new();
        let counter = Counter::with_opts(Opts::new("http_requests_total", "Total HTTP requests")).unwrap();
        registry.register(Box::new(counter.clone())).unwrap();
        counter.inc();

        let output = render_text(&registry.gather()).unwrap();
        assert!(output.contains("# TYPE http_requests_total counter"));
        assert!(output.contains("http_requests_total 1"));
    }

    #[test]
    fn content_type_is_text_format() {
        assert!(text_content_type().starts_with("text/plain"));
        assert_eq!(text_content_type(), prometheus::TEXT_FORMAT);
    }

    #[test]
    fn gauge_converts_to_single_plain_sample() {
        let registry = Registry::new();
        let gauge = Gauge::with_opts(Opts::new("active_connections", "Active connections")).unwrap();
        registry.register(Box::new(gauge.clone())).unwrap();
        gauge.set(42.0);

        let json = to_json(&registry.gather());
        assert_eq!(json.len(), 1);
        assert_eq!(json[0].name, "active_connections");
        assert_eq!(json[0].kind, "gauge");
        assert_eq!(json[0].help, "Active connections");
        assert_eq!(json[0].values, vec![SampleJson {
            value: 42.0,
            labels: BTreeMap::new(),
            metric_name: None,
        }]);
    }

    #[test]
    fn histogram_expands_into_bucket_sum_and_count_series() {
        let registry = Registry::new();
        let h = Histogram::with_opts(
            HistogramOpts::new("latency", "Latency").buckets(vec![1.0, 5.0]),
        )
        .unwrap();
        registry.register(Box::new(h.clone())).unwrap();
        h.observe(0.5);
        h.observe(3.0);
        h.observe(9.0);

        let json = to_json(&registry.gather());
        let values = &json[0].values;
        // two configured buckets + Inf + sum + count
        assert_eq!(values.len(), 5);
        assert_eq!(values[0].labels["le"], "1");
        assert_eq!(values[0].value, 1.0);
        assert_eq!(values[1].labels["le"], "5");
        assert_eq!(values[1].value, 2.0);
        assert_eq!(values[2].labels["le"], "+Inf");
        assert_eq!(values[2].value, 3.0);
        assert_eq!(values[3].metric_name.as_deref(), Some("latency_sum"));
        assert_eq!(values[3].value, 12.5);
        assert_eq!(values[4].metric_name.as_deref(), Some("latency_count"));
    }

    #[test]
    fn json_serializes_type_and_metric_name_keys() {
        let sample = series(1.0, BTreeMap::new(), "x_count".into());
        let v = serde_json::to_value(&sample).unwrap();
        assert_eq!(v["metricName"], "x_count");

        let v = serde_json::to_value(plain(1.0, BTreeMap::new())).unwrap();
        assert!(v.get("metricName").is_none());
    }
}

//! # EMF
//!
//! Helpers for serializing CloudWatch Embedded Metrics via serde_json
//!
//! <https://docs.aws.amazon.com/AmazonCloudWatch/latest/monitoring/CloudWatch_Embedded_Metric_Format_Specification.html>

use super::datum::MetricDatum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Serialize)]
pub struct EmbeddedMetrics<'a> {
    #[serde(rename = "_aws")]
    pub aws: EmbeddedMetricsAws<'a>,
    #[serde(flatten)]
    pub dimensions: BTreeMap<&'a str, &'a str>,
    #[serde(flatten)]
    pub values: BTreeMap<&'a str, f64>,
}

#[derive(Serialize)]
pub struct EmbeddedMetricsAws<'a> {
    #[serde(rename = "Timestamp")]
    pub timestamp: u64,
    // One namespace per document
    #[serde(rename = "CloudWatchMetrics")]
    pub cloudwatch_metrics: [EmbeddedNamespace<'a>; 1],
}

#[derive(Serialize)]
pub struct EmbeddedNamespace<'a> {
    #[serde(rename = "Namespace")]
    pub namespace: &'a str,
    // A single dimension set holding every dimension of the datum
    #[serde(rename = "Dimensions")]
    pub dimensions: [Vec<&'a str>; 1],
    #[serde(rename = "Metrics")]
    pub metrics: Vec<EmbeddedMetric<'a>>,
}

#[derive(Serialize)]
pub struct EmbeddedMetric<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Unit")]
    pub unit: &'static str,
}

impl<'a> EmbeddedMetrics<'a> {
    /// Build the document for a single datum
    pub fn from_datum(namespace: &'a str, datum: &'a MetricDatum) -> Self {
        let name = datum.metric_name.as_str();

        let mut emf = EmbeddedMetrics {
            aws: EmbeddedMetricsAws {
                timestamp: epoch_millis(datum.timestamp),
                cloudwatch_metrics: [EmbeddedNamespace {
                    namespace,
                    dimensions: [Vec::with_capacity(datum.dimensions.len())],
                    metrics: vec![EmbeddedMetric {
                        name,
                        unit: unit_to_str(&datum.unit),
                    }],
                }],
            },
            dimensions: BTreeMap::new(),
            values: BTreeMap::new(),
        };

        for dimension in &datum.dimensions {
            emf.aws.cloudwatch_metrics[0].dimensions[0].push(&dimension.name);
            emf.dimensions.insert(&dimension.name, &dimension.value);
        }
        emf.values.insert(name, datum.value);

        emf
    }
}

/// Milliseconds since the Unix epoch, times before the epoch clamp to 0
pub fn epoch_millis(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Convert a metrics::Unit into the cloudwatch string
///
/// <https://docs.aws.amazon.com/AmazonCloudWatch/latest/APIReference/API_MetricDatum.html>
pub fn unit_to_str(unit: &metrics::Unit) -> &'static str {
    match unit {
        metrics::Unit::Count => "Count",
        metrics::Unit::Percent => "Percent",
        metrics::Unit::Seconds => "Seconds",
        metrics::Unit::Milliseconds => "Milliseconds",
        metrics::Unit::Microseconds => "Microseconds",
        metrics::Unit::Nanoseconds => "Nanoseconds",
        metrics::Unit::Tebibytes => "Terabytes",
        metrics::Unit::Gibibytes => "Gigabytes",
        metrics::Unit::Mebibytes => "Megabytes",
        metrics::Unit::Kibibytes => "Kilobytes",
        metrics::Unit::Bytes => "Bytes",
        metrics::Unit::TerabitsPerSecond => "Terabits/Second",
        metrics::Unit::GigabitsPerSecond => "Gigabits/Second",
        metrics::Unit::MegabitsPerSecond => "Megabits/Second",
        metrics::Unit::KilobitsPerSecond => "Kilobits/Second",
        metrics::Unit::BitsPerSecond => "Bits/Second",
        metrics::Unit::CountPerSecond => "Count/Second",
    }
}

#[cfg(test)]
mod tests {
    use super::super::datum::{Dimension, MetricName};
    use super::*;
    use std::time::Duration;

    #[test]
    fn embedded_metrics() {
        let datum = MetricDatum {
            metric_name: MetricName::HandlerDuration,
            unit: metrics::Unit::Milliseconds,
            value: 250.0,
            timestamp: UNIX_EPOCH + Duration::from_millis(1687394207903),
            dimensions: vec![
                Dimension {
                    name: "ActionType".into(),
                    value: "UPDATE".into(),
                },
                Dimension {
                    name: "ResourceType".into(),
                    value: "Aws::S3::Bucket".into(),
                },
            ],
        };

        let emf = EmbeddedMetrics::from_datum("AWS/CloudFormation/Aws/S3/Bucket", &datum);

        assert_eq!(
            serde_json::to_string(&emf).unwrap(),
            r#"{"_aws":{"Timestamp":1687394207903,"CloudWatchMetrics":[{"Namespace":"AWS/CloudFormation/Aws/S3/Bucket","Dimensions":[["ActionType","ResourceType"]],"Metrics":[{"Name":"HandlerDuration","Unit":"Milliseconds"}]}]},"ActionType":"UPDATE","ResourceType":"Aws::S3::Bucket","HandlerDuration":250.0}"#
        );
    }

    #[test]
    fn timestamp_before_epoch() {
        assert_eq!(epoch_millis(UNIX_EPOCH - Duration::from_secs(1)), 0);
        assert_eq!(epoch_millis(UNIX_EPOCH + Duration::from_millis(42)), 42);
    }

    #[test]
    fn units() {
        assert_eq!(unit_to_str(&metrics::Unit::Count), "Count");
        assert_eq!(unit_to_str(&metrics::Unit::Milliseconds), "Milliseconds");
    }
}

//! # Datum
//!
//! Request model handed to a [MetricsClient](super::MetricsClient), mirroring CloudWatch `PutMetricData`
//!
//! <https://docs.aws.amazon.com/AmazonCloudWatch/latest/APIReference/API_PutMetricData.html>

use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

/// Root of every namespace published by this crate
pub const METRIC_NAMESPACE_ROOT: &str = "AWS/CloudFormation";

pub const DIMENSION_KEY_ACTION_TYPE: &str = "ActionType";
pub const DIMENSION_KEY_EXCEPTION_TYPE: &str = "ExceptionType";
pub const DIMENSION_KEY_RESOURCE_TYPE: &str = "ResourceType";

/// Dimension key to value, keys are unique and iterate in sorted order
pub type DimensionSet = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    HandlerException,
    HandlerInvocationCount,
    HandlerDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::HandlerException => "HandlerException",
            MetricName::HandlerInvocationCount => "HandlerInvocationCount",
            MetricName::HandlerDuration => "HandlerDuration",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// A single timestamped, named, dimensioned observation
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDatum {
    pub metric_name: MetricName,
    pub unit: metrics::Unit,
    pub value: f64,
    pub timestamp: SystemTime,
    pub dimensions: Vec<Dimension>,
}

impl MetricDatum {
    pub fn new(
        metric_name: MetricName,
        unit: metrics::Unit,
        value: f64,
        timestamp: SystemTime,
        dimensions: DimensionSet,
    ) -> Self {
        Self {
            metric_name,
            unit,
            value,
            timestamp,
            dimensions: dimensions
                .into_iter()
                .map(|(name, value)| Dimension {
                    name: name.to_owned(),
                    value,
                })
                .collect(),
        }
    }

    /// Looks up a dimension value by name
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.name == name)
            .map(|dimension| dimension.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutMetricDataRequest {
    pub namespace: String,
    pub metric_data: Vec<MetricDatum>,
}

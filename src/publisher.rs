//! # Publisher
//!
//! Handler metrics emitter returned from cloudwatch_handler_metrics::Builder

use super::action::Action;
use super::client::MetricsClient;
use super::datum::{
    DimensionSet, MetricDatum, MetricName, PutMetricDataRequest, DIMENSION_KEY_ACTION_TYPE,
    DIMENSION_KEY_EXCEPTION_TYPE, DIMENSION_KEY_RESOURCE_TYPE,
};
use super::resource::ResourceType;
use super::Error;
use metrics::SharedString;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::trace;

/// Configuration via Builder
#[derive(Debug, Clone)]
pub struct Config {
    pub root_namespace: SharedString,
    pub resource_type: ResourceType,
}

/// Publishes invocation, exception and duration metrics for one resource type
///
/// Use [Builder](super::Builder) to construct. Configuration is fixed at construction, so a
/// publisher can be cloned and shared across tasks freely.
///
/// # Example
/// ```
/// use cloudwatch_handler_metrics::{Action, Builder, NoOpClient};
/// use std::time::SystemTime;
///
/// let metrics = Builder::new()
///     .resource_type("Aws::S3::Bucket")
///     .client(NoOpClient)
///     .build()
///     .unwrap();
///
/// assert_eq!(metrics.namespace(), "AWS/CloudFormation/Aws/S3/Bucket");
///
/// let start = SystemTime::now();
/// metrics.publish_invocation_metric(start, Action::Create).unwrap();
/// metrics.publish_duration_metric(start, Action::Create, 120).unwrap();
/// ```
#[derive(Clone)]
pub struct MetricsPublisher {
    config: Config,
    namespace: String,
    client: Arc<dyn MetricsClient>,
}

impl MetricsPublisher {
    pub fn new(config: Config, client: Arc<dyn MetricsClient>) -> Self {
        let namespace = format!("{}/{}", &*config.root_namespace, config.resource_type.namespace());
        Self {
            config,
            namespace,
            client,
        }
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.config.resource_type
    }

    /// Full namespace, `<root>/<resource type namespace>`
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Publish `HandlerException` with an `ExceptionType` dimension naming the error's type
    ///
    /// The type name is taken from the static type of `error`, so pass the concrete error where
    /// one is available rather than a `dyn Error`.
    pub fn publish_exception_metric<E>(&self, timestamp: SystemTime, action: Action, error: &E) -> Result<(), Error>
    where
        E: std::error::Error + ?Sized,
    {
        self.publish_exception_type_metric(timestamp, action, exception_type(error))
    }

    /// Publish `HandlerException` with an already resolved `ExceptionType`
    pub fn publish_exception_type_metric(
        &self,
        timestamp: SystemTime,
        action: Action,
        exception_type: &str,
    ) -> Result<(), Error> {
        let mut dimensions = self.dimensions(action);
        dimensions.insert(DIMENSION_KEY_EXCEPTION_TYPE, exception_type.to_owned());

        self.publish_metric(MetricName::HandlerException, dimensions, metrics::Unit::Count, 1.0, timestamp)
    }

    /// Publish `HandlerInvocationCount`
    pub fn publish_invocation_metric(&self, timestamp: SystemTime, action: Action) -> Result<(), Error> {
        self.publish_metric(
            MetricName::HandlerInvocationCount,
            self.dimensions(action),
            metrics::Unit::Count,
            1.0,
            timestamp,
        )
    }

    /// Publish `HandlerDuration` in milliseconds
    pub fn publish_duration_metric(&self, timestamp: SystemTime, action: Action, milliseconds: u64) -> Result<(), Error> {
        self.publish_metric(
            MetricName::HandlerDuration,
            self.dimensions(action),
            metrics::Unit::Milliseconds,
            milliseconds as f64,
            timestamp,
        )
    }

    /// Dimensions shared by every metric
    fn dimensions(&self, action: Action) -> DimensionSet {
        let mut dimensions = DimensionSet::new();
        dimensions.insert(DIMENSION_KEY_ACTION_TYPE, action.name().to_owned());
        dimensions.insert(DIMENSION_KEY_RESOURCE_TYPE, self.config.resource_type.name().to_owned());
        dimensions
    }

    fn publish_metric(
        &self,
        metric_name: MetricName,
        dimensions: DimensionSet,
        unit: metrics::Unit,
        value: f64,
        timestamp: SystemTime,
    ) -> Result<(), Error> {
        let request = PutMetricDataRequest {
            namespace: self.namespace.clone(),
            metric_data: vec![MetricDatum::new(metric_name, unit, value, timestamp, dimensions)],
        };

        trace!(namespace = %self.namespace, metric = %metric_name, value, "publishing metric");
        self.client.put_metric_data(request)
    }
}

impl fmt::Debug for MetricsPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsPublisher")
            .field("config", &self.config)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

fn exception_type<E: ?Sized>(_error: &E) -> &'static str {
    std::any::type_name::<E>()
}

//! Handler metrics for CloudFormation-style resource handlers
//!
//! Publishes `HandlerInvocationCount`, `HandlerException` and `HandlerDuration` data points
//! under `AWS/CloudFormation/<Resource/Type/Namespace>` through a [MetricsClient].

pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

pub use {
    action::Action,
    builder::Builder,
    client::{EmfClient, MetricsClient, NoOpClient},
    datum::{Dimension, MetricDatum, MetricName, PutMetricDataRequest, METRIC_NAMESPACE_ROOT},
    publisher::{Config, MetricsPublisher},
    resource::{ConfigError, ResourceType},
};

#[cfg(feature = "service")]
pub use service::{ExceptionType, HandlerRequest, MetricsLayer, MetricsService, StaticTypeName};

mod action;
mod builder;
mod client;
pub mod datum;
mod emf;
mod publisher;
mod resource;
#[cfg(feature = "service")]
pub mod service;

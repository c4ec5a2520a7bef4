//! [tower] integration for recording handler metrics around every invocation
//!
//! *this module requires the `service` feature flag*
//!
//! # Example
//! ```
//! use cloudwatch_handler_metrics::{Action, Builder, EmfClient, HandlerRequest, MetricsLayer};
//! use tower::{Layer, Service, ServiceExt};
//!
//! struct Request {
//!     action: Action,
//! }
//!
//! impl HandlerRequest for Request {
//!     fn action(&self) -> Action {
//!         self.action
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let metrics = Builder::new()
//!     .resource_type("Aws::S3::Bucket")
//!     .client(EmfClient::stdout())
//!     .build()
//!     .unwrap();
//!
//! let mut service = MetricsLayer::new(metrics)
//!     .layer(tower::service_fn(|_req: Request| async { Ok::<_, std::io::Error>("done") }));
//!
//! let response = service.ready().await.unwrap().call(Request { action: Action::Create }).await;
//! assert_eq!(response.unwrap(), "done");
//! # });
//! ```
//!
//! # Output
//!
//! ```plaintext
//! {"_aws":{"Timestamp":1687947426188,"CloudWatchMetrics":[{"Namespace":"AWS/CloudFormation/Aws/S3/Bucket","Dimensions":[["ActionType","ResourceType"]],"Metrics":[{"Name":"HandlerInvocationCount","Unit":"Count"}]}]},"ActionType":"CREATE","ResourceType":"Aws::S3::Bucket","HandlerInvocationCount":1.0}
//! {"_aws":{"Timestamp":1687947426188,"CloudWatchMetrics":[{"Namespace":"AWS/CloudFormation/Aws/S3/Bucket","Dimensions":[["ActionType","ResourceType"]],"Metrics":[{"Name":"HandlerDuration","Unit":"Milliseconds"}]}]},"ActionType":"CREATE","ResourceType":"Aws::S3::Bucket","HandlerDuration":0.0}
//! ```
//!
//! # Exception types
//!
//! By default `ExceptionType` is the static type name of the inner service's error. Handlers that
//! return boxed errors all share one static type, so resolve the concrete kind yourself:
//!
//! ```
//! use cloudwatch_handler_metrics::{Builder, MetricsLayer, NoOpClient};
//! use std::borrow::Cow;
//!
//! type BoxError = Box<dyn std::error::Error + Send + Sync>;
//!
//! fn error_kind(error: &BoxError) -> Cow<'static, str> {
//!     if error.is::<std::io::Error>() {
//!         Cow::Borrowed("std::io::Error")
//!     } else {
//!         Cow::Borrowed("unknown")
//!     }
//! }
//!
//! let metrics = Builder::new()
//!     .resource_type("Aws::S3::Bucket")
//!     .client(NoOpClient)
//!     .build()
//!     .unwrap();
//!
//! let layer = MetricsLayer::new(metrics).with_exception_type(error_kind);
//! ```

use super::action::Action;
use super::publisher::MetricsPublisher;
use pin_project::pin_project;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant, SystemTime};
use tracing::warn;

/// Requests that know which handler action they invoke
pub trait HandlerRequest {
    fn action(&self) -> Action;
}

impl HandlerRequest for Action {
    fn action(&self) -> Action {
        *self
    }
}

/// Resolves the `ExceptionType` dimension for an error returned by the inner service
///
/// Implemented for any `Fn(&E) -> Cow<'static, str>`.
pub trait ExceptionType<E> {
    fn exception_type(&self, error: &E) -> Cow<'static, str>;
}

impl<E, F> ExceptionType<E> for F
where
    F: Fn(&E) -> Cow<'static, str>,
{
    fn exception_type(&self, error: &E) -> Cow<'static, str> {
        self(error)
    }
}

/// Default resolver, the static type name of the error
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticTypeName;

impl<E> ExceptionType<E> for StaticTypeName {
    fn exception_type(&self, _error: &E) -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<E>())
    }
}

/// [tower::Layer] producing a [MetricsService]
#[derive(Clone)]
pub struct MetricsLayer<R = StaticTypeName> {
    metrics: MetricsPublisher,
    exception_type: R,
}

impl MetricsLayer {
    pub fn new(metrics: MetricsPublisher) -> Self {
        Self {
            metrics,
            exception_type: StaticTypeName,
        }
    }
}

impl<R> MetricsLayer<R> {
    /// Replaces how `ExceptionType` is derived from the inner service's error
    pub fn with_exception_type<T>(self, exception_type: T) -> MetricsLayer<T> {
        MetricsLayer {
            metrics: self.metrics,
            exception_type,
        }
    }
}

impl<R> fmt::Debug for MetricsLayer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsLayer")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl<S, R: Clone> tower::Layer<S> for MetricsLayer<R> {
    type Service = MetricsService<S, R>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            metrics: self.metrics.clone(),
            exception_type: self.exception_type.clone(),
            inner,
        }
    }
}

/// [tower::Service] publishing `HandlerInvocationCount` before each call, then `HandlerDuration` and,
/// on failure, `HandlerException` once the inner service finishes
///
/// Metric failures are logged and never change the inner service's result.
#[derive(Clone)]
pub struct MetricsService<S, R = StaticTypeName> {
    metrics: MetricsPublisher,
    exception_type: R,
    inner: S,
}

impl<S> MetricsService<S> {
    pub fn new(metrics: MetricsPublisher, inner: S) -> Self {
        Self {
            metrics,
            exception_type: StaticTypeName,
            inner,
        }
    }
}

impl<S, R> MetricsService<S, R> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S: fmt::Debug, R> fmt::Debug for MetricsService<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsService")
            .field("metrics", &self.metrics)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<S, R, Request> tower::Service<Request> for MetricsService<S, R>
where
    S: tower::Service<Request>,
    R: ExceptionType<S::Error> + Clone,
    Request: HandlerRequest,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = MetricsServiceFuture<S::Future, R>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let action = req.action();
        let timestamp = SystemTime::now();

        if let Err(err) = self.metrics.publish_invocation_metric(timestamp, action) {
            warn!(%action, "failed to publish invocation metric: {err}");
        }

        // Wrap the inner Future so we can publish after it's done
        MetricsServiceFuture {
            metrics: self.metrics.clone(),
            exception_type: self.exception_type.clone(),
            action,
            timestamp,
            start: Instant::now(),
            inner: self.inner.call(req),
        }
    }
}

#[pin_project]
#[doc(hidden)]
pub struct MetricsServiceFuture<F, R> {
    metrics: MetricsPublisher,
    exception_type: R,
    action: Action,
    timestamp: SystemTime,
    start: Instant,
    #[pin]
    inner: F,
}

impl<F, R, Response, Error> Future for MetricsServiceFuture<F, R>
where
    F: Future<Output = Result<Response, Error>>,
    R: ExceptionType<Error>,
{
    type Output = Result<Response, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if let Poll::Ready(result) = this.inner.poll(cx) {
            let action = *this.action;

            if let Err(error) = &result {
                let exception_type = this.exception_type.exception_type(error);
                if let Err(err) = this
                    .metrics
                    .publish_exception_type_metric(*this.timestamp, action, &exception_type)
                {
                    warn!(%action, "failed to publish exception metric: {err}");
                }
            }

            let milliseconds = elapsed_millis(this.start.elapsed());
            if let Err(err) = this.metrics.publish_duration_metric(*this.timestamp, action, milliseconds) {
                warn!(%action, "failed to publish duration metric: {err}");
            }

            return Poll::Ready(result);
        }

        Poll::Pending
    }
}


/// Whole milliseconds, saturating at `u64::MAX`
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

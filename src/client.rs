//! # Client
//!
//! The outbound seam: anything that accepts a [PutMetricDataRequest]

use super::datum::PutMetricDataRequest;
use super::{emf, Error};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Metrics ingestion client
///
/// Delivery guarantees belong to the implementation, [MetricsPublisher](super::MetricsPublisher) makes
/// exactly one call per published metric and hands any error straight back to its caller.
pub trait MetricsClient: Send + Sync {
    fn put_metric_data(&self, request: PutMetricDataRequest) -> Result<(), Error>;
}

impl<C: MetricsClient + ?Sized> MetricsClient for Arc<C> {
    fn put_metric_data(&self, request: PutMetricDataRequest) -> Result<(), Error> {
        (**self).put_metric_data(request)
    }
}

impl<C: MetricsClient + ?Sized> MetricsClient for Box<C> {
    fn put_metric_data(&self, request: PutMetricDataRequest) -> Result<(), Error> {
        (**self).put_metric_data(request)
    }
}

/// Discards every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpClient;

impl MetricsClient for NoOpClient {
    fn put_metric_data(&self, _request: PutMetricDataRequest) -> Result<(), Error> {
        Ok(())
    }
}

/// Writes each datum as a CloudWatch Embedded Metric Format line to an implementation of
/// [std::io::Write]
///
/// Inside Lambda, writing to stdout is enough for CloudWatch to ingest the metrics.
///
/// # Example
/// ```
/// use cloudwatch_handler_metrics::{Action, Builder, EmfClient};
/// use std::time::SystemTime;
///
/// let metrics = Builder::new()
///     .resource_type("Aws::S3::Bucket")
///     .client(EmfClient::stdout())
///     .build()
///     .unwrap();
///
/// metrics.publish_invocation_metric(SystemTime::now(), Action::Create).unwrap();
/// ```
#[derive(Debug)]
pub struct EmfClient<W> {
    writer: Mutex<W>,
}

impl EmfClient<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> EmfClient<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the client, returning the writer
    pub fn into_inner(self) -> Result<W, Error> {
        self.writer
            .into_inner()
            .map_err(|_| "emf writer mutex poisoned".into())
    }
}

impl<W: Write + Send> MetricsClient for EmfClient<W> {
    fn put_metric_data(&self, request: PutMetricDataRequest) -> Result<(), Error> {
        // Serialize before taking the lock
        let mut buffer = Vec::new();
        for datum in &request.metric_data {
            let document = emf::EmbeddedMetrics::from_datum(&request.namespace, datum);
            serde_json::to_writer(&mut buffer, &document)?;
            buffer.push(b'\n');
        }

        let mut writer = self.writer.lock().map_err(|_| "emf writer mutex poisoned")?;
        writer.write_all(&buffer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::datum::{MetricDatum, MetricName};
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn request(count: usize) -> PutMetricDataRequest {
        let datum = MetricDatum {
            metric_name: MetricName::HandlerInvocationCount,
            unit: metrics::Unit::Count,
            value: 1.0,
            timestamp: UNIX_EPOCH + Duration::from_millis(1000),
            dimensions: Vec::new(),
        };
        PutMetricDataRequest {
            namespace: "AWS/CloudFormation/Aws/S3/Bucket".into(),
            metric_data: vec![datum; count],
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_one_line_per_datum() {
        let client = EmfClient::new(Vec::new());
        client.put_metric_data(request(2)).unwrap();

        let output = String::from_utf8(client.into_inner().unwrap()).unwrap();
        let line = r#"{"_aws":{"Timestamp":1000,"CloudWatchMetrics":[{"Namespace":"AWS/CloudFormation/Aws/S3/Bucket","Dimensions":[[]],"Metrics":[{"Name":"HandlerInvocationCount","Unit":"Count"}]}]},"HandlerInvocationCount":1.0}"#;
        assert_eq!(output, format!("{line}\n{line}\n"));
    }

    #[test]
    fn io_errors_are_returned() {
        let client = EmfClient::new(FailingWriter);
        let err = client.put_metric_data(request(1)).unwrap_err();
        assert_eq!(err.to_string(), "closed");
    }

    struct PanickingWriter;

    impl Write for PanickingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            panic!("writer panicked");
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn poisoned_writer_is_an_error() {
        let client = EmfClient::new(PanickingWriter);

        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = client.put_metric_data(request(1));
        }));
        assert!(panicked.is_err());

        let err = client.put_metric_data(request(1)).unwrap_err();
        assert_eq!(err.to_string(), "emf writer mutex poisoned");

        let err = client.into_inner().err().unwrap();
        assert_eq!(err.to_string(), "emf writer mutex poisoned");
    }

    #[test]
    fn shared_clients() {
        let shared: Arc<dyn MetricsClient> = Arc::new(NoOpClient);
        assert!(shared.put_metric_data(request(1)).is_ok());

        let boxed: Box<dyn MetricsClient> = Box::new(NoOpClient);
        assert!(boxed.put_metric_data(request(1)).is_ok());
    }
}

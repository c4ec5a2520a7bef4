use super::client::MetricsClient;
use super::datum::METRIC_NAMESPACE_ROOT;
use super::publisher::{Config, MetricsPublisher};
use super::resource::{ConfigError, ResourceType};
use metrics::SharedString;
use std::sync::Arc;

/// Builder for the handler [MetricsPublisher]
///
/// # Example
/// ```
///  let metrics = cloudwatch_handler_metrics::Builder::new()
///      .resource_type("Aws::S3::Bucket")
///      .client(cloudwatch_handler_metrics::EmfClient::stdout())
///      .build()
///      .unwrap();
/// ```
#[derive(Default)]
pub struct Builder {
    root_namespace: Option<SharedString>,
    resource_type: Option<String>,
    client: Option<Arc<dyn MetricsClient>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resource type name, e.g. `Aws::S3::Bucket`
    /// * Must be set or build() will return Err(ConfigError::Missing("resource_type"))
    /// * Validated by build(), see [ResourceType::new]
    pub fn resource_type(self, name: impl Into<String>) -> Self {
        Self {
            resource_type: Some(name.into()),
            ..self
        }
    }

    /// Sets the client metrics are handed to
    /// * Must be set or build() will return Err(ConfigError::Missing("client"))
    pub fn client(self, client: impl MetricsClient + 'static) -> Self {
        self.shared_client(Arc::new(client))
    }

    /// Same as [Builder::client] for a client already shared with other publishers
    pub fn shared_client(self, client: Arc<dyn MetricsClient>) -> Self {
        Self {
            client: Some(client),
            ..self
        }
    }

    /// Overrides the namespace root, defaults to [METRIC_NAMESPACE_ROOT]
    pub fn root_namespace(self, namespace: impl Into<SharedString>) -> Self {
        Self {
            root_namespace: Some(namespace.into()),
            ..self
        }
    }

    /// Private helper for consuming the builder into publisher configuration
    fn build_config(
        root_namespace: Option<SharedString>,
        resource_type: Option<String>,
    ) -> Result<Config, ConfigError> {
        let resource_type = resource_type.ok_or(ConfigError::Missing("resource_type"))?;
        Ok(Config {
            root_namespace: root_namespace.unwrap_or_else(|| METRIC_NAMESPACE_ROOT.into()),
            resource_type: ResourceType::new(resource_type)?,
        })
    }

    /// Validate the configuration and construct the publisher
    pub fn build(self) -> Result<MetricsPublisher, ConfigError> {
        let config = Self::build_config(self.root_namespace, self.resource_type)?;
        let client = self.client.ok_or(ConfigError::Missing("client"))?;
        Ok(MetricsPublisher::new(config, client))
    }
}

#[cfg(test)]
mod tests {
    use super::super::client::NoOpClient;
    use super::*;

    #[test]
    fn defaults_to_cloudformation_root() {
        let metrics = Builder::new()
            .resource_type("Aws::S3::Bucket")
            .client(NoOpClient)
            .build()
            .unwrap();
        assert_eq!(metrics.namespace(), "AWS/CloudFormation/Aws/S3/Bucket");
    }

    #[test]
    fn root_namespace_override() {
        let metrics = Builder::new()
            .root_namespace("Custom")
            .resource_type(String::from("Org::Team::Widget"))
            .shared_client(Arc::new(NoOpClient))
            .build()
            .unwrap();
        assert_eq!(metrics.namespace(), "Custom/Org/Team/Widget");
    }

    #[test]
    fn new_starts_empty() {
        let builder = Builder::new();
        assert!(builder.root_namespace.is_none());
        assert!(builder.resource_type.is_none());
        assert!(builder.client.is_none());
    }

    #[test]
    fn missing_resource_type() {
        let err = Builder::new().client(NoOpClient).build().unwrap_err();
        assert_eq!(err, ConfigError::Missing("resource_type"));
    }

    #[test]
    fn missing_client() {
        let err = Builder::new().resource_type("Aws::S3::Bucket").build().unwrap_err();
        assert_eq!(err, ConfigError::Missing("client"));
    }

    #[test]
    fn invalid_resource_type() {
        let err = Builder::new()
            .resource_type("Aws-S3-Bucket")
            .client(NoOpClient)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidResourceType { .. }));
    }
}

//! # Resource
//!
//! Validated resource type name and the metrics namespace segment derived from it

use std::fmt;
use std::str::FromStr;

const TYPE_DELIMITER: &str = "::";
const NAMESPACE_DELIMITER: &str = "/";

/// Configuration errors raised while building a [MetricsPublisher](super::MetricsPublisher)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} missing")]
    Missing(&'static str),

    #[error("invalid resource type name {name:?}: {reason}")]
    InvalidResourceType { name: String, reason: &'static str },
}

/// Resource type name such as `Aws::S3::Bucket` together with its namespace `Aws/S3/Bucket`
///
/// Both strings are computed once in [ResourceType::new] and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceType {
    name: String,
    namespace: String,
}

impl ResourceType {
    /// Validates `name` and derives the namespace
    /// * Must contain the `::` delimiter
    /// * Every `::` separated segment must be non-empty and ASCII alphanumeric
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();

        let invalid = |reason| ConfigError::InvalidResourceType {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if !name.contains(TYPE_DELIMITER) {
            return Err(invalid("expected segments separated by \"::\""));
        }
        for segment in name.split(TYPE_DELIMITER) {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid("segments may only contain ASCII letters and digits"));
            }
        }

        let namespace = name.replace(TYPE_DELIMITER, NAMESPACE_DELIMITER);
        Ok(Self { name, namespace })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name with every `::` replaced by `/`
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for ResourceType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ResourceType {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for ResourceType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_replaces_every_delimiter() {
        for (name, namespace) in [
            ("Aws::S3::Bucket", "Aws/S3/Bucket"),
            ("Vendor::Service", "Vendor/Service"),
            ("My::Deep::Nested::Type1", "My/Deep/Nested/Type1"),
        ] {
            let resource_type = ResourceType::new(name).unwrap();
            assert_eq!(resource_type.name(), name);
            assert_eq!(resource_type.namespace(), namespace);
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in ["", "Bucket", "Aws::", "::S3", "Aws::::Bucket", "Aws::S3:Bucket", "Aws::S 3", "Aws/S3::Bucket"] {
            let err = ResourceType::new(name).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidResourceType { name: n, .. } if n == name),
                "{name:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn parse() {
        let resource_type: ResourceType = "Aws::EC2::Instance".parse().unwrap();
        assert_eq!(resource_type.to_string(), "Aws::EC2::Instance");
        assert_eq!(ResourceType::try_from("Aws::EC2::Instance").unwrap(), resource_type);
        assert_eq!(ResourceType::try_from(String::from("Aws::EC2::Instance")).unwrap(), resource_type);
    }

    #[test]
    fn error_messages() {
        assert_eq!(ConfigError::Missing("client").to_string(), "client missing");
        assert_eq!(
            ResourceType::new("Bucket").unwrap_err().to_string(),
            r#"invalid resource type name "Bucket": expected segments separated by "::""#
        );
    }
}

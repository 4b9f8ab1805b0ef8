//! Configuration management for the provisioner
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (provisioner.toml)
//! - Environment variables (PROVISIONER_*)
//!
//! ## Example config file (provisioner.toml):
//! ```toml
//! [service]
//! endpoint = "https://registry.example.com"
//! username = "svc-schemas"
//! password = "secret"
//!
//! [provision]
//! registry = "my-registry"
//! schema = "my-avro-schema"
//! format = "AVRO"
//! compatibility = "FORWARD"
//! checkpoint = true
//!
//! [policy]
//! setup = "fail"
//! data = "continue"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::http::HttpRegistryConfig;
use crate::provisioner::{ErrorPolicy, ProvisionPlan};
use crate::schema::{Compatibility, DataFormat, SchemaId};

/// Main configuration for the provisioner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionerConfig {
    /// Registry service connection
    #[serde(default)]
    pub service: ServiceConfig,

    /// What to provision
    #[serde(default)]
    pub provision: ProvisionConfig,

    /// Error-handling policy
    #[serde(default)]
    pub policy: ErrorPolicy,
}

/// Registry service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Basic-auth username
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,
}

/// Provisioning target settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Registry name
    #[serde(default = "default_registry")]
    pub registry: String,

    /// Schema name
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Data format of the schema definition
    #[serde(default)]
    pub format: DataFormat,

    /// Compatibility mode for newly created schemas
    #[serde(default)]
    pub compatibility: Compatibility,

    /// Mark the registered version as the checkpoint
    #[serde(default = "default_true")]
    pub checkpoint: bool,
}

// Default value functions
fn default_endpoint() -> String {
    "http://localhost:8081".to_string()
}

fn default_registry() -> String {
    "my-registry".to_string()
}

fn default_schema() -> String {
    "my-avro-schema".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            username: None,
            password: None,
        }
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            schema: default_schema(),
            format: DataFormat::Avro,
            compatibility: Compatibility::Forward,
            checkpoint: true,
        }
    }
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            provision: ProvisionConfig::default(),
            policy: ErrorPolicy::default(),
        }
    }
}

impl ProvisionerConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "provisioner.toml",
            ".provisioner.toml",
            "config/provisioner.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "provisioner") {
            let xdg_config = config_dir.config_dir().join("provisioner.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (PROVISIONER_*)
        builder = builder.add_source(
            Environment::with_prefix("PROVISIONER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Connection settings for the HTTP backend
    pub fn http_config(&self) -> HttpRegistryConfig {
        HttpRegistryConfig {
            endpoint: self.service.endpoint.clone(),
            username: self.service.username.clone(),
            password: self.service.password.clone(),
        }
    }

    /// Identifier of the configured schema
    pub fn schema_id(&self) -> SchemaId {
        SchemaId::new(&self.provision.registry, &self.provision.schema)
    }

    /// Build a provisioning plan around the given definition
    pub fn plan(&self, definition: impl Into<String>) -> ProvisionPlan {
        ProvisionPlan {
            registry: self.provision.registry.clone(),
            schema: self.provision.schema.clone(),
            format: self.provision.format,
            compatibility: self.provision.compatibility,
            definition: definition.into(),
            checkpoint: self.provision.checkpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioner::FailureMode;

    #[test]
    fn test_default_config() {
        let config = ProvisionerConfig::default();
        assert_eq!(config.provision.registry, "my-registry");
        assert_eq!(config.provision.format, DataFormat::Avro);
        assert_eq!(config.provision.compatibility, Compatibility::Forward);
        assert!(config.provision.checkpoint);
        assert_eq!(config.policy.setup, FailureMode::Fail);
        assert_eq!(config.policy.data, FailureMode::Continue);
    }

    #[test]
    fn test_serialize_config() {
        let config = ProvisionerConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[service]"));
        assert!(toml_str.contains("[provision]"));
        assert!(toml_str.contains("[policy]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provisioner.toml");
        std::fs::write(
            &path,
            r#"
[provision]
registry = "analytics"
schema = "events"
format = "JSON"
checkpoint = false

[policy]
data = "fail"
"#,
        )
        .unwrap();

        let config = ProvisionerConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.provision.registry, "analytics");
        assert_eq!(config.provision.schema, "events");
        assert_eq!(config.provision.format, DataFormat::Json);
        assert!(!config.provision.checkpoint);
        assert_eq!(config.policy.data, FailureMode::Fail);
    }

    #[test]
    fn test_plan_carries_definition() {
        let config = ProvisionerConfig::default();
        let plan = config.plan(r#"{"type": "record"}"#);
        assert_eq!(plan.registry, "my-registry");
        assert_eq!(plan.definition, r#"{"type": "record"}"#);
        assert!(plan.checkpoint);
    }
}

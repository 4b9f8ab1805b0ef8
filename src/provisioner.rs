//! Idempotent schema provisioning
//!
//! Sequences the five registry operations (ensure registry, ensure schema,
//! register version, read back latest, checkpoint) against any
//! [`RegistryClient`]. "Already exists" during the ensure steps is success;
//! everything else is governed by an explicit [`ErrorPolicy`] instead of a
//! mix of raising and swallowing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::checksum::Checksum;
use crate::client::RegistryClient;
use crate::error::{RegistryError, Result};
use crate::schema::{
    Compatibility, DataFormat, SchemaId, CHECKPOINT_KEY, CHECKPOINT_VALUE,
};

/// How a failing collaborator call is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Propagate the error to the caller
    #[default]
    Fail,
    /// Log the error and yield an absent result
    Continue,
}

/// Error handling for setup (ensure) vs data (version) operations
///
/// The default reproduces the historical contract: setup problems fail
/// loudly, version operations log and continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPolicy {
    /// Applied to ensure_registry / ensure_schema
    #[serde(default)]
    pub setup: FailureMode,
    /// Applied to register / read-latest / metadata operations
    #[serde(default = "default_data_mode")]
    pub data: FailureMode,
}

fn default_data_mode() -> FailureMode {
    FailureMode::Continue
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            setup: FailureMode::Fail,
            data: FailureMode::Continue,
        }
    }
}

impl ErrorPolicy {
    /// Every operation propagates errors
    pub fn strict() -> Self {
        Self {
            setup: FailureMode::Fail,
            data: FailureMode::Fail,
        }
    }

    /// Every operation logs and continues
    pub fn lenient() -> Self {
        Self {
            setup: FailureMode::Continue,
            data: FailureMode::Continue,
        }
    }
}

/// Result of an idempotent ensure operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsureOutcome {
    /// The entity was created by this call
    Created,
    /// The entity already existed; treated as success
    AlreadyExists,
    /// Creation failed and the policy chose to continue
    Failed,
}

impl EnsureOutcome {
    /// Whether the entity is known to exist after the call
    pub fn exists(&self) -> bool {
        !matches!(self, EnsureOutcome::Failed)
    }
}

/// Everything needed for one provisioning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionPlan {
    pub registry: String,
    pub schema: String,
    pub format: DataFormat,
    pub compatibility: Compatibility,
    pub definition: String,
    /// Mark the registered version as the checkpoint
    pub checkpoint: bool,
}

impl ProvisionPlan {
    fn schema_id(&self) -> SchemaId {
        SchemaId::new(&self.registry, &self.schema)
    }
}

/// Outcome of one provisioning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionReport {
    pub registry: EnsureOutcome,
    pub schema: EnsureOutcome,
    /// Version number assigned by the service, when registration succeeded
    pub registered_version: Option<u64>,
    /// Whether the read-back definition matched what was registered
    pub read_back_matches: Option<bool>,
    /// Whether the checkpoint tag was attached
    pub checkpointed: bool,
    pub finished_at: DateTime<Utc>,
}

/// Sequences idempotent provisioning against an injected registry client
pub struct SchemaProvisioner<C: RegistryClient> {
    client: C,
    policy: ErrorPolicy,
}

impl<C: RegistryClient> SchemaProvisioner<C> {
    /// Create a provisioner with the default error policy
    pub fn new(client: C) -> Self {
        Self::with_policy(client, ErrorPolicy::default())
    }

    pub fn with_policy(client: C, policy: ErrorPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Give the client back, e.g. to inspect a fake after a run
    pub fn into_client(self) -> C {
        self.client
    }

    /// Create the registry, treating "already exists" as success.
    pub fn ensure_registry(&mut self, registry: &str) -> Result<EnsureOutcome> {
        match self.client.create_registry(registry) {
            Ok(()) => {
                info!(registry, "registry created");
                Ok(EnsureOutcome::Created)
            }
            Err(e) if e.is_already_exists() => {
                info!(registry, "registry already exists");
                Ok(EnsureOutcome::AlreadyExists)
            }
            Err(e) => match self.policy.setup {
                FailureMode::Fail => Err(e),
                FailureMode::Continue => {
                    error!(registry, error = %e, "failed to create registry");
                    Ok(EnsureOutcome::Failed)
                }
            },
        }
    }

    /// Create the schema inside its registry, treating "already exists" as
    /// success.
    pub fn ensure_schema(
        &mut self,
        id: &SchemaId,
        format: DataFormat,
        compatibility: Compatibility,
        definition: &str,
    ) -> Result<EnsureOutcome> {
        match self
            .client
            .create_schema(id, format, compatibility, definition)
        {
            Ok(()) => {
                info!(schema = %id, %format, %compatibility, "schema created");
                Ok(EnsureOutcome::Created)
            }
            Err(e) if e.is_already_exists() => {
                info!(schema = %id, "schema already exists");
                Ok(EnsureOutcome::AlreadyExists)
            }
            Err(e) => match self.policy.setup {
                FailureMode::Fail => Err(e),
                FailureMode::Continue => {
                    error!(schema = %id, error = %e, "failed to create schema");
                    Ok(EnsureOutcome::Failed)
                }
            },
        }
    }

    /// Register a new version and return its service-assigned number.
    ///
    /// `Ok(None)` means no version was registered; callers must not
    /// checkpoint in that case.
    pub fn register_version(&mut self, id: &SchemaId, definition: &str) -> Result<Option<u64>> {
        match self.client.register_version(id, definition) {
            Ok(version) => {
                info!(schema = %id, version = version.version_number, "schema version registered");
                Ok(Some(version.version_number))
            }
            Err(e) => self.absorb_data_error(e, id, "failed to register schema version"),
        }
    }

    /// Fetch and log the most recent definition.
    pub fn read_latest_definition(&mut self, id: &SchemaId) -> Result<Option<String>> {
        match self.client.get_latest_version(id) {
            Ok(version) => {
                info!(
                    schema = %id,
                    version = version.version_number,
                    definition = %version.definition,
                    "latest schema version"
                );
                Ok(Some(version.definition))
            }
            Err(e) => self.absorb_data_error(e, id, "failed to read latest schema version"),
        }
    }

    /// Attach an arbitrary metadata key/value pair to one version.
    ///
    /// Returns whether the tag was attached.
    pub fn tag_version(
        &mut self,
        id: &SchemaId,
        version_number: u64,
        key: &str,
        value: &str,
    ) -> Result<bool> {
        match self
            .client
            .put_version_metadata(id, version_number, key, value)
        {
            Ok(()) => {
                info!(schema = %id, version_number, key, value, "version metadata updated");
                Ok(true)
            }
            Err(e) => self
                .absorb_data_error(e, id, "failed to update version metadata")
                .map(|absent: Option<()>| absent.is_some()),
        }
    }

    /// Mark one version as the authoritative checkpoint.
    ///
    /// Uniqueness is a caller convention: tagging a new version does not
    /// clear the tag on a previous one.
    pub fn set_checkpoint(&mut self, id: &SchemaId, version_number: u64) -> Result<bool> {
        let tagged = self.tag_version(id, version_number, CHECKPOINT_KEY, CHECKPOINT_VALUE)?;
        if tagged {
            info!(schema = %id, version_number, "checkpoint set");
        }
        Ok(tagged)
    }

    /// Run the full sequence: registry, schema, version, read-back, and
    /// (optionally) checkpoint.
    pub fn provision(&mut self, plan: &ProvisionPlan) -> Result<ProvisionReport> {
        let id = plan.schema_id();

        let registry = self.ensure_registry(&plan.registry)?;
        let schema =
            self.ensure_schema(&id, plan.format, plan.compatibility, &plan.definition)?;

        let registered_version = self.register_version(&id, &plan.definition)?;

        let registered_checksum = Checksum::from_content(&plan.definition);
        let read_back_matches = self
            .read_latest_definition(&id)?
            .map(|latest| registered_checksum.verify(&latest));

        let checkpointed = match registered_version {
            Some(version) if plan.checkpoint => self.set_checkpoint(&id, version)?,
            _ => false,
        };

        Ok(ProvisionReport {
            registry,
            schema,
            registered_version,
            read_back_matches,
            checkpointed,
            finished_at: Utc::now(),
        })
    }

    fn absorb_data_error<T>(
        &self,
        e: RegistryError,
        id: &SchemaId,
        context: &'static str,
    ) -> Result<Option<T>> {
        match self.policy.data {
            FailureMode::Fail => Err(e),
            FailureMode::Continue => {
                error!(schema = %id, error = %e, "{context}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRegistry;

    const DEFINITION: &str = r#"{"type": "record", "name": "User"}"#;

    fn schema_id() -> SchemaId {
        SchemaId::new("my-registry", "my-avro-schema")
    }

    fn provisioned() -> SchemaProvisioner<MemoryRegistry> {
        let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
        provisioner.ensure_registry("my-registry").unwrap();
        provisioner
            .ensure_schema(
                &schema_id(),
                DataFormat::Avro,
                Compatibility::Forward,
                DEFINITION,
            )
            .unwrap();
        provisioner
    }

    #[test]
    fn test_ensure_registry_is_idempotent() {
        let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
        assert_eq!(
            provisioner.ensure_registry("my-registry").unwrap(),
            EnsureOutcome::Created
        );
        assert_eq!(
            provisioner.ensure_registry("my-registry").unwrap(),
            EnsureOutcome::AlreadyExists
        );
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let mut provisioner = provisioned();
        let outcome = provisioner
            .ensure_schema(
                &schema_id(),
                DataFormat::Avro,
                Compatibility::Forward,
                DEFINITION,
            )
            .unwrap();
        assert_eq!(outcome, EnsureOutcome::AlreadyExists);
    }

    #[test]
    fn test_ensure_schema_without_registry_fails_under_default_policy() {
        let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
        let result = provisioner.ensure_schema(
            &schema_id(),
            DataFormat::Avro,
            Compatibility::Forward,
            DEFINITION,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_schema_without_registry_continues_under_lenient_policy() {
        let mut provisioner =
            SchemaProvisioner::with_policy(MemoryRegistry::new(), ErrorPolicy::lenient());
        let outcome = provisioner
            .ensure_schema(
                &schema_id(),
                DataFormat::Avro,
                Compatibility::Forward,
                DEFINITION,
            )
            .unwrap();
        assert_eq!(outcome, EnsureOutcome::Failed);
        assert!(!outcome.exists());
    }

    #[test]
    fn test_register_version_returns_increasing_numbers() {
        let mut provisioner = provisioned();
        let v2 = provisioner
            .register_version(&schema_id(), r#"{"v": 2}"#)
            .unwrap();
        let v3 = provisioner
            .register_version(&schema_id(), r#"{"v": 3}"#)
            .unwrap();
        assert_eq!(v2, Some(2));
        assert_eq!(v3, Some(3));
    }

    #[test]
    fn test_register_version_against_missing_schema_yields_none() {
        let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
        provisioner.ensure_registry("my-registry").unwrap();
        let version = provisioner
            .register_version(&schema_id(), DEFINITION)
            .unwrap();
        assert_eq!(version, None);
    }

    #[test]
    fn test_register_version_propagates_under_strict_policy() {
        let mut provisioner =
            SchemaProvisioner::with_policy(MemoryRegistry::new(), ErrorPolicy::strict());
        provisioner.ensure_registry("my-registry").unwrap();
        let result = provisioner.register_version(&schema_id(), DEFINITION);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_latest_returns_registered_definition() {
        let mut provisioner = provisioned();
        provisioner
            .register_version(&schema_id(), r#"{"v": 2}"#)
            .unwrap();
        let latest = provisioner.read_latest_definition(&schema_id()).unwrap();
        assert_eq!(latest.as_deref(), Some(r#"{"v": 2}"#));
    }

    #[test]
    fn test_checkpoint_on_unknown_version_is_non_fatal() {
        let mut provisioner = provisioned();
        let tagged = provisioner.set_checkpoint(&schema_id(), 99).unwrap();
        assert!(!tagged);
    }

    #[test]
    fn test_checkpoint_attaches_metadata() {
        let mut provisioner = provisioned();
        assert!(provisioner.set_checkpoint(&schema_id(), 1).unwrap());
        let metadata = provisioner
            .client()
            .version_metadata(&schema_id(), 1);
        assert_eq!(
            metadata.get(CHECKPOINT_KEY).map(String::as_str),
            Some(CHECKPOINT_VALUE)
        );
    }

    #[test]
    fn test_tag_version_accepts_free_form_metadata() {
        let mut provisioner = provisioned();
        assert!(provisioner
            .tag_version(&schema_id(), 1, "owner", "data-platform")
            .unwrap());
        let metadata = provisioner.client().version_metadata(&schema_id(), 1);
        assert_eq!(metadata.get("owner").map(String::as_str), Some("data-platform"));
    }
}

//! In-memory registry fake
//!
//! Implements [`RegistryClient`] against process-local maps, mirroring the
//! service contract: version numbers start at 1 and increase strictly per
//! schema, an already-known definition resolves to its existing version,
//! registered definitions are never rewritten, and version metadata
//! accumulates without cross-version clearing. Used by tests and dry runs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::client::RegistryClient;
use crate::error::{EntityKind, RegistryError, Result};
use crate::schema::{Compatibility, DataFormat, SchemaId, SchemaVersion};

/// One registered version and its metadata
#[derive(Debug, Clone)]
struct VersionRecord {
    version_number: u64,
    definition: String,
    metadata: HashMap<String, String>,
    registered_at: DateTime<Utc>,
}

/// One schema lineage
#[derive(Debug, Clone)]
struct SchemaRecord {
    format: DataFormat,
    compatibility: Compatibility,
    versions: Vec<VersionRecord>,
    created_at: DateTime<Utc>,
}

/// One registry namespace
#[derive(Debug, Clone, Default)]
struct RegistryRecord {
    schemas: HashMap<String, SchemaRecord>,
}

/// In-memory stand-in for the managed registry service
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    registries: HashMap<String, RegistryRecord>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_record(&self, id: &SchemaId) -> Result<&SchemaRecord> {
        let registry = self
            .registries
            .get(&id.registry)
            .ok_or_else(|| RegistryError::NotFound {
                kind: EntityKind::Registry,
                name: id.registry.clone(),
            })?;
        registry
            .schemas
            .get(&id.name)
            .ok_or_else(|| RegistryError::NotFound {
                kind: EntityKind::Schema,
                name: id.to_string(),
            })
    }

    fn schema_record_mut(&mut self, id: &SchemaId) -> Result<&mut SchemaRecord> {
        let registry =
            self.registries
                .get_mut(&id.registry)
                .ok_or_else(|| RegistryError::NotFound {
                    kind: EntityKind::Registry,
                    name: id.registry.clone(),
                })?;
        registry
            .schemas
            .get_mut(&id.name)
            .ok_or_else(|| RegistryError::NotFound {
                kind: EntityKind::Schema,
                name: id.to_string(),
            })
    }

    /// Number of versions registered for a schema
    pub fn version_count(&self, id: &SchemaId) -> usize {
        self.schema_record(id).map(|s| s.versions.len()).unwrap_or(0)
    }

    /// Declared format of a schema, if it exists
    pub fn schema_format(&self, id: &SchemaId) -> Option<DataFormat> {
        self.schema_record(id).map(|s| s.format).ok()
    }

    /// Declared compatibility mode of a schema, if it exists
    pub fn schema_compatibility(&self, id: &SchemaId) -> Option<Compatibility> {
        self.schema_record(id).map(|s| s.compatibility).ok()
    }

    /// Metadata attached to one version
    pub fn version_metadata(&self, id: &SchemaId, version_number: u64) -> HashMap<String, String> {
        self.schema_record(id)
            .ok()
            .and_then(|s| {
                s.versions
                    .iter()
                    .find(|v| v.version_number == version_number)
            })
            .map(|v| v.metadata.clone())
            .unwrap_or_default()
    }

    /// When a schema was created, if it exists
    pub fn schema_created_at(&self, id: &SchemaId) -> Option<DateTime<Utc>> {
        self.schema_record(id).map(|s| s.created_at).ok()
    }

    /// When a version was registered, if it exists
    pub fn version_registered_at(&self, id: &SchemaId, version_number: u64) -> Option<DateTime<Utc>> {
        self.schema_record(id).ok().and_then(|s| {
            s.versions
                .iter()
                .find(|v| v.version_number == version_number)
                .map(|v| v.registered_at)
        })
    }
}

impl RegistryClient for MemoryRegistry {
    fn create_registry(&mut self, registry: &str) -> Result<()> {
        if self.registries.contains_key(registry) {
            return Err(RegistryError::AlreadyExists {
                kind: EntityKind::Registry,
                name: registry.to_string(),
            });
        }
        self.registries
            .insert(registry.to_string(), RegistryRecord::default());
        Ok(())
    }

    fn create_schema(
        &mut self,
        id: &SchemaId,
        format: DataFormat,
        compatibility: Compatibility,
        definition: &str,
    ) -> Result<()> {
        let registry =
            self.registries
                .get_mut(&id.registry)
                .ok_or_else(|| RegistryError::NotFound {
                    kind: EntityKind::Registry,
                    name: id.registry.clone(),
                })?;
        if registry.schemas.contains_key(&id.name) {
            return Err(RegistryError::AlreadyExists {
                kind: EntityKind::Schema,
                name: id.to_string(),
            });
        }
        registry.schemas.insert(
            id.name.clone(),
            SchemaRecord {
                format,
                compatibility,
                versions: vec![VersionRecord {
                    version_number: 1,
                    definition: definition.to_string(),
                    metadata: HashMap::new(),
                    registered_at: Utc::now(),
                }],
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn register_version(&mut self, id: &SchemaId, definition: &str) -> Result<SchemaVersion> {
        let schema = self.schema_record_mut(id)?;
        // Registering an already-known definition returns its existing
        // version instead of minting a new number.
        if let Some(existing) = schema.versions.iter().find(|v| v.definition == definition) {
            return Ok(SchemaVersion::new(existing.version_number, definition));
        }
        // Append only: prior definitions are never rewritten.
        let next = schema
            .versions
            .last()
            .map(|v| v.version_number + 1)
            .unwrap_or(1);
        schema.versions.push(VersionRecord {
            version_number: next,
            definition: definition.to_string(),
            metadata: HashMap::new(),
            registered_at: Utc::now(),
        });
        Ok(SchemaVersion::new(next, definition))
    }

    fn get_latest_version(&mut self, id: &SchemaId) -> Result<SchemaVersion> {
        let schema = self.schema_record(id)?;
        let latest = schema
            .versions
            .last()
            .ok_or_else(|| RegistryError::NotFound {
                kind: EntityKind::SchemaVersion,
                name: id.to_string(),
            })?;
        Ok(SchemaVersion::new(
            latest.version_number,
            latest.definition.clone(),
        ))
    }

    fn put_version_metadata(
        &mut self,
        id: &SchemaId,
        version_number: u64,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let name = format!("{} v{}", id, version_number);
        let schema = self.schema_record_mut(id)?;
        let version = schema
            .versions
            .iter_mut()
            .find(|v| v.version_number == version_number)
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::SchemaVersion,
                name,
            })?;
        version.metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

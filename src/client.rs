//! The registry collaborator seam
//!
//! The external schema-registry service is the sole source of truth; this
//! crate keeps no state between runs. Everything the crate needs from the
//! service is expressed as the five operations below, so tests can substitute
//! [`MemoryRegistry`](crate::memory::MemoryRegistry) for the real
//! [`HttpRegistry`](crate::http::HttpRegistry).

use crate::error::Result;
use crate::schema::{Compatibility, DataFormat, SchemaId, SchemaVersion};

/// Client for a managed schema-registry service
pub trait RegistryClient {
    /// Create a named registry.
    ///
    /// Fails with [`RegistryError::AlreadyExists`](crate::RegistryError::AlreadyExists)
    /// when the registry exists; callers treating creation as idempotent map
    /// that variant to success.
    fn create_registry(&mut self, registry: &str) -> Result<()>;

    /// Create a schema lineage inside a registry, bound to a data format,
    /// a compatibility mode, and an initial definition.
    fn create_schema(
        &mut self,
        id: &SchemaId,
        format: DataFormat,
        compatibility: Compatibility,
        definition: &str,
    ) -> Result<()>;

    /// Register a new version of a schema.
    ///
    /// The service assigns the version number; for a new definition it is
    /// positive and strictly greater than any number previously assigned for
    /// the same schema. Registering a definition the service already knows
    /// resolves to the existing version.
    fn register_version(&mut self, id: &SchemaId, definition: &str) -> Result<SchemaVersion>;

    /// Fetch the most recently registered version of a schema.
    fn get_latest_version(&mut self, id: &SchemaId) -> Result<SchemaVersion>;

    /// Attach a metadata key/value pair to one schema version.
    ///
    /// Metadata accumulates; putting a key on one version never clears the
    /// same key on another version.
    fn put_version_metadata(
        &mut self,
        id: &SchemaId,
        version_number: u64,
        key: &str,
        value: &str,
    ) -> Result<()>;
}

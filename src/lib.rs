//! Schema Provisioner
//!
//! Idempotent provisioning against a managed schema-registry service:
//! create a registry, create a schema, register a version, read back the
//! latest definition, and mark a version as the authoritative checkpoint.
//!
//! ## Features
//!
//! - **Idempotent setup**: "already exists" is success for registry and
//!   schema creation
//! - **Service-assigned versions**: version numbers come from the registry,
//!   monotonically increasing per schema
//! - **Checkpoint tagging**: one metadata tag marks the authoritative version
//! - **Explicit error policy**: raise vs log-and-continue is configured, not
//!   hardwired per operation
//! - **Swappable backend**: the service sits behind [`RegistryClient`], with
//!   an HTTP implementation and an in-memory fake
//!
//! ## Flow
//!
//! ```text
//! ensure registry ──> ensure schema ──> register version ──> read latest
//!                                             │
//!                                             └──> set checkpoint (v N)
//! ```

pub mod checksum;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod provisioner;
pub mod schema;

pub use checksum::Checksum;
pub use client::RegistryClient;
pub use config::ProvisionerConfig;
pub use error::{EntityKind, RegistryError, Result};
pub use http::{HttpRegistry, HttpRegistryConfig};
pub use memory::MemoryRegistry;
pub use provisioner::{
    EnsureOutcome, ErrorPolicy, FailureMode, ProvisionPlan, ProvisionReport, SchemaProvisioner,
};
pub use schema::{Compatibility, DataFormat, SchemaId, SchemaVersion};

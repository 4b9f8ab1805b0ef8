//! Schema types and structures

use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;

/// Metadata key marking a version as the authoritative checkpoint
pub const CHECKPOINT_KEY: &str = "Checkpoint";

/// Metadata value attached under [`CHECKPOINT_KEY`]
pub const CHECKPOINT_VALUE: &str = "true";

/// Identifies one schema lineage within a registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaId {
    /// Name of the registry containing the schema
    pub registry: String,
    /// Name of the schema within the registry
    pub name: String,
}

impl SchemaId {
    pub fn new(registry: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.registry, self.name)
    }
}

/// Serialization format of a schema definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataFormat {
    /// Avro schema (JSON text)
    #[default]
    Avro,
    /// JSON Schema
    Json,
    /// Protocol Buffers
    Protobuf,
}

impl DataFormat {
    /// Service-side identifier (e.g. "AVRO")
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Avro => "AVRO",
            DataFormat::Json => "JSON",
            DataFormat::Protobuf => "PROTOBUF",
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AVRO" => Ok(DataFormat::Avro),
            "JSON" => Ok(DataFormat::Json),
            "PROTOBUF" => Ok(DataFormat::Protobuf),
            other => Err(format!("unknown data format: {other}")),
        }
    }
}

/// Policy governing which future schema changes the service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compatibility {
    /// No compatibility checking
    None,
    /// New versions can read data written by the previous version
    Backward,
    /// The previous version can read data written by new versions
    #[default]
    Forward,
    /// Both backward and forward
    Full,
}

impl Compatibility {
    /// Service-side identifier (e.g. "FORWARD")
    pub fn as_str(&self) -> &'static str {
        match self {
            Compatibility::None => "NONE",
            Compatibility::Backward => "BACKWARD",
            Compatibility::Forward => "FORWARD",
            Compatibility::Full => "FULL",
        }
    }
}

impl std::fmt::Display for Compatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Compatibility {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(Compatibility::None),
            "BACKWARD" => Ok(Compatibility::Backward),
            "FORWARD" => Ok(Compatibility::Forward),
            "FULL" => Ok(Compatibility::Full),
            other => Err(format!("unknown compatibility mode: {other}")),
        }
    }
}

/// One immutable, numbered snapshot of a schema's definition
///
/// Version numbers are assigned by the registry service and increase
/// monotonically per schema; the client never chooses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Positive, service-assigned version number
    pub version_number: u64,
    /// Serialized schema definition (e.g. Avro JSON)
    pub definition: String,
}

impl SchemaVersion {
    pub fn new(version_number: u64, definition: impl Into<String>) -> Self {
        Self {
            version_number,
            definition: definition.into(),
        }
    }

    /// Checksum of the definition text, for read-back comparison
    pub fn checksum(&self) -> Checksum {
        Checksum::from_content(&self.definition)
    }
}

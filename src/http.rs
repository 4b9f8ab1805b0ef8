//! HTTP client for the managed registry service
//!
//! Blocking REST/JSON client. Service-side failures arrive as a JSON body
//! `{"code": ..., "message": ...}`; the code (or the HTTP status when no body
//! is readable) is classified into the crate's error taxonomy.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::RegistryClient;
use crate::error::{EntityKind, RegistryError, Result};
use crate::schema::{Compatibility, DataFormat, SchemaId, SchemaVersion};

/// Connection settings for [`HttpRegistry`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRegistryConfig {
    /// Service endpoint, e.g. "https://registry.example.com"
    pub endpoint: String,
    /// Basic-auth username, if the service requires it
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,
}

/// HTTP-backed implementation of [`RegistryClient`]
pub struct HttpRegistry {
    config: HttpRegistryConfig,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRegistryRequest<'a> {
    registry_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSchemaRequest<'a> {
    schema_name: &'a str,
    data_format: &'a str,
    compatibility: &'a str,
    schema_definition: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterVersionRequest<'a> {
    schema_definition: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionResponse {
    version_number: u64,
    #[serde(default)]
    schema_definition: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataRequest<'a> {
    metadata_key: &'a str,
    metadata_value: &'a str,
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    code: String,
    message: String,
}

impl HttpRegistry {
    pub fn new(config: HttpRegistryConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => request.header(
                "Authorization",
                format!(
                    "Basic {}",
                    base64::encode(format!("{}:{}", username, password))
                ),
            ),
            _ => request,
        }
    }

    /// Turn a non-success response into the typed error taxonomy.
    fn classify(response: Response, kind: EntityKind, name: &str) -> RegistryError {
        let status = response.status();
        if let Ok(body) = response.json::<ServiceErrorBody>() {
            return match body.code.as_str() {
                "AlreadyExistsException" => RegistryError::AlreadyExists {
                    kind,
                    name: name.to_string(),
                },
                "EntityNotFoundException" => RegistryError::NotFound {
                    kind,
                    name: name.to_string(),
                },
                _ => RegistryError::Service {
                    code: body.code,
                    message: body.message,
                },
            };
        }
        match status {
            StatusCode::CONFLICT => RegistryError::AlreadyExists {
                kind,
                name: name.to_string(),
            },
            StatusCode::NOT_FOUND => RegistryError::NotFound {
                kind,
                name: name.to_string(),
            },
            _ => RegistryError::Service {
                code: status.as_u16().to_string(),
                message: format!("unexpected status for {}", name),
            },
        }
    }

    fn expect_success(response: Response, kind: EntityKind, name: &str) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::classify(response, kind, name))
        }
    }
}

impl RegistryClient for HttpRegistry {
    fn create_registry(&mut self, registry: &str) -> Result<()> {
        debug!(registry, "create registry");
        let response = self
            .authorize(self.client.post(self.url("registries")))
            .json(&CreateRegistryRequest {
                registry_name: registry,
            })
            .send()?;
        Self::expect_success(response, EntityKind::Registry, registry)?;
        Ok(())
    }

    fn create_schema(
        &mut self,
        id: &SchemaId,
        format: DataFormat,
        compatibility: Compatibility,
        definition: &str,
    ) -> Result<()> {
        debug!(schema = %id, %format, %compatibility, "create schema");
        let path = format!("registries/{}/schemas", id.registry);
        let response = self
            .authorize(self.client.post(self.url(&path)))
            .json(&CreateSchemaRequest {
                schema_name: &id.name,
                data_format: format.as_str(),
                compatibility: compatibility.as_str(),
                schema_definition: definition,
            })
            .send()?;
        Self::expect_success(response, EntityKind::Schema, &id.to_string())?;
        Ok(())
    }

    fn register_version(&mut self, id: &SchemaId, definition: &str) -> Result<SchemaVersion> {
        debug!(schema = %id, "register version");
        let path = format!("registries/{}/schemas/{}/versions", id.registry, id.name);
        let response = self
            .authorize(self.client.post(self.url(&path)))
            .json(&RegisterVersionRequest {
                schema_definition: definition,
            })
            .send()?;
        let body: VersionResponse =
            Self::expect_success(response, EntityKind::Schema, &id.to_string())?.json()?;
        Ok(SchemaVersion::new(body.version_number, definition))
    }

    fn get_latest_version(&mut self, id: &SchemaId) -> Result<SchemaVersion> {
        debug!(schema = %id, "get latest version");
        let path = format!(
            "registries/{}/schemas/{}/versions/latest",
            id.registry, id.name
        );
        let response = self.authorize(self.client.get(self.url(&path))).send()?;
        let body: VersionResponse =
            Self::expect_success(response, EntityKind::SchemaVersion, &id.to_string())?.json()?;
        let definition = body.schema_definition.ok_or_else(|| {
            RegistryError::InvalidResponse(format!(
                "latest version of {} carried no definition",
                id
            ))
        })?;
        Ok(SchemaVersion::new(body.version_number, definition))
    }

    fn put_version_metadata(
        &mut self,
        id: &SchemaId,
        version_number: u64,
        key: &str,
        value: &str,
    ) -> Result<()> {
        debug!(schema = %id, version_number, key, "put version metadata");
        let path = format!(
            "registries/{}/schemas/{}/versions/{}/metadata",
            id.registry, id.name, version_number
        );
        let response = self
            .authorize(self.client.put(self.url(&path)))
            .json(&MetadataRequest {
                metadata_key: key,
                metadata_value: value,
            })
            .send()?;
        Self::expect_success(
            response,
            EntityKind::SchemaVersion,
            &format!("{} v{}", id, version_number),
        )?;
        Ok(())
    }
}

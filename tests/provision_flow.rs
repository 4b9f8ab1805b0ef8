//! End-to-end provisioning flow against the in-memory registry

use schema_provisioner::{
    Compatibility, DataFormat, EnsureOutcome, MemoryRegistry, ProvisionPlan, SchemaId,
    SchemaProvisioner,
};
use schema_provisioner::schema::{CHECKPOINT_KEY, CHECKPOINT_VALUE};

const USER_SCHEMA: &str = include_str!("fixtures/user.avsc");

fn user_plan() -> ProvisionPlan {
    ProvisionPlan {
        registry: "my-registry".to_string(),
        schema: "my-avro-schema".to_string(),
        format: DataFormat::Avro,
        compatibility: Compatibility::Forward,
        definition: USER_SCHEMA.to_string(),
        checkpoint: true,
    }
}

#[test]
fn test_full_provisioning_run() {
    let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
    let report = provisioner.provision(&user_plan()).unwrap();

    assert_eq!(report.registry, EnsureOutcome::Created);
    assert_eq!(report.schema, EnsureOutcome::Created);
    // Schema creation stores version 1; registering the identical definition
    // resolves to that same version.
    assert_eq!(report.registered_version, Some(1));
    assert_eq!(report.read_back_matches, Some(true));
    assert!(report.checkpointed);

    let id = SchemaId::new("my-registry", "my-avro-schema");
    let registry = provisioner.into_client();
    let metadata = registry.version_metadata(&id, 1);
    assert_eq!(
        metadata.get(CHECKPOINT_KEY).map(String::as_str),
        Some(CHECKPOINT_VALUE)
    );
}

#[test]
fn test_rerun_is_idempotent_for_setup() {
    let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
    provisioner.provision(&user_plan()).unwrap();
    let report = provisioner.provision(&user_plan()).unwrap();

    assert_eq!(report.registry, EnsureOutcome::AlreadyExists);
    assert_eq!(report.schema, EnsureOutcome::AlreadyExists);
    assert_eq!(report.registered_version, Some(1));
    assert_eq!(report.read_back_matches, Some(true));
}

#[test]
fn test_read_back_returns_registered_definition() {
    let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
    provisioner.provision(&user_plan()).unwrap();

    let id = SchemaId::new("my-registry", "my-avro-schema");
    let latest = provisioner.read_latest_definition(&id).unwrap().unwrap();
    assert_eq!(latest, USER_SCHEMA);

    // The definition is Avro JSON with the three expected fields.
    let parsed: serde_json::Value = serde_json::from_str(&latest).unwrap();
    assert_eq!(parsed["type"], "record");
    assert_eq!(parsed["name"], "User");
    let fields = parsed["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0]["name"], "name");
    assert_eq!(fields[1]["default"], serde_json::Value::Null);
    assert_eq!(fields[2]["type"], "int");
}

#[test]
fn test_evolved_definition_gets_a_new_version() {
    let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
    provisioner.provision(&user_plan()).unwrap();

    let mut evolved = user_plan();
    evolved.definition = USER_SCHEMA.replace("\"age\"", "\"years\"");
    let report = provisioner.provision(&evolved).unwrap();

    assert_eq!(report.registered_version, Some(2));
    assert_eq!(report.read_back_matches, Some(true));
    assert!(report.checkpointed);

    // The old checkpoint is not cleared; uniqueness is a caller convention.
    let id = SchemaId::new("my-registry", "my-avro-schema");
    let registry = provisioner.into_client();
    assert!(registry.version_metadata(&id, 1).contains_key(CHECKPOINT_KEY));
    assert!(registry.version_metadata(&id, 2).contains_key(CHECKPOINT_KEY));
}

#[test]
fn test_checkpoint_skipped_when_disabled() {
    let mut plan = user_plan();
    plan.checkpoint = false;

    let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
    let report = provisioner.provision(&plan).unwrap();
    assert!(!report.checkpointed);

    let id = SchemaId::new("my-registry", "my-avro-schema");
    let registry = provisioner.into_client();
    assert!(registry.version_metadata(&id, 1).is_empty());
}

#[test]
fn test_checkpoint_skipped_when_registration_fails() {
    // A plan whose schema is never created: register_version cannot succeed,
    // so no checkpoint must be attempted.
    let mut provisioner = SchemaProvisioner::new(MemoryRegistry::new());
    let id = SchemaId::new("my-registry", "orphan");

    provisioner.ensure_registry("my-registry").unwrap();
    let version = provisioner.register_version(&id, USER_SCHEMA).unwrap();
    assert_eq!(version, None);
}

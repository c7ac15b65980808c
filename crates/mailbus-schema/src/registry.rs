use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use jsonschema::Validator;
use serde_json::{Map, Value};

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::validator::collect_violations;
use crate::violation::Violation;

/// File suffix a schema document must carry: `<EventType>.schema.json`.
const SCHEMA_SUFFIX: &str = ".schema.json";

/// A schema document compiled for one event type.
pub struct CompiledSchema {
    event_type: String,
    validator: Validator,
    source: Value,
}

impl CompiledSchema {
    /// Compile `document` for `event_type`, applying the closed-schema policy
    /// when configured.
    pub fn compile(event_type: &str, document: &Value, config: &RegistryConfig) -> Result<Self> {
        let mut to_compile = document.clone();
        if config.closed_schemas {
            close_object_schemas(&mut to_compile);
        }

        let validator =
            jsonschema::validator_for(&to_compile).map_err(|err| SchemaError::CompileFailed {
                event_type: event_type.to_string(),
                message: err.to_string(),
            })?;

        Ok(Self {
            event_type: event_type.to_string(),
            validator,
            source: document.clone(),
        })
    }

    /// The event type this schema validates.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The schema document as loaded, before closed-schema injection.
    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Every violation `instance` produces against this schema, with paths
    /// rooted at `prefix`.
    pub fn violations_for(&self, instance: &Value, prefix: &str) -> Vec<Violation> {
        collect_violations(&self.validator, instance, prefix)
    }
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("event_type", &self.event_type)
            .finish()
    }
}

/// Counts from one registry load or reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Schemas compiled and registered.
    pub loaded: usize,
    /// Documents skipped (malformed, oversized, or not a regular file).
    pub skipped: usize,
}

/// Event-type-keyed registry of compiled schemas.
///
/// The mapping is built once at construction and read-only afterwards;
/// [`SchemaRegistry::reload`] swaps in a fully rebuilt mapping, so concurrent
/// readers never observe a partially updated registry.
pub struct SchemaRegistry {
    schemas: RwLock<Arc<HashMap<String, Arc<CompiledSchema>>>>,
    source_dir: Option<PathBuf>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Load every `<EventType>.schema.json` under `path`.
    ///
    /// A malformed document is skipped and logged, not fatal; the remaining
    /// schemas still load. The error case is environmental: unreadable
    /// directory or a breached load limit.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_dir_with_config(path, RegistryConfig::default())
    }

    /// Load from a directory with explicit config.
    pub fn from_dir_with_config(path: impl AsRef<Path>, config: RegistryConfig) -> Result<Self> {
        let path = path.as_ref();
        let (schemas, report) = load_dir(path, &config)?;
        tracing::info!(
            dir = %path.display(),
            loaded = report.loaded,
            skipped = report.skipped,
            "schema registry loaded"
        );
        Ok(Self {
            schemas: RwLock::new(Arc::new(schemas)),
            source_dir: Some(path.to_path_buf()),
            config,
        })
    }

    /// Build from embedded `(event_type, schema_json)` pairs.
    ///
    /// Embedded schemas are programmer-provided, so a malformed one is a hard
    /// error here rather than a skip.
    pub fn from_embedded(schemas: &[(&str, &str)]) -> Result<Self> {
        Self::from_embedded_with_config(schemas, RegistryConfig::default())
    }

    /// Build from embedded pairs with explicit config.
    pub fn from_embedded_with_config(
        schemas: &[(&str, &str)],
        config: RegistryConfig,
    ) -> Result<Self> {
        let mut map = HashMap::new();
        for (event_type, schema_json) in schemas {
            let document: Value = serde_json::from_str(schema_json)
                .map_err(|err| SchemaError::LoadFailed(format!("{event_type}: {err}")))?;
            let compiled = CompiledSchema::compile(event_type, &document, &config)?;
            map.insert(event_type.to_string(), Arc::new(compiled));
        }
        Ok(Self {
            schemas: RwLock::new(Arc::new(map)),
            source_dir: None,
            config,
        })
    }

    /// Exact, case-sensitive lookup. `None` means the type is unknown — not
    /// an error.
    pub fn get(&self, event_type: &str) -> Option<Arc<CompiledSchema>> {
        self.snapshot().get(event_type).cloned()
    }

    /// Whether a schema is registered for `event_type`.
    pub fn contains(&self, event_type: &str) -> bool {
        self.snapshot().contains_key(event_type)
    }

    /// Sorted snapshot of currently loaded event types.
    pub fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.snapshot().keys().cloned().collect();
        types.sort_unstable();
        types
    }

    /// Rebuild the mapping from the source directory and swap it in atomically.
    ///
    /// The new mapping is built fully before the write lock is taken; readers
    /// see either the old mapping or the new one, never a mix.
    pub fn reload(&self) -> Result<LoadReport> {
        let dir = self.source_dir.as_ref().ok_or_else(|| {
            SchemaError::LoadFailed("registry was not loaded from a directory".to_string())
        })?;

        let (schemas, report) = load_dir(dir, &self.config)?;
        let mut guard = self
            .schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(schemas);

        tracing::info!(
            dir = %dir.display(),
            loaded = report.loaded,
            skipped = report.skipped,
            "schema registry reloaded"
        );
        Ok(report)
    }

    /// Registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn snapshot(&self) -> Arc<HashMap<String, Arc<CompiledSchema>>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn load_dir(
    path: &Path,
    config: &RegistryConfig,
) -> Result<(HashMap<String, Arc<CompiledSchema>>, LoadReport)> {
    let mut schemas = HashMap::new();
    let mut report = LoadReport::default();

    let entries = std::fs::read_dir(path)
        .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;

    for entry in entries {
        let entry = entry.map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();

        let Some(event_type) = resolve_event_type(&file_name) else {
            continue;
        };

        let entry_path = entry.path();
        let metadata = std::fs::symlink_metadata(&entry_path)
            .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
        if !metadata.file_type().is_file() {
            // Symlinks and directories are not trusted as schema sources.
            tracing::warn!(file = %file_name, "skipping non-regular schema file");
            report.skipped += 1;
            continue;
        }

        if schemas.len() >= config.max_schemas {
            return Err(SchemaError::LoadFailed(format!(
                "schema count exceeds configured max ({})",
                config.max_schemas
            )));
        }

        if metadata.len() > config.max_schema_file_size as u64 {
            tracing::warn!(
                file = %file_name,
                size = metadata.len(),
                max = config.max_schema_file_size,
                "skipping oversized schema file"
            );
            report.skipped += 1;
            continue;
        }

        let content = std::fs::read_to_string(&entry_path).map_err(|err| {
            SchemaError::LoadFailed(format!("failed reading {}: {err}", entry_path.display()))
        })?;

        let document: Value = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(event_type, error = %err, "skipping malformed schema document");
                report.skipped += 1;
                continue;
            }
        };

        match CompiledSchema::compile(event_type, &document, config) {
            Ok(compiled) => {
                schemas.insert(event_type.to_string(), Arc::new(compiled));
                report.loaded += 1;
            }
            Err(err) => {
                tracing::warn!(event_type, error = %err, "skipping uncompilable schema document");
                report.skipped += 1;
            }
        }
    }

    Ok((schemas, report))
}

/// `ArchiveIngested.schema.json` → `ArchiveIngested`. Case-sensitive.
fn resolve_event_type(file_name: &str) -> Option<&str> {
    let event_type = file_name.strip_suffix(SCHEMA_SUFFIX)?;
    if event_type.is_empty() {
        return None;
    }
    Some(event_type)
}

/// Inject `additionalProperties: false` into every object schema that does
/// not state its own policy, recursing through the standard applicator
/// keywords. This is the closed-schema policy: undeclared fields are
/// violations, not silently accepted.
fn close_object_schemas(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if declares_object_shape(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            recurse_applicators(map);
        }
        Value::Array(items) => {
            for item in items {
                close_object_schemas(item);
            }
        }
        _ => {}
    }
}

fn recurse_applicators(map: &mut Map<String, Value>) {
    for key in ["properties", "patternProperties", "$defs", "definitions"] {
        if let Some(Value::Object(children)) = map.get_mut(key) {
            for child in children.values_mut() {
                close_object_schemas(child);
            }
        }
    }

    for key in ["items", "contains", "not", "if", "then", "else"] {
        if let Some(child) = map.get_mut(key) {
            close_object_schemas(child);
        }
    }

    for key in ["prefixItems", "allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(children)) = map.get_mut(key) {
            for child in children {
                close_object_schemas(child);
            }
        }
    }
}

fn declares_object_shape(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds
            .iter()
            .any(|kind| matches!(kind, Value::String(kind) if kind == "object")),
        _ => {
            map.contains_key("properties")
                || map.contains_key("patternProperties")
                || map.contains_key("required")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const ARCHIVE_SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "archive_url": { "type": "string" },
            "message_count": { "type": "integer", "minimum": 0 }
        },
        "required": ["archive_url"]
    }"#;

    fn make_temp_schema_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mailbus-schema-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    fn write_schema(dir: &Path, file_name: &str, contents: &str) {
        std::fs::write(dir.join(file_name), contents.as_bytes())
            .expect("schema file should be writable");
    }

    #[test]
    fn from_embedded_registers_and_validates() {
        let registry = SchemaRegistry::from_embedded(&[("ArchiveIngested", ARCHIVE_SCHEMA)])
            .expect("embedded schemas should compile");

        let schema = registry
            .get("ArchiveIngested")
            .expect("registered type should resolve");
        assert!(schema
            .violations_for(&serde_json::json!({"archive_url": "mbox://x"}), "$")
            .is_empty());
        assert!(!schema
            .violations_for(&serde_json::json!({"archive_url": 7}), "$")
            .is_empty());
    }

    #[test]
    fn unknown_type_is_absent_not_error() {
        let registry = SchemaRegistry::from_embedded(&[("ArchiveIngested", ARCHIVE_SCHEMA)])
            .expect("embedded schemas should compile");
        assert!(registry.get("NoSuchEvent").is_none());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = SchemaRegistry::from_embedded(&[("ArchiveIngested", ARCHIVE_SCHEMA)])
            .expect("embedded schemas should compile");
        assert!(registry.get("archiveingested").is_none());
        assert!(registry.get("ArchiveIngested").is_some());
    }

    #[test]
    fn event_types_are_sorted() {
        let registry = SchemaRegistry::from_embedded(&[
            ("SummaryRequested", r#"{"type":"object"}"#),
            ("ArchiveIngested", ARCHIVE_SCHEMA),
        ])
        .expect("embedded schemas should compile");

        assert_eq!(
            registry.event_types(),
            vec!["ArchiveIngested".to_string(), "SummaryRequested".to_string()]
        );
    }

    #[test]
    fn closed_schema_rejects_undeclared_fields() {
        let registry = SchemaRegistry::from_embedded(&[("ArchiveIngested", ARCHIVE_SCHEMA)])
            .expect("embedded schemas should compile");
        let schema = registry.get("ArchiveIngested").expect("type should resolve");

        let violations = schema.violations_for(
            &serde_json::json!({"archive_url": "mbox://x", "surprise": true}),
            "$",
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("surprise"));
    }

    #[test]
    fn open_config_accepts_undeclared_fields() {
        let config = RegistryConfig {
            closed_schemas: false,
            ..RegistryConfig::default()
        };
        let registry =
            SchemaRegistry::from_embedded_with_config(&[("ArchiveIngested", ARCHIVE_SCHEMA)], config)
                .expect("embedded schemas should compile");
        let schema = registry.get("ArchiveIngested").expect("type should resolve");

        assert!(schema
            .violations_for(
                &serde_json::json!({"archive_url": "mbox://x", "surprise": true}),
                "$",
            )
            .is_empty());
    }

    #[test]
    fn closed_schema_applies_to_nested_objects() {
        let schema_json = r#"{
            "type": "object",
            "properties": {
                "thread": {
                    "type": "object",
                    "properties": { "id": { "type": "string" } },
                    "required": ["id"]
                }
            },
            "required": ["thread"]
        }"#;
        let registry = SchemaRegistry::from_embedded(&[("SummaryRequested", schema_json)])
            .expect("embedded schemas should compile");
        let schema = registry.get("SummaryRequested").expect("type should resolve");

        assert!(schema
            .violations_for(&serde_json::json!({"thread": {"id": "t1"}}), "$")
            .is_empty());
        assert!(!schema
            .violations_for(&serde_json::json!({"thread": {"id": "t1", "extra": 1}}), "$")
            .is_empty());
    }

    #[test]
    fn from_dir_loads_named_schemas() {
        let dir = make_temp_schema_dir("from-dir");
        write_schema(&dir, "ArchiveIngested.schema.json", ARCHIVE_SCHEMA);
        write_schema(
            &dir,
            "SummaryRequested.schema.json",
            r#"{"type":"object","properties":{"thread_id":{"type":"string"}},"required":["thread_id"]}"#,
        );
        write_schema(&dir, "notes.txt", "not a schema");

        let registry = SchemaRegistry::from_dir(&dir).expect("directory should load");
        assert_eq!(
            registry.event_types(),
            vec!["ArchiveIngested".to_string(), "SummaryRequested".to_string()]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_document_is_skipped_not_fatal() {
        let dir = make_temp_schema_dir("malformed");
        write_schema(&dir, "ArchiveIngested.schema.json", ARCHIVE_SCHEMA);
        write_schema(&dir, "Broken.schema.json", "{ definitely not json");

        let registry = SchemaRegistry::from_dir(&dir).expect("load should continue past bad doc");
        assert!(registry.contains("ArchiveIngested"));
        assert!(!registry.contains("Broken"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn uncompilable_document_is_skipped_not_fatal() {
        let dir = make_temp_schema_dir("uncompilable");
        write_schema(&dir, "ArchiveIngested.schema.json", ARCHIVE_SCHEMA);
        write_schema(
            &dir,
            "Broken.schema.json",
            r#"{"type":"definitely-not-a-type"}"#,
        );

        let registry = SchemaRegistry::from_dir(&dir).expect("load should continue past bad doc");
        assert!(registry.contains("ArchiveIngested"));
        assert!(!registry.contains("Broken"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn oversized_document_is_skipped() {
        let dir = make_temp_schema_dir("oversized");
        write_schema(&dir, "ArchiveIngested.schema.json", ARCHIVE_SCHEMA);

        let config = RegistryConfig {
            max_schema_file_size: 8,
            ..RegistryConfig::default()
        };
        let registry =
            SchemaRegistry::from_dir_with_config(&dir, config).expect("load should succeed");
        assert!(!registry.contains("ArchiveIngested"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_count_limit_is_enforced() {
        let dir = make_temp_schema_dir("count-limit");
        write_schema(&dir, "ArchiveIngested.schema.json", ARCHIVE_SCHEMA);
        write_schema(&dir, "MessagesParsed.schema.json", r#"{"type":"object"}"#);

        let config = RegistryConfig {
            max_schemas: 1,
            ..RegistryConfig::default()
        };
        let result = SchemaRegistry::from_dir_with_config(&dir, config);
        assert!(matches!(result, Err(SchemaError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reload_swaps_in_new_mapping() {
        let dir = make_temp_schema_dir("reload");
        write_schema(&dir, "ArchiveIngested.schema.json", ARCHIVE_SCHEMA);

        let registry = SchemaRegistry::from_dir(&dir).expect("directory should load");
        assert_eq!(registry.event_types().len(), 1);

        write_schema(&dir, "MessagesParsed.schema.json", r#"{"type":"object"}"#);
        let report = registry.reload().expect("reload should succeed");
        assert_eq!(report.loaded, 2);
        assert!(registry.contains("MessagesParsed"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reload_requires_directory_source() {
        let registry = SchemaRegistry::from_embedded(&[("ArchiveIngested", ARCHIVE_SCHEMA)])
            .expect("embedded schemas should compile");
        assert!(matches!(
            registry.reload(),
            Err(SchemaError::LoadFailed(_))
        ));
    }

    #[test]
    fn embedded_bad_schema_is_hard_error() {
        let result = SchemaRegistry::from_embedded(&[("Bad", r#"{"type":"not-a-type"}"#)]);
        assert!(matches!(result, Err(SchemaError::CompileFailed { .. })));
    }

    #[test]
    fn resolve_event_type_requires_exact_suffix() {
        assert_eq!(
            resolve_event_type("ArchiveIngested.schema.json"),
            Some("ArchiveIngested")
        );
        assert_eq!(resolve_event_type(".schema.json"), None);
        assert_eq!(resolve_event_type("ArchiveIngested.json"), None);
        assert_eq!(resolve_event_type("readme.md"), None);
    }
}

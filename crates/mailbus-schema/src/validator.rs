use jsonschema::Validator;
use mailbus_envelope::Envelope;
use serde_json::Value;

use crate::registry::CompiledSchema;
use crate::violation::{ValidationReport, Violation};

/// Validate a full envelope: envelope-level fields plus the payload against
/// the event type's schema. Every violation found is surfaced in one pass.
pub fn validate_envelope(envelope: &Envelope, schema: &CompiledSchema) -> ValidationReport {
    let mut report = ValidationReport::new();

    if envelope.event_type.is_empty() {
        report.push(Violation::new("$.event_type", "must not be empty"));
    } else if envelope.event_type != schema.event_type() {
        report.push(Violation::new(
            "$.event_type",
            format!(
                "envelope declares {:?} but schema is for {:?}",
                envelope.event_type,
                schema.event_type()
            ),
        ));
    }
    if envelope.event_id.is_empty() {
        report.push(Violation::new("$.event_id", "must not be empty"));
    }
    if envelope.schema_version.is_empty() {
        report.push(Violation::new("$.schema_version", "must not be empty"));
    }

    for violation in schema.violations_for(&envelope.payload, "$.payload") {
        report.push(violation);
    }

    report
}

/// Validate `candidate` against a raw schema document, compiling it ad hoc.
///
/// A malformed schema (unknown constraint type, bad structure) never causes
/// an error or a panic: the candidate is reported invalid with one violation
/// at `$` describing the schema problem.
pub fn validate_document(candidate: &Value, schema_document: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();

    match jsonschema::validator_for(schema_document) {
        Ok(validator) => {
            for violation in collect_violations(&validator, candidate, "$") {
                report.push(violation);
            }
        }
        Err(err) => {
            report.push(Violation::new("$", format!("schema is malformed: {err}")));
        }
    }

    report
}

/// Map every validation error to a [`Violation`] with a `$`-rooted path.
pub(crate) fn collect_violations(
    validator: &Validator,
    instance: &Value,
    prefix: &str,
) -> Vec<Violation> {
    validator
        .iter_errors(instance)
        .map(|err| {
            let pointer = err.instance_path().to_string();
            Violation::new(pointer_to_path(prefix, &pointer), err.to_string())
        })
        .collect()
}

/// `/name` → `$.name`; the empty pointer addresses the prefix itself.
fn pointer_to_path(prefix: &str, pointer: &str) -> String {
    if pointer.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}{}", pointer.replace('/', "."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::registry::SchemaRegistry;

    const SUBSCRIBER_SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "age": { "type": "integer", "minimum": 0 }
        },
        "required": ["name", "age"]
    }"#;

    fn subscriber_schema() -> std::sync::Arc<CompiledSchema> {
        SchemaRegistry::from_embedded(&[("SubscriberRegistered", SUBSCRIBER_SCHEMA)])
            .expect("embedded schema should compile")
            .get("SubscriberRegistered")
            .expect("registered type should resolve")
    }

    #[test]
    fn valid_envelope_has_empty_report() {
        let schema = subscriber_schema();
        let envelope = Envelope::new(
            "SubscriberRegistered",
            serde_json::json!({"name": "ada", "age": 36}),
        );

        let report = validate_envelope(&envelope, &schema);
        assert!(report.is_valid(), "unexpected: {}", report.summary());
    }

    #[test]
    fn every_violation_is_surfaced_in_one_pass() {
        let schema = subscriber_schema();
        let envelope = Envelope::new(
            "SubscriberRegistered",
            serde_json::json!({"name": 123, "age": -5, "extra": true}),
        );

        let report = validate_envelope(&envelope, &schema);
        assert!(!report.is_valid());

        let summary = report.summary();
        assert!(summary.contains("name"), "missing name: {summary}");
        assert!(summary.contains("age"), "missing age: {summary}");
        assert!(summary.contains("extra"), "missing extra: {summary}");
        assert!(report.violations().len() >= 3);
    }

    #[test]
    fn payload_violations_carry_payload_rooted_paths() {
        let schema = subscriber_schema();
        let envelope = Envelope::new(
            "SubscriberRegistered",
            serde_json::json!({"name": 123, "age": 1}),
        );

        let report = validate_envelope(&envelope, &schema);
        assert!(report
            .violations()
            .iter()
            .any(|violation| violation.path == "$.payload.name"));
    }

    #[test]
    fn envelope_field_checks_run_alongside_payload_checks() {
        let schema = subscriber_schema();
        let mut envelope = Envelope::new("SubscriberRegistered", serde_json::json!({"name": 1}));
        envelope.event_id = String::new();
        envelope.schema_version = String::new();

        let report = validate_envelope(&envelope, &schema);
        let paths: Vec<&str> = report
            .violations()
            .iter()
            .map(|violation| violation.path.as_str())
            .collect();

        assert!(paths.contains(&"$.event_id"));
        assert!(paths.contains(&"$.schema_version"));
        assert!(paths.iter().any(|path| path.starts_with("$.payload")));
    }

    #[test]
    fn event_type_mismatch_is_a_violation() {
        let schema = subscriber_schema();
        let envelope = Envelope::new(
            "SomethingElse",
            serde_json::json!({"name": "ada", "age": 1}),
        );

        let report = validate_envelope(&envelope, &schema);
        assert!(report
            .violations()
            .iter()
            .any(|violation| violation.path == "$.event_type"));
    }

    #[test]
    fn malformed_schema_never_raises() {
        let candidate = serde_json::json!({"anything": "at all"});
        let schema = serde_json::json!({"type": "definitely-not-a-type"});

        let report = validate_document(&candidate, &schema);
        assert!(!report.is_valid());
        assert!(report.violations()[0].message.contains("schema"));
    }

    #[test]
    fn validate_document_reports_instance_violations() {
        let candidate = serde_json::json!({"count": "three"});
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "count": { "type": "integer" } }
        });

        let report = validate_document(&candidate, &schema);
        assert!(!report.is_valid());
        assert_eq!(report.violations()[0].path, "$.count");
    }

    #[test]
    fn enum_and_bound_constraints_are_checked() {
        let schema_json = r#"{
            "type": "object",
            "properties": {
                "status": { "enum": ["queued", "running", "done"] },
                "priority": { "type": "integer", "minimum": 0, "maximum": 9 }
            },
            "required": ["status"]
        }"#;
        let registry = SchemaRegistry::from_embedded_with_config(
            &[("SummaryRequested", schema_json)],
            RegistryConfig::default(),
        )
        .expect("embedded schema should compile");
        let schema = registry.get("SummaryRequested").expect("type should resolve");

        let envelope = Envelope::new(
            "SummaryRequested",
            serde_json::json!({"status": "paused", "priority": 11}),
        );
        let report = validate_envelope(&envelope, &schema);
        assert_eq!(report.violations().len(), 2);
    }

    #[test]
    fn pointer_to_path_handles_nesting_and_root() {
        assert_eq!(pointer_to_path("$", ""), "$");
        assert_eq!(pointer_to_path("$.payload", "/name"), "$.payload.name");
        assert_eq!(
            pointer_to_path("$.payload", "/threads/0/id"),
            "$.payload.threads.0.id"
        );
    }
}

//! Validation Layer
//!
//! Schema objects defining field constraints (string length, numeric range,
//! enum membership, required/optional) for create and partial-update
//! operations on domain entities. Validation is synchronous and runs before
//! any network call; a violation produces a structured error enumerating the
//! offending fields with human-readable messages, which callers surface
//! without modification.

mod schemas;

pub use schemas::{
    attribute_option_schema, category_schema, client_schema, order_schema, product_schema,
    variation_attribute_schema,
};

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Expected JSON type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    Boolean,
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Integer => "an integer",
            FieldKind::Number => "a number",
            FieldKind::Boolean => "a boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
        }
    }
}

/// A per-field constraint, applied when the field is present and non-null.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Minimum string length (characters)
    MinLen(usize),
    /// Maximum string length (characters)
    MaxLen(usize),
    /// Minimum numeric value (inclusive)
    Min(f64),
    /// Maximum numeric value (inclusive)
    Max(f64),
    /// Allowed string values (enum membership)
    OneOf(Vec<String>),
}

/// Definition of a single field in an entity schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,

    /// Default applied on create when the field is absent
    pub default: Option<Value>,

    pub rules: Vec<FieldRule>,
}

impl FieldSpec {
    /// A required field of the given kind.
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            rules: Vec::new(),
        }
    }

    /// An optional field of the given kind.
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            rules: Vec::new(),
        }
    }

    /// Default value applied on create when the field is absent.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// One offending field with its human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Structured validation failure enumerating every offending field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{entity} validation failed: {}", format_violations(.violations))]
pub struct ValidationError {
    pub entity: String,
    pub violations: Vec<Violation>,
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Field constraints for one entity, with create and partial-update modes.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    pub entity: String,
    pub fields: Vec<FieldSpec>,
}

impl EntitySchema {
    pub fn new(entity: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            entity: entity.into(),
            fields,
        }
    }

    /// Validate a create payload.
    ///
    /// All required fields must be present and non-null; defaults are
    /// inserted for absent optional fields that declare one; unknown fields
    /// are rejected.
    pub fn validate_create(&self, payload: &mut Value) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        let Some(object) = payload.as_object_mut() else {
            return Err(self.fail(vec![Violation {
                field: "<payload>".to_string(),
                message: "must be a JSON object".to_string(),
            }]));
        };

        self.check_unknown_fields(object, &mut violations);

        for field in &self.fields {
            match object.get(&field.name).cloned() {
                None | Some(Value::Null) if field.required => violations.push(Violation {
                    field: field.name.clone(),
                    message: "is required".to_string(),
                }),
                None => {
                    if let Some(default) = &field.default {
                        object.insert(field.name.clone(), default.clone());
                    }
                }
                Some(Value::Null) => {}
                Some(value) => Self::check_value(field, &value, &mut violations),
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(self.fail(violations))
        }
    }

    /// Validate a partial-update payload.
    ///
    /// Every field is optional; present fields obey the same per-field
    /// constraints, except that a required field may not be set to null.
    /// Unknown fields are rejected.
    pub fn validate_update(&self, payload: &Value) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        let Some(object) = payload.as_object() else {
            return Err(self.fail(vec![Violation {
                field: "<payload>".to_string(),
                message: "must be a JSON object".to_string(),
            }]));
        };

        self.check_unknown_fields(object, &mut violations);

        for field in &self.fields {
            match object.get(&field.name) {
                None => {}
                Some(Value::Null) => {
                    if field.required {
                        violations.push(Violation {
                            field: field.name.clone(),
                            message: "cannot be null".to_string(),
                        });
                    }
                }
                Some(value) => Self::check_value(field, value, &mut violations),
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(self.fail(violations))
        }
    }

    fn check_unknown_fields(
        &self,
        object: &serde_json::Map<String, Value>,
        violations: &mut Vec<Violation>,
    ) {
        for key in object.keys() {
            if !self.fields.iter().any(|f| &f.name == key) {
                violations.push(Violation {
                    field: key.clone(),
                    message: "is not a known field".to_string(),
                });
            }
        }
    }

    fn check_value(field: &FieldSpec, value: &Value, violations: &mut Vec<Violation>) {
        if !field.kind.accepts(value) {
            violations.push(Violation {
                field: field.name.clone(),
                message: format!("must be {}", field.kind.describe()),
            });
            return;
        }

        for rule in &field.rules {
            let message = match rule {
                FieldRule::MinLen(min) => value.as_str().and_then(|s| {
                    (s.chars().count() < *min)
                        .then(|| format!("must be at least {min} character(s)"))
                }),
                FieldRule::MaxLen(max) => value.as_str().and_then(|s| {
                    (s.chars().count() > *max)
                        .then(|| format!("must be at most {max} character(s)"))
                }),
                FieldRule::Min(min) => value.as_f64().and_then(|n| {
                    (n < *min).then(|| format!("must be greater than or equal to {min}"))
                }),
                FieldRule::Max(max) => value.as_f64().and_then(|n| {
                    (n > *max).then(|| format!("must be less than or equal to {max}"))
                }),
                FieldRule::OneOf(allowed) => value.as_str().and_then(|s| {
                    (!allowed.iter().any(|a| a == s))
                        .then(|| format!("must be one of: {}", allowed.join(", ")))
                }),
            };

            if let Some(message) = message {
                violations.push(Violation {
                    field: field.name.clone(),
                    message,
                });
            }
        }
    }

    fn fail(&self, violations: Vec<Violation>) -> ValidationError {
        ValidationError {
            entity: self.entity.clone(),
            violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> EntitySchema {
        EntitySchema::new(
            "widget",
            vec![
                FieldSpec::required("name", FieldKind::Text)
                    .rule(FieldRule::MinLen(1))
                    .rule(FieldRule::MaxLen(10)),
                FieldSpec::optional("sort_order", FieldKind::Integer)
                    .with_default(0)
                    .rule(FieldRule::Min(0.0)),
                FieldSpec::optional("status", FieldKind::Text).rule(FieldRule::OneOf(vec![
                    "draft".to_string(),
                    "live".to_string(),
                ])),
            ],
        )
    }

    #[test]
    fn test_create_applies_defaults() {
        let mut payload = json!({"name": "Mug"});
        schema().validate_create(&mut payload).unwrap();
        assert_eq!(payload["sort_order"], 0);
    }

    #[test]
    fn test_create_missing_required_field() {
        let mut payload = json!({"sort_order": 3});
        let err = schema().validate_create(&mut payload).unwrap_err();
        assert_eq!(err.entity, "widget");
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "name");
        assert_eq!(err.violations[0].message, "is required");
    }

    #[test]
    fn test_create_collects_every_violation() {
        let mut payload = json!({
            "name": "this name is far too long",
            "sort_order": -1,
            "status": "archived"
        });

        let err = schema().validate_create(&mut payload).unwrap_err();
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "sort_order", "status"]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut payload = json!({"name": "Mug", "color": "red"});
        let err = schema().validate_create(&mut payload).unwrap_err();
        assert_eq!(err.violations[0].field, "color");
        assert_eq!(err.violations[0].message, "is not a known field");
    }

    #[test]
    fn test_update_allows_partial_payload() {
        let payload = json!({"sort_order": 5});
        schema().validate_update(&payload).unwrap();
    }

    #[test]
    fn test_update_rejects_null_on_required_field() {
        let payload = json!({"name": null});
        let err = schema().validate_update(&payload).unwrap_err();
        assert_eq!(err.violations[0].message, "cannot be null");
    }

    #[test]
    fn test_update_checks_rules_on_present_fields() {
        let payload = json!({"status": "archived"});
        let err = schema().validate_update(&payload).unwrap_err();
        assert!(err.violations[0].message.starts_with("must be one of"));
    }

    #[test]
    fn test_kind_mismatch_reported_once() {
        let mut payload = json!({"name": 42});
        let err = schema().validate_create(&mut payload).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].message, "must be a string");
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let mut payload = json!(["not", "an", "object"]);
        let err = schema().validate_create(&mut payload).unwrap_err();
        assert_eq!(err.violations[0].field, "<payload>");
    }

    #[test]
    fn test_optional_null_is_accepted_on_create() {
        let mut payload = json!({"name": "Mug", "status": null});
        schema().validate_create(&mut payload).unwrap();
    }
}

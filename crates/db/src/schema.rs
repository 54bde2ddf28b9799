//! Field-level schemas: casting loosely typed JSON into BSON and validating it
//! before anything is written.

use std::fmt;

use bson::{oid::ObjectId, Bson, Document};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Placeholder replaced by the offending value in bound messages.
const VALUE_PLACEHOLDER: &str = "{VALUE}";

/// Storage type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    ObjectId,
}

impl FieldKind {
    fn name(self) -> &'static str {
        match self {
            FieldKind::String => "String",
            FieldKind::Number => "Number",
            FieldKind::ObjectId => "ObjectId",
        }
    }
}

/// Inclusive numeric bound with the message reported when it is crossed.
#[derive(Debug, Clone, Copy)]
pub struct Bound {
    pub value: f64,
    pub message: &'static str,
}

/// Declaration of a single field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Message reported when the field is missing; `None` means optional.
    pub required: Option<&'static str>,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: None,
            min: None,
            max: None,
        }
    }

    pub const fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    pub const fn min(mut self, value: f64, message: &'static str) -> Self {
        self.min = Some(Bound { value, message });
        self
    }

    pub const fn max(mut self, value: f64, message: &'static str) -> Self {
        self.max = Some(Bound { value, message });
        self
    }
}

/// Whether a write supplies the whole entity or only the fields to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub path: String,
    pub message: String,
}

/// Every rule a document violated, in schema declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|v| v.message.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, path: &str, message: String) {
        self.0.push(FieldViolation {
            path: path.to_string(),
            message,
        });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

/// Ordered set of field declarations for one collection.
#[derive(Debug)]
pub struct Schema {
    fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Converts a JSON body into a BSON document holding only declared fields.
    /// Undeclared keys (including `id`/`_id`) are dropped.
    pub fn cast(&self, body: &Value) -> StoreResult<Document> {
        let object = body
            .as_object()
            .ok_or_else(|| StoreError::cast("Object", body, "body"))?;

        let mut document = Document::new();
        for spec in self.fields {
            if let Some(value) = object.get(spec.name) {
                document.insert(spec.name, cast_value(spec, value)?);
            }
        }

        Ok(document)
    }

    /// Checks every rule and reports all violations at once.
    pub fn validate(&self, document: &Document, mode: Mode) -> StoreResult<()> {
        let mut errors = ValidationErrors::default();

        for spec in self.fields {
            let value = document.get(spec.name);

            if let Some(message) = spec.required {
                let missing = match (mode, value) {
                    (Mode::Create, None) => true,
                    (_, Some(value)) => is_blank(value),
                    (Mode::Update, None) => false,
                };
                if missing {
                    errors.push(spec.name, message.to_string());
                    continue;
                }
            }

            let Some(number) = value.and_then(as_f64) else {
                continue;
            };

            if let Some(min) = spec.min.filter(|bound| number < bound.value) {
                errors.push(spec.name, render_bound(min.message, number));
            } else if let Some(max) = spec.max.filter(|bound| number > bound.value) {
                errors.push(spec.name, render_bound(max.message, number));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }

    /// Cast then validate.
    pub fn prepare(&self, body: &Value, mode: Mode) -> StoreResult<Document> {
        let document = self.cast(body)?;
        self.validate(&document, mode)?;
        Ok(document)
    }
}

/// Parses a raw string the way a `Number` field would be cast.
pub fn cast_number(path: &str, raw: &str) -> StoreResult<Bson> {
    number_from_str(raw).ok_or_else(|| StoreError::cast(FieldKind::Number.name(), raw, path))
}

/// Parses a hex object id, failing with a cast error rather than "not found".
pub fn parse_object_id(path: &str, raw: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| StoreError::cast(FieldKind::ObjectId.name(), raw, path))
}

fn cast_value(spec: &FieldSpec, value: &Value) -> StoreResult<Bson> {
    let fail = || StoreError::cast(spec.kind.name(), display_json(value), spec.name);

    if value.is_null() {
        return Ok(Bson::Null);
    }

    match spec.kind {
        FieldKind::String => match value {
            Value::String(s) => Ok(Bson::String(s.clone())),
            Value::Number(n) => Ok(Bson::String(n.to_string())),
            Value::Bool(b) => Ok(Bson::String(b.to_string())),
            _ => Err(fail()),
        },
        FieldKind::Number => match value {
            Value::Number(n) => n
                .as_i64()
                .map(Bson::Int64)
                .or_else(|| n.as_f64().map(Bson::Double))
                .ok_or_else(fail),
            Value::String(s) => number_from_str(s).ok_or_else(fail),
            _ => Err(fail()),
        },
        FieldKind::ObjectId => match value {
            Value::String(s) => parse_object_id(spec.name, s).map(Bson::ObjectId),
            _ => Err(fail()),
        },
    }
}

fn number_from_str(raw: &str) -> Option<Bson> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Bson::Int64(int));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Bson::Double)
}

fn display_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Bson) -> bool {
    match value {
        Bson::Null => true,
        Bson::String(s) => s.is_empty(),
        _ => false,
    }
}

pub(crate) fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn render_bound(message: &str, value: f64) -> String {
    message.replace(VALUE_PLACEHOLDER, &value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static SCHEMA: Schema = Schema::new(&[
        FieldSpec::new("title", FieldKind::String).required("title is required"),
        FieldSpec::new("pages", FieldKind::Number)
            .min(10.0, "pages out of range: {VALUE}")
            .max(5000.0, "pages out of range: {VALUE}"),
        FieldSpec::new("owner", FieldKind::ObjectId).required("owner is required"),
    ]);

    #[test]
    fn cast_drops_undeclared_fields() {
        let doc = SCHEMA
            .cast(&json!({"title": "Dune", "id": "x", "_id": "y", "color": "red"}))
            .unwrap();

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get_str("title").unwrap(), "Dune");
    }

    #[test]
    fn cast_converts_numeric_strings() {
        let doc = SCHEMA.cast(&json!({"pages": "300"})).unwrap();
        assert_eq!(doc.get("pages"), Some(&Bson::Int64(300)));

        let doc = SCHEMA.cast(&json!({"pages": 12.5})).unwrap();
        assert_eq!(doc.get("pages"), Some(&Bson::Double(12.5)));
    }

    #[test]
    fn cast_rejects_malformed_object_id() {
        let err = SCHEMA.cast(&json!({"owner": "not-an-id"})).unwrap_err();
        match err {
            StoreError::Cast { kind, path, value } => {
                assert_eq!(kind, "ObjectId");
                assert_eq!(path, "owner");
                assert_eq!(value, "not-an-id");
            }
            other => panic!("expected cast error, got {:?}", other),
        }
    }

    #[test]
    fn cast_rejects_non_object_body() {
        assert!(matches!(
            SCHEMA.cast(&json!(["title"])),
            Err(StoreError::Cast { .. })
        ));
    }

    #[test]
    fn validate_reports_every_missing_field() {
        let err = SCHEMA.prepare(&json!({}), Mode::Create).unwrap_err();
        match err {
            StoreError::Validation(errors) => {
                assert_eq!(
                    errors.messages(),
                    vec!["title is required", "owner is required"]
                );
                assert_eq!(errors.to_string(), "title is required; owner is required");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn validate_names_out_of_range_value() {
        let owner = ObjectId::new().to_hex();
        for (pages, shown) in [(json!(5), "5"), (json!(5001), "5001"), (json!(9.5), "9.5")] {
            let err = SCHEMA
                .prepare(&json!({"title": "A", "owner": owner, "pages": pages}), Mode::Create)
                .unwrap_err();
            match err {
                StoreError::Validation(errors) => {
                    assert_eq!(errors.violations().len(), 1);
                    assert_eq!(errors.violations()[0].path, "pages");
                    assert_eq!(
                        errors.violations()[0].message,
                        format!("pages out of range: {}", shown)
                    );
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let owner = ObjectId::new().to_hex();
        for pages in [10, 5000] {
            SCHEMA
                .prepare(&json!({"title": "A", "owner": owner, "pages": pages}), Mode::Create)
                .unwrap();
        }
    }

    #[test]
    fn update_only_checks_supplied_fields() {
        SCHEMA.prepare(&json!({"pages": 20}), Mode::Update).unwrap();

        let err = SCHEMA
            .prepare(&json!({"title": ""}), Mode::Update)
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn cast_number_rejects_garbage() {
        assert_eq!(cast_number("minPages", "120").unwrap(), Bson::Int64(120));
        assert!(matches!(
            cast_number("minPages", "many"),
            Err(StoreError::Cast { .. })
        ));
    }
}

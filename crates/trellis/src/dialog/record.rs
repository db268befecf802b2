//! Records, field errors and validation results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A form record: field name to JSON value.
pub type Record = serde_json::Map<String, Value>;

/// Field-level error messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Raised by [`FormAdapter::get_validated_values`](super::form::FormAdapter::get_validated_values)
/// when the form's input does not validate.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed ({} field error(s))", errors.len())]
pub struct ValidationFailed {
    /// Per-field messages. May be empty when the form reports invalid
    /// without saying why.
    pub errors: FieldErrors,
}

impl ValidationFailed {
    /// Create a validation failure carrying `errors`.
    pub fn new(errors: FieldErrors) -> Self {
        Self { errors }
    }
}

/// Outcome of validating and collecting a form.
///
/// Valid results always carry data, invalid results never do. The fields are
/// private so that shape cannot be broken after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    is_valid: bool,
    data: Option<Record>,
    errors: FieldErrors,
}

impl ValidationResult {
    /// A successful validation carrying the collected values.
    pub fn valid(data: Record) -> Self {
        Self {
            is_valid: true,
            data: Some(data),
            errors: FieldErrors::new(),
        }
    }

    /// A failed validation carrying field errors and no data.
    pub fn invalid(errors: FieldErrors) -> Self {
        Self {
            is_valid: false,
            data: None,
            errors,
        }
    }

    /// Whether validation passed.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// The collected values, present only when valid.
    pub fn data(&self) -> Option<&Record> {
        self.data.as_ref()
    }

    /// The field errors, empty when valid.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Convert into a `Result`, the shape the controller branches on.
    pub fn into_result(self) -> Result<Record, ValidationFailed> {
        match self.data {
            Some(data) if self.is_valid => Ok(data),
            _ => Err(ValidationFailed::new(self.errors)),
        }
    }
}

impl From<Result<Record, ValidationFailed>> for ValidationResult {
    fn from(result: Result<Record, ValidationFailed>) -> Self {
        match result {
            Ok(data) => Self::valid(data),
            Err(failed) => Self::invalid(failed.errors),
        }
    }
}

/// Copy the identifier field from `payload` into `data` when `data` lacks it.
///
/// Returns `true` if the identifier was copied. A `null` identifier in the
/// data counts as missing.
pub fn carry_identifier(payload: Option<&Record>, data: &mut Record, field: &str) -> bool {
    let Some(id) = payload.and_then(|p| p.get(field)) else {
        return false;
    };
    if id.is_null() {
        return false;
    }
    match data.get(field) {
        Some(existing) if !existing.is_null() => false,
        _ => {
            data.insert(field.to_string(), id.clone());
            true
        }
    }
}

/// Build a [`Record`] from a JSON value, returning an empty record for
/// anything that is not an object.
pub fn record_from_value(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: Value) -> Record {
        record_from_value(value)
    }

    #[test]
    fn test_validation_result_shape() {
        let ok = ValidationResult::valid(rec(json!({"name": "A"})));
        assert!(ok.is_valid());
        assert!(ok.data().is_some());
        assert!(ok.errors().is_empty());

        let mut errors = FieldErrors::new();
        errors.insert("name".into(), "required".into());
        let bad = ValidationResult::invalid(errors.clone());
        assert!(!bad.is_valid());
        assert!(bad.data().is_none());
        assert_eq!(bad.into_result(), Err(ValidationFailed::new(errors)));
    }

    #[test]
    fn test_carry_identifier() {
        let payload = rec(json!({"id": 42, "name": "A"}));
        let mut data = rec(json!({"name": "B"}));
        assert!(carry_identifier(Some(&payload), &mut data, "id"));
        assert_eq!(Value::Object(data), json!({"id": 42, "name": "B"}));
    }

    #[test]
    fn test_carry_identifier_keeps_existing() {
        let payload = rec(json!({"id": 42}));
        let mut data = rec(json!({"id": 7}));
        assert!(!carry_identifier(Some(&payload), &mut data, "id"));
        assert_eq!(data["id"], json!(7));

        let mut data = rec(json!({"id": null}));
        assert!(carry_identifier(Some(&payload), &mut data, "id"));
        assert_eq!(data["id"], json!(42));
    }

    #[test]
    fn test_carry_identifier_without_payload_id() {
        let mut data = rec(json!({"name": "B"}));
        assert!(!carry_identifier(None, &mut data, "id"));
        assert!(!carry_identifier(Some(&rec(json!({"name": "A"}))), &mut data, "id"));
        assert!(!data.contains_key("id"));
    }

    #[test]
    fn test_record_from_non_object() {
        assert!(record_from_value(json!([1, 2])).is_empty());
        assert!(record_from_value(Value::Null).is_empty());
    }
}

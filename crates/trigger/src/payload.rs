//! Structured access to an incoming trigger payload.
//!
//! The transport layer hands the core a JSON object. [`TriggerPayload`] exposes
//! it through required/optional accessors so intake code never pattern-matches
//! on raw JSON, and [`RawParameterEntry`] models one element of the
//! `parameters` list.

use serde_json::{Map, Value};
use tracing::debug;

use crate::{TriggerError, UserName};

/// Payload field holding the triggering user.
pub const BY: &str = "by";
/// Payload field holding the issue key.
pub const ISSUE_KEY: &str = "issueKey";
/// Payload field holding the issue URL.
pub const ISSUE_URL: &str = "issueUrl";
/// Payload field holding the proposed parameter list.
pub const PARAMETERS: &str = "parameters";
/// Field of a parameter entry holding its name.
pub const NAME: &str = "name";
/// Field of a parameter entry holding its value.
pub const VALUE: &str = "value";

/// A decoded trigger request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerPayload {
    fields: Map<String, Value>,
}

impl TriggerPayload {
    /// Wraps an already-decoded JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Interprets an arbitrary JSON value as a payload.
    ///
    /// Only JSON objects are payloads; anything else is malformed.
    pub fn from_value(value: Value) -> Result<Self, TriggerError> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(TriggerError::malformed(format!(
                "payload must be a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Decodes a JSON request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, TriggerError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| TriggerError::malformed(format!("body is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Returns the raw JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns a string field that must be present.
    ///
    /// Numbers and booleans are rendered as text. A missing or `null` field, or
    /// a field holding an object or array, is a [`TriggerError::MalformedPayload`].
    pub fn get_required_string(&self, name: &str) -> Result<String, TriggerError> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Err(TriggerError::malformed(format!(
                "field '{name}' is required"
            ))),
            Some(value) => scalar_to_string(value).ok_or_else(|| {
                TriggerError::malformed(format!(
                    "field '{name}' must be a string, got {}",
                    json_type(value)
                ))
            }),
        }
    }

    /// Returns a string field, or `default` when it is missing or `null`.
    ///
    /// Non-scalar values are treated like a missing field.
    pub fn get_optional_string(&self, name: &str, default: Option<&str>) -> Option<String> {
        self.fields
            .get(name)
            .and_then(scalar_to_string)
            .or_else(|| default.map(str::to_owned))
    }

    /// Returns a list field, or an empty slice when it is missing, `null`, or
    /// not a list.
    pub fn get_optional_list(&self, name: &str) -> &[Value] {
        match self.fields.get(name) {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => &[],
            Some(other) => {
                debug!(
                    field = name,
                    found = json_type(other),
                    "Ignoring non-list value for list field"
                );
                &[]
            }
        }
    }
}

/// One caller-supplied `{name, ...}` element of the `parameters` list.
///
/// Ephemeral: it lives for the duration of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RawParameterEntry {
    name: String,
    fields: Map<String, Value>,
}

impl RawParameterEntry {
    /// Decodes one list element.
    ///
    /// The element must be a JSON object with a string `name` field.
    pub fn parse(value: &Value) -> Result<Self, TriggerError> {
        let Value::Object(fields) = value else {
            return Err(TriggerError::malformed(format!(
                "parameter entries must be objects, got {}",
                json_type(value)
            )));
        };
        let name = match fields.get(NAME) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(TriggerError::malformed(format!(
                    "parameter entry field 'name' must be a string, got {}",
                    json_type(other)
                )))
            }
            None => {
                return Err(TriggerError::malformed(
                    "parameter entry is missing field 'name'",
                ))
            }
        };
        Ok(Self {
            name,
            fields: fields.clone(),
        })
    }

    /// Decodes every element of a `parameters` list, failing on the first bad one.
    pub fn parse_all(values: &[Value]) -> Result<Vec<Self>, TriggerError> {
        values.iter().map(Self::parse).collect()
    }

    /// Returns the entry's name as currently recorded.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entry's `value` field, treating `null` as absent.
    pub fn value(&self) -> Option<&Value> {
        self.fields.get(VALUE).filter(|v| !v.is_null())
    }

    /// Returns any field of the entry.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a copy of this entry with its name replaced by `canonical`.
    pub fn renamed(&self, canonical: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(NAME.to_owned(), Value::String(canonical.to_owned()));
        Self {
            name: canonical.to_owned(),
            fields,
        }
    }
}

/// Request-scoped data available to parameter kinds while constructing values.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    payload: &'a TriggerPayload,
    triggered_by: &'a UserName,
}

impl<'a> RequestContext<'a> {
    /// Creates a context for one trigger request.
    pub fn new(payload: &'a TriggerPayload, triggered_by: &'a UserName) -> Self {
        Self {
            payload,
            triggered_by,
        }
    }

    /// The full payload of the request.
    pub fn payload(&self) -> &'a TriggerPayload {
        self.payload
    }

    /// The user the trigger was sent on behalf of.
    pub fn triggered_by(&self) -> &'a UserName {
        self.triggered_by
    }
}

/// Renders a JSON scalar as text; objects, arrays and `null` yield `None`.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> TriggerPayload {
        TriggerPayload::from_value(value).expect("object payload")
    }

    #[test]
    fn non_object_payload_is_malformed() {
        let err = TriggerPayload::from_value(json!(["by"])).unwrap_err();
        assert!(matches!(err, TriggerError::MalformedPayload { .. }));
    }

    #[test]
    fn body_must_be_json_object() {
        assert!(TriggerPayload::from_slice(b"{").is_err());
        assert!(TriggerPayload::from_slice(b"42").is_err());
        let p = TriggerPayload::from_slice(br#"{"by":"alice"}"#).unwrap();
        assert_eq!(p.get_required_string(BY).unwrap(), "alice");
    }

    #[test]
    fn required_string_missing_or_null_is_malformed() {
        let p = payload(json!({ "by": null }));
        assert!(p.get_required_string("by").is_err());
        assert!(p.get_required_string("other").is_err());
    }

    #[test]
    fn required_string_renders_scalars() {
        let p = payload(json!({ "by": "alice", "n": 42, "flag": true, "obj": {} }));
        assert_eq!(p.get_required_string("by").unwrap(), "alice");
        assert_eq!(p.get_required_string("n").unwrap(), "42");
        assert_eq!(p.get_required_string("flag").unwrap(), "true");
        assert!(p.get_required_string("obj").is_err());
    }

    #[test]
    fn optional_string_falls_back_to_default() {
        let p = payload(json!({ "issueKey": "ABC-1", "issueUrl": null }));
        assert_eq!(p.get_optional_string(ISSUE_KEY, None).as_deref(), Some("ABC-1"));
        assert_eq!(p.get_optional_string(ISSUE_URL, None), None);
        assert_eq!(
            p.get_optional_string("missing", Some("fallback")).as_deref(),
            Some("fallback")
        );
    }

    #[test]
    fn optional_list_defaults_to_empty() {
        let p = payload(json!({ "parameters": "not-a-list" }));
        assert!(p.get_optional_list(PARAMETERS).is_empty());
        let p = payload(json!({}));
        assert!(p.get_optional_list(PARAMETERS).is_empty());
        let p = payload(json!({ "parameters": [{ "name": "a" }] }));
        assert_eq!(p.get_optional_list(PARAMETERS).len(), 1);
    }

    #[test]
    fn entry_without_name_is_malformed() {
        let err = RawParameterEntry::parse(&json!({ "value": "main" })).unwrap_err();
        assert_eq!(
            err,
            TriggerError::malformed("parameter entry is missing field 'name'")
        );
        assert!(RawParameterEntry::parse(&json!("branch")).is_err());
        assert!(RawParameterEntry::parse(&json!({ "name": 7 })).is_err());
    }

    #[test]
    fn renamed_entry_rewrites_name_field_and_keeps_the_rest() {
        let entry = RawParameterEntry::parse(&json!({ "name": "Branch", "value": "main" })).unwrap();
        let renamed = entry.renamed("branch");
        assert_eq!(renamed.name(), "branch");
        assert_eq!(renamed.field(NAME), Some(&json!("branch")));
        assert_eq!(renamed.value(), Some(&json!("main")));
        assert_eq!(entry.name(), "Branch");
    }

    #[test]
    fn null_value_is_absent() {
        let entry = RawParameterEntry::parse(&json!({ "name": "x", "value": null })).unwrap();
        assert!(entry.value().is_none());
    }
}

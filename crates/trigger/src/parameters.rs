//! Declared job parameters.
//!
//! A job declares its inputs as a [`ParameterSchema`]: an ordered list of
//! [`ParameterDefinition`] trait objects. Each definition knows how to turn a
//! caller-supplied [`RawParameterEntry`] into a concrete [`ParameterValue`] and
//! what its default is. [`ParameterSpec`] provides the built-in kinds and is
//! the form jobs declare their parameters in configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::payload::scalar_to_string;
use crate::{ParameterValue, RawParameterEntry, RequestContext};

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// One named input a job accepts.
///
/// Implementations decide how a raw value is parsed. Returning `None` from
/// [`construct_value`](Self::construct_value) means "no usable value"; the
/// reconciler then falls back to [`default_value`](Self::default_value).
pub trait ParameterDefinition: Send + Sync + std::fmt::Debug {
    /// The canonical declared name.
    fn name(&self) -> &str;

    /// Human-readable description, used as the value's display label.
    fn description(&self) -> Option<&str>;

    /// Short name of the parameter kind, for diagnostics.
    fn kind(&self) -> &str;

    /// Builds a value from a caller-supplied entry whose name has already been
    /// rewritten to [`name`](Self::name).
    fn construct_value(
        &self,
        ctx: &RequestContext<'_>,
        entry: &RawParameterEntry,
    ) -> Option<ParameterValue>;

    /// The value to use when the caller supplied none.
    fn default_value(&self) -> Option<ParameterValue>;
}

// ---------------------------------------------------------------------------
// Built-in kinds
// ---------------------------------------------------------------------------

/// Built-in parameter kinds, as declared in job configuration.
///
/// ```toml
/// [[jobs.parameters]]
/// type = "choice"
/// name = "environment"
/// choices = ["staging", "production"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterSpec {
    /// Single-line text.
    String {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        default: Option<String>,
        /// Strip leading and trailing whitespace from supplied values.
        #[serde(default)]
        trim: bool,
    },
    /// Multi-line text. Never trimmed.
    Text {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        default: Option<String>,
    },
    /// A flag; accepts JSON booleans or the strings `true`/`false`.
    Boolean {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        default: bool,
    },
    /// One of a fixed list of strings. The first choice is the default.
    Choice {
        name: String,
        #[serde(default)]
        description: Option<String>,
        choices: Vec<String>,
    },
    /// A secret string, redacted in logs.
    Password {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        default: Option<String>,
    },
}

impl ParameterSpec {
    fn label(&self) -> Option<String> {
        self.description().map(str::to_owned)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.name().trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if let Self::Choice { name, choices, .. } = self {
            if choices.is_empty() {
                return Err(SchemaError::NoChoices { name: name.clone() });
            }
        }
        Ok(())
    }
}

impl ParameterDefinition for ParameterSpec {
    fn name(&self) -> &str {
        match self {
            Self::String { name, .. }
            | Self::Text { name, .. }
            | Self::Boolean { name, .. }
            | Self::Choice { name, .. }
            | Self::Password { name, .. } => name,
        }
    }

    fn description(&self) -> Option<&str> {
        match self {
            Self::String { description, .. }
            | Self::Text { description, .. }
            | Self::Boolean { description, .. }
            | Self::Choice { description, .. }
            | Self::Password { description, .. } => description.as_deref(),
        }
    }

    fn kind(&self) -> &str {
        match self {
            Self::String { .. } => "string",
            Self::Text { .. } => "text",
            Self::Boolean { .. } => "boolean",
            Self::Choice { .. } => "choice",
            Self::Password { .. } => "password",
        }
    }

    fn construct_value(
        &self,
        _ctx: &RequestContext<'_>,
        entry: &RawParameterEntry,
    ) -> Option<ParameterValue> {
        let raw = entry.value()?;
        let name = self.name();
        match self {
            Self::String { trim, .. } => {
                let text = scalar_to_string(raw)?;
                let text = if *trim { text.trim().to_owned() } else { text };
                Some(ParameterValue::string(name, text, self.label()))
            }
            Self::Text { .. } => {
                scalar_to_string(raw).map(|text| ParameterValue::string(name, text, self.label()))
            }
            Self::Boolean { .. } => {
                parse_bool(raw).map(|flag| ParameterValue::boolean(name, flag, self.label()))
            }
            Self::Choice { choices, .. } => {
                let text = scalar_to_string(raw)?;
                if choices.contains(&text) {
                    Some(ParameterValue::string(name, text, self.label()))
                } else {
                    debug!(parameter = name, value = %text, "Value is not one of the declared choices");
                    None
                }
            }
            Self::Password { .. } => {
                scalar_to_string(raw).map(|text| ParameterValue::password(name, text, self.label()))
            }
        }
    }

    fn default_value(&self) -> Option<ParameterValue> {
        let name = self.name();
        match self {
            Self::String { default, .. } | Self::Text { default, .. } => default
                .as_ref()
                .map(|d| ParameterValue::string(name, d.clone(), self.label())),
            Self::Boolean { default, .. } => {
                Some(ParameterValue::boolean(name, *default, self.label()))
            }
            Self::Choice { choices, .. } => choices
                .first()
                .map(|c| ParameterValue::string(name, c.clone(), self.label())),
            Self::Password { default, .. } => default
                .as_ref()
                .map(|d| ParameterValue::password(name, d.clone(), self.label())),
        }
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Problems with a declared parameter schema, reported when a job is loaded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A parameter was declared with an empty name.
    #[error("parameter name must not be empty")]
    EmptyName,

    /// Two parameters share a name (compared case-insensitively).
    #[error("parameter '{name}' is declared more than once")]
    DuplicateParameter {
        /// The second occurrence's name.
        name: String,
    },

    /// A choice parameter lists no choices.
    #[error("choice parameter '{name}' declares no choices")]
    NoChoices {
        /// The parameter's name.
        name: String,
    },
}

/// The ordered parameters a job declares. Read-only once built.
#[derive(Clone, Default)]
pub struct ParameterSchema {
    definitions: Vec<Arc<dyn ParameterDefinition>>,
}

impl ParameterSchema {
    /// Builds a schema, rejecting names that collide case-insensitively.
    pub fn new(definitions: Vec<Arc<dyn ParameterDefinition>>) -> Result<Self, SchemaError> {
        for (i, definition) in definitions.iter().enumerate() {
            if definitions[..i]
                .iter()
                .any(|earlier| names_match(earlier.name(), definition.name()))
            {
                return Err(SchemaError::DuplicateParameter {
                    name: definition.name().to_owned(),
                });
            }
        }
        Ok(Self { definitions })
    }

    /// Builds a schema from built-in kinds, validating each declaration.
    pub fn from_specs(specs: Vec<ParameterSpec>) -> Result<Self, SchemaError> {
        let mut definitions: Vec<Arc<dyn ParameterDefinition>> = Vec::with_capacity(specs.len());
        for spec in specs {
            spec.validate()?;
            definitions.push(Arc::new(spec));
        }
        Self::new(definitions)
    }

    /// Iterates the declared parameters in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = &dyn ParameterDefinition> {
        self.definitions.iter().map(|d| d.as_ref() as &dyn ParameterDefinition)
    }

    /// Returns the number of declared parameters.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if the schema declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Finds the declared parameter matching the first alias that matches any.
    ///
    /// Aliases are tried in priority order; for each alias the declared
    /// parameters are scanned in declaration order with a case-insensitive
    /// comparison. No match is not an error.
    pub fn find(&self, aliases: &[&str]) -> Option<&dyn ParameterDefinition> {
        debug!(aliases = %aliases.join(","), "Looking for a declared parameter");
        for alias in aliases {
            if let Some(definition) = self
                .definitions()
                .find(|definition| names_match(definition.name(), alias))
            {
                debug!(
                    alias = *alias,
                    parameter = definition.name(),
                    kind = definition.kind(),
                    "Found declared parameter"
                );
                return Some(definition);
            }
        }
        debug!(aliases = %aliases.join(","), "No matching declared parameter");
        None
    }
}

impl std::fmt::Debug for ParameterSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.definitions().map(|d| d.name()))
            .finish()
    }
}

fn names_match(declared: &str, candidate: &str) -> bool {
    declared.to_lowercase() == candidate.to_lowercase()
}

//! Shared value types for trigger handling.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! the data that flows from an accepted trigger to the execution host:
//! concrete parameter values, correlation metadata, and diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IssueKey, IssueUrl, UserName};

// ---------------------------------------------------------------------------
// Parameter values
// ---------------------------------------------------------------------------

/// A secret string whose content never appears in `Debug`, `Display`, or
/// serialised output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    const REDACTED: &'static str = "********";

    /// Wraps a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret content. Only the execution host should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret({})", Self::REDACTED)
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(Self::REDACTED)
    }
}

impl Serialize for Secret {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::REDACTED)
    }
}

/// The typed content of a [`ParameterValue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterData {
    /// Free text (single- or multi-line).
    String(String),
    /// A boolean flag.
    Boolean(bool),
    /// A secret string.
    Password(Secret),
}

impl std::fmt::Display for ParameterData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Password(secret) => write!(f, "{secret}"),
        }
    }
}

/// One concrete input value submitted with an execution.
///
/// `name` is always the declared parameter's canonical name, never the
/// caller-supplied spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterValue {
    /// Canonical parameter name as declared by the job.
    pub name: String,
    /// The declared parameter's description, used as a display label.
    pub description: Option<String>,
    /// The value itself.
    pub value: ParameterData,
}

impl ParameterValue {
    /// Creates a string-valued parameter.
    pub fn string(
        name: impl Into<String>,
        value: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            value: ParameterData::String(value.into()),
        }
    }

    /// Creates a boolean-valued parameter.
    pub fn boolean(name: impl Into<String>, value: bool, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            value: ParameterData::Boolean(value),
        }
    }

    /// Creates a password-valued parameter.
    pub fn password(
        name: impl Into<String>,
        value: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            value: ParameterData::Password(Secret::new(value)),
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// The ordered parameter values submitted with one execution.
///
/// Order: issue-key parameter, issue-url parameter, then values derived from
/// the caller's parameter list in the order the caller listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedParameterSet(Vec<ParameterValue>);

impl ResolvedParameterSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value at the end of the set.
    pub fn push(&mut self, value: ParameterValue) {
        self.0.push(value);
    }

    /// Returns the values in submission order.
    pub fn values(&self) -> &[ParameterValue] {
        &self.0
    }

    /// Returns the value with the given canonical name, if any.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.0.iter().find(|v| v.name == name)
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ResolvedParameterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

// ---------------------------------------------------------------------------
// Correlation metadata
// ---------------------------------------------------------------------------

/// Why and by whom a run was requested. Created once per trigger and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationMetadata {
    issue_key: Option<IssueKey>,
    issue_url: Option<IssueUrl>,
    triggered_by: UserName,
}

impl CorrelationMetadata {
    /// Records the cause of a run.
    pub fn new(
        issue_key: Option<IssueKey>,
        issue_url: Option<IssueUrl>,
        triggered_by: UserName,
    ) -> Self {
        Self {
            issue_key,
            issue_url,
            triggered_by,
        }
    }

    /// The issue that caused the run, if the caller named one.
    pub fn issue_key(&self) -> Option<&IssueKey> {
        self.issue_key.as_ref()
    }

    /// The URL of the issue that caused the run, if supplied.
    pub fn issue_url(&self) -> Option<&IssueUrl> {
        self.issue_url.as_ref()
    }

    /// The user the run was requested by.
    pub fn triggered_by(&self) -> &UserName {
        &self.triggered_by
    }
}

impl std::fmt::Display for CorrelationMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.issue_key {
            Some(key) => write!(f, "Triggered by {} from issue {key}", self.triggered_by),
            None => write!(f, "Triggered by {}", self.triggered_by),
        }
    }
}

/// Display-only reference from a run to the issue that caused it.
///
/// Only produced when both the issue key and the issue URL are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    /// Key of the linked issue.
    pub issue_key: IssueKey,
    /// Browsable URL of the linked issue.
    pub issue_url: IssueUrl,
}

/// A record attached to a queued execution as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextRecord {
    /// The cause of the run.
    Cause(CorrelationMetadata),
    /// Link to the issue for display.
    IssueLink(IssueLink),
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Severity level for a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    /// A declared parameter received no value; the run proceeds without it.
    Warning,
    /// Contextual information with no impact on the run.
    Informational,
}

/// A non-fatal finding from reconciliation.
///
/// Kept for operators reconciling naming differences between the issue
/// tracker and the job; never returned to the external caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The parameter name the finding concerns (declared name when matched,
    /// caller-supplied name otherwise).
    pub parameter: String,
    /// Severity of this finding.
    pub severity: DiagnosticSeverity,
    /// Human-readable description of the finding.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns this timestamp shifted forward by `delay`.
    ///
    /// Delays too large to represent saturate at this timestamp.
    pub fn after(self, delay: std::time::Duration) -> Self {
        chrono::Duration::from_std(delay)
            .ok()
            .and_then(|d| self.0.checked_add_signed(d))
            .map_or(self, Timestamp)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

//! Parameter reconciliation.
//!
//! Matches the issue data and the caller's proposed parameters against a job's
//! declared [`ParameterSchema`] and produces the ordered
//! [`ResolvedParameterSet`] submitted with the run.
//!
//! Order of the result:
//!
//! 1. the issue-key parameter (aliases `issueKey`, `issue_key`), if declared
//!    and an issue key was supplied;
//! 2. the issue-url parameter (aliases `issueUrl`, `issue_url`), likewise;
//! 3. one value per caller entry that names a declared parameter, in the
//!    caller's order.
//!
//! Resolution problems never fail the request; they are recorded as
//! [`Diagnostic`]s.

use tracing::{debug, trace, warn};

use crate::{
    Diagnostic, DiagnosticSeverity, IssueKey, IssueUrl, ParameterSchema, ParameterValue,
    RawParameterEntry, RequestContext, ResolvedParameterSet,
};

/// Declared-parameter aliases that receive the issue key, in priority order.
pub const ISSUE_KEY_ALIASES: [&str; 2] = ["issueKey", "issue_key"];

/// Declared-parameter aliases that receive the issue URL, in priority order.
pub const ISSUE_URL_ALIASES: [&str; 2] = ["issueUrl", "issue_url"];

/// The outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Values to submit, in submission order.
    pub parameters: ResolvedParameterSet,
    /// Non-fatal findings, in the order they were encountered.
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves issue data and caller entries against `schema`.
///
/// With no schema the job cannot accept parameters, so everything is
/// discarded and the result is empty. Given identical inputs the result is
/// identical.
pub fn reconcile(
    schema: Option<&ParameterSchema>,
    issue_key: Option<&IssueKey>,
    issue_url: Option<&IssueUrl>,
    entries: &[RawParameterEntry],
    ctx: &RequestContext<'_>,
) -> Reconciliation {
    let mut result = Reconciliation::default();
    let Some(schema) = schema else {
        debug!(
            entries = entries.len(),
            "Job declares no parameters; discarding issue data and caller entries"
        );
        return result;
    };

    if let Some(key) = issue_key {
        resolve_implicit(schema, &ISSUE_KEY_ALIASES, key.as_str(), &mut result);
    }
    if let Some(url) = issue_url {
        resolve_implicit(schema, &ISSUE_URL_ALIASES, url.as_str(), &mut result);
    }

    if !entries.is_empty() {
        debug!(entries = entries.len(), "Matching job parameters to caller-supplied values");
    }
    for entry in entries {
        resolve_entry(schema, entry, ctx, &mut result);
    }

    result
}

fn resolve_implicit(
    schema: &ParameterSchema,
    aliases: &[&str],
    value: &str,
    result: &mut Reconciliation,
) {
    match schema.find(aliases) {
        Some(definition) => result.parameters.push(ParameterValue::string(
            definition.name(),
            value,
            definition.description().map(str::to_owned),
        )),
        None => trace!(aliases = %aliases.join(","), "Job has no parameter for implicit value"),
    }
}

fn resolve_entry(
    schema: &ParameterSchema,
    entry: &RawParameterEntry,
    ctx: &RequestContext<'_>,
    result: &mut Reconciliation,
) {
    let Some(definition) = schema.find(&[entry.name()]) else {
        debug!(parameter = entry.name(), "Skipping entry that names no declared parameter");
        result.diagnostics.push(Diagnostic {
            parameter: entry.name().to_owned(),
            severity: DiagnosticSeverity::Informational,
            message: "no declared parameter with this name; entry skipped".to_owned(),
        });
        return;
    };

    let canonical = entry.renamed(definition.name());
    if let Some(value) = definition
        .construct_value(ctx, &canonical)
        .or_else(|| definition.default_value())
    {
        result.parameters.push(value);
        return;
    }

    warn!(
        parameter = definition.name(),
        "Unable to match a value for parameter: none supplied and no default declared"
    );
    result.diagnostics.push(Diagnostic {
        parameter: definition.name().to_owned(),
        severity: DiagnosticSeverity::Warning,
        message: "no value resolvable and no default".to_owned(),
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::{
        ParameterData, ParameterDefinition, ParameterSpec, TriggerPayload, UserName,
    };

    fn string(name: &str) -> ParameterSpec {
        ParameterSpec::String {
            name: name.into(),
            description: None,
            default: None,
            trim: false,
        }
    }

    fn entries(values: Value) -> Vec<RawParameterEntry> {
        RawParameterEntry::parse_all(values.as_array().expect("array")).expect("entries")
    }

    fn run(
        schema: Option<&ParameterSchema>,
        key: Option<&str>,
        url: Option<&str>,
        raw: Value,
    ) -> Reconciliation {
        let payload = TriggerPayload::default();
        let by = UserName::new("alice");
        let ctx = RequestContext::new(&payload, &by);
        reconcile(
            schema,
            key.map(IssueKey::new).as_ref(),
            url.map(IssueUrl::new).as_ref(),
            &entries(raw),
            &ctx,
        )
    }

    fn names(r: &Reconciliation) -> Vec<&str> {
        r.parameters.values().iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn issue_key_then_caller_entries_in_order() {
        let schema = ParameterSchema::from_specs(vec![string("issue_key"), string("branch")]).unwrap();
        let r = run(
            Some(&schema),
            Some("ABC-1"),
            None,
            json!([{ "name": "Branch", "value": "main" }]),
        );
        assert_eq!(r.parameters.to_string(), "[issue_key=ABC-1, branch=main]");
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn implicit_values_precede_entries_even_when_declared_last() {
        let schema = ParameterSchema::from_specs(vec![
            string("branch"),
            string("ISSUE_URL"),
            string("issueKey"),
        ])
        .unwrap();
        let r = run(
            Some(&schema),
            Some("ABC-1"),
            Some("https://jira.example/browse/ABC-1"),
            json!([{ "name": "branch", "value": "dev" }]),
        );
        assert_eq!(names(&r), ["issueKey", "ISSUE_URL", "branch"]);
        assert_eq!(
            r.parameters.get("ISSUE_URL").map(|v| &v.value),
            Some(&ParameterData::String("https://jira.example/browse/ABC-1".into()))
        );
    }

    #[test]
    fn camel_case_alias_wins_when_both_are_declared() {
        let schema =
            ParameterSchema::from_specs(vec![string("issue_key"), string("issuekey")]).unwrap();
        let r = run(Some(&schema), Some("ABC-1"), None, json!([]));
        assert_eq!(names(&r), ["issuekey"]);
    }

    #[test]
    fn camel_case_url_alias_wins_when_both_are_declared() {
        let schema =
            ParameterSchema::from_specs(vec![string("issue_url"), string("issueUrl")]).unwrap();
        let r = run(Some(&schema), None, Some("https://x"), json!([]));
        assert_eq!(names(&r), ["issueUrl"]);
        assert_eq!(
            r.parameters.get("issueUrl").map(|v| &v.value),
            Some(&ParameterData::String("https://x".into()))
        );
    }

    #[test]
    fn empty_issue_key_still_fills_its_parameter() {
        let schema = ParameterSchema::from_specs(vec![string("issue_key")]).unwrap();
        let r = run(Some(&schema), Some(""), None, json!([]));
        assert_eq!(r.parameters.to_string(), "[issue_key=]");
    }

    #[test]
    fn implicit_value_uses_declared_description_as_label() {
        let schema = ParameterSchema::from_specs(vec![ParameterSpec::String {
            name: "ISSUE_KEY".into(),
            description: Some("Jira issue".into()),
            default: None,
            trim: false,
        }])
        .unwrap();
        let r = run(Some(&schema), Some("ABC-1"), None, json!([]));
        let value = &r.parameters.values()[0];
        assert_eq!(value.name, "ISSUE_KEY");
        assert_eq!(value.description.as_deref(), Some("Jira issue"));
    }

    #[test]
    fn missing_issue_data_or_parameter_is_skipped_silently() {
        let schema = ParameterSchema::from_specs(vec![string("branch")]).unwrap();
        let r = run(Some(&schema), Some("ABC-1"), Some("https://x"), json!([]));
        assert!(r.parameters.is_empty());
        assert!(r.diagnostics.is_empty());

        let schema = ParameterSchema::from_specs(vec![string("issue_key")]).unwrap();
        let r = run(Some(&schema), None, None, json!([]));
        assert!(r.parameters.is_empty());
    }

    #[test]
    fn unknown_entries_contribute_nothing() {
        let schema = ParameterSchema::from_specs(vec![string("branch")]).unwrap();
        let r = run(
            Some(&schema),
            None,
            None,
            json!([{ "name": "colour", "value": "blue" }, { "name": "BRANCH", "value": "x" }]),
        );
        assert_eq!(names(&r), ["branch"]);
        assert_eq!(r.diagnostics.len(), 1);
        assert_eq!(r.diagnostics[0].parameter, "colour");
        assert_eq!(r.diagnostics[0].severity, DiagnosticSeverity::Informational);
    }

    #[test]
    fn default_fills_position_of_unconstructable_entry() {
        let schema = ParameterSchema::from_specs(vec![
            string("first"),
            ParameterSpec::Choice {
                name: "env".into(),
                description: None,
                choices: vec!["staging".into(), "production".into()],
            },
            string("last"),
        ])
        .unwrap();
        let r = run(
            Some(&schema),
            None,
            None,
            json!([
                { "name": "first", "value": "1" },
                { "name": "ENV", "value": "moon" },
                { "name": "last", "value": "3" }
            ]),
        );
        assert_eq!(r.parameters.to_string(), "[first=1, env=staging, last=3]");
    }

    #[test]
    fn unresolvable_entry_without_default_is_omitted_with_warning() {
        let schema = ParameterSchema::from_specs(vec![string("branch"), string("tag")]).unwrap();
        let r = run(
            Some(&schema),
            None,
            None,
            json!([{ "name": "branch" }, { "name": "tag", "value": "v1" }]),
        );
        assert_eq!(names(&r), ["tag"]);
        assert_eq!(
            r.diagnostics,
            vec![Diagnostic {
                parameter: "branch".into(),
                severity: DiagnosticSeverity::Warning,
                message: "no value resolvable and no default".into(),
            }]
        );
    }

    #[test]
    fn no_schema_discards_everything() {
        let r = run(
            None,
            Some("ABC-1"),
            Some("https://x"),
            json!([{ "name": "x", "value": "y" }]),
        );
        assert_eq!(r, Reconciliation::default());
    }

    #[test]
    fn reconciliation_is_deterministic() {
        let schema = ParameterSchema::from_specs(vec![
            string("issue_key"),
            string("branch"),
            ParameterSpec::Boolean {
                name: "dry_run".into(),
                description: None,
                default: true,
            },
        ])
        .unwrap();
        let raw = json!([
            { "name": "dry_run", "value": "nope" },
            { "name": "branch", "value": "main" },
            { "name": "unknown" }
        ]);
        let first = run(Some(&schema), Some("ABC-1"), None, raw.clone());
        let second = run(Some(&schema), Some("ABC-1"), None, raw);
        assert_eq!(first, second);
        assert_eq!(first.parameters.to_string(), "[issue_key=ABC-1, dry_run=true, branch=main]");
    }

    /// A custom kind that consults the request context.
    #[derive(Debug)]
    struct RequesterParameter;

    impl ParameterDefinition for RequesterParameter {
        fn name(&self) -> &str {
            "requester"
        }

        fn description(&self) -> Option<&str> {
            None
        }

        fn kind(&self) -> &str {
            "requester"
        }

        fn construct_value(
            &self,
            ctx: &RequestContext<'_>,
            entry: &RawParameterEntry,
        ) -> Option<ParameterValue> {
            assert_eq!(entry.name(), "requester");
            Some(ParameterValue::string(
                self.name(),
                ctx.triggered_by().as_str(),
                None,
            ))
        }

        fn default_value(&self) -> Option<ParameterValue> {
            None
        }
    }

    #[test]
    fn custom_kinds_receive_canonical_entry_and_context() {
        let definitions: Vec<Arc<dyn ParameterDefinition>> = vec![Arc::new(RequesterParameter)];
        let schema = ParameterSchema::new(definitions).unwrap();
        let r = run(Some(&schema), None, None, json!([{ "name": "REQUESTER" }]));
        assert_eq!(r.parameters.to_string(), "[requester=alice]");
    }
}

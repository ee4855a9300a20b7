//! Trigger intake.
//!
//! Turns an authenticated trigger payload for one job into either an
//! [`ExecutionRequest`] ready for [`crate::submit`] or a [`Rejection`].
//! Intake has no side effects: it never talks to the execution host, so a
//! failed intake queues nothing.

use tracing::{debug, info, instrument};

use crate::payload::{BY, ISSUE_KEY, ISSUE_URL, PARAMETERS};
use crate::reconcile::reconcile;
use crate::{
    ContextRecord, CorrelationMetadata, Diagnostic, IssueKey, IssueLink, IssueUrl, JobName,
    RawParameterEntry, RequestContext, ResolvedParameterSet, TriggerError, TriggerPayload,
    TriggerTarget, UserName,
};

/// HTTP status recommended when a job cannot accept runs (406 Not Acceptable).
pub const NOT_ACCEPTABLE: u16 = 406;

/// Everything the execution host needs to queue one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// The job to run.
    pub job: JobName,
    /// Why and by whom the run was requested.
    pub cause: CorrelationMetadata,
    /// Issue link for display; present only when both key and URL are known.
    pub link: Option<IssueLink>,
    /// Input values; `None` when the job declares no parameters at all.
    pub parameters: Option<ResolvedParameterSet>,
    /// Reconciliation findings for operators. Never shown to the caller.
    pub diagnostics: Vec<Diagnostic>,
}

impl ExecutionRequest {
    /// The context records to attach to the queued run, cause first.
    pub fn context_records(&self) -> Vec<ContextRecord> {
        let mut records = vec![ContextRecord::Cause(self.cause.clone())];
        if let Some(link) = &self.link {
            records.push(ContextRecord::IssueLink(link.clone()));
        }
        records
    }
}

/// Why a trigger was refused without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The job cannot currently accept new runs.
    NotEligible,
}

/// A refused trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The job that refused the trigger.
    pub job: JobName,
    /// Why it was refused.
    pub reason: RejectionReason,
}

impl Rejection {
    /// The status code the transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self.reason {
            RejectionReason::NotEligible => NOT_ACCEPTABLE,
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            RejectionReason::NotEligible => write!(f, "job {} is not eligible to run", self.job),
        }
    }
}

/// Result of a successful intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The trigger produced a request to submit.
    Accepted(ExecutionRequest),
    /// The job refused the trigger.
    Rejected(Rejection),
}

/// Validates a trigger for `job` and assembles the execution request.
///
/// Eligibility is checked before the payload is looked at. Any
/// [`TriggerError::MalformedPayload`] fails the whole request.
#[instrument(skip_all, fields(job = %job.job_name()))]
pub fn handle_trigger(
    job: &dyn TriggerTarget,
    payload: &TriggerPayload,
) -> Result<TriggerOutcome, TriggerError> {
    if let Some(rejection) = check_eligibility(job) {
        return Ok(TriggerOutcome::Rejected(rejection));
    }
    accept(job, payload)
}

/// Like [`handle_trigger`], for a request body that has not been decoded yet.
///
/// The body is only decoded once the job is known to be eligible, so an
/// ineligible job is rejected even when the body is not valid JSON.
#[instrument(skip_all, fields(job = %job.job_name()))]
pub fn handle_trigger_body(
    job: &dyn TriggerTarget,
    body: &[u8],
) -> Result<TriggerOutcome, TriggerError> {
    if let Some(rejection) = check_eligibility(job) {
        return Ok(TriggerOutcome::Rejected(rejection));
    }
    let payload = TriggerPayload::from_slice(body)?;
    accept(job, &payload)
}

fn check_eligibility(job: &dyn TriggerTarget) -> Option<Rejection> {
    if job.is_eligible_to_run() {
        return None;
    }
    info!("Job is not eligible to run; rejecting trigger");
    Some(Rejection {
        job: job.job_name().clone(),
        reason: RejectionReason::NotEligible,
    })
}

fn accept(job: &dyn TriggerTarget, payload: &TriggerPayload) -> Result<TriggerOutcome, TriggerError> {
    let triggered_by = UserName::new(payload.get_required_string(BY)?);
    let issue_key = payload
        .get_optional_string(ISSUE_KEY, None)
        .map(IssueKey::new);
    let issue_url = payload
        .get_optional_string(ISSUE_URL, None)
        .map(IssueUrl::new);
    info!(
        by = %triggered_by,
        issue_key = issue_key.as_ref().map(IssueKey::as_str),
        "Received build trigger"
    );
    debug!(payload = %serde_json::Value::Object(payload.as_map().clone()), "Trigger payload");

    let link = match (&issue_key, &issue_url) {
        (Some(key), Some(url)) => Some(IssueLink {
            issue_key: key.clone(),
            issue_url: url.clone(),
        }),
        _ => None,
    };
    let entries = RawParameterEntry::parse_all(payload.get_optional_list(PARAMETERS))?;

    let ctx = RequestContext::new(payload, &triggered_by);
    let (parameters, diagnostics) = match job.parameter_schema() {
        Some(schema) => {
            let reconciled = reconcile(
                Some(schema),
                issue_key.as_ref(),
                issue_url.as_ref(),
                &entries,
                &ctx,
            );
            (Some(reconciled.parameters), reconciled.diagnostics)
        }
        None => {
            debug!(
                entries = entries.len(),
                "Job declares no parameters; submitting without a parameter set"
            );
            (None, Vec::new())
        }
    };

    Ok(TriggerOutcome::Accepted(ExecutionRequest {
        job: job.job_name().clone(),
        cause: CorrelationMetadata::new(issue_key, issue_url, triggered_by),
        link,
        parameters,
        diagnostics,
    }))
}

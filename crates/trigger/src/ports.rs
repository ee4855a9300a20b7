//! Port traits implemented by infrastructure crates.
//!
//! The trigger domain never looks up jobs or the execution host from ambient
//! state; callers inject implementations of these traits.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::{ContextRecord, ExecutionId, JobName, ParameterSchema, ResolvedParameterSet};

/// A job that can be the target of a trigger.
pub trait TriggerTarget: Send + Sync {
    /// The job's name, for logging and submission.
    fn job_name(&self) -> &JobName;

    /// Returns `false` if the job cannot currently accept new runs (e.g. disabled).
    fn is_eligible_to_run(&self) -> bool;

    /// The job's declared parameters, or `None` if it declares none at all.
    fn parameter_schema(&self) -> Option<&ParameterSchema>;
}

/// Lookup of the jobs that may be triggered.
pub trait JobCatalog: Send + Sync {
    /// Returns the job with exactly this name, if it exists.
    fn find_job(&self, name: &str) -> Option<Arc<dyn TriggerTarget>>;
}

/// The execution host could not accept a submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostUnavailable {
    /// Description of the failure.
    pub message: String,
}

/// Queueing side of the job-execution host.
///
/// Implementations must be safe to call from concurrent requests and must not
/// block: `schedule` enqueues and returns.
pub trait ExecutionHost: Send + Sync {
    /// Queues one run of `job` to start no earlier than `delay` from now.
    fn schedule(
        &self,
        job: &JobName,
        delay: Duration,
        context: Vec<ContextRecord>,
        parameters: Option<ResolvedParameterSet>,
    ) -> Result<ExecutionId, HostUnavailable>;
}

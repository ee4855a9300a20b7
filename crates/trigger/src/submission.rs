//! Execution submission: hands an accepted request to the execution host.

use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::{DiagnosticSeverity, ExecutionHost, ExecutionId, ExecutionRequest, TriggerError};

/// Triggered runs are queued to start immediately.
pub const SCHEDULE_DELAY: Duration = Duration::ZERO;

/// Queues `request` on `host` with zero delay.
///
/// Returns as soon as the host has accepted the run; the host owns its
/// lifecycle from then on. A host that cannot accept work yields
/// [`TriggerError::HostUnavailable`], which callers must treat as fatal.
#[instrument(skip_all, fields(job = %request.job))]
pub fn submit(
    host: &dyn ExecutionHost,
    request: ExecutionRequest,
) -> Result<ExecutionId, TriggerError> {
    let warnings = request
        .diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Warning)
        .count();
    if warnings > 0 {
        warn!(warnings, "Submitting with unresolved parameters omitted");
    }

    let context = request.context_records();
    match host.schedule(&request.job, SCHEDULE_DELAY, context, request.parameters) {
        Ok(id) => {
            info!(execution = %id, "Queued execution");
            Ok(id)
        }
        Err(fault) => {
            error!(error = %fault, "Execution host rejected submission");
            Err(TriggerError::HostUnavailable {
                message: fault.message,
            })
        }
    }
}

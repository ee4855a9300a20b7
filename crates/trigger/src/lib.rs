//! Core domain for issuehook.
//!
//! Converts an authenticated trigger from an issue tracker into a request to
//! run a job, reconciling the caller's loosely structured data against the
//! job's declared parameters. Infrastructure crates implement the traits
//! defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`JobName`, `IssueKey`, `ExecutionId`, etc.) |
//! | [`types`] | Parameter values, correlation metadata, diagnostics |
//! | [`parameters`] | Declared parameter kinds and the schema lookup |
//! | [`payload`] | Field access on the incoming payload |
//! | [`reconcile`] | Parameter reconciliation |
//! | [`intake`] | Trigger intake: eligibility, correlation data, request assembly |
//! | [`submission`] | Hand-off to the execution host |
//! | [`ports`] | `TriggerTarget`, `JobCatalog` and `ExecutionHost` traits |
//! | [`errors`] | Request-level error type |

pub mod errors;
pub mod identifiers;
pub mod intake;
pub mod parameters;
pub mod payload;
pub mod ports;
pub mod reconcile;
pub mod submission;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::TriggerError;
pub use identifiers::{ExecutionId, IssueKey, IssueUrl, JobName, UserName};
pub use intake::{
    handle_trigger, handle_trigger_body, ExecutionRequest, Rejection, RejectionReason,
    TriggerOutcome,
};
pub use parameters::{ParameterDefinition, ParameterSchema, ParameterSpec, SchemaError};
pub use payload::{RawParameterEntry, RequestContext, TriggerPayload};
pub use ports::{ExecutionHost, HostUnavailable, JobCatalog, TriggerTarget};
pub use reconcile::{reconcile, Reconciliation};
pub use submission::submit;
pub use types::{
    ContextRecord, CorrelationMetadata, Diagnostic, DiagnosticSeverity, IssueLink, ParameterData,
    ParameterValue, ResolvedParameterSet, Secret, Timestamp,
};

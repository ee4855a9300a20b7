//! issuehook execution host adapter.
//!
//! Implements the [`trigger::TriggerTarget`] and [`trigger::ExecutionHost`]
//! traits for a single-process deployment:
//!
//! - [`JobRegistry`]: the configured jobs and their declared parameters,
//!   built once at start-up and shared read-only.
//! - [`QueueHost`] / [`QueueConsumer`]: a non-blocking run queue. The
//!   listener enqueues through [`QueueHost`]; the runner drains
//!   [`QueueConsumer`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Queueing and configuration details live here. The
//! [`trigger`] crate sees only its own traits.

pub mod queue;
pub mod registry;

pub use queue::{channel, QueueConsumer, QueueHost, QueuedExecution};
pub use registry::{ConfiguredJob, JobConfig, JobRegistry, RegistryError};

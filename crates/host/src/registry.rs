//! Jobs known to this deployment.
//!
//! The registry is built once from configuration and then shared read-only
//! between concurrent triggers; nothing in it is mutated after construction.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use trigger::{JobCatalog, JobName, ParameterSchema, ParameterSpec, SchemaError, TriggerTarget};

/// One `[[jobs]]` entry of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name as used in the trigger URL.
    pub name: String,

    /// Disabled jobs refuse triggers with 406.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Declared parameters. When omitted, the job declares no parameters at all
    /// and caller-supplied values are discarded. An explicit empty list is a
    /// schema with no entries.
    #[serde(default)]
    pub parameters: Option<Vec<ParameterSpec>>,
}

fn default_enabled() -> bool {
    true
}

/// Errors building the registry from configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A job was configured with an empty name.
    #[error("job name must not be empty")]
    EmptyJobName,

    /// Two jobs share a name.
    #[error("job '{0}' is configured more than once")]
    DuplicateJob(String),

    /// A job's parameter declarations are invalid.
    #[error("job '{job}' has an invalid parameter schema: {source}")]
    InvalidSchema {
        /// The offending job.
        job: String,
        /// What is wrong with the schema.
        #[source]
        source: SchemaError,
    },
}

/// A job built from configuration.
#[derive(Debug)]
pub struct ConfiguredJob {
    name: JobName,
    enabled: bool,
    schema: Option<ParameterSchema>,
}

impl ConfiguredJob {
    /// Builds a job from its configuration entry.
    pub fn from_config(config: JobConfig) -> Result<Self, RegistryError> {
        let name = JobName::new(config.name.trim()).ok_or(RegistryError::EmptyJobName)?;
        let schema = config
            .parameters
            .map(ParameterSchema::from_specs)
            .transpose()
            .map_err(|source| RegistryError::InvalidSchema {
                job: name.to_string(),
                source,
            })?;
        Ok(Self {
            name,
            enabled: config.enabled,
            schema,
        })
    }
}

impl TriggerTarget for ConfiguredJob {
    fn job_name(&self) -> &JobName {
        &self.name
    }

    fn is_eligible_to_run(&self) -> bool {
        self.enabled
    }

    fn parameter_schema(&self) -> Option<&ParameterSchema> {
        self.schema.as_ref()
    }
}

/// Immutable lookup of configured jobs by name.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<HashMap<String, Arc<ConfiguredJob>>>,
}

impl JobRegistry {
    /// Builds the registry, validating every job.
    pub fn from_config(configs: Vec<JobConfig>) -> Result<Self, RegistryError> {
        let mut jobs = HashMap::with_capacity(configs.len());
        for config in configs {
            let job = ConfiguredJob::from_config(config)?;
            let key = job.name.as_str().to_owned();
            if jobs.contains_key(&key) {
                return Err(RegistryError::DuplicateJob(key));
            }
            info!(
                job = %job.name,
                enabled = job.enabled,
                parameters = job.schema.as_ref().map(ParameterSchema::len),
                "Registered job"
            );
            jobs.insert(key, Arc::new(job));
        }
        Ok(Self {
            jobs: Arc::new(jobs),
        })
    }

    /// Returns the job with exactly this name.
    pub fn get(&self, name: &str) -> Option<Arc<ConfiguredJob>> {
        self.jobs.get(name).cloned()
    }

    /// Returns the number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns `true` if no jobs are registered.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl JobCatalog for JobRegistry {
    fn find_job(&self, name: &str) -> Option<Arc<dyn TriggerTarget>> {
        self.get(name).map(|job| job as Arc<dyn TriggerTarget>)
    }
}

//! In-process run queue.
//!
//! [`QueueHost`] is the producer side handed to the trigger listener; it never
//! blocks. [`QueueConsumer`] is the receiving side owned by whatever actually
//! runs jobs. When the consumer is dropped the host reports itself
//! unavailable.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;
use trigger::{
    ContextRecord, ExecutionHost, ExecutionId, HostUnavailable, JobName, ResolvedParameterSet,
    Timestamp,
};

/// One run waiting to be picked up by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedExecution {
    /// Identifier assigned when the run was queued.
    pub id: ExecutionId,
    /// The job to run.
    pub job: JobName,
    /// When the run was queued.
    pub enqueued_at: Timestamp,
    /// Earliest time the run may start.
    pub not_before: Timestamp,
    /// Cause and issue-link records.
    pub context: Vec<ContextRecord>,
    /// Input values; `None` for jobs without declared parameters.
    pub parameters: Option<ResolvedParameterSet>,
}

/// Creates a connected host/consumer pair.
pub fn channel() -> (QueueHost, QueueConsumer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueHost { tx }, QueueConsumer { rx })
}

/// Producer side of the run queue. Cheap to clone; safe to share.
#[derive(Debug, Clone)]
pub struct QueueHost {
    tx: mpsc::UnboundedSender<QueuedExecution>,
}

impl ExecutionHost for QueueHost {
    fn schedule(
        &self,
        job: &JobName,
        delay: Duration,
        context: Vec<ContextRecord>,
        parameters: Option<ResolvedParameterSet>,
    ) -> Result<ExecutionId, HostUnavailable> {
        let enqueued_at = Timestamp::now();
        let execution = QueuedExecution {
            id: ExecutionId::new_random(),
            job: job.clone(),
            enqueued_at,
            not_before: enqueued_at.after(delay),
            context,
            parameters,
        };
        let id = execution.id;
        self.tx.send(execution).map_err(|_| HostUnavailable {
            message: "run queue consumer has shut down".to_owned(),
        })?;
        debug!(execution = %id, job = %job, "Enqueued run");
        Ok(id)
    }
}

/// Consumer side of the run queue.
#[derive(Debug)]
pub struct QueueConsumer {
    rx: mpsc::UnboundedReceiver<QueuedExecution>,
}

impl QueueConsumer {
    /// Waits for the next queued run. Returns `None` once every [`QueueHost`]
    /// has been dropped and the queue is drained.
    pub async fn next(&mut self) -> Option<QueuedExecution> {
        self.rx.recv().await
    }

    /// Returns the next queued run without waiting.
    pub fn try_next(&mut self) -> Option<QueuedExecution> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trigger::{CorrelationMetadata, ParameterValue, UserName};

    fn job() -> JobName {
        JobName::new("deploy").unwrap()
    }

    #[tokio::test]
    async fn scheduled_runs_arrive_in_order() {
        let (host, mut consumer) = channel();
        let cause = ContextRecord::Cause(CorrelationMetadata::new(
            None,
            None,
            UserName::new("alice"),
        ));
        let mut parameters = ResolvedParameterSet::new();
        parameters.push(ParameterValue::string("branch", "main", None));

        let first = host
            .schedule(&job(), Duration::ZERO, vec![cause.clone()], Some(parameters))
            .unwrap();
        let second = host.schedule(&job(), Duration::ZERO, vec![cause], None).unwrap();

        let a = consumer.next().await.unwrap();
        let b = consumer.next().await.unwrap();
        assert_eq!(a.id, first);
        assert_eq!(b.id, second);
        assert_eq!(a.not_before, a.enqueued_at);
        assert_eq!(a.parameters.map(|p| p.len()), Some(1));
        assert!(b.parameters.is_none());
        assert!(consumer.try_next().is_none());
    }

    #[test]
    fn delay_is_applied_to_not_before() {
        let (host, mut consumer) = channel();
        host.schedule(&job(), Duration::from_secs(60), Vec::new(), None)
            .unwrap();
        let queued = consumer.try_next().unwrap();
        assert!(queued.not_before > queued.enqueued_at);
    }

    #[test]
    fn dropped_consumer_makes_host_unavailable() {
        let (host, consumer) = channel();
        drop(consumer);
        let err = host
            .schedule(&job(), Duration::ZERO, Vec::new(), None)
            .unwrap_err();
        assert!(err.message.contains("shut down"));
    }

    #[tokio::test]
    async fn consumer_ends_when_hosts_are_dropped() {
        let (host, mut consumer) = channel();
        let clone = host.clone();
        drop(host);
        clone
            .schedule(&job(), Duration::ZERO, Vec::new(), None)
            .unwrap();
        drop(clone);
        assert!(consumer.next().await.is_some());
        assert!(consumer.next().await.is_none());
    }
}

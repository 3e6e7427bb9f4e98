// src/scheduler/client.rs

use std::fmt;

use thiserror::Error;

use crate::task::TaskDescriptor;

/// Which client operation a [`SchedulerError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerOp {
    Submit,
    Wait,
    Resources,
    Finish,
    Stop,
    Cleanup,
}

impl fmt::Display for SchedulerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchedulerOp::Submit => "submit",
            SchedulerOp::Wait => "wait",
            SchedulerOp::Resources => "resources",
            SchedulerOp::Finish => "finish",
            SchedulerOp::Stop => "stop",
            SchedulerOp::Cleanup => "cleanup",
        };
        f.write_str(s)
    }
}

/// Any failure surfaced by a scheduler client.
///
/// The submission core treats these as fatal: they abort the remaining
/// submission loop and propagate to the caller unchanged. Partial submissions
/// already accepted by the scheduler are not rolled back.
#[derive(Debug, Error)]
#[error("scheduler {op} failed: {message}")]
pub struct SchedulerError {
    op: SchedulerOp,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SchedulerError {
    pub fn new(op: SchedulerOp, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        op: SchedulerOp,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            op,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn op(&self) -> SchedulerOp {
        self.op
    }
}

/// Synchronous-in-spirit handle to the external pilot-job scheduler.
///
/// The scheduler is an opaque concurrent executor: it receives descriptors
/// with declared dependency edges and decides execution order itself.
/// Submission order only affects queuing; a dependency naming a task that has
/// not been submitted yet must resolve once that task arrives (deferred
/// dependency resolution is the scheduler's responsibility, not the core's).
pub trait SchedulerClient {
    /// Hand a batch of descriptors to the scheduler.
    async fn submit(&mut self, tasks: Vec<TaskDescriptor>) -> Result<(), SchedulerError>;

    /// Block until every submitted task has finished, successfully or not.
    /// Unbounded: there is no timeout and no cancellation hook.
    async fn wait_all(&mut self) -> Result<(), SchedulerError>;

    /// Human-readable description of the resources the scheduler manages.
    async fn resources(&mut self) -> Result<String, SchedulerError>;

    /// Let in-flight work drain before shutdown.
    async fn finish(&mut self) -> Result<(), SchedulerError>;

    /// Stop the scheduler service. Stopping twice is an error.
    async fn stop(&mut self) -> Result<(), SchedulerError>;

    /// Remove the scheduler's scratch state.
    async fn cleanup(&mut self) -> Result<(), SchedulerError>;
}

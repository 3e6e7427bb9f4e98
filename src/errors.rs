// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Everything the submission core can fail with is enumerated here; scheduler
//! failures are wrapped in [`SchedulerError`] by the client implementation and
//! propagate unchanged. The core performs no retries and no local recovery.

use thiserror::Error;

use crate::scheduler::SchedulerError;
use crate::task::TaskKind;

#[derive(Debug, Error)]
pub enum SweepqError {
    /// A builder needed a task spec that was never registered.
    #[error("no task spec registered for kind {0}")]
    MissingTaskSpec(TaskKind),

    /// A required field was absent where a task kind demands one
    /// (e.g. `application` for an execution spec).
    #[error("task spec for kind {kind} is missing required parameter '{param}'")]
    MissingParameter { kind: TaskKind, param: String },

    /// Descriptor construction was attempted for a reserved kind.
    #[error("task kind {0} is not supported for submission")]
    UnsupportedTaskKind(TaskKind),

    /// `run`/`terminate` was called before a scheduler manager was bound.
    #[error("no scheduler manager bound; call attach_manager or create_manager first")]
    ManagerNotBound,

    /// Any failure surfaced by the scheduler client (submission rejected,
    /// wait failed, shutdown failed). Fatal to the current operation.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("reading config file at {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing TOML config from {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Semantic validation of a loaded config failed.
    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    /// Scratch directory for the scheduler could not be created.
    #[error("creating scratch directory under {dir}: {source}")]
    ScratchDir {
        dir: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SweepqError>;

// src/task/spec.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::errors::{Result, SweepqError};

/// The kinds of work a registered task template can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskKind {
    Encoding,
    Execution,
    EncodingAndExecution,
    /// Reserved. Specs of this kind can be registered but never built.
    Other,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskKind::Encoding => "ENCODING",
            TaskKind::Execution => "EXECUTION",
            TaskKind::EncodingAndExecution => "ENCODING_AND_EXECUTION",
            TaskKind::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// Per-kind payload of a task spec.
///
/// Each variant carries exactly the fields its kind needs, so a spec that
/// reaches the builder is already complete; the free-form parameter mapping
/// this replaces deferred such failures to build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskWork {
    Encoding,
    Execution { application: String },
    EncodingAndExecution { application: String },
    Other,
}

impl TaskWork {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskWork::Encoding => TaskKind::Encoding,
            TaskWork::Execution { .. } => TaskKind::Execution,
            TaskWork::EncodingAndExecution { .. } => TaskKind::EncodingAndExecution,
            TaskWork::Other => TaskKind::Other,
        }
    }

    /// Path of the simulated application, for the kinds that launch one.
    pub fn application(&self) -> Option<&str> {
        match self {
            TaskWork::Execution { application }
            | TaskWork::EncodingAndExecution { application } => Some(application),
            TaskWork::Encoding | TaskWork::Other => None,
        }
    }
}

/// An exact value or a min/max range for one resource axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl ResourceRange {
    pub fn exact(n: u32) -> Self {
        Self {
            exact: Some(n),
            min: None,
            max: None,
        }
    }

    pub fn range(min: u32, max: u32) -> Self {
        Self {
            exact: None,
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Resource shape of one task, translated verbatim into the scheduler's
/// resource-request JSON (`numCores`, optionally `numNodes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRequirement {
    #[serde(rename = "numCores")]
    pub cores: ResourceRange,
    #[serde(rename = "numNodes", skip_serializing_if = "Option::is_none")]
    pub nodes: Option<ResourceRange>,
}

impl TaskRequirement {
    /// Require an exact number of cores.
    pub fn cores(n: u32) -> Self {
        Self {
            cores: ResourceRange::exact(n),
            nodes: None,
        }
    }

    pub fn cores_range(min: u32, max: u32) -> Self {
        Self {
            cores: ResourceRange::range(min, max),
            nodes: None,
        }
    }

    pub fn with_nodes(mut self, nodes: ResourceRange) -> Self {
        self.nodes = Some(nodes);
        self
    }
}

/// Template for building submittable descriptors of one kind.
///
/// Immutable once registered; the registry holds at most one spec per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    work: TaskWork,
    requirement: TaskRequirement,
    name: String,
}

impl TaskSpec {
    /// Create a spec; the name defaults to the kind's string form.
    pub fn new(work: TaskWork, requirement: TaskRequirement) -> Self {
        let name = work.kind().to_string();
        Self {
            work,
            requirement,
            name,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn kind(&self) -> TaskKind {
        self.work.kind()
    }

    pub fn work(&self) -> &TaskWork {
        &self.work
    }

    pub fn requirement(&self) -> &TaskRequirement {
        &self.requirement
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The application path, failing when this spec's kind carries none.
    pub fn application(&self) -> Result<&str> {
        self.work
            .application()
            .ok_or_else(|| SweepqError::MissingParameter {
                kind: self.kind(),
                param: "application".to_string(),
            })
    }
}

/// Registry of task specs, keyed by kind.
///
/// Owned by the executor instance; there is no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct SpecRegistry {
    specs: BTreeMap<TaskKind, TaskSpec>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a spec under its kind, silently overwriting any previous spec
    /// of the same kind.
    pub fn register(&mut self, spec: TaskSpec) {
        self.specs.insert(spec.kind(), spec);
    }

    pub fn get(&self, kind: TaskKind) -> Option<&TaskSpec> {
        self.specs.get(&kind)
    }

    /// Like [`get`](Self::get) but failing with `MissingTaskSpec`, for call
    /// sites where the spec is a precondition.
    pub fn lookup(&self, kind: TaskKind) -> Result<&TaskSpec> {
        self.specs
            .get(&kind)
            .ok_or(SweepqError::MissingTaskSpec(kind))
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

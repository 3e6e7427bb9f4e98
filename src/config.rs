// src/config.rs

//! TOML configuration surface.
//!
//! Mirrors what callers would otherwise assemble in code:
//!
//! ```toml
//! [manager]
//! dir = "/scratch"
//! resources = "node_1:2,node_2:3"
//! reserve_core = true
//! log_level = "info"
//!
//! [task.encoding]
//! cores = 1
//!
//! [task.execution]
//! cores = 4
//! application = "/apps/model"
//! ```
//!
//! Validation happens at load time: unknown task kinds, missing required
//! fields and malformed resource sets are reported before anything reaches
//! the scheduler.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::{Result, SweepqError};
use crate::scheduler::{ManagerOptions, ResourceSet};
use crate::task::{ResourceRange, TaskKind, TaskRequirement, TaskSpec, TaskWork};

/// Top-level configuration as read from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    /// `[manager]` section: how the scheduler is brought up.
    #[serde(default)]
    pub manager: ManagerSection,

    /// `[task.<kind>]` sections, keyed by kind name
    /// (`encoding`, `execution`, `encoding_and_execution`, `other`).
    #[serde(default)]
    pub task: BTreeMap<String, TaskSection>,
}

/// `[manager]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerSection {
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Explicit resource restriction in `[node:]cores[,node:cores,...]`
    /// syntax.
    #[serde(default)]
    pub resources: Option<String>,

    #[serde(default)]
    pub reserve_core: bool,

    /// Case-insensitive level name; unrecognized values fall back to debug.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_dir() -> String {
    ".".to_string()
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for ManagerSection {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            resources: None,
            reserve_core: false,
            log_level: default_log_level(),
        }
    }
}

/// `[task.<kind>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSection {
    /// Exact core count requested for tasks of this kind.
    #[serde(default = "default_cores")]
    pub cores: u32,

    /// Exact node count, when the scheduler should spread over nodes.
    #[serde(default)]
    pub nodes: Option<u32>,

    /// Path of the simulated application. Required for `execution` and
    /// `encoding_and_execution`, rejected elsewhere.
    #[serde(default)]
    pub application: Option<String>,

    /// Optional spec name; defaults to the kind's string form.
    #[serde(default)]
    pub name: Option<String>,
}

fn default_cores() -> u32 {
    1
}

/// Load a configuration file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ExecutorConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| SweepqError::ConfigIo {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| SweepqError::ConfigParse {
        path: path.display().to_string(),
        source,
    })
}

/// Load a configuration file and validate it by materializing both the
/// manager options and the task specs.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ExecutorConfig> {
    let config = load_from_path(path)?;
    config.manager_options()?;
    config.task_specs()?;
    Ok(config)
}

impl ExecutorConfig {
    /// Materialize the `[manager]` section into [`ManagerOptions`].
    pub fn manager_options(&self) -> Result<ManagerOptions> {
        let resources = match &self.manager.resources {
            Some(raw) => Some(
                ResourceSet::from_str(raw)
                    .map_err(|msg| SweepqError::ConfigInvalid(format!("[manager].resources: {msg}")))?,
            ),
            None => None,
        };

        Ok(ManagerOptions {
            dir: self.manager.dir.clone().into(),
            resources,
            reserve_core: self.manager.reserve_core,
            log_level: self.manager.log_level.clone(),
        })
    }

    /// Materialize every `[task.<kind>]` section into a [`TaskSpec`].
    ///
    /// Fails with `MissingParameter` when a kind that launches an
    /// application lacks one, and with `ConfigInvalid` for unknown kinds,
    /// zero core counts, or fields a kind does not take.
    pub fn task_specs(&self) -> Result<Vec<TaskSpec>> {
        let mut specs = Vec::with_capacity(self.task.len());
        for (kind_name, section) in &self.task {
            specs.push(section.to_spec(kind_name)?);
        }
        Ok(specs)
    }
}

impl TaskSection {
    fn to_spec(&self, kind_name: &str) -> Result<TaskSpec> {
        let kind = parse_kind(kind_name)?;

        if self.cores == 0 {
            return Err(SweepqError::ConfigInvalid(format!(
                "[task.{kind_name}].cores must be >= 1"
            )));
        }

        let work = match kind {
            TaskKind::Encoding => {
                self.reject_application(kind_name)?;
                TaskWork::Encoding
            }
            TaskKind::Execution => TaskWork::Execution {
                application: self.require_application(kind)?,
            },
            TaskKind::EncodingAndExecution => TaskWork::EncodingAndExecution {
                application: self.require_application(kind)?,
            },
            TaskKind::Other => {
                self.reject_application(kind_name)?;
                TaskWork::Other
            }
        };

        let mut requirement = TaskRequirement::cores(self.cores);
        if let Some(nodes) = self.nodes {
            if nodes == 0 {
                return Err(SweepqError::ConfigInvalid(format!(
                    "[task.{kind_name}].nodes must be >= 1"
                )));
            }
            requirement = requirement.with_nodes(ResourceRange::exact(nodes));
        }

        let mut spec = TaskSpec::new(work, requirement);
        if let Some(name) = &self.name {
            spec = spec.with_name(name.clone());
        }
        Ok(spec)
    }

    fn require_application(&self, kind: TaskKind) -> Result<String> {
        self.application
            .clone()
            .ok_or_else(|| SweepqError::MissingParameter {
                kind,
                param: "application".to_string(),
            })
    }

    fn reject_application(&self, kind_name: &str) -> Result<()> {
        if self.application.is_some() {
            return Err(SweepqError::ConfigInvalid(format!(
                "[task.{kind_name}] does not take an application"
            )));
        }
        Ok(())
    }
}

fn parse_kind(name: &str) -> Result<TaskKind> {
    match name {
        "encoding" => Ok(TaskKind::Encoding),
        "execution" => Ok(TaskKind::Execution),
        "encoding_and_execution" => Ok(TaskKind::EncodingAndExecution),
        "other" => Ok(TaskKind::Other),
        _ => Err(SweepqError::ConfigInvalid(format!(
            "unknown task kind '{name}' (expected encoding, execution, \
             encoding_and_execution or other)"
        ))),
    }
}

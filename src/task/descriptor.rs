// src/task/descriptor.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::task::spec::TaskRequirement;

/// One concrete, submittable unit of work.
///
/// Built fresh per run by the [`TaskGraphBuilder`](crate::task::TaskGraphBuilder),
/// handed to the scheduler client, and not retained afterwards. The name embeds
/// the run key (`encode_Run_3`, `execute_Run_3`, ...) which makes names unique
/// across one orchestration run.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDescriptor {
    pub name: String,
    pub exec: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
    pub resources: TaskRequirement,
    /// Names of tasks that must complete before this one starts. Empty or
    /// `{encode_<key>}`. A name referencing a not-yet-submitted task is
    /// legal; the scheduler resolves it once that task is submitted.
    pub after: BTreeSet<String>,
}

impl TaskDescriptor {
    /// Build a descriptor with stdout/stderr files named after the task
    /// inside `workdir`.
    pub fn new(
        name: impl Into<String>,
        exec: impl Into<String>,
        args: Vec<String>,
        workdir: &Path,
        resources: TaskRequirement,
        after: BTreeSet<String>,
    ) -> Self {
        let name = name.into();
        let stdout_path = workdir.join(format!("{name}.stdout"));
        let stderr_path = workdir.join(format!("{name}.stderr"));
        Self {
            name,
            exec: exec.into(),
            args,
            workdir: workdir.to_path_buf(),
            stdout_path,
            stderr_path,
            resources,
            after,
        }
    }

    /// Serialize into the scheduler's wire shape:
    ///
    /// ```json
    /// {
    ///   "name": "...",
    ///   "execution": { "exec": "...", "args": [...], "wd": "...",
    ///                  "stdout": "...", "stderr": "..." },
    ///   "resources": { "numCores": { "exact": 1 } },
    ///   "dependencies": { "after": ["..."] }
    /// }
    /// ```
    ///
    /// `dependencies` is omitted when the task has none.
    ///
    /// The only failure mode is a non-UTF-8 path, which serde cannot render
    /// as a JSON string.
    pub fn to_wire(&self) -> serde_json::Result<serde_json::Value> {
        let wire = WireTask {
            name: &self.name,
            execution: WireExecution {
                exec: &self.exec,
                args: &self.args,
                wd: &self.workdir,
                stdout: &self.stdout_path,
                stderr: &self.stderr_path,
            },
            resources: &self.resources,
            dependencies: if self.after.is_empty() {
                None
            } else {
                Some(WireDependencies {
                    after: self.after.iter().map(String::as_str).collect(),
                })
            },
        };

        serde_json::to_value(wire)
    }
}

#[derive(Serialize)]
struct WireTask<'a> {
    name: &'a str,
    execution: WireExecution<'a>,
    resources: &'a TaskRequirement,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<WireDependencies<'a>>,
}

#[derive(Serialize)]
struct WireExecution<'a> {
    exec: &'a str,
    args: &'a [String],
    wd: &'a Path,
    stdout: &'a Path,
    stderr: &'a Path,
}

#[derive(Serialize)]
struct WireDependencies<'a> {
    after: Vec<&'a str>,
}

// src/scheduler/local.rs

//! In-process reference scheduler.
//!
//! [`LocalScheduler`] implements [`SchedulerClient`] by spawning each
//! descriptor as an OS process on the local machine. It honors declared
//! dependency edges, including deferred resolution: a task whose dependency
//! has not been submitted yet simply waits until that name is submitted and
//! completes. Exit codes are recorded and logged but never interpreted;
//! dependents run once their dependencies finish, successfully or not.
//!
//! There is no resource-allocation logic here. Resource requests are carried
//! through the descriptors untouched; a production deployment points the
//! executor at a real pilot-job service instead.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::scheduler::client::{SchedulerClient, SchedulerError, SchedulerOp};
use crate::scheduler::service::{SchedulerLauncher, ServiceConfig};
use crate::task::TaskDescriptor;

/// Result of one task process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// Process exited non-zero, was killed, or could not be spawned (-1).
    Failed(i32),
}

struct Shared {
    /// Names of tasks that have finished (any outcome).
    completed: Mutex<HashSet<String>>,
    /// Exit outcome per finished task.
    outcomes: Mutex<HashMap<String, TaskOutcome>>,
    /// Bumped on every completion so waiting tasks re-check their deps.
    completion_tx: watch::Sender<u64>,
}

impl Shared {
    fn mark_complete(&self, name: &str, outcome: TaskOutcome) {
        self.completed
            .lock()
            .expect("completion set lock")
            .insert(name.to_string());
        self.outcomes
            .lock()
            .expect("outcome map lock")
            .insert(name.to_string(), outcome);
        self.completion_tx.send_modify(|generation| *generation += 1);
    }

    fn deps_met(&self, deps: &HashSet<String>) -> bool {
        let completed = self.completed.lock().expect("completion set lock");
        deps.iter().all(|d| completed.contains(d))
    }
}

/// Local implementation of [`SchedulerClient`].
pub struct LocalScheduler {
    workdir: PathBuf,
    resources_desc: String,
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
    submitted: HashSet<String>,
    stopped: bool,
}

impl LocalScheduler {
    /// Build a scheduler rooted at the prepared scratch directory.
    pub fn new(config: &ServiceConfig) -> Self {
        let resources_desc = match &config.resources {
            Some(set) => format!("local[{set}]"),
            None => {
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                format!("local[{cores}]")
            }
        };

        let (completion_tx, _) = watch::channel(0);

        Self {
            workdir: config.workdir.clone(),
            resources_desc,
            shared: Arc::new(Shared {
                completed: Mutex::new(HashSet::new()),
                outcomes: Mutex::new(HashMap::new()),
                completion_tx,
            }),
            handles: Vec::new(),
            submitted: HashSet::new(),
            stopped: false,
        }
    }

    /// Outcome of a finished task, if it has finished.
    pub fn outcome(&self, name: &str) -> Option<TaskOutcome> {
        self.shared
            .outcomes
            .lock()
            .expect("outcome map lock")
            .get(name)
            .copied()
    }

    fn ensure_running(&self, op: SchedulerOp) -> Result<(), SchedulerError> {
        if self.stopped {
            Err(SchedulerError::new(op, "scheduler already stopped"))
        } else {
            Ok(())
        }
    }

    async fn drain(&mut self) -> Result<(), SchedulerError> {
        for handle in std::mem::take(&mut self.handles) {
            handle.await.map_err(|err| {
                SchedulerError::with_source(SchedulerOp::Wait, "task runner panicked", err)
            })?;
        }
        Ok(())
    }
}

impl SchedulerClient for LocalScheduler {
    async fn submit(&mut self, tasks: Vec<TaskDescriptor>) -> Result<(), SchedulerError> {
        self.ensure_running(SchedulerOp::Submit)?;

        for task in tasks {
            if !self.submitted.insert(task.name.clone()) {
                return Err(SchedulerError::new(
                    SchedulerOp::Submit,
                    format!("duplicate task name '{}'", task.name),
                ));
            }

            debug!(task = %task.name, deps = ?task.after, "local scheduler accepted task");

            let shared = Arc::clone(&self.shared);
            let rx = self.shared.completion_tx.subscribe();
            self.handles.push(tokio::spawn(async move {
                run_task(task, shared, rx).await;
            }));
        }

        Ok(())
    }

    async fn wait_all(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running(SchedulerOp::Wait)?;
        self.drain().await
    }

    async fn resources(&mut self) -> Result<String, SchedulerError> {
        Ok(self.resources_desc.clone())
    }

    async fn finish(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running(SchedulerOp::Finish)?;
        self.drain().await
    }

    async fn stop(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running(SchedulerOp::Stop)?;
        self.stopped = true;
        info!("local scheduler stopped");
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), SchedulerError> {
        tokio::fs::remove_dir_all(&self.workdir)
            .await
            .map_err(|err| {
                SchedulerError::with_source(
                    SchedulerOp::Cleanup,
                    format!("removing scratch dir {}", self.workdir.display()),
                    err,
                )
            })
    }
}

/// Wait for dependencies, run the process, record the outcome.
async fn run_task(task: TaskDescriptor, shared: Arc<Shared>, mut rx: watch::Receiver<u64>) {
    let deps: HashSet<String> = task.after.iter().cloned().collect();

    // Deferred resolution: re-check on every completion until all named
    // dependencies have finished, whether or not they were submitted before
    // this task.
    while !shared.deps_met(&deps) {
        if rx.changed().await.is_err() {
            warn!(task = %task.name, "completion channel closed while waiting on deps");
            shared.mark_complete(&task.name, TaskOutcome::Failed(-1));
            return;
        }
    }

    let outcome = spawn_and_wait(&task).await;
    match outcome {
        TaskOutcome::Success => info!(task = %task.name, "task completed successfully"),
        TaskOutcome::Failed(code) => warn!(task = %task.name, exit_code = code, "task failed"),
    }

    shared.mark_complete(&task.name, outcome);
}

async fn spawn_and_wait(task: &TaskDescriptor) -> TaskOutcome {
    let stdout = match std::fs::File::create(&task.stdout_path) {
        Ok(f) => Stdio::from(f),
        Err(err) => {
            warn!(task = %task.name, error = %err, "cannot create stdout file");
            return TaskOutcome::Failed(-1);
        }
    };
    let stderr = match std::fs::File::create(&task.stderr_path) {
        Ok(f) => Stdio::from(f),
        Err(err) => {
            warn!(task = %task.name, error = %err, "cannot create stderr file");
            return TaskOutcome::Failed(-1);
        }
    };

    info!(task = %task.name, exec = %task.exec, "starting task process");

    let mut child = match Command::new(&task.exec)
        .args(&task.args)
        .current_dir(&task.workdir)
        .stdout(stdout)
        .stderr(stderr)
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            warn!(task = %task.name, exec = %task.exec, error = %err, "spawn failed");
            return TaskOutcome::Failed(-1);
        }
    };

    match child.wait().await {
        Ok(status) if status.success() => TaskOutcome::Success,
        Ok(status) => TaskOutcome::Failed(status.code().unwrap_or(-1)),
        Err(err) => {
            warn!(task = %task.name, error = %err, "waiting for task process failed");
            TaskOutcome::Failed(-1)
        }
    }
}

/// Launcher producing [`LocalScheduler`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLauncher;

impl SchedulerLauncher for LocalLauncher {
    type Client = LocalScheduler;

    async fn launch(&self, config: &ServiceConfig) -> Result<LocalScheduler, SchedulerError> {
        debug!(workdir = %config.workdir.display(), args = ?config.service_args(),
               "launching local scheduler");
        Ok(LocalScheduler::new(config))
    }
}

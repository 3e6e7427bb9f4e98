// src/executor.rs

//! Executor lifecycle: bind a scheduler, submit per strategy, wait, reconcile.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::campaign::{Campaign, RunStatus};
use crate::errors::{Result, SweepqError};
use crate::scheduler::{ManagerOptions, SchedulerClient, SchedulerLauncher, ServiceConfig};
use crate::task::{SpecRegistry, TaskGraphBuilder, TaskSpec};

/// How per-run descriptors are batched and ordered across the run collection.
///
/// Only dependency edges sequence execution; the order chosen here affects
/// queuing and visibility on the scheduler side, never correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOrder {
    /// Submit the encoding task for every run, then the execution task for
    /// every run. All encode submissions precede all execute submissions,
    /// regardless of per-run completion.
    PhaseOriented,
    /// Submit encoding then execution for one run before moving to the next.
    RunOriented,
    /// Submit a single condensed encode+execute task per run.
    RunOrientedCondensed,
    /// Submit only standalone execution tasks; encoding happened previously
    /// out of band, so no dependency is declared.
    ExecOnly,
}

/// Lifecycle state of an [`Executor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// No scheduler handle yet.
    Unbound,
    /// A scheduler handle is attached or created.
    Bound,
    /// Submission/wait in progress.
    Running,
    /// The wait call returned; statuses reconciled.
    Completed,
    /// The scheduler was shut down.
    Terminated,
}

/// Drives submission of a campaign's runs to a pilot-job scheduler.
///
/// Owns the scheduler handle, the registered task specs and the scratch
/// working directory. Sequential by design: descriptors are built and
/// submitted in a simple loop, then one blocking wait covers everything.
/// Concurrent `run` calls against one instance are not supported.
pub struct Executor<S: SchedulerClient> {
    manager: Option<S>,
    specs: SpecRegistry,
    workdir: PathBuf,
    state: ExecutorState,
}

impl<S: SchedulerClient> Executor<S> {
    pub fn new() -> Self {
        Self {
            manager: None,
            specs: SpecRegistry::new(),
            workdir: PathBuf::from("."),
            state: ExecutorState::Unbound,
        }
    }

    /// Bind an existing scheduler client as this executor's engine, logging
    /// the resources it reports.
    pub async fn attach_manager(&mut self, mut manager: S) -> Result<()> {
        let resources = manager.resources().await?;
        info!(%resources, "attached scheduler manager");

        self.manager = Some(manager);
        self.state = ExecutorState::Bound;
        Ok(())
    }

    /// Create a new scheduler through `launcher` and bind it.
    ///
    /// Allocates a private scratch directory under `options.dir`, resolves
    /// log levels and resource restrictions into a [`ServiceConfig`], and
    /// hands that to the launcher.
    pub async fn create_manager<L>(&mut self, launcher: &L, options: &ManagerOptions) -> Result<()>
    where
        L: SchedulerLauncher<Client = S>,
    {
        let config = ServiceConfig::prepare(options)?;
        info!(workdir = %config.workdir.display(), "created scheduler scratch directory");

        let manager = launcher.launch(&config).await?;

        self.workdir = config.workdir.clone();
        self.manager = Some(manager);
        self.state = ExecutorState::Bound;
        Ok(())
    }

    /// Register a task spec, keyed by kind. Last write wins.
    pub fn register(&mut self, spec: TaskSpec) {
        debug!(kind = %spec.kind(), name = %spec.name(), "registered task spec");
        self.specs.register(spec);
    }

    pub fn specs(&self) -> &SpecRegistry {
        &self.specs
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Descriptor builder bound to this executor's specs and scratch dir.
    pub fn task_builder(&self) -> TaskGraphBuilder<'_> {
        TaskGraphBuilder::new(&self.specs, &self.workdir)
    }

    /// Log the resources the bound scheduler reports.
    pub async fn log_resources(&mut self) -> Result<()> {
        let manager = self.manager.as_mut().ok_or(SweepqError::ManagerNotBound)?;
        let resources = manager.resources().await?;
        info!(%resources, "available resources");
        Ok(())
    }

    /// Submit every run of the campaign per `order`, block until the
    /// scheduler reports all tasks finished, then reconcile run statuses
    /// with the default policy ([`mark_new_runs_encoded`]).
    pub async fn run<C: Campaign>(&mut self, campaign: &mut C, order: SubmitOrder) -> Result<()> {
        self.run_with_reconciler(campaign, order, mark_new_runs_encoded)
            .await
    }

    /// Like [`run`](Self::run) but with an explicit status-reconciliation
    /// policy, applied after the wait returns.
    ///
    /// This is the substitution point for implementations that want run
    /// statuses to reflect actual per-task outcomes instead of the default
    /// unconditional update.
    pub async fn run_with_reconciler<C, F>(
        &mut self,
        campaign: &mut C,
        order: SubmitOrder,
        reconcile: F,
    ) -> Result<()>
    where
        C: Campaign,
        F: FnOnce(&mut C) -> Result<()>,
    {
        if self.manager.is_none() {
            return Err(SweepqError::ManagerNotBound);
        }
        self.state = ExecutorState::Running;

        self.submit_jobs(campaign, order).await?;

        let manager = self.manager.as_mut().ok_or(SweepqError::ManagerNotBound)?;
        manager.wait_all().await?;
        self.state = ExecutorState::Completed;

        info!("syncing campaign state after pilot-job execution");
        reconcile(campaign)?;
        Ok(())
    }

    /// Shut the scheduler down: drain remaining work, stop the service,
    /// remove its scratch state. Not idempotent; a second call surfaces the
    /// scheduler's own error.
    pub async fn terminate(&mut self) -> Result<()> {
        let manager = self.manager.as_mut().ok_or(SweepqError::ManagerNotBound)?;
        manager.finish().await?;
        manager.stop().await?;
        manager.cleanup().await?;

        self.state = ExecutorState::Terminated;
        info!("scheduler manager terminated");
        Ok(())
    }

    /// Build and submit descriptors for every run, in the loop shape the
    /// submit order prescribes. Each descriptor is handed to the scheduler
    /// as soon as it is built; a failure aborts the remaining loop without
    /// rolling back what was already accepted.
    async fn submit_jobs<C: Campaign>(&mut self, campaign: &C, order: SubmitOrder) -> Result<()> {
        info!(?order, "starting submission of tasks to the scheduler");

        let manager = self.manager.as_mut().ok_or(SweepqError::ManagerNotBound)?;
        let builder = TaskGraphBuilder::new(&self.specs, &self.workdir);

        match order {
            SubmitOrder::RunOrientedCondensed => {
                for (key, record) in campaign.runs() {
                    let task = builder.encode_execute_task(campaign, &key, &record)?;
                    manager.submit(vec![task]).await?;
                }
            }
            SubmitOrder::RunOriented => {
                for (key, record) in campaign.runs() {
                    let encode = builder.encode_task(campaign, &key)?;
                    manager.submit(vec![encode]).await?;

                    let execute = builder.execute_task(&key, &record)?;
                    manager.submit(vec![execute]).await?;
                }
            }
            SubmitOrder::PhaseOriented => {
                for (key, _record) in campaign.runs() {
                    let encode = builder.encode_task(campaign, &key)?;
                    manager.submit(vec![encode]).await?;
                }
                for (key, record) in campaign.runs() {
                    let execute = builder.execute_task(&key, &record)?;
                    manager.submit(vec![execute]).await?;
                }
            }
            SubmitOrder::ExecOnly => {
                for (key, record) in campaign.runs() {
                    let execute = builder.execute_only_task(&key, &record)?;
                    manager.submit(vec![execute]).await?;
                }
            }
        }

        Ok(())
    }
}

impl<S: SchedulerClient> Default for Executor<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Default status reconciliation: every run currently in `New` is marked
/// `Encoded`.
///
/// Deliberately unconditional, matching the historical campaign-sync
/// behavior: it does not check that the corresponding task succeeded, and it
/// fires even under [`SubmitOrder::ExecOnly`] where no encoding ran. Pass a
/// different policy to [`Executor::run_with_reconciler`] to change this.
pub fn mark_new_runs_encoded<C: Campaign + ?Sized>(campaign: &mut C) -> Result<()> {
    for key in campaign.runs_with_status(RunStatus::New) {
        campaign.set_run_status(&key, RunStatus::Encoded);
    }
    Ok(())
}

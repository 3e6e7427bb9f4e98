// tests/common/mod.rs

//! Shared test doubles: a recording scheduler client and an in-memory
//! campaign.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use sweepq::scheduler::{SchedulerClient, SchedulerError, SchedulerOp};
use sweepq::{Campaign, Executor, RunKey, RunRecord, RunStatus, TaskDescriptor};

/// Scheduler client that records submissions instead of executing anything.
///
/// Clone it before attaching to an executor; all clones share one record.
#[derive(Clone, Default)]
pub struct RecordingScheduler {
    submitted: Arc<Mutex<Vec<TaskDescriptor>>>,
    waits: Arc<Mutex<usize>>,
    stopped: Arc<Mutex<bool>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All descriptors handed to `submit`, in submission order.
    pub fn submitted(&self) -> Vec<TaskDescriptor> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn wait_count(&self) -> usize {
        *self.waits.lock().unwrap()
    }

    fn ensure_running(&self, op: SchedulerOp) -> Result<(), SchedulerError> {
        if *self.stopped.lock().unwrap() {
            Err(SchedulerError::new(op, "scheduler already stopped"))
        } else {
            Ok(())
        }
    }
}

impl SchedulerClient for RecordingScheduler {
    async fn submit(&mut self, tasks: Vec<TaskDescriptor>) -> Result<(), SchedulerError> {
        self.ensure_running(SchedulerOp::Submit)?;
        self.submitted.lock().unwrap().extend(tasks);
        Ok(())
    }

    async fn wait_all(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running(SchedulerOp::Wait)?;
        *self.waits.lock().unwrap() += 1;
        Ok(())
    }

    async fn resources(&mut self) -> Result<String, SchedulerError> {
        Ok("mock[4]".to_string())
    }

    async fn finish(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running(SchedulerOp::Finish)
    }

    async fn stop(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running(SchedulerOp::Stop)?;
        *self.stopped.lock().unwrap() = true;
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), SchedulerError> {
        Ok(())
    }
}

/// In-memory campaign with `n` runs, all starting in `New`.
pub struct MockCampaign {
    runs: Vec<(RunKey, RunRecord)>,
    statuses: BTreeMap<RunKey, RunStatus>,
}

impl MockCampaign {
    pub fn with_runs(n: usize) -> Self {
        let runs: Vec<(RunKey, RunRecord)> = (1..=n)
            .map(|i| {
                let key = format!("Run_{i}");
                let record = RunRecord::new(format!("/campaigns/sweep/runs/Run_{i}"));
                (key, record)
            })
            .collect();

        let statuses = runs
            .iter()
            .map(|(key, _)| (key.clone(), RunStatus::New))
            .collect();

        Self { runs, statuses }
    }

    pub fn status_of(&self, key: &str) -> Option<RunStatus> {
        self.statuses.get(key).copied()
    }
}

impl Campaign for MockCampaign {
    fn db_type(&self) -> &str {
        "sql"
    }

    fn db_location(&self) -> &str {
        "sqlite:///campaign.db"
    }

    fn campaign_name(&self) -> &str {
        "sweep_test"
    }

    fn active_app_name(&self) -> &str {
        "model"
    }

    fn runs(&self) -> Vec<(RunKey, RunRecord)> {
        self.runs.clone()
    }

    fn runs_with_status(&self, status: RunStatus) -> Vec<RunKey> {
        self.runs
            .iter()
            .filter(|(key, _)| self.statuses.get(key) == Some(&status))
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn set_run_status(&mut self, key: &str, status: RunStatus) {
        self.statuses.insert(key.to_string(), status);
    }
}

/// Executor bound to a fresh recording scheduler, with encoding (1 core) and
/// execution (4 cores, application `/apps/model`) specs registered.
pub async fn registered_executor() -> (Executor<RecordingScheduler>, RecordingScheduler) {
    use sweepq::{TaskRequirement, TaskSpec, TaskWork};

    let scheduler = RecordingScheduler::new();
    let mut executor = Executor::new();
    executor
        .attach_manager(scheduler.clone())
        .await
        .expect("attach recording scheduler");

    executor.register(TaskSpec::new(TaskWork::Encoding, TaskRequirement::cores(1)));
    executor.register(TaskSpec::new(
        TaskWork::Execution {
            application: "/apps/model".to_string(),
        },
        TaskRequirement::cores(4),
    ));
    executor.register(TaskSpec::new(
        TaskWork::EncodingAndExecution {
            application: "/apps/model".to_string(),
        },
        TaskRequirement::cores(4),
    ));

    (executor, scheduler)
}

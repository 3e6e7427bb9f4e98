// tests/local_scheduler.rs

use std::collections::BTreeSet;
use std::error::Error;
use std::path::Path;

use sweepq::scheduler::{
    LocalLauncher, LocalScheduler, ManagerOptions, SchedulerClient, ServiceConfig, TaskOutcome,
};
use sweepq::{Executor, RunStatus, SubmitOrder, TaskDescriptor, TaskRequirement};

mod common;
use common::MockCampaign;

type TestResult = Result<(), Box<dyn Error>>;

fn shell_task(
    name: &str,
    script: String,
    workdir: &Path,
    after: BTreeSet<String>,
) -> TaskDescriptor {
    TaskDescriptor::new(
        name,
        "sh",
        vec!["-c".to_string(), script],
        workdir,
        TaskRequirement::cores(1),
        after,
    )
}

fn local_scheduler_in(dir: &Path) -> Result<(LocalScheduler, ServiceConfig), Box<dyn Error>> {
    let options = ManagerOptions {
        dir: dir.to_path_buf(),
        ..ManagerOptions::default()
    };
    let config = ServiceConfig::prepare(&options)?;
    Ok((LocalScheduler::new(&config), config))
}

#[tokio::test]
async fn dependencies_run_before_dependents_even_when_submitted_later() -> TestResult {
    let base = tempfile::tempdir()?;
    let (mut scheduler, config) = local_scheduler_in(base.path())?;
    let log = config.workdir.join("order.log");
    let log_str = log.display();

    // The dependent goes in first; its dependency is submitted afterwards
    // and must still be resolved.
    let dependent = shell_task(
        "second",
        format!("echo second >> {log_str}"),
        &config.workdir,
        BTreeSet::from(["first".to_string()]),
    );
    let dependency = shell_task(
        "first",
        format!("echo first >> {log_str}"),
        &config.workdir,
        BTreeSet::new(),
    );

    scheduler.submit(vec![dependent]).await?;
    scheduler.submit(vec![dependency]).await?;
    scheduler.wait_all().await?;

    let contents = std::fs::read_to_string(&log)?;
    assert_eq!(contents, "first\nsecond\n");

    assert_eq!(scheduler.outcome("first"), Some(TaskOutcome::Success));
    assert_eq!(scheduler.outcome("second"), Some(TaskOutcome::Success));
    Ok(())
}

#[tokio::test]
async fn failure_is_recorded_but_does_not_block_dependents() -> TestResult {
    let base = tempfile::tempdir()?;
    let (mut scheduler, config) = local_scheduler_in(base.path())?;

    let failing = shell_task("broken", "exit 3".to_string(), &config.workdir, BTreeSet::new());
    let dependent = shell_task(
        "follow_up",
        "true".to_string(),
        &config.workdir,
        BTreeSet::from(["broken".to_string()]),
    );

    scheduler.submit(vec![failing, dependent]).await?;
    scheduler.wait_all().await?;

    assert_eq!(scheduler.outcome("broken"), Some(TaskOutcome::Failed(3)));
    assert_eq!(scheduler.outcome("follow_up"), Some(TaskOutcome::Success));
    Ok(())
}

#[tokio::test]
async fn stdout_and_stderr_land_in_the_descriptor_paths() -> TestResult {
    let base = tempfile::tempdir()?;
    let (mut scheduler, config) = local_scheduler_in(base.path())?;

    let task = shell_task(
        "chatty",
        "echo out; echo err >&2".to_string(),
        &config.workdir,
        BTreeSet::new(),
    );
    let stdout_path = task.stdout_path.clone();
    let stderr_path = task.stderr_path.clone();

    scheduler.submit(vec![task]).await?;
    scheduler.wait_all().await?;

    assert_eq!(std::fs::read_to_string(stdout_path)?, "out\n");
    assert_eq!(std::fs::read_to_string(stderr_path)?, "err\n");
    Ok(())
}

#[tokio::test]
async fn duplicate_task_names_are_rejected_at_submit() -> TestResult {
    let base = tempfile::tempdir()?;
    let (mut scheduler, config) = local_scheduler_in(base.path())?;

    let first = shell_task("twin", "true".to_string(), &config.workdir, BTreeSet::new());
    let second = shell_task("twin", "true".to_string(), &config.workdir, BTreeSet::new());

    scheduler.submit(vec![first]).await?;
    assert!(scheduler.submit(vec![second]).await.is_err());

    scheduler.wait_all().await?;
    Ok(())
}

#[tokio::test]
async fn stop_twice_is_an_error_and_cleanup_removes_scratch_state() -> TestResult {
    let base = tempfile::tempdir()?;
    let (mut scheduler, config) = local_scheduler_in(base.path())?;

    scheduler.finish().await?;
    scheduler.stop().await?;
    assert!(scheduler.stop().await.is_err());

    assert!(config.workdir.is_dir());
    scheduler.cleanup().await?;
    assert!(!config.workdir.exists());
    Ok(())
}

#[tokio::test]
async fn executor_run_completes_even_when_wrapper_scripts_are_missing() -> TestResult {
    // The encode/execute wrappers are not installed in the test environment,
    // so every task fails to spawn. The run must still complete: the core
    // never inspects task exit status, and the default reconcile fires.
    let base = tempfile::tempdir()?;
    let options = ManagerOptions {
        dir: base.path().to_path_buf(),
        ..ManagerOptions::default()
    };

    let mut executor: Executor<LocalScheduler> = Executor::new();
    executor.create_manager(&LocalLauncher, &options).await?;

    use sweepq::{TaskSpec, TaskWork};
    executor.register(TaskSpec::new(TaskWork::Encoding, TaskRequirement::cores(1)));
    executor.register(TaskSpec::new(
        TaskWork::Execution {
            application: "/apps/model".to_string(),
        },
        TaskRequirement::cores(1),
    ));

    let mut campaign = MockCampaign::with_runs(2);
    executor.run(&mut campaign, SubmitOrder::RunOriented).await?;

    assert_eq!(campaign.status_of("Run_1"), Some(RunStatus::Encoded));
    assert_eq!(campaign.status_of("Run_2"), Some(RunStatus::Encoded));

    executor.terminate().await?;
    Ok(())
}

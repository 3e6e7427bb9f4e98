// src/task/builder.rs

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::campaign::{Campaign, RunRecord};
use crate::errors::{Result, SweepqError};
use crate::task::descriptor::TaskDescriptor;
use crate::task::spec::{SpecRegistry, TaskKind};

/// Wrapper script that materializes a run's input files from the campaign
/// database.
pub const ENCODE_EXEC: &str = "sweepq_encode";
/// Wrapper script that launches the simulated application inside a run dir.
pub const EXECUTE_EXEC: &str = "sweepq_execute";
/// Wrapper script that performs encode and execute in a single invocation.
pub const ENCODE_EXECUTE_EXEC: &str = "sweepq_encode_execute";
/// Launcher marker the execute wrapper uses to locate the application shim.
pub const APP_LAUNCHER: &str = "sweepq_app";

/// Turns one run into submittable task descriptors.
///
/// Pure with respect to submission: builders resolve arguments, working
/// directory, stdout/stderr paths and dependency edges, and nothing else.
/// Required specs must already be registered; a missing one fails the build
/// with `MissingTaskSpec` and no retries.
pub struct TaskGraphBuilder<'a> {
    specs: &'a SpecRegistry,
    workdir: &'a Path,
}

impl<'a> TaskGraphBuilder<'a> {
    pub fn new(specs: &'a SpecRegistry, workdir: &'a Path) -> Self {
        Self { specs, workdir }
    }

    /// Encoding-only descriptor `encode_<key>`: no dependencies, resource
    /// request from the ENCODING spec.
    pub fn encode_task<C: Campaign + ?Sized>(
        &self,
        campaign: &C,
        key: &str,
    ) -> Result<TaskDescriptor> {
        let spec = self.specs.lookup(TaskKind::Encoding)?;

        let descriptor = TaskDescriptor::new(
            format!("encode_{key}"),
            ENCODE_EXEC,
            encode_args(campaign, key),
            self.workdir,
            spec.requirement().clone(),
            BTreeSet::new(),
        );

        debug!(task = %descriptor.name, "built encoding task");
        Ok(descriptor)
    }

    /// Execution descriptor `execute_<key>` depending on `encode_<key>`,
    /// resource request from the EXECUTION spec.
    pub fn execute_task(&self, key: &str, record: &RunRecord) -> Result<TaskDescriptor> {
        let descriptor = self.execute_descriptor(key, record, true)?;
        debug!(task = %descriptor.name, "built execution task (after encode)");
        Ok(descriptor)
    }

    /// Execution descriptor `execute_<key>` with an empty dependency set, for
    /// campaigns whose runs were encoded previously out of band.
    pub fn execute_only_task(&self, key: &str, record: &RunRecord) -> Result<TaskDescriptor> {
        let descriptor = self.execute_descriptor(key, record, false)?;
        debug!(task = %descriptor.name, "built standalone execution task");
        Ok(descriptor)
    }

    /// Condensed descriptor `encode_execute_<key>`: encode and execute
    /// argument lists concatenated into one invocation, no dependencies,
    /// resource request from the ENCODING_AND_EXECUTION spec.
    pub fn encode_execute_task<C: Campaign + ?Sized>(
        &self,
        campaign: &C,
        key: &str,
        record: &RunRecord,
    ) -> Result<TaskDescriptor> {
        let spec = self.specs.lookup(TaskKind::EncodingAndExecution)?;
        let application = spec.application()?;

        let mut args = encode_args(campaign, key);
        args.extend(execute_args(record, application));

        let descriptor = TaskDescriptor::new(
            format!("encode_execute_{key}"),
            ENCODE_EXECUTE_EXEC,
            args,
            self.workdir,
            spec.requirement().clone(),
            BTreeSet::new(),
        );

        debug!(task = %descriptor.name, "built condensed encode+execute task");
        Ok(descriptor)
    }

    /// Build the descriptor for an explicit kind. The reserved `Other` kind
    /// is rejected with `UnsupportedTaskKind`.
    pub fn build<C: Campaign + ?Sized>(
        &self,
        kind: TaskKind,
        campaign: &C,
        key: &str,
        record: &RunRecord,
    ) -> Result<TaskDescriptor> {
        match kind {
            TaskKind::Encoding => self.encode_task(campaign, key),
            TaskKind::Execution => self.execute_task(key, record),
            TaskKind::EncodingAndExecution => self.encode_execute_task(campaign, key, record),
            TaskKind::Other => Err(SweepqError::UnsupportedTaskKind(kind)),
        }
    }

    fn execute_descriptor(
        &self,
        key: &str,
        record: &RunRecord,
        after_encode: bool,
    ) -> Result<TaskDescriptor> {
        let spec = self.specs.lookup(TaskKind::Execution)?;
        let application = spec.application()?;

        let after = if after_encode {
            BTreeSet::from([format!("encode_{key}")])
        } else {
            BTreeSet::new()
        };

        Ok(TaskDescriptor::new(
            format!("execute_{key}"),
            EXECUTE_EXEC,
            execute_args(record, application),
            self.workdir,
            spec.requirement().clone(),
            after,
        ))
    }
}

/// Positional arguments consumed by the encode wrapper script.
fn encode_args<C: Campaign + ?Sized>(campaign: &C, key: &str) -> Vec<String> {
    vec![
        campaign.db_type().to_string(),
        campaign.db_location().to_string(),
        // Fixed positional flag consumed by the encode wrapper script.
        "FALSE".to_string(),
        campaign.campaign_name().to_string(),
        campaign.active_app_name().to_string(),
        key.to_string(),
    ]
}

/// Positional arguments consumed by the execute wrapper script.
fn execute_args(record: &RunRecord, application: &str) -> Vec<String> {
    vec![
        record.run_dir.display().to_string(),
        APP_LAUNCHER.to_string(),
        application.to_string(),
    ]
}

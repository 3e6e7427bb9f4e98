// src/campaign.rs

//! Boundary to the campaign/database collaborator.
//!
//! The campaign layer enumerates runs and stores their statuses; this crate
//! only reads runs and pushes status updates back. The trait is the whole
//! contract — nothing here knows how runs are sampled or persisted.

use std::path::PathBuf;

/// Unique identifier of a run within one campaign, e.g. `"Run_7"`.
pub type RunKey = String;

/// The per-run data this crate needs: where the run's inputs/outputs live.
///
/// The campaign layer typically stores much more per run; only `run_dir`
/// crosses this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub run_dir: PathBuf,
}

impl RunRecord {
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_dir: run_dir.into(),
        }
    }
}

/// Run status vocabulary shared with the campaign layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// Sampled but not yet materialized on disk.
    New,
    /// Input files written; ready for (or past) execution.
    Encoded,
    /// Results collected by downstream post-processing.
    Collated,
}

/// What the campaign collaborator must expose to the submission core.
///
/// `runs` yields `(key, record)` pairs in whatever order the campaign layer
/// chooses; the core preserves that order when looping per strategy and never
/// assumes a particular one.
pub trait Campaign {
    fn db_type(&self) -> &str;
    fn db_location(&self) -> &str;
    fn campaign_name(&self) -> &str;
    fn active_app_name(&self) -> &str;

    /// All runs of the campaign, in campaign order.
    fn runs(&self) -> Vec<(RunKey, RunRecord)>;

    /// Keys of runs currently in the given status, in campaign order.
    fn runs_with_status(&self, status: RunStatus) -> Vec<RunKey>;

    /// Record a new status for one run.
    fn set_run_status(&mut self, key: &str, status: RunStatus);
}

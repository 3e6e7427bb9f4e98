// src/lib.rs

//! sweepq — submission of parameter-sweep campaign runs to a pilot-job
//! scheduler.
//!
//! A campaign (uncertainty-quantification sweep) produces runs; each run
//! needs its inputs encoded and its application executed. This crate turns
//! runs into task descriptors with resolved arguments, resource requests and
//! dependency edges (encode before execute), hands them to a scheduler in
//! the order a [`SubmitOrder`] strategy prescribes, blocks until everything
//! finished, and reconciles run statuses with the campaign layer.
//!
//! The collaborators stay behind traits: the campaign/database layer is a
//! [`Campaign`], the scheduler is a [`SchedulerClient`]. A local
//! process-spawning scheduler ships in [`scheduler::local`] for single-node
//! use and testing.
//!
//! ```no_run
//! use sweepq::{Executor, SubmitOrder, TaskRequirement, TaskSpec, TaskWork};
//! use sweepq::scheduler::{LocalLauncher, LocalScheduler, ManagerOptions};
//! # use sweepq::{Campaign, RunKey, RunRecord, RunStatus};
//! # struct MyCampaign;
//! # impl Campaign for MyCampaign {
//! #     fn db_type(&self) -> &str { "sql" }
//! #     fn db_location(&self) -> &str { "sqlite:///c.db" }
//! #     fn campaign_name(&self) -> &str { "c" }
//! #     fn active_app_name(&self) -> &str { "app" }
//! #     fn runs(&self) -> Vec<(RunKey, RunRecord)> { vec![] }
//! #     fn runs_with_status(&self, _: RunStatus) -> Vec<RunKey> { vec![] }
//! #     fn set_run_status(&mut self, _: &str, _: RunStatus) {}
//! # }
//!
//! # async fn demo() -> sweepq::Result<()> {
//! let mut executor: Executor<LocalScheduler> = Executor::new();
//! executor.create_manager(&LocalLauncher, &ManagerOptions::default()).await?;
//!
//! executor.register(TaskSpec::new(TaskWork::Encoding, TaskRequirement::cores(1)));
//! executor.register(TaskSpec::new(
//!     TaskWork::Execution { application: "/apps/model".into() },
//!     TaskRequirement::cores(4),
//! ));
//!
//! let mut campaign = MyCampaign;
//! executor.run(&mut campaign, SubmitOrder::RunOriented).await?;
//! executor.terminate().await?;
//! # Ok(())
//! # }
//! ```

pub mod campaign;
pub mod config;
pub mod errors;
pub mod executor;
pub mod scheduler;
pub mod task;

pub use campaign::{Campaign, RunKey, RunRecord, RunStatus};
pub use errors::{Result, SweepqError};
pub use executor::{Executor, ExecutorState, SubmitOrder, mark_new_runs_encoded};
pub use scheduler::{SchedulerClient, SchedulerError};
pub use task::{
    SpecRegistry, TaskDescriptor, TaskGraphBuilder, TaskKind, TaskRequirement, TaskSpec, TaskWork,
};

// src/scheduler/mod.rs

//! Boundary to the pilot-job scheduler.
//!
//! - [`client`] is the opaque service handle the executor drives:
//!   submit, wait, lifecycle.
//! - [`service`] resolves bring-up options (scratch dir, log levels,
//!   resource sets) into a launchable configuration.
//! - [`local`] is an in-process reference implementation that runs
//!   descriptors as OS processes while honoring dependency edges.

pub mod client;
pub mod local;
pub mod service;

pub use client::{SchedulerClient, SchedulerError, SchedulerOp};
pub use local::{LocalLauncher, LocalScheduler, TaskOutcome};
pub use service::{
    ClientConfig, ClientLogLevel, ManagerOptions, ResourceEntry, ResourceSet, SchedulerLauncher,
    ServiceConfig, ServiceLogLevel,
};

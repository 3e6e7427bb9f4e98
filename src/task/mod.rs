// src/task/mod.rs

//! Task model and descriptor construction.
//!
//! - [`spec`] holds the registered templates: kinds, typed per-kind payloads
//!   and resource requirements.
//! - [`descriptor`] is the concrete submittable unit and its wire shape.
//! - [`builder`] turns (run, registered specs) into descriptors with resolved
//!   arguments and dependency edges.

pub mod builder;
pub mod descriptor;
pub mod spec;

pub use builder::{
    APP_LAUNCHER, ENCODE_EXEC, ENCODE_EXECUTE_EXEC, EXECUTE_EXEC, TaskGraphBuilder,
};
pub use descriptor::TaskDescriptor;
pub use spec::{ResourceRange, SpecRegistry, TaskKind, TaskRequirement, TaskSpec, TaskWork};

// src/scheduler/service.rs

//! Bring-up configuration for a scheduler service/client pair.
//!
//! [`ManagerOptions`] is what callers provide; [`ServiceConfig::prepare`]
//! turns it into a concrete configuration (scratch directory allocated,
//! log-level names translated into the scheduler's vocabularies) that a
//! [`SchedulerLauncher`] consumes to start the actual service.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{Result, SweepqError};
use crate::scheduler::client::{SchedulerClient, SchedulerError};

/// Log levels understood by the scheduler service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl ServiceLogLevel {
    /// Translate a case-insensitive level name. Unrecognized names fall back
    /// to the most verbose level.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "critical" => ServiceLogLevel::Critical,
            "error" => ServiceLogLevel::Error,
            "warning" => ServiceLogLevel::Warning,
            "info" => ServiceLogLevel::Info,
            "debug" => ServiceLogLevel::Debug,
            _ => ServiceLogLevel::Debug,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceLogLevel::Critical => "critical",
            ServiceLogLevel::Error => "error",
            ServiceLogLevel::Warning => "warning",
            ServiceLogLevel::Info => "info",
            ServiceLogLevel::Debug => "debug",
        }
    }
}

/// Log levels understood by the scheduler client library. A narrower
/// vocabulary than the service side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientLogLevel {
    Info,
    Debug,
}

impl ClientLogLevel {
    /// Translate a case-insensitive level name, falling back to debug.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "info" => ClientLogLevel::Info,
            "debug" => ClientLogLevel::Debug,
            _ => ClientLogLevel::Debug,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientLogLevel::Info => "info",
            ClientLogLevel::Debug => "debug",
        }
    }
}

/// One entry of an explicit resource set: cores on an (optionally named) node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub node: Option<String>,
    pub cores: u32,
}

/// Explicit resource restriction in the scheduler's `NODES` syntax:
/// `[node_name:]cores[,node_name2:cores,...]`.
///
/// `"4"` means 4 cores anywhere; `"node_1:2,node_2:3"` pins cores to nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSet {
    pub entries: Vec<ResourceEntry>,
}

impl FromStr for ResourceSet {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("resource set must not be empty".to_string());
        }

        let mut entries = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(format!("empty entry in resource set '{s}'"));
            }

            let (node, cores_str) = match part.split_once(':') {
                Some((node, cores)) => {
                    if node.trim().is_empty() {
                        return Err(format!("empty node name in resource entry '{part}'"));
                    }
                    (Some(node.trim().to_string()), cores.trim())
                }
                None => (None, part),
            };

            let cores: u32 = cores_str
                .parse()
                .map_err(|_| format!("invalid core count '{cores_str}' in resource entry '{part}'"))?;
            if cores == 0 {
                return Err(format!("core count must be >= 1 in resource entry '{part}'"));
            }

            entries.push(ResourceEntry { node, cores });
        }

        Ok(ResourceSet { entries })
    }
}

impl fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match &entry.node {
                Some(node) => write!(f, "{node}:{}", entry.cores)?,
                None => write!(f, "{}", entry.cores)?,
            }
        }
        Ok(())
    }
}

/// How the scheduler manager should be brought up.
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Directory under which the manager's private scratch directory is
    /// allocated.
    pub dir: PathBuf,
    /// Explicit resource restriction; forces the scheduler's local mode.
    pub resources: Option<ResourceSet>,
    /// Reserve one core for the scheduler process itself instead of sharing
    /// one with computing tasks.
    pub reserve_core: bool,
    /// Case-insensitive log-level name applied to both the service and the
    /// client side.
    pub log_level: String,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            resources: None,
            reserve_core: false,
            log_level: "debug".to_string(),
        }
    }
}

/// Client-side logging configuration handed to the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub log_file: PathBuf,
    pub log_level: ClientLogLevel,
}

/// Fully resolved bring-up configuration for one scheduler instance.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Private scratch directory of this scheduler instance.
    pub workdir: PathBuf,
    pub service_log_level: ServiceLogLevel,
    pub client: ClientConfig,
    pub resources: Option<ResourceSet>,
    pub reserve_core: bool,
}

impl ServiceConfig {
    /// Allocate the scratch directory and resolve log levels from options.
    ///
    /// The scratch directory (`.sweepq-*` under `options.dir`) is kept on
    /// disk; removing it is the job of the scheduler's `cleanup`.
    pub fn prepare(options: &ManagerOptions) -> Result<Self> {
        let workdir = tempfile::Builder::new()
            .prefix(".sweepq-")
            .tempdir_in(&options.dir)
            .map_err(|source| SweepqError::ScratchDir {
                dir: options.dir.display().to_string(),
                source,
            })?
            .keep();

        Ok(Self {
            service_log_level: ServiceLogLevel::from_name(&options.log_level),
            client: ClientConfig {
                log_file: workdir.join("api.log"),
                log_level: ClientLogLevel::from_name(&options.log_level),
            },
            resources: options.resources.clone(),
            reserve_core: options.reserve_core,
            workdir,
        })
    }

    /// Render the service-side command-line arguments for launchers that
    /// start the scheduler service as an external process.
    pub fn service_args(&self) -> Vec<String> {
        let mut args = vec![
            "--log".to_string(),
            self.service_log_level.as_str().to_string(),
            "--wd".to_string(),
            self.workdir.display().to_string(),
        ];

        if let Some(resources) = &self.resources {
            args.push("--nodes".to_string());
            args.push(resources.to_string());
        }

        if self.reserve_core {
            args.push("--system-core".to_string());
        }

        args
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

/// Starts a concrete scheduler service/client pair from a resolved
/// [`ServiceConfig`].
pub trait SchedulerLauncher {
    type Client: SchedulerClient;

    async fn launch(&self, config: &ServiceConfig) -> std::result::Result<Self::Client, SchedulerError>;
}

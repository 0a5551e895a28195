//! # System Constants
//!
//! Lane names, lifecycle event names and environment variables shared
//! across the dispatch layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Worker queue lanes
pub mod lanes {
    /// Lane for script and service task execution
    pub const BPMN: &str = "bpmn";
}

/// Dispatch lifecycle events published on the [`crate::events::EventPublisher`]
pub mod events {
    pub const COMMAND_EXECUTED: &str = "bpmn.command_executed";
    pub const COMMAND_ENQUEUED: &str = "bpmn.command_enqueued";
    pub const COMMAND_FAILED: &str = "bpmn.command_failed";
    pub const VALIDATION_FAILED: &str = "bpmn.validation_failed";
    pub const SIGNAL_BROADCAST: &str = "bpmn.signal_broadcast";
}

/// Environment variables read by configuration and logging
pub mod env_vars {
    pub const ENVIRONMENT: &str = "WORKFLOW_ENV";
    pub const CONFIG_DIR: &str = "WORKFLOW_CONFIG_DIR";
    pub const CONFIG_PREFIX: &str = "WORKFLOW";
    pub const LOG_FORMAT: &str = "WORKFLOW_LOG_FORMAT";
}

/// How a command reaches its executor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "lane", rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Executed on the calling thread before the operation returns
    Synchronous,
    /// Handed to a worker lane; the caller observes only the enqueue
    Queued(String),
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synchronous => "synchronous",
            Self::Queued(_) => "queued",
        }
    }

    pub fn lane(&self) -> Option<&str> {
        match self {
            Self::Synchronous => None,
            Self::Queued(lane) => Some(lane),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synchronous => f.write_str("synchronous"),
            Self::Queued(lane) => write!(f, "queued({lane})"),
        }
    }
}

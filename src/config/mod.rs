//! # Workflow Manager Configuration
//!
//! Layered configuration for the dispatch layer: lane routing, worker queue
//! sizing, structural payload limits and event channel capacity.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use workflow_manager::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration (environment auto-detected)
//! let manager = ConfigManager::load()?;
//!
//! let lane = &manager.config().dispatch.async_lane;
//! let capacity = manager.config().events.channel_capacity;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::lanes;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/workflow.yaml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Routing of operations onto execution paths
    pub dispatch: DispatchConfig,

    /// Worker lanes for asynchronously dispatched commands
    pub worker_queue: WorkerQueueConfig,

    /// Built-in structural payload limits
    pub validation: ValidationConfig,

    /// Lifecycle event publishing
    pub events: EventsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Lane that script and service tasks are queued on
    pub async_lane: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            async_lane: lanes::BPMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerQueueConfig {
    pub lanes: Vec<LaneConfig>,
}

impl Default for WorkerQueueConfig {
    fn default() -> Self {
        Self {
            lanes: vec![LaneConfig::default()],
        }
    }
}

impl WorkerQueueConfig {
    pub fn lane(&self, name: &str) -> Option<&LaneConfig> {
        self.lanes.iter().find(|lane| lane.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LaneConfig {
    pub name: String,
    /// Commands that may wait in the lane before enqueueing is refused
    pub capacity: usize,
    /// Concurrent consumers draining the lane
    pub workers: usize,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            name: lanes::BPMN.to_string(),
            capacity: 1024,
            workers: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub max_payload_bytes: usize,
    pub max_depth: usize,
    pub max_keys: usize,
    pub max_string_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 1024 * 1024,
            max_depth: 10,
            max_keys: 1000,
            max_string_length: 10000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1000,
        }
    }
}

impl WorkflowConfig {
    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.dispatch.async_lane.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "dispatch.async_lane",
                "dispatch configuration",
            ));
        }

        let mut seen = HashSet::new();
        for lane in &self.worker_queue.lanes {
            if lane.name.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "worker_queue.lanes[].name",
                    "worker queue configuration",
                ));
            }
            if !seen.insert(lane.name.as_str()) {
                return Err(ConfigurationError::invalid_value(
                    "worker_queue.lanes[].name",
                    lane.name.clone(),
                    "lane names must be unique",
                ));
            }
            if lane.capacity == 0 {
                return Err(ConfigurationError::invalid_value(
                    format!("worker_queue.lanes.{}.capacity", lane.name),
                    "0",
                    "lane capacity must be greater than 0",
                ));
            }
            if lane.workers == 0 {
                return Err(ConfigurationError::invalid_value(
                    format!("worker_queue.lanes.{}.workers", lane.name),
                    "0",
                    "a lane needs at least one worker",
                ));
            }
        }

        if self.worker_queue.lane(&self.dispatch.async_lane).is_none() {
            return Err(ConfigurationError::invalid_value(
                "dispatch.async_lane",
                self.dispatch.async_lane.clone(),
                "async lane must be declared in worker_queue.lanes",
            ));
        }

        if self.validation.max_depth == 0 || self.validation.max_payload_bytes == 0 {
            return Err(ConfigurationError::invalid_value(
                "validation",
                format!(
                    "max_depth={}, max_payload_bytes={}",
                    self.validation.max_depth, self.validation.max_payload_bytes
                ),
                "structural limits must be greater than 0",
            ));
        }

        if self.events.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.channel_capacity",
                "0",
                "broadcast channel capacity must be greater than 0",
            ));
        }

        Ok(())
    }
}

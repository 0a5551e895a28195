#![allow(clippy::doc_markdown)] // Allow technical terms like BPMN, signalRef in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Workflow Manager
//!
//! Validation and dispatch facade between a BPMN-style execution engine and
//! the operations that advance its execution.
//!
//! ## Overview
//!
//! The engine's traversal logic calls one [`WorkflowManager`] operation per
//! workflow action (complete a task, resolve a catch event, trigger a
//! boundary or start event, call a process, run a script or service task,
//! throw a signal or message). The manager:
//!
//! - runs the registered validation hooks before any token-advancing action
//! - executes most commands on the calling thread so the caller observes the
//!   result (for example the newly started instance)
//! - hands script and service tasks to a worker lane so user code never
//!   blocks traversal
//! - computes which instances a signal broadcast must skip
//!
//! Graph parsing, traversal, persistence and transport belong to the engine.
//!
//! ## Module Organization
//!
//! - [`models`] - Definitions, instances, collaborations and tokens as seen by the facade
//! - [`validation`] - Structural payload validator and field rules
//! - [`registry`] - Append-only validation hook registry
//! - [`commands`] - Operation commands and the synchronous executor boundary
//! - [`messaging`] - Worker queue boundary and tokio-backed lanes
//! - [`orchestration`] - Dispatch router and signal broadcast preparation
//! - [`events`] - Dispatch lifecycle event publishing
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workflow_manager::commands::{CommandExecutor, CommandOutcome, OperationCommand};
//! use workflow_manager::config::ConfigManager;
//! use workflow_manager::events::EventPublisher;
//! use workflow_manager::messaging::{BlockingExecutorHandler, LaneWorkerQueue};
//! use workflow_manager::registry::ValidationHookRegistry;
//! use workflow_manager::WorkflowManager;
//!
//! struct Engine;
//!
//! impl CommandExecutor for Engine {
//!     fn execute(&self, command: OperationCommand) -> anyhow::Result<CommandOutcome> {
//!         println!("executing {}", command.name());
//!         Ok(CommandOutcome::Completed)
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! workflow_manager::logging::init_structured_logging();
//! let config = ConfigManager::load()?;
//!
//! let engine: Arc<dyn CommandExecutor> = Arc::new(Engine);
//! let events = EventPublisher::from_config(&config.config().events);
//! let queue = Arc::new(LaneWorkerQueue::start(
//!     &config.config().worker_queue,
//!     Arc::new(BlockingExecutorHandler::new(engine.clone())),
//!     events.clone(),
//! )?);
//! let validations = Arc::new(ValidationHookRegistry::from_config(&config.config().validation));
//!
//! let manager = WorkflowManager::from_config(config.config(), validations, engine, queue.clone())
//!     .with_event_publisher(events);
//! # let _ = manager;
//! queue.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod registry;
pub mod validation;

pub use commands::{CommandExecutor, CommandOutcome, OperationCommand};
pub use config::{ConfigManager, WorkflowConfig};
pub use constants::ExecutionMode;
pub use error::{Result, WorkflowError};
pub use messaging::{LaneWorkerQueue, WorkerQueue};
pub use models::{
    Collaboration, DataMap, Element, ElementKind, EventDefinition, InstanceKey, ProcessDefinition,
    ProcessInstance, Token,
};
pub use orchestration::{BroadcastResolutionError, DispatchError, WorkflowManager};
pub use registry::{ValidationHook, ValidationHookRegistry};
pub use validation::{DataValidator, Rule, ValidationError, Violation};

//! # Operation Commands
//!
//! One immutable command per BPMN action. The dispatch layer builds a
//! command, then hands it either to a [`CommandExecutor`] on the calling
//! thread or to a [`crate::messaging::WorkerQueue`] lane. A command is
//! consumed exactly once and never retried by this crate.

use serde::Serialize;
use std::sync::Arc;

use crate::constants::ExecutionMode;
use crate::models::{
    DataMap, Element, InstanceKey, ProcessDefinition, ProcessInstance, Token, TokenState,
};

/// Advance a token past its activity or catch event
#[derive(Debug, Clone)]
pub struct TokenCommand {
    pub definition: Arc<ProcessDefinition>,
    pub instance: Arc<ProcessInstance>,
    pub token: Token,
    pub data: DataMap,
}

/// Interrupt an active activity through one of its boundary events
#[derive(Debug, Clone)]
pub struct BoundaryEventCommand {
    pub definition: Arc<ProcessDefinition>,
    pub instance: Arc<ProcessInstance>,
    pub token: Token,
    pub boundary_event: Element,
    pub data: DataMap,
}

/// Create a new instance from a start event or a callable process
#[derive(Debug, Clone)]
pub struct InstantiateCommand {
    pub definition: Arc<ProcessDefinition>,
    pub element: Element,
    pub data: DataMap,
}

/// Broadcast a signal to every listening instance not excluded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrowSignalCommand {
    pub signal_ref: String,
    pub data: DataMap,
    pub exclude: Vec<InstanceKey>,
}

/// Deliver a message to one element of one instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrowMessageCommand {
    pub instance_key: InstanceKey,
    pub element_id: String,
    pub message_ref: String,
    pub payload: DataMap,
}

/// Closed set of workflow state transitions
#[derive(Debug, Clone)]
pub enum OperationCommand {
    CompleteActivity(TokenCommand),
    CatchEvent(TokenCommand),
    BoundaryEvent(BoundaryEventCommand),
    StartEvent(InstantiateCommand),
    CallProcess(InstantiateCommand),
    RunScriptTask(TokenCommand),
    RunServiceTask(TokenCommand),
    ThrowSignal(ThrowSignalCommand),
    ThrowMessage(ThrowMessageCommand),
}

impl OperationCommand {
    /// Get a string representation of the command for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompleteActivity(_) => "complete_activity",
            Self::CatchEvent(_) => "catch_event",
            Self::BoundaryEvent(_) => "boundary_event",
            Self::StartEvent(_) => "start_event",
            Self::CallProcess(_) => "call_process",
            Self::RunScriptTask(_) => "run_script_task",
            Self::RunServiceTask(_) => "run_service_task",
            Self::ThrowSignal(_) => "throw_signal",
            Self::ThrowMessage(_) => "throw_message",
        }
    }

    /// Execution path for this command
    ///
    /// Script and service tasks run user code and go to `async_lane`;
    /// everything else runs on the calling thread.
    pub fn execution_mode(&self, async_lane: &str) -> ExecutionMode {
        match self {
            Self::RunScriptTask(_) | Self::RunServiceTask(_) => {
                ExecutionMode::Queued(async_lane.to_string())
            }
            Self::CompleteActivity(_)
            | Self::CatchEvent(_)
            | Self::BoundaryEvent(_)
            | Self::StartEvent(_)
            | Self::CallProcess(_)
            | Self::ThrowSignal(_)
            | Self::ThrowMessage(_) => ExecutionMode::Synchronous,
        }
    }

    /// Whether a successful execution must yield a new instance
    pub fn creates_instance(&self) -> bool {
        matches!(self, Self::StartEvent(_) | Self::CallProcess(_))
    }

    /// Instance the command targets, when there is exactly one
    pub fn instance_key(&self) -> Option<&InstanceKey> {
        match self {
            Self::CompleteActivity(c)
            | Self::CatchEvent(c)
            | Self::RunScriptTask(c)
            | Self::RunServiceTask(c) => Some(c.instance.key()),
            Self::BoundaryEvent(c) => Some(c.instance.key()),
            Self::ThrowMessage(c) => Some(&c.instance_key),
            Self::StartEvent(_) | Self::CallProcess(_) | Self::ThrowSignal(_) => None,
        }
    }

    /// Element the command acts on, when there is one
    pub fn element_id(&self) -> Option<&str> {
        match self {
            Self::CompleteActivity(c)
            | Self::CatchEvent(c)
            | Self::RunScriptTask(c)
            | Self::RunServiceTask(c) => Some(c.token.element_id()),
            Self::BoundaryEvent(c) => Some(&c.boundary_event.id),
            Self::StartEvent(c) | Self::CallProcess(c) => Some(&c.element.id),
            Self::ThrowMessage(c) => Some(&c.element_id),
            Self::ThrowSignal(_) => None,
        }
    }

    /// Token transition the command asks the engine to perform
    ///
    /// Reported for observability only; the engine decides the outcome.
    pub fn requested_transition(&self) -> Option<(TokenState, TokenState)> {
        match self {
            Self::CompleteActivity(_) => {
                Some((TokenState::ReadyToComplete, TokenState::Advanced))
            }
            Self::CatchEvent(_) => Some((TokenState::Waiting, TokenState::Advanced)),
            Self::BoundaryEvent(_) => Some((TokenState::Active, TokenState::Interrupted)),
            Self::RunScriptTask(_) | Self::RunServiceTask(_) => {
                Some((TokenState::Active, TokenState::ReadyToComplete))
            }
            Self::StartEvent(_)
            | Self::CallProcess(_)
            | Self::ThrowSignal(_)
            | Self::ThrowMessage(_) => None,
        }
    }
}

/// Result of a synchronously executed command
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    Completed,
    InstanceCreated(Arc<ProcessInstance>),
}

impl CommandOutcome {
    pub fn into_instance(self) -> Option<Arc<ProcessInstance>> {
        match self {
            Self::InstanceCreated(instance) => Some(instance),
            Self::Completed => None,
        }
    }
}

/// Synchronous executor boundary into the execution engine
///
/// Implementations perform the actual state transition on the calling
/// thread. Errors are opaque to this crate and surface as dispatch errors.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, command: OperationCommand) -> anyhow::Result<CommandOutcome>;
}

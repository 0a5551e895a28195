//! # Orchestration Error Types
//!
//! Failures of the dispatch layer itself. Validation failures live in
//! [`crate::validation`]; everything is surfaced to the caller unmodified
//! and nothing is retried.

use thiserror::Error;

use crate::messaging::MessagingError;
use crate::models::DataStoreError;

/// A command could not be handed to, or completed by, its executor
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Command {command} failed during synchronous execution: {source:#}")]
    ExecutionFailed {
        command: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Command {command} could not be enqueued on lane {lane}: {source}")]
    EnqueueFailed {
        command: &'static str,
        lane: String,
        #[source]
        source: MessagingError,
    },

    #[error("Command {command} completed without producing {expected}")]
    UnexpectedOutcome {
        command: &'static str,
        expected: &'static str,
    },
}

/// A signal broadcast could not be prepared
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BroadcastResolutionError {
    #[error("Event definition {event_definition_id} has no signalRef")]
    MissingSignalRef { event_definition_id: String },

    #[error("Event definition {event_definition_id} has a non-string signalRef")]
    InvalidSignalRef { event_definition_id: String },

    #[error("Data store of instance {instance_key} could not be read: {source}")]
    DataStoreUnavailable {
        instance_key: String,
        #[source]
        source: DataStoreError,
    },
}

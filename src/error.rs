use thiserror::Error;

use crate::config::ConfigurationError;
use crate::models::ModelError;
use crate::orchestration::errors::{BroadcastResolutionError, DispatchError};
use crate::validation::ValidationError;

/// Crate-level error returned by every workflow operation
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    BroadcastResolution(#[from] BroadcastResolutionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl WorkflowError {
    /// Violations when the payload was rejected
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

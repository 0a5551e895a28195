//! # Execution Tokens
//!
//! A token marks the current position of an instance on one flow element.
//! The element is stored by id and resolved on demand against the owning
//! instance's definition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{Element, ModelError, ProcessInstance};

/// Token-level execution state
///
/// The engine owns transitions; the dispatch layer only reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    /// Parked at a catch point
    Waiting,
    /// Inside an activity that boundary events can interrupt
    Active,
    /// Activity work done, waiting to be moved on
    ReadyToComplete,
    /// Moved past its element
    Advanced,
    /// Activity interrupted by a boundary event
    Interrupted,
}

impl TokenState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::ReadyToComplete => "ready_to_complete",
            Self::Advanced => "advanced",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cursor of an instance on a flow element
#[derive(Debug, Clone)]
pub struct Token {
    id: String,
    element_id: String,
    instance: Arc<ProcessInstance>,
    state: TokenState,
}

impl Token {
    pub fn new(
        id: impl Into<String>,
        element_id: impl Into<String>,
        instance: Arc<ProcessInstance>,
    ) -> Self {
        Self {
            id: id.into(),
            element_id: element_id.into(),
            instance,
            state: TokenState::Active,
        }
    }

    pub fn with_state(mut self, state: TokenState) -> Self {
        self.state = state;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn state(&self) -> TokenState {
        self.state
    }

    /// Instance this token belongs to
    pub fn instance(&self) -> &Arc<ProcessInstance> {
        &self.instance
    }

    /// Resolve the element this token sits on
    pub fn definition(&self) -> Result<&Element, ModelError> {
        self.instance
            .definition()
            .require_element(&self.element_id)
    }
}

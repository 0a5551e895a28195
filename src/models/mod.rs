//! # Engine Model
//!
//! The slice of the execution engine's model that the dispatch layer sees:
//! definitions, instances, collaborations and tokens. Everything here is
//! owned by the engine and only read by this crate.

pub mod definition;
pub mod instance;
pub mod token;

pub use definition::{
    Element, ElementKind, EventDefinition, EventDefinitionKind, ProcessDefinition,
};
pub use instance::{
    Collaboration, DataMap, DataStore, InstanceKey, MemoryDataStore, ProcessInstance,
};
pub use token::{Token, TokenState};

use thiserror::Error;

/// Errors raised while reading the engine model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Element {element_id} not found in definition {definition_id}")]
    ElementNotFound {
        definition_id: String,
        element_id: String,
    },

    #[error("Element {element_id} is a {found}, expected {expected}")]
    UnexpectedElementKind {
        element_id: String,
        expected: String,
        found: ElementKind,
    },
}

/// Failure to read an instance data store
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Data store unavailable: {message}")]
pub struct DataStoreError {
    pub message: String,
}

impl DataStoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

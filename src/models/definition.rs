//! # Process Definitions
//!
//! Immutable description of a BPMN-style graph as seen by the dispatch layer.
//! The execution engine owns parsing and traversal; this module only carries
//! enough shape for validation hooks, element-kind guards and command payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::ModelError;

/// Kind of a flow element within a process graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Process,
    CallActivity,
    StartEvent,
    EndEvent,
    IntermediateCatchEvent,
    IntermediateThrowEvent,
    BoundaryEvent,
    Task,
    UserTask,
    ScriptTask,
    ServiceTask,
    Gateway,
}

impl ElementKind {
    /// Get a string representation of the kind for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::CallActivity => "call_activity",
            Self::StartEvent => "start_event",
            Self::EndEvent => "end_event",
            Self::IntermediateCatchEvent => "intermediate_catch_event",
            Self::IntermediateThrowEvent => "intermediate_throw_event",
            Self::BoundaryEvent => "boundary_event",
            Self::Task => "task",
            Self::UserTask => "user_task",
            Self::ScriptTask => "script_task",
            Self::ServiceTask => "service_task",
            Self::Gateway => "gateway",
        }
    }

    /// Elements that can be the target of `call_process`
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Process)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single flow element (task, event, gateway, process)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Guard used by typed operations in place of interface-level typing
    pub fn expect_kind(&self, expected: ElementKind) -> Result<&Self, ModelError> {
        if self.kind == expected {
            Ok(self)
        } else {
            Err(ModelError::UnexpectedElementKind {
                element_id: self.id.clone(),
                expected: expected.as_str().to_string(),
                found: self.kind,
            })
        }
    }
}

/// Kind of an event definition attached to a throw or catch event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventDefinitionKind {
    Signal,
    Message,
    Timer,
    Error,
    Terminate,
}

/// Event definition of a throw/catch event (`signalRef`, `messageRef`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    pub kind: EventDefinitionKind,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl EventDefinition {
    pub fn new(id: impl Into<String>, kind: EventDefinitionKind) -> Self {
        Self {
            id: id.into(),
            kind,
            properties: BTreeMap::new(),
        }
    }

    /// Signal event definition referencing `signal_ref`
    pub fn signal(id: impl Into<String>, signal_ref: impl Into<String>) -> Self {
        Self::new(id, EventDefinitionKind::Signal)
            .with_property("signalRef", Value::String(signal_ref.into()))
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Immutable process graph description, shared by reference across calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub elements: BTreeMap<String, Element>,
}

impl ProcessDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            elements: BTreeMap::new(),
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.insert(element.id.clone(), element);
        self
    }

    pub fn element(&self, element_id: &str) -> Option<&Element> {
        self.elements.get(element_id)
    }

    /// Resolve an element or fail with [`ModelError::ElementNotFound`]
    pub fn require_element(&self, element_id: &str) -> Result<&Element, ModelError> {
        self.element(element_id)
            .ok_or_else(|| ModelError::ElementNotFound {
                definition_id: self.id.clone(),
                element_id: element_id.to_string(),
            })
    }

    pub fn elements_of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.elements.values().filter(move |e| e.kind == kind)
    }
}

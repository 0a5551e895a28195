//! Test data builders for engine model fixtures

use serde_json::Value;
use std::sync::Arc;
use workflow_manager::commands::CommandExecutor;
use workflow_manager::messaging::WorkerQueue;
use workflow_manager::models::{
    Collaboration, DataMap, Element, ElementKind, InstanceKey, ProcessDefinition, ProcessInstance,
    Token,
};
use workflow_manager::registry::ValidationHookRegistry;
use workflow_manager::WorkflowManager;

use super::spies::{RecordingExecutor, RecordingQueue};

/// Invoice approval process used across dispatch tests
pub fn invoice_definition() -> Arc<ProcessDefinition> {
    Arc::new(
        ProcessDefinition::new("invoice_approval")
            .with_element(Element::new("invoice_approval", ElementKind::Process))
            .with_element(Element::new("start", ElementKind::StartEvent))
            .with_element(Element::new("approve", ElementKind::UserTask).with_name("Approve invoice"))
            .with_element(Element::new("await_payment", ElementKind::IntermediateCatchEvent))
            .with_element(Element::new("approval_timeout", ElementKind::BoundaryEvent))
            .with_element(Element::new("score", ElementKind::ScriptTask))
            .with_element(Element::new("notify", ElementKind::ServiceTask))
            .with_element(Element::new("end", ElementKind::EndEvent)),
    )
}

/// Builder for process instances
pub struct InstanceBuilder {
    key: String,
    definition: Arc<ProcessDefinition>,
    collaboration: Option<Arc<Collaboration>>,
    data: DataMap,
}

impl InstanceBuilder {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            definition: invoice_definition(),
            collaboration: None,
            data: DataMap::new(),
        }
    }

    pub fn with_definition(mut self, definition: Arc<ProcessDefinition>) -> Self {
        self.definition = definition;
        self
    }

    pub fn in_collaboration(mut self, collaboration: Arc<Collaboration>) -> Self {
        self.collaboration = Some(collaboration);
        self
    }

    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Arc<ProcessInstance> {
        let mut instance =
            ProcessInstance::new(InstanceKey::new(self.key), self.definition).with_data(self.data);
        if let Some(collaboration) = self.collaboration {
            instance = instance.with_collaboration(collaboration);
        }
        Arc::new(instance)
    }
}

pub fn collaboration(id: &str, keys: &[&str]) -> Arc<Collaboration> {
    Arc::new(Collaboration::new(
        id,
        keys.iter().map(|k| InstanceKey::new(*k)),
    ))
}

pub fn token_at(instance: &Arc<ProcessInstance>, element_id: &str) -> Token {
    Token::new(format!("{}-{element_id}", instance.key()), element_id, instance.clone())
}

pub fn payload(value: Value) -> DataMap {
    value
        .as_object()
        .cloned()
        .expect("payload fixtures must be JSON objects")
}

/// Manager wired to recording spies
pub struct Harness {
    pub manager: WorkflowManager,
    pub registry: Arc<ValidationHookRegistry>,
    pub executor: Arc<RecordingExecutor>,
    pub queue: Arc<RecordingQueue>,
}

impl Harness {
    pub fn new() -> Self {
        let registry = Arc::new(ValidationHookRegistry::new());
        let executor = Arc::new(RecordingExecutor::default());
        let queue = Arc::new(RecordingQueue::default());
        let manager = WorkflowManager::new(
            registry.clone(),
            executor.clone() as Arc<dyn CommandExecutor>,
            queue.clone() as Arc<dyn WorkerQueue>,
        );
        Self {
            manager,
            registry,
            executor,
            queue,
        }
    }

    /// Total commands that reached either executor
    pub fn dispatched(&self) -> usize {
        self.executor.count() + self.queue.count()
    }
}

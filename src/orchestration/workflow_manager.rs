//! # Workflow Manager
//!
//! Single entry point per workflow action. Every action that advances a
//! specific token (complete, catch, boundary, start, call) validates the
//! payload through the [`ValidationHookRegistry`] first and then executes its
//! command on the calling thread. Script and service tasks skip validation
//! and are handed to the worker queue lane so user code never blocks the
//! engine's traversal loop. Signal and message throws execute synchronously
//! without validation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workflow_manager::commands::{CommandExecutor, CommandOutcome, OperationCommand};
//! use workflow_manager::messaging::WorkerQueue;
//! use workflow_manager::models::{DataMap, Token, ProcessDefinition, ProcessInstance};
//! use workflow_manager::registry::ValidationHookRegistry;
//! use workflow_manager::validation::Rule;
//! use workflow_manager::WorkflowManager;
//!
//! # fn example(
//! #     executor: Arc<dyn CommandExecutor>,
//! #     queue: Arc<dyn WorkerQueue>,
//! #     definition: Arc<ProcessDefinition>,
//! #     instance: Arc<ProcessInstance>,
//! #     token: Token,
//! # ) -> workflow_manager::Result<()> {
//! let validations = Arc::new(ValidationHookRegistry::new());
//! let manager = WorkflowManager::new(validations, executor, queue);
//!
//! manager.on_data_validation(|validator, _definition, _element| {
//!     validator.rule("amount", Rule::Required);
//!     Ok(())
//! });
//!
//! let mut data = DataMap::new();
//! data.insert("amount".to_string(), 5.into());
//! manager.complete_task(&definition, &instance, &token, data)?;
//! # Ok(())
//! # }
//! ```

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::broadcast::prepare_signal_broadcast;
use super::errors::DispatchError;
use crate::commands::{
    BoundaryEventCommand, CommandExecutor, CommandOutcome, InstantiateCommand, OperationCommand,
    ThrowMessageCommand, ThrowSignalCommand, TokenCommand,
};
use crate::config::WorkflowConfig;
use crate::constants::{events, lanes, ExecutionMode};
use crate::error::Result;
use crate::events::EventPublisher;
use crate::logging::{log_broadcast_operation, log_dispatch_operation, log_error};
use crate::messaging::WorkerQueue;
use crate::models::{
    DataMap, Element, ElementKind, EventDefinition, InstanceKey, ModelError, ProcessDefinition,
    ProcessInstance, Token,
};
use crate::registry::ValidationHookRegistry;
use crate::validation::{DataValidator, ValidationError};

/// Dispatch router for workflow actions
pub struct WorkflowManager {
    validations: Arc<ValidationHookRegistry>,
    executor: Arc<dyn CommandExecutor>,
    queue: Arc<dyn WorkerQueue>,
    events: EventPublisher,
    async_lane: String,
}

impl WorkflowManager {
    /// Create a manager dispatching script and service tasks to the `bpmn` lane
    pub fn new(
        validations: Arc<ValidationHookRegistry>,
        executor: Arc<dyn CommandExecutor>,
        queue: Arc<dyn WorkerQueue>,
    ) -> Self {
        Self {
            validations,
            executor,
            queue,
            events: EventPublisher::default(),
            async_lane: lanes::BPMN.to_string(),
        }
    }

    /// Create a manager using the dispatch and event settings of `config`
    pub fn from_config(
        config: &WorkflowConfig,
        validations: Arc<ValidationHookRegistry>,
        executor: Arc<dyn CommandExecutor>,
        queue: Arc<dyn WorkerQueue>,
    ) -> Self {
        Self::new(validations, executor, queue)
            .with_event_publisher(EventPublisher::from_config(&config.events))
            .with_async_lane(config.dispatch.async_lane.clone())
    }

    pub fn with_event_publisher(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn with_async_lane(mut self, lane: impl Into<String>) -> Self {
        self.async_lane = lane.into();
        self
    }

    pub fn validations(&self) -> &Arc<ValidationHookRegistry> {
        &self.validations
    }

    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    pub fn async_lane(&self) -> &str {
        &self.async_lane
    }

    /// Complete the activity a token is sitting on
    #[instrument(skip_all, fields(instance = %instance.key(), element_id = %token.element_id()))]
    pub fn complete_task(
        &self,
        definition: &Arc<ProcessDefinition>,
        instance: &Arc<ProcessInstance>,
        token: &Token,
        data: DataMap,
    ) -> Result<()> {
        let element = token.definition()?;
        self.validate_data(&data, definition, element)?;
        self.dispatch(OperationCommand::CompleteActivity(TokenCommand {
            definition: definition.clone(),
            instance: instance.clone(),
            token: token.clone(),
            data,
        }))?;
        Ok(())
    }

    /// Complete the catch event a token is waiting on
    #[instrument(skip_all, fields(instance = %instance.key(), element_id = %token.element_id()))]
    pub fn complete_catch_event(
        &self,
        definition: &Arc<ProcessDefinition>,
        instance: &Arc<ProcessInstance>,
        token: &Token,
        data: DataMap,
    ) -> Result<()> {
        let element = token.definition()?;
        self.validate_data(&data, definition, element)?;
        self.dispatch(OperationCommand::CatchEvent(TokenCommand {
            definition: definition.clone(),
            instance: instance.clone(),
            token: token.clone(),
            data,
        }))?;
        Ok(())
    }

    /// Interrupt the activity under `token` through `boundary_event`
    #[instrument(skip_all, fields(instance = %instance.key(), element_id = %boundary_event.id))]
    pub fn trigger_boundary_event(
        &self,
        definition: &Arc<ProcessDefinition>,
        instance: &Arc<ProcessInstance>,
        token: &Token,
        boundary_event: &Element,
        data: DataMap,
    ) -> Result<()> {
        boundary_event.expect_kind(ElementKind::BoundaryEvent)?;
        self.validate_data(&data, definition, boundary_event)?;
        self.dispatch(OperationCommand::BoundaryEvent(BoundaryEventCommand {
            definition: definition.clone(),
            instance: instance.clone(),
            token: token.clone(),
            boundary_event: boundary_event.clone(),
            data,
        }))?;
        Ok(())
    }

    /// Trigger a start event and return the instance it created
    #[instrument(skip_all, fields(definition = %definition.id, element_id = %event.id))]
    pub fn trigger_start_event(
        &self,
        definition: &Arc<ProcessDefinition>,
        event: &Element,
        data: DataMap,
    ) -> Result<Arc<ProcessInstance>> {
        event.expect_kind(ElementKind::StartEvent)?;
        self.validate_data(&data, definition, event)?;
        self.instantiate(OperationCommand::StartEvent(InstantiateCommand {
            definition: definition.clone(),
            element: event.clone(),
            data,
        }))
    }

    /// Start a new instance of a (sub)process and return it
    #[instrument(skip_all, fields(definition = %definition.id, element_id = %process.id))]
    pub fn call_process(
        &self,
        definition: &Arc<ProcessDefinition>,
        process: &Element,
        data: DataMap,
    ) -> Result<Arc<ProcessInstance>> {
        if !process.kind.is_callable() {
            return Err(ModelError::UnexpectedElementKind {
                element_id: process.id.clone(),
                expected: ElementKind::Process.as_str().to_string(),
                found: process.kind,
            }
            .into());
        }
        self.validate_data(&data, definition, process)?;
        self.instantiate(OperationCommand::CallProcess(InstantiateCommand {
            definition: definition.clone(),
            element: process.clone(),
            data,
        }))
    }

    /// Queue a script task for execution on a worker
    #[instrument(skip_all, fields(instance = %token.instance().key(), element_id = %script_task.id))]
    pub fn run_script_task(&self, script_task: &Element, token: &Token) -> Result<()> {
        script_task.expect_kind(ElementKind::ScriptTask)?;
        info!("Dispatch a script task: {}", script_task.id);
        self.dispatch(OperationCommand::RunScriptTask(Self::worker_command(token)))?;
        Ok(())
    }

    /// Queue a service task for execution on a worker
    #[instrument(skip_all, fields(instance = %token.instance().key(), element_id = %service_task.id))]
    pub fn run_service_task(&self, service_task: &Element, token: &Token) -> Result<()> {
        service_task.expect_kind(ElementKind::ServiceTask)?;
        info!("Dispatch a service task: {}", service_task.id);
        self.dispatch(OperationCommand::RunServiceTask(Self::worker_command(token)))?;
        Ok(())
    }

    /// Forward a caught signal to [`Self::throw_signal_event_definition`]
    #[deprecated(note = "use WorkflowManager::throw_signal_event_definition")]
    pub fn catch_signal_event(
        &self,
        _source: Option<&Element>,
        source_event_definition: &EventDefinition,
        token: &Token,
    ) -> Result<()> {
        self.throw_signal_event_definition(source_event_definition, token)
    }

    /// Broadcast the signal of `source_event_definition` thrown by `token`
    ///
    /// The throwing instance's data store is the payload. Instances of the
    /// thrower's collaboration, or just the thrower when it has none, are
    /// excluded from delivery.
    #[instrument(skip_all, fields(instance = %token.instance().key(), event_definition = %source_event_definition.id))]
    pub fn throw_signal_event_definition(
        &self,
        source_event_definition: &EventDefinition,
        token: &Token,
    ) -> Result<()> {
        let command = prepare_signal_broadcast(source_event_definition, token.instance())?;
        log_broadcast_operation(
            &command.signal_ref,
            Some(token.instance().key().as_str()),
            command.exclude.len(),
            "prepared",
        );
        self.broadcast(command)
    }

    /// Broadcast `signal_ref` with an explicit exclusion list
    ///
    /// No exclusion is derived here: an empty `exclude` reaches every
    /// listening instance, including the caller's own collaboration.
    #[instrument(skip(self, data, exclude), fields(excluded = exclude.len()))]
    pub fn throw_signal_event(
        &self,
        signal_ref: &str,
        data: DataMap,
        exclude: Vec<InstanceKey>,
    ) -> Result<()> {
        log_broadcast_operation(signal_ref, None, exclude.len(), "prepared");
        self.broadcast(ThrowSignalCommand {
            signal_ref: signal_ref.to_string(),
            data,
            exclude,
        })
    }

    /// Deliver a message to one element of one instance
    #[instrument(skip(self, payload), fields(instance = %instance_key))]
    pub fn throw_message_event(
        &self,
        instance_key: InstanceKey,
        element_id: &str,
        message_ref: &str,
        payload: DataMap,
    ) -> Result<()> {
        self.dispatch(OperationCommand::ThrowMessage(ThrowMessageCommand {
            instance_key,
            element_id: element_id.to_string(),
            message_ref: message_ref.to_string(),
            payload,
        }))?;
        Ok(())
    }

    /// Attach a validation hook run on every subsequent validated action
    pub fn on_data_validation<F>(&self, hook: F)
    where
        F: Fn(&mut DataValidator<'_>, &ProcessDefinition, &Element) -> std::result::Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        self.validations.register_fn(hook);
    }

    /// Validate `data` against every registered hook for `element`
    pub fn validate_data(
        &self,
        data: &DataMap,
        definition: &ProcessDefinition,
        element: &Element,
    ) -> Result<()> {
        if let Err(err) = self.validations.validate(data, definition, element) {
            warn!(
                element_id = %element.id,
                definition_id = %definition.id,
                violations = err.violations.len(),
                "Payload rejected"
            );
            self.events.publish(
                events::VALIDATION_FAILED,
                json!({
                    "definition_id": definition.id,
                    "element_id": element.id,
                    "violations": err.violations,
                }),
            );
            return Err(err.into());
        }
        Ok(())
    }

    fn worker_command(token: &Token) -> TokenCommand {
        let instance = token.instance();
        TokenCommand {
            definition: instance.definition().clone(),
            instance: instance.clone(),
            token: token.clone(),
            data: DataMap::new(),
        }
    }

    fn broadcast(&self, command: ThrowSignalCommand) -> Result<()> {
        let context = json!({
            "signal_ref": command.signal_ref,
            "exclude": command.exclude,
        });
        self.dispatch(OperationCommand::ThrowSignal(command))?;
        self.events.publish(events::SIGNAL_BROADCAST, context);
        Ok(())
    }

    /// Execute a command that must yield a new instance
    fn instantiate(&self, command: OperationCommand) -> Result<Arc<ProcessInstance>> {
        debug_assert!(command.creates_instance(), "{} does not create instances", command.name());
        let name = command.name();
        self.dispatch(command)?
            .and_then(CommandOutcome::into_instance)
            .ok_or_else(|| {
                DispatchError::UnexpectedOutcome {
                    command: name,
                    expected: "a process instance",
                }
                .into()
            })
    }

    /// Route a command to its execution path
    ///
    /// Returns the outcome for synchronous commands and `None` once a queued
    /// command has been accepted by its lane.
    fn dispatch(&self, command: OperationCommand) -> Result<Option<CommandOutcome>> {
        let name = command.name();
        let element_id = command.element_id().map(str::to_string);
        let instance_key = command.instance_key().map(|k| k.to_string());
        let mode = command.execution_mode(&self.async_lane);

        if let Some((from, to)) = command.requested_transition() {
            debug!(command = name, from = %from, to = %to, "Requesting token transition");
        }

        match &mode {
            ExecutionMode::Synchronous => {
                let outcome = self.executor.execute(command).map_err(|source| {
                    log_error(
                        "WorkflowManager",
                        name,
                        &format!("{source:#}"),
                        element_id.as_deref(),
                    );
                    DispatchError::ExecutionFailed {
                        command: name,
                        source,
                    }
                })?;
                log_dispatch_operation(
                    "dispatch",
                    name,
                    element_id.as_deref(),
                    instance_key.as_deref(),
                    mode.as_str(),
                    "executed",
                );
                self.events.publish(
                    events::COMMAND_EXECUTED,
                    json!({
                        "command": name,
                        "element_id": element_id,
                        "instance_key": instance_key,
                    }),
                );
                Ok(Some(outcome))
            }
            ExecutionMode::Queued(lane) => {
                self.queue.dispatch(lane, command).map_err(|source| {
                    log_error(
                        "WorkflowManager",
                        name,
                        &source.to_string(),
                        element_id.as_deref(),
                    );
                    DispatchError::EnqueueFailed {
                        command: name,
                        lane: lane.clone(),
                        source,
                    }
                })?;
                log_dispatch_operation(
                    "dispatch",
                    name,
                    element_id.as_deref(),
                    instance_key.as_deref(),
                    mode.as_str(),
                    "enqueued",
                );
                self.events.publish(
                    events::COMMAND_ENQUEUED,
                    json!({
                        "command": name,
                        "lane": lane,
                        "element_id": element_id,
                        "instance_key": instance_key,
                    }),
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessagingError;
    use crate::models::Collaboration;
    use crate::validation::Rule;
    use crate::WorkflowError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct SpyExecutor {
        executed: Mutex<Vec<OperationCommand>>,
    }

    impl CommandExecutor for SpyExecutor {
        fn execute(&self, command: OperationCommand) -> anyhow::Result<CommandOutcome> {
            let outcome = match &command {
                OperationCommand::StartEvent(c) | OperationCommand::CallProcess(c) => {
                    CommandOutcome::InstanceCreated(Arc::new(ProcessInstance::new(
                        InstanceKey::new("new"),
                        c.definition.clone(),
                    )))
                }
                _ => CommandOutcome::Completed,
            };
            self.executed.lock().push(command);
            Ok(outcome)
        }
    }

    #[derive(Default)]
    struct SpyQueue {
        queued: Mutex<Vec<(String, OperationCommand)>>,
    }

    impl WorkerQueue for SpyQueue {
        fn dispatch(
            &self,
            lane: &str,
            command: OperationCommand,
        ) -> std::result::Result<(), MessagingError> {
            self.queued.lock().push((lane.to_string(), command));
            Ok(())
        }
    }

    struct Fixture {
        manager: WorkflowManager,
        executor: Arc<SpyExecutor>,
        queue: Arc<SpyQueue>,
        definition: Arc<ProcessDefinition>,
        instance: Arc<ProcessInstance>,
    }

    fn fixture() -> Fixture {
        let definition = Arc::new(
            ProcessDefinition::new("invoice")
                .with_element(Element::new("approve", ElementKind::UserTask))
                .with_element(Element::new("wait", ElementKind::IntermediateCatchEvent))
                .with_element(Element::new("script", ElementKind::ScriptTask))
                .with_element(Element::new("start", ElementKind::StartEvent)),
        );
        let instance = Arc::new(ProcessInstance::new(
            InstanceKey::new("A"),
            definition.clone(),
        ));
        let executor = Arc::new(SpyExecutor::default());
        let queue = Arc::new(SpyQueue::default());
        let manager = WorkflowManager::new(
            Arc::new(ValidationHookRegistry::new()),
            executor.clone(),
            queue.clone(),
        );
        Fixture {
            manager,
            executor,
            queue,
            definition,
            instance,
        }
    }

    #[test]
    fn test_complete_catch_event_validates_against_token_element() {
        let f = fixture();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_hook = seen.clone();
        f.manager.on_data_validation(move |_, _, element| {
            seen_by_hook.lock().push(element.id.clone());
            Ok(())
        });

        let token = Token::new("t1", "wait", f.instance.clone());
        f.manager
            .complete_catch_event(&f.definition, &f.instance, &token, DataMap::new())
            .unwrap();

        assert_eq!(*seen.lock(), vec!["wait".to_string()]);
        assert!(matches!(
            f.executor.executed.lock()[0],
            OperationCommand::CatchEvent(_)
        ));
    }

    #[test]
    fn test_unknown_token_element_fails_before_validation() {
        let f = fixture();
        f.manager.on_data_validation(|_, _, _| panic!("hook must not run"));

        let token = Token::new("t1", "missing", f.instance.clone());
        let err = f
            .manager
            .complete_task(&f.definition, &f.instance, &token, DataMap::new())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Model(ModelError::ElementNotFound { .. })));
        assert!(f.executor.executed.lock().is_empty());
    }

    #[test]
    fn test_boundary_event_requires_boundary_element() {
        let f = fixture();
        let token = Token::new("t1", "approve", f.instance.clone());
        let not_boundary = Element::new("approve", ElementKind::UserTask);

        let err = f
            .manager
            .trigger_boundary_event(&f.definition, &f.instance, &token, &not_boundary, DataMap::new())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Model(ModelError::UnexpectedElementKind { .. })));

        let boundary = Element::new("timeout", ElementKind::BoundaryEvent);
        f.manager
            .trigger_boundary_event(&f.definition, &f.instance, &token, &boundary, DataMap::new())
            .unwrap();
        assert_eq!(f.executor.executed.lock().len(), 1);
    }

    #[test]
    fn test_start_event_returns_created_instance() {
        let f = fixture();
        let start = f.definition.require_element("start").unwrap().clone();
        let created = f
            .manager
            .trigger_start_event(&f.definition, &start, DataMap::new())
            .unwrap();
        assert_eq!(created.key(), &InstanceKey::new("new"));
    }

    #[test]
    fn test_call_process_requires_callable_element() {
        let f = fixture();
        for kind in [ElementKind::UserTask, ElementKind::CallActivity] {
            let element = Element::new("approve", kind);
            let err = f
                .manager
                .call_process(&f.definition, &element, DataMap::new())
                .unwrap_err();
            assert!(matches!(err, WorkflowError::Model(ModelError::UnexpectedElementKind { .. })));
        }
        assert!(f.executor.executed.lock().is_empty());

        let process = Element::new("invoice", ElementKind::Process);
        let created = f
            .manager
            .call_process(&f.definition, &process, DataMap::new())
            .unwrap();
        assert_eq!(created.definition().id, "invoice");
    }

    #[test]
    fn test_instantiate_without_instance_is_unexpected() {
        struct NoInstanceExecutor;
        impl CommandExecutor for NoInstanceExecutor {
            fn execute(&self, _command: OperationCommand) -> anyhow::Result<CommandOutcome> {
                Ok(CommandOutcome::Completed)
            }
        }

        let f = fixture();
        let manager = WorkflowManager::new(
            Arc::new(ValidationHookRegistry::new()),
            Arc::new(NoInstanceExecutor),
            f.queue.clone(),
        );
        let start = Element::new("start", ElementKind::StartEvent);
        let err = manager
            .trigger_start_event(&f.definition, &start, DataMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Dispatch(DispatchError::UnexpectedOutcome { command: "start_event", .. })
        ));
    }

    #[test]
    fn test_executor_failure_surfaces_as_dispatch_error() {
        struct FailingExecutor;
        impl CommandExecutor for FailingExecutor {
            fn execute(&self, _command: OperationCommand) -> anyhow::Result<CommandOutcome> {
                anyhow::bail!("engine unavailable")
            }
        }

        let f = fixture();
        let manager = WorkflowManager::new(
            Arc::new(ValidationHookRegistry::new()),
            Arc::new(FailingExecutor),
            f.queue.clone(),
        );
        let token = Token::new("t1", "approve", f.instance.clone());
        let err = manager
            .complete_task(&f.definition, &f.instance, &token, DataMap::new())
            .unwrap_err();
        assert!(err.is_dispatch());
        assert!(err.to_string().contains("engine unavailable"));
    }

    #[test]
    fn test_enqueue_failure_surfaces_as_dispatch_error() {
        struct FullQueue;
        impl WorkerQueue for FullQueue {
            fn dispatch(
                &self,
                lane: &str,
                _command: OperationCommand,
            ) -> std::result::Result<(), MessagingError> {
                Err(MessagingError::queue_capacity_exceeded(lane, 1))
            }
        }

        let f = fixture();
        let manager = WorkflowManager::new(
            Arc::new(ValidationHookRegistry::new()),
            f.executor.clone(),
            Arc::new(FullQueue),
        );
        let script = Element::new("script", ElementKind::ScriptTask);
        let token = Token::new("t1", "script", f.instance.clone());
        let err = manager.run_script_task(&script, &token).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Dispatch(DispatchError::EnqueueFailed { ref lane, .. }) if lane == "bpmn"
        ));
        assert!(f.executor.executed.lock().is_empty());
    }

    #[test]
    fn test_service_task_uses_configured_lane() {
        let f = fixture();
        let manager = f.manager.with_async_lane("services");
        let service = Element::new("call_api", ElementKind::ServiceTask);
        let token = Token::new("t1", "call_api", f.instance.clone());

        manager.run_service_task(&service, &token).unwrap();

        let queued = f.queue.queued.lock();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].0, "services");
        assert!(matches!(queued[0].1, OperationCommand::RunServiceTask(ref c) if c.data.is_empty()));
    }

    #[test]
    fn test_script_task_skips_validation() {
        let f = fixture();
        f.manager.on_data_validation(|validator, _, _| {
            validator.rule("amount", Rule::Required);
            Ok(())
        });
        let script = Element::new("script", ElementKind::ScriptTask);
        let token = Token::new("t1", "script", f.instance.clone());

        f.manager.run_script_task(&script, &token).unwrap();
        assert_eq!(f.queue.queued.lock().len(), 1);
    }

    #[test]
    #[allow(deprecated)]
    fn test_catch_signal_event_forwards_to_throw() {
        let f = fixture();
        let collaboration = Arc::new(Collaboration::new("c1", ["A".into(), "B".into()]));
        let instance = Arc::new(
            ProcessInstance::new(InstanceKey::new("A"), f.definition.clone())
                .with_collaboration(collaboration),
        );
        let token = Token::new("t1", "approve", instance);

        f.manager
            .catch_signal_event(None, &EventDefinition::signal("d1", "S1"), &token)
            .unwrap();

        let executed = f.executor.executed.lock();
        match &executed[0] {
            OperationCommand::ThrowSignal(c) => {
                assert_eq!(c.signal_ref, "S1");
                assert_eq!(c.exclude, vec![InstanceKey::new("A"), InstanceKey::new("B")]);
            }
            other => panic!("unexpected command {}", other.name()),
        }
    }

    #[test]
    fn test_throw_message_event_is_point_to_point() {
        let f = fixture();
        f.manager
            .throw_message_event(InstanceKey::new("B"), "receive", "M1", DataMap::new())
            .unwrap();

        let executed = f.executor.executed.lock();
        match &executed[0] {
            OperationCommand::ThrowMessage(c) => {
                assert_eq!(c.instance_key, InstanceKey::new("B"));
                assert_eq!(c.element_id, "receive");
                assert_eq!(c.message_ref, "M1");
            }
            other => panic!("unexpected command {}", other.name()),
        }
        assert!(f.queue.queued.lock().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_is_published() {
        let f = fixture();
        let mut receiver = f.manager.events().subscribe();
        f.manager.on_data_validation(|validator, _, _| {
            validator.rule("amount", Rule::Required);
            Ok(())
        });

        let token = Token::new("t1", "approve", f.instance.clone());
        let err = f
            .manager
            .complete_task(&f.definition, &f.instance, &token, DataMap::new())
            .unwrap_err();
        assert!(err.is_validation());

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.name, events::VALIDATION_FAILED);
        assert_eq!(event.context["element_id"], "approve");
        assert_eq!(event.context["violations"][0]["field"], "amount");
    }
}

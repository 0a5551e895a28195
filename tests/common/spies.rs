//! Recording command sinks

use parking_lot::Mutex;
use std::sync::Arc;
use workflow_manager::commands::{CommandExecutor, CommandOutcome, OperationCommand};
use workflow_manager::messaging::{MessagingError, WorkerQueue};
use workflow_manager::models::{InstanceKey, ProcessInstance};

/// Synchronous executor that records every command it receives
#[derive(Default)]
pub struct RecordingExecutor {
    commands: Mutex<Vec<OperationCommand>>,
}

impl RecordingExecutor {
    pub fn count(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn commands(&self) -> Vec<OperationCommand> {
        self.commands.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.commands.lock().iter().map(|c| c.name()).collect()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, command: OperationCommand) -> anyhow::Result<CommandOutcome> {
        let outcome = match &command {
            OperationCommand::StartEvent(c) | OperationCommand::CallProcess(c) => {
                CommandOutcome::InstanceCreated(Arc::new(ProcessInstance::new(
                    InstanceKey::generate(),
                    c.definition.clone(),
                )))
            }
            _ => CommandOutcome::Completed,
        };
        self.commands.lock().push(command);
        Ok(outcome)
    }
}

/// Worker queue that records every enqueued command with its lane
#[derive(Default)]
pub struct RecordingQueue {
    commands: Mutex<Vec<(String, OperationCommand)>>,
}

impl RecordingQueue {
    pub fn count(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn commands(&self) -> Vec<(String, OperationCommand)> {
        self.commands.lock().clone()
    }
}

impl WorkerQueue for RecordingQueue {
    fn dispatch(&self, lane: &str, command: OperationCommand) -> Result<(), MessagingError> {
        self.commands.lock().push((lane.to_string(), command));
        Ok(())
    }
}

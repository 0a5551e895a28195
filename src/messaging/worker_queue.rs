//! # Worker Queue
//!
//! Fire-and-forget execution of commands off the calling thread.
//!
//! [`WorkerQueue::dispatch`] is a non-blocking handoff: it either places the
//! command on the named lane or fails immediately. Execution happens later
//! on lane workers, and failures are reported only through logs and the
//! `bpmn.command_failed` event. There is no ordering between lanes and no
//! way to cancel a queued command.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workflow_manager::config::WorkerQueueConfig;
//! use workflow_manager::events::EventPublisher;
//! use workflow_manager::messaging::{LaneWorkerQueue, QueuedCommandHandler};
//! use workflow_manager::commands::OperationCommand;
//!
//! struct ScriptRunner;
//!
//! #[async_trait::async_trait]
//! impl QueuedCommandHandler for ScriptRunner {
//!     async fn handle(&self, command: OperationCommand) -> anyhow::Result<()> {
//!         println!("running {}", command.name());
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = LaneWorkerQueue::start(
//!     &WorkerQueueConfig::default(),
//!     Arc::new(ScriptRunner),
//!     EventPublisher::default(),
//! )?;
//! // ... dispatch through a WorkflowManager ...
//! queue.shutdown().await;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, Instrument};

use super::errors::MessagingError;
use crate::commands::{CommandExecutor, OperationCommand};
use crate::config::WorkerQueueConfig;
use crate::constants::events;
use crate::events::EventPublisher;
use crate::logging::log_error;

/// Asynchronous executor boundary
pub trait WorkerQueue: Send + Sync {
    /// Hand `command` to `lane`; returns once the command is queued
    fn dispatch(&self, lane: &str, command: OperationCommand) -> Result<(), MessagingError>;
}

/// Consumer of queued commands, run on lane workers
#[async_trait]
pub trait QueuedCommandHandler: Send + Sync {
    async fn handle(&self, command: OperationCommand) -> anyhow::Result<()>;
}

/// Runs a synchronous [`CommandExecutor`] on tokio's blocking pool
pub struct BlockingExecutorHandler {
    executor: Arc<dyn CommandExecutor>,
}

impl BlockingExecutorHandler {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl QueuedCommandHandler for BlockingExecutorHandler {
    async fn handle(&self, command: OperationCommand) -> anyhow::Result<()> {
        let executor = self.executor.clone();
        tokio::task::spawn_blocking(move || executor.execute(command)).await??;
        Ok(())
    }
}

/// Counters across all lanes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub processed: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
}

struct Lane {
    sender: mpsc::Sender<OperationCommand>,
    capacity: usize,
}

/// Named lanes backed by bounded tokio channels and worker tasks
pub struct LaneWorkerQueue {
    /// `None` once shut down
    lanes: RwLock<Option<HashMap<String, Lane>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl LaneWorkerQueue {
    /// Create lanes and spawn their workers on the current tokio runtime
    pub fn start(
        config: &WorkerQueueConfig,
        handler: Arc<dyn QueuedCommandHandler>,
        events: EventPublisher,
    ) -> Result<Self, MessagingError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            MessagingError::configuration("LaneWorkerQueue", format!("no tokio runtime: {e}"))
        })?;

        let counters = Arc::new(Counters::default());
        let mut lanes = HashMap::new();
        let mut workers = Vec::new();

        for lane_config in &config.lanes {
            if lane_config.capacity == 0 || lane_config.workers == 0 {
                return Err(MessagingError::configuration(
                    "LaneWorkerQueue",
                    format!("lane '{}' needs capacity and workers", lane_config.name),
                ));
            }

            let (sender, receiver) = mpsc::channel(lane_config.capacity);
            let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

            for worker_id in 0..lane_config.workers {
                let worker = LaneWorker {
                    lane: lane_config.name.clone(),
                    worker_id,
                    receiver: receiver.clone(),
                    handler: handler.clone(),
                    events: events.clone(),
                    counters: counters.clone(),
                };
                let span = tracing::info_span!("lane_worker", lane = %lane_config.name, worker_id);
                workers.push(runtime.spawn(worker.run().instrument(span)));
            }

            info!(
                lane = %lane_config.name,
                capacity = lane_config.capacity,
                workers = lane_config.workers,
                "Started worker lane"
            );
            lanes.insert(
                lane_config.name.clone(),
                Lane {
                    sender,
                    capacity: lane_config.capacity,
                },
            );
        }

        Ok(Self {
            lanes: RwLock::new(Some(lanes)),
            workers: Mutex::new(workers),
            counters,
        })
    }

    pub fn lane_names(&self) -> Vec<String> {
        self.lanes
            .read()
            .as_ref()
            .map(|lanes| lanes.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            processed: self.counters.processed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting commands and wait for workers to drain their lanes
    pub async fn shutdown(&self) {
        // Dropping the senders closes each lane once it is drained
        let lanes = self.lanes.write().take();
        drop(lanes);

        let workers: Vec<_> = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            if let Err(e) = handle.await {
                log_error("LaneWorkerQueue", "shutdown", &e.to_string(), None);
            }
        }
        info!(stats = ?self.stats(), "Worker queue shut down");
    }
}

impl WorkerQueue for LaneWorkerQueue {
    #[instrument(skip(self, command), fields(command = command.name()))]
    fn dispatch(&self, lane: &str, command: OperationCommand) -> Result<(), MessagingError> {
        let guard = self.lanes.read();
        let lanes = guard
            .as_ref()
            .ok_or_else(|| MessagingError::queue_closed(lane))?;
        let target = lanes
            .get(lane)
            .ok_or_else(|| MessagingError::queue_not_found(lane))?;

        match target.sender.try_send(command) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                debug!(lane = %lane, "Command enqueued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(MessagingError::queue_capacity_exceeded(
                lane,
                target.capacity,
            )),
            Err(TrySendError::Closed(_)) => Err(MessagingError::queue_closed(lane)),
        }
    }
}

struct LaneWorker {
    lane: String,
    worker_id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<OperationCommand>>>,
    handler: Arc<dyn QueuedCommandHandler>,
    events: EventPublisher,
    counters: Arc<Counters>,
}

impl LaneWorker {
    async fn run(self) {
        loop {
            let next = { self.receiver.lock().await.recv().await };
            let Some(command) = next else {
                debug!(worker_id = self.worker_id, "Lane closed, worker exiting");
                break;
            };
            self.process(command).await;
        }
    }

    async fn process(&self, command: OperationCommand) {
        let name = command.name();
        let element_id = command.element_id().map(str::to_string);
        let instance_key = command.instance_key().map(|k| k.to_string());

        let outcome = AssertUnwindSafe(self.handler.handle(command))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(anyhow::anyhow!("handler panicked: {}", panic_message(&*panic)))
            });

        match outcome {
            Ok(()) => {
                self.counters.processed.fetch_add(1, Ordering::Relaxed);
                debug!(command = name, element_id = ?element_id, "Queued command executed");
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                log_error(
                    "LaneWorker",
                    name,
                    &format!("{e:#}"),
                    element_id.as_deref(),
                );
                self.events.publish(
                    events::COMMAND_FAILED,
                    json!({
                        "command": name,
                        "lane": self.lane,
                        "element_id": element_id,
                        "instance_key": instance_key,
                        "error": format!("{e:#}"),
                    }),
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

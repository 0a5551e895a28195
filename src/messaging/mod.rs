//! # Messaging Module
//!
//! Worker queue boundary for asynchronously dispatched commands, plus a
//! tokio-backed lane implementation.

pub mod errors;
pub mod worker_queue;

pub use errors::MessagingError;
pub use worker_queue::{
    BlockingExecutorHandler, LaneWorkerQueue, QueueStats, QueuedCommandHandler, WorkerQueue,
};

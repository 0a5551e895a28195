//! # Orchestration
//!
//! The dispatch router between the execution engine's traversal logic and
//! the operation commands that advance execution.
//!
//! ## Control Flow
//!
//! ```text
//! engine traversal event
//!   └── WorkflowManager operation
//!         ├── ValidationHookRegistry::validate   (token-advancing operations)
//!         ├── broadcast::prepare_signal_broadcast (signals thrown by a token)
//!         └── OperationCommand
//!               ├── CommandExecutor   (synchronous, result observed by caller)
//!               └── WorkerQueue lane  (script/service tasks, fire-and-forget)
//! ```

pub mod broadcast;
pub mod errors;
pub mod workflow_manager;

pub use broadcast::{exclusion_set, prepare_signal_broadcast, resolve_signal_ref};
pub use errors::{BroadcastResolutionError, DispatchError};
pub use workflow_manager::WorkflowManager;

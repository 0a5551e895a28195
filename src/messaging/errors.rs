//! # Messaging Error Types
//!
//! Errors raised when handing commands to worker lanes.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    #[error("Queue not found: {queue_name}")]
    QueueNotFound { queue_name: String },

    #[error("Queue capacity exceeded: {queue_name} is full at {capacity} commands")]
    QueueCapacityExceeded { queue_name: String, capacity: usize },

    #[error("Queue closed: {queue_name}")]
    QueueClosed { queue_name: String },

    #[error("Configuration error: {component}: {message}")]
    Configuration { component: String, message: String },
}

impl MessagingError {
    /// Create a queue not found error
    pub fn queue_not_found(queue_name: impl Into<String>) -> Self {
        Self::QueueNotFound {
            queue_name: queue_name.into(),
        }
    }

    pub fn queue_capacity_exceeded(queue_name: impl Into<String>, capacity: usize) -> Self {
        Self::QueueCapacityExceeded {
            queue_name: queue_name.into(),
            capacity,
        }
    }

    pub fn queue_closed(queue_name: impl Into<String>) -> Self {
        Self::QueueClosed {
            queue_name: queue_name.into(),
        }
    }

    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Whether retrying the enqueue later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::QueueCapacityExceeded { .. })
    }
}

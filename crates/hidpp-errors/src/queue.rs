//! Message queue outcomes.

use std::time::Duration;

use crate::common::ErrorSeverity;

/// Outcomes of queue operations that did not yield a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// No matching message arrived before the timeout.
    #[error("Queue '{queue}' empty after {timeout:?}")]
    Empty {
        /// Queue name
        queue: String,
        /// Time waited
        timeout: Duration,
    },

    /// A bounded queue stayed full for the whole timeout.
    #[error("Queue '{queue}' full after {timeout:?}")]
    Full {
        /// Queue name
        queue: String,
        /// Time waited
        timeout: Duration,
    },

    /// No queue with that name is registered.
    #[error("Unknown queue '{0}'")]
    UnknownQueue(String),
}

impl QueueError {
    /// Create an empty-queue outcome.
    #[must_use]
    pub fn empty(queue: impl Into<String>, timeout: Duration) -> Self {
        Self::Empty {
            queue: queue.into(),
            timeout,
        }
    }

    /// Whether this is the normal timed-poll outcome.
    pub fn is_empty(&self) -> bool {
        matches!(self, QueueError::Empty { .. })
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            QueueError::Empty { .. } => ErrorSeverity::Expected,
            QueueError::Full { .. } => ErrorSeverity::Expected,
            QueueError::UnknownQueue(_) => ErrorSeverity::Misuse,
        }
    }
}

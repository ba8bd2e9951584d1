//! Message handlers registered with the dispatcher.
//!
//! Handlers are consulted in registration order. A terminal handler (every
//! [`MessageQueue`](crate::queue::MessageQueue)) consumes the record and ends
//! delivery; a non-terminal handler receives a copy and delivery goes on.

use std::fmt;
use std::sync::Arc;

use hidpp_errors::Result;
use hidpp_fields::{Record, Schema};

use crate::queue::MessageQueue;

pub trait MessageHandler: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Whether the handler wants `record`.
    fn accepts(&self, record: &Record) -> bool;

    /// Take delivery of `record`.
    ///
    /// # Errors
    ///
    /// Implementation defined. The dispatcher returns a terminal handler's
    /// error to the producer and only logs an observer's.
    fn handle(&self, record: Record) -> Result<()>;

    /// Whether delivery stops at this handler.
    fn is_terminal(&self) -> bool {
        true
    }

    /// The handler as a queue, for lookup by name.
    fn into_queue(self: Arc<Self>) -> Option<Arc<MessageQueue>> {
        None
    }
}

type Callback = Box<dyn Fn(&Record) + Send + Sync>;

/// Observer that sees every accepted record and never consumes it.
pub struct CallbackHandler {
    name: String,
    accepts: Vec<&'static Schema>,
    callback: Callback,
}

impl CallbackHandler {
    /// An observer of records derived from `accepts`; empty observes all.
    pub fn new(
        name: impl Into<String>,
        accepts: impl Into<Vec<&'static Schema>>,
        callback: impl Fn(&Record) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            accepts: accepts.into(),
            callback: Box::new(callback),
        }
    }
}

impl fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("name", &self.name)
            .field("accepts", &self.accepts)
            .finish_non_exhaustive()
    }
}

impl MessageHandler for CallbackHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self, record: &Record) -> bool {
        self.accepts.is_empty() || self.accepts.iter().any(|schema| record.is_a(schema))
    }

    fn handle(&self, record: Record) -> Result<()> {
        (self.callback)(&record);
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidpp_messages::category;
    use hidpp_messages::features::root;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_callback_observes_without_consuming() -> TestResult {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let observer = CallbackHandler::new("observer", vec![&category::IMPORTANT as &'static Schema], move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let record = Record::new(&root::GET_FEATURE_RESPONSE_V0)?;
        assert!(observer.accepts(&record));
        assert!(!observer.is_terminal());
        observer.handle(record)?;
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        let handler: Arc<dyn MessageHandler> = Arc::new(observer);
        assert!(handler.into_queue().is_none());
        Ok(())
    }

    #[test]
    fn test_queue_is_terminal() {
        let queue: Arc<dyn MessageHandler> = Arc::new(MessageQueue::new("Important", Vec::new()));
        assert!(queue.is_terminal());
        assert!(queue.into_queue().is_some_and(|queue| queue.name() == "Important"));
    }
}

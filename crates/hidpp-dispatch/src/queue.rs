//! Type-filtered FIFO queues fed by the dispatcher.
//!
//! Each queue owns its lock. Producers only ever hold it for a push;
//! consumers wait on a condition variable with a caller-supplied timeout.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use hidpp_errors::{QueueError, Result};
use hidpp_fields::{Record, Schema};
use hidpp_messages::category;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::trace;

use crate::handler::MessageHandler;

/// Name of the catch-all queue.
pub const DEFAULT_QUEUE_NAME: &str = "Default";

/// A named FIFO accepting records derived from any of its accepted types.
pub struct MessageQueue {
    name: String,
    accepts: Vec<&'static Schema>,
    capacity: Option<usize>,
    messages: Mutex<VecDeque<Record>>,
    not_empty: Condvar,
    not_full: Condvar,
    empty: AtomicBool,
}

impl MessageQueue {
    /// An unbounded queue. An empty `accepts` list accepts every record.
    pub fn new(name: impl Into<String>, accepts: impl Into<Vec<&'static Schema>>) -> Self {
        Self::with_capacity(name, accepts, None)
    }

    pub fn with_capacity(
        name: impl Into<String>,
        accepts: impl Into<Vec<&'static Schema>>,
        capacity: Option<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            accepts: accepts.into(),
            capacity,
            messages: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            empty: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepted_types(&self) -> &[&'static Schema] {
        &self.accepts
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Whether `record` passes the type filter.
    pub fn accepts(&self, record: &Record) -> bool {
        self.accepts.is_empty() || self.accepts.iter().any(|schema| record.is_a(schema))
    }

    fn is_full(&self, messages: &VecDeque<Record>) -> bool {
        self.capacity.is_some_and(|capacity| messages.len() >= capacity)
    }

    fn push(&self, messages: &mut VecDeque<Record>, record: Record) {
        messages.push_back(record);
        self.empty.store(false, Ordering::Release);
        self.not_empty.notify_all();
    }

    fn pop_at(&self, messages: &mut VecDeque<Record>, position: usize) -> Option<Record> {
        let record = messages.remove(position);
        if messages.is_empty() {
            self.empty.store(true, Ordering::Release);
        }
        self.not_full.notify_one();
        record
    }

    /// Append a record, waiting for room when the queue is bounded.
    pub fn put(&self, record: Record) {
        let mut messages = self.messages.lock();
        while self.is_full(&messages) {
            self.not_full.wait(&mut messages);
        }
        self.push(&mut messages, record);
    }

    /// Append a record, giving up after `timeout` on a full bounded queue.
    ///
    /// # Errors
    ///
    /// `QueueError::Full` if no room appeared in time.
    pub fn put_timeout(&self, record: Record, timeout: Duration) -> Result<()> {
        let deadline = Instant::now().checked_add(timeout);
        let mut messages = self.messages.lock();
        while self.is_full(&messages) {
            if wait(&self.not_full, &mut messages, deadline) && self.is_full(&messages) {
                return Err(QueueError::Full {
                    queue: self.name.clone(),
                    timeout,
                }
                .into());
            }
        }
        self.push(&mut messages, record);
        Ok(())
    }

    /// Pop the oldest record, waiting up to `timeout`.
    ///
    /// # Errors
    ///
    /// `QueueError::Empty` if nothing arrived in time.
    pub fn get(&self, timeout: Duration) -> Result<Record> {
        self.get_matching(timeout, |_| true)
    }

    /// Pop the oldest record without waiting.
    pub fn try_get(&self) -> Option<Record> {
        let mut messages = self.messages.lock();
        if messages.is_empty() {
            return None;
        }
        self.pop_at(&mut messages, 0)
    }

    /// Pop the oldest record derived from one of `types`, waiting up to
    /// `timeout`. Records of other types stay queued in order.
    ///
    /// # Errors
    ///
    /// `QueueError::Empty` if no such record arrived in time.
    pub fn get_first_message_type_in(&self, types: &[&Schema], timeout: Duration) -> Result<Record> {
        self.get_matching(timeout, |record| types.iter().any(|schema| record.is_a(schema)))
    }

    fn get_matching(&self, timeout: Duration, matches: impl Fn(&Record) -> bool) -> Result<Record> {
        let deadline = Instant::now().checked_add(timeout);
        let mut messages = self.messages.lock();
        loop {
            if let Some(position) = messages.iter().position(&matches) {
                if let Some(record) = self.pop_at(&mut messages, position) {
                    return Ok(record);
                }
            }
            if wait(&self.not_empty, &mut messages, deadline) && !messages.iter().any(&matches)
            {
                return Err(QueueError::empty(self.name.clone(), timeout).into());
            }
        }
    }

    /// Whether the queue is empty, without taking its lock.
    pub fn check_empty(&self) -> bool {
        self.empty.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Remove and return every queued record, oldest first.
    pub fn drain(&self) -> Vec<Record> {
        let mut messages = self.messages.lock();
        let drained: Vec<Record> = messages.drain(..).collect();
        self.empty.store(true, Ordering::Release);
        self.not_full.notify_all();
        drained
    }

    /// Drop every queued record.
    pub fn clear(&self) {
        let dropped = self.drain().len();
        if dropped > 0 {
            trace!(queue = %self.name, dropped, "queue cleared");
        }
    }
}

/// Wait on `condvar`, forever when the deadline overflowed. True on timeout.
fn wait(
    condvar: &Condvar,
    messages: &mut MutexGuard<'_, VecDeque<Record>>,
    deadline: Option<Instant>,
) -> bool {
    match deadline {
        Some(deadline) => condvar.wait_until(messages, deadline).timed_out(),
        None => {
            condvar.wait(messages);
            false
        }
    }
}

impl fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageQueue")
            .field("name", &self.name)
            .field("accepts", &self.accepts)
            .field("capacity", &self.capacity)
            .field("len", &self.messages.try_lock().map(|messages| messages.len()))
            .finish()
    }
}

impl MessageHandler for MessageQueue {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self, record: &Record) -> bool {
        MessageQueue::accepts(self, record)
    }

    fn handle(&self, record: Record) -> Result<()> {
        self.put(record);
        Ok(())
    }

    fn into_queue(self: Arc<Self>) -> Option<Arc<MessageQueue>> {
        Some(self)
    }
}

/// The built-in queues in delivery order, default queue excluded.
pub fn builtin_queues(capacity: Option<usize>) -> Vec<Arc<MessageQueue>> {
    let layout: [(&str, &'static Schema); 19] = [
        ("Important", &category::IMPORTANT),
        ("Common", &category::COMMON),
        ("Mouse", &category::MOUSE),
        ("Keyboard", &category::KEYBOARD),
        ("Touchpad", &category::TOUCHPAD),
        ("Gaming", &category::GAMING),
        ("Peripheral", &category::PERIPHERAL),
        ("InterfaceDescriptor", &category::INTERFACE_DESCRIPTOR),
        ("Event", &category::EVENT),
        ("BatteryEvent", &category::BATTERY_EVENT),
        ("Error", &category::ERROR),
        ("HID", &category::HID),
        ("ReceiverError", &category::RECEIVER_ERROR),
        ("ReceiverResponse", &category::RECEIVER_RESPONSE),
        ("ReceiverEvent", &category::RECEIVER_EVENT),
        ("ReceiverConnectionEvent", &category::RECEIVER_CONNECTION_EVENT),
        ("VLPImportant", &category::VLP_IMPORTANT),
        ("VLPCommon", &category::VLP_COMMON),
        ("VLPEvent", &category::VLP_EVENT),
    ];
    layout
        .into_iter()
        .map(|(name, accepts)| Arc::new(MessageQueue::with_capacity(name, vec![accepts], capacity)))
        .collect()
}

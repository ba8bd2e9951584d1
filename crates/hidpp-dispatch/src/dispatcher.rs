//! The dispatcher: classify each interrupt and hand it to one consumer.
//!
//! A re-entrant lock serializes classification and delivery, so a handler
//! may call back into the dispatcher while a message is being delivered.
//! The handler list sits behind its own short-lived lock and delivery works
//! on a snapshot of it: a producer blocked on a full bounded queue never
//! keeps consumers from looking queues up and draining them.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hidpp_errors::{QueueError, Result, ResultExt};
use hidpp_fields::Record;
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, trace, warn};

use crate::classifier::Classifier;
use crate::config::DispatcherConfig;
use crate::handler::MessageHandler;
use crate::index::FeatureKey;
use crate::interface::{HidCollection, HidInterface};
use crate::queue::{DEFAULT_QUEUE_NAME, MessageQueue, builtin_queues};
use crate::registry::FeatureRegistry;
use crate::transport::TransportMessage;

/// Record property carrying the dispatcher sequence number.
pub const SEQUENCE_PROPERTY: &str = "sequence";

/// Where a classified message went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Name of the terminal handler (or the default queue) that took it.
    pub handler: String,
    /// Sequence number assigned to the message.
    pub sequence: u64,
}

type Handlers = Vec<Arc<dyn MessageHandler>>;

#[derive(Debug)]
pub struct Dispatcher {
    config: DispatcherConfig,
    classifier: ReentrantMutex<RefCell<Classifier>>,
    handlers: Mutex<Handlers>,
    default_queue: Arc<MessageQueue>,
    sequence: AtomicU64,
}

impl Dispatcher {
    /// A dispatcher over the standard registry with the built-in queues.
    ///
    /// # Errors
    ///
    /// Configuration errors, or a broken standard registry.
    pub fn new(config: DispatcherConfig) -> Result<Self> {
        let dispatcher = Self::with_registry(config, Arc::new(FeatureRegistry::standard()?))?;
        dispatcher.init_queues();
        Ok(dispatcher)
    }

    /// A dispatcher over `registry` with no handlers; unaccepted records go
    /// to the default queue.
    ///
    /// # Errors
    ///
    /// Configuration errors.
    pub fn with_registry(config: DispatcherConfig, registry: Arc<FeatureRegistry>) -> Result<Self> {
        config.validate()?;
        let classifier = Classifier::new(registry, &config);
        let default_queue = Arc::new(MessageQueue::with_capacity(
            DEFAULT_QUEUE_NAME,
            Vec::new(),
            config.queue_capacity,
        ));
        Ok(Self {
            config,
            classifier: ReentrantMutex::new(RefCell::new(classifier)),
            handlers: Mutex::new(Vec::new()),
            default_queue,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Replace every handler with fresh built-in queues.
    pub fn init_queues(&self) {
        let queues: Handlers = builtin_queues(self.config.queue_capacity)
            .into_iter()
            .map(|queue| queue as Arc<dyn MessageHandler>)
            .collect();
        let count = queues.len();
        *self.handlers.lock() = queues;
        self.default_queue.clear();
        debug!(queues = count, "dispatcher queues initialised");
    }

    /// Classify `message` and deliver the record.
    ///
    /// Returns `None` when nothing classified the message. Otherwise the
    /// record went to the first accepting terminal handler, or to the
    /// default queue; non-terminal handlers met on the way saw a copy.
    /// Observer failures are logged and delivery goes on.
    ///
    /// # Errors
    ///
    /// Classification errors, wrapped with the report bytes. A terminal
    /// handler error, wrapped the same way, after the record was put on the
    /// default queue instead.
    pub fn process_interrupt(&self, message: &mut TransportMessage) -> Result<Option<Delivery>> {
        let guard = self.classifier.lock();
        let classified = guard.borrow().classify(message).in_frame("classify", &message.data)?;
        let Some(mut record) = classified else {
            trace!(data = %message.hex(), "interrupt not classified");
            return Ok(None);
        };
        let handlers = self.handlers.lock().clone();
        message.record_name = Some(record.name().to_string());
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        record.set_property(SEQUENCE_PROPERTY, sequence.to_string());

        for handler in &handlers {
            if !handler.accepts(&record) {
                continue;
            }
            if !handler.is_terminal() {
                if let Err(error) = handler.handle(record.clone()) {
                    warn!(handler = handler.name(), sequence, %error, "observer failed");
                }
                continue;
            }
            let name = handler.name().to_string();
            if let Err(error) = handler.handle(record.clone()) {
                warn!(handler = %name, sequence, %error, "handler refused message, kept in default queue");
                self.default_queue.put(record);
                return Err::<Option<Delivery>, _>(error).in_frame("deliver", &message.data);
            }
            debug!(queue = %name, sequence, record = record.name(), "message delivered");
            return Ok(Some(Delivery {
                handler: name,
                sequence,
            }));
        }

        debug!(queue = DEFAULT_QUEUE_NAME, sequence, record = record.name(), "message delivered");
        self.default_queue.put(record);
        Ok(Some(Delivery {
            handler: DEFAULT_QUEUE_NAME.to_string(),
            sequence,
        }))
    }

    /// Append a handler; it is consulted after every existing one, from the
    /// next message on.
    pub fn add_handler(&self, handler: Arc<dyn MessageHandler>) {
        debug!(handler = handler.name(), "handler added");
        self.handlers.lock().push(handler);
    }

    /// Remove the first handler named `name`.
    pub fn remove_handler(&self, name: &str) -> Option<Arc<dyn MessageHandler>> {
        let mut handlers = self.handlers.lock();
        let position = handlers.iter().position(|handler| handler.name() == name)?;
        debug!(handler = name, "handler removed");
        Some(handlers.remove(position))
    }

    pub fn remove_all_handlers(&self) {
        self.handlers.lock().clear();
        debug!("all handlers removed");
    }

    /// Names of the registered handlers in delivery order.
    pub fn handler_names(&self) -> Vec<String> {
        self.handlers
            .lock()
            .iter()
            .map(|handler| handler.name().to_string())
            .collect()
    }

    /// The queue registered as `name`, the default queue included.
    pub fn get_queue_by_name(&self, name: &str) -> Option<Arc<MessageQueue>> {
        if name == DEFAULT_QUEUE_NAME {
            return Some(Arc::clone(&self.default_queue));
        }
        self.queues().into_iter().find(|queue| queue.name() == name)
    }

    /// Like [`Dispatcher::get_queue_by_name`], failing for unknown names.
    ///
    /// # Errors
    ///
    /// `QueueError::UnknownQueue`.
    pub fn queue(&self, name: &str) -> Result<Arc<MessageQueue>> {
        self.get_queue_by_name(name)
            .ok_or_else(|| QueueError::UnknownQueue(name.to_string()).into())
    }

    pub fn default_queue(&self) -> &Arc<MessageQueue> {
        &self.default_queue
    }

    /// Registered queues in delivery order, default queue excluded.
    pub fn queues(&self) -> Vec<Arc<MessageQueue>> {
        let handlers = self.handlers.lock().clone();
        handlers.into_iter().filter_map(|handler| handler.into_queue()).collect()
    }

    /// Drain every queue in delivery order, default queue last, and return
    /// what nobody consumed.
    pub fn clear_all_queues(&self) -> Vec<Record> {
        let mut untreated = Vec::new();
        for queue in self.queues().iter().chain(std::iter::once(&self.default_queue)) {
            let drained = queue.drain();
            if !drained.is_empty() {
                warn!(queue = queue.name(), count = drained.len(), "untreated messages");
            }
            untreated.extend(drained);
        }
        untreated
    }

    /// Messages classified so far.
    pub fn sequence_number(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Announce `feature_index` for `(feature_id, version)`; returns the
    /// index evicted to keep the mapping one to one.
    pub fn add_feature_entry(&self, feature_index: u8, feature_id: u16, version: u8) -> Option<u8> {
        let guard = self.classifier.lock();
        let mut classifier = guard.borrow_mut();
        classifier
            .hidpp_index_mut()
            .add(feature_index, feature_id, version)
    }

    /// Forget every announced feature index but the seeded error entries.
    pub fn clear_feature_entries(&self) {
        let guard = self.classifier.lock();
        guard.borrow_mut().hidpp_index_mut().clear();
    }

    pub fn feature_entries(&self) -> Vec<(u8, FeatureKey)> {
        let guard = self.classifier.lock();
        let classifier = guard.borrow();
        classifier.hidpp_index().entries().collect()
    }

    pub fn add_vlp_feature_entry(&self, feature_index: u8, feature_id: u16, version: u8) -> Option<u8> {
        let guard = self.classifier.lock();
        let mut classifier = guard.borrow_mut();
        classifier
            .vlp_index_mut()
            .add(feature_index, feature_id, version)
    }

    pub fn clear_vlp_feature_entries(&self) {
        let guard = self.classifier.lock();
        guard.borrow_mut().vlp_index_mut().clear();
    }

    pub fn vlp_feature_entries(&self) -> Vec<(u8, FeatureKey)> {
        let guard = self.classifier.lock();
        let classifier = guard.borrow();
        classifier.vlp_index().entries().collect()
    }

    /// Copy the HID++ and VLP feature index tables into `other`, entry by
    /// entry.
    pub fn dump_mapping_in_other_dispatcher(&self, other: &Dispatcher) {
        let hidpp = self.feature_entries();
        let vlp = self.vlp_feature_entries();
        for (index, key) in &hidpp {
            other.add_feature_entry(*index, key.feature_id, key.version);
        }
        for (index, key) in &vlp {
            other.add_vlp_feature_entry(*index, key.feature_id, key.version);
        }
        debug!(hidpp = hidpp.len(), vlp = vlp.len(), "feature mapping copied");
    }

    /// Install the descriptor collections of `interface`, keyed by report ID.
    pub fn set_interface_collections(
        &self,
        interface: HidInterface,
        collections: BTreeMap<u8, Arc<dyn HidCollection>>,
    ) {
        let guard = self.classifier.lock();
        let mut classifier = guard.borrow_mut();
        debug!(%interface, collections = collections.len(), "interface collections set");
        classifier
            .interfaces_mut()
            .table_mut(interface)
            .set_collections(collections);
    }

    pub fn set_interface_report_ids(&self, interface: HidInterface, report_ids: impl IntoIterator<Item = u8>) {
        let guard = self.classifier.lock();
        let mut classifier = guard.borrow_mut();
        classifier
            .interfaces_mut()
            .table_mut(interface)
            .set_report_ids(report_ids);
    }

    /// Drop the session state a device loses when it reboots: announced
    /// feature indexes and descriptor collections. Queues and handlers stay.
    pub fn reset_on_reboot(&self) {
        let guard = self.classifier.lock();
        let mut classifier = guard.borrow_mut();
        classifier.hidpp_index_mut().clear();
        classifier.vlp_index_mut().clear();
        for interface in HidInterface::ALL {
            classifier
                .interfaces_mut()
                .table_mut(interface)
                .clear_collections();
        }
        debug!("dispatcher reset after device reboot");
    }
}

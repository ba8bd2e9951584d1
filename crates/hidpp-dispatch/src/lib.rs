//! # hidpp-dispatch
//!
//! Classification and routing of raw HID++, VLP and HID input interrupts.
//!
//! Every interrupt a device interface produces goes through
//! [`Dispatcher::process_interrupt`]: the [`Classifier`] turns the bytes
//! into a typed [`Record`](hidpp_fields::Record), the dispatcher stamps it
//! with a sequence number and hands it to exactly one queue.
//!
//! ## Architecture
//!
//! - [`registry`] - static `(feature_id, version, function) -> record` and
//!   HID++ 1.0 register tables
//! - [`index`] - per-session `feature_index -> (feature_id, version)` tables
//! - [`interface`] - HID input interfaces and descriptor collections
//! - [`classifier`] - the classification algorithm
//! - [`queue`] - type-filtered FIFO queues
//! - [`handler`] - terminal and observer handlers
//! - [`dispatcher`] - the router and its lock
//! - [`config`] - dispatcher configuration
//!
//! ## Concurrency
//!
//! Producers may call `process_interrupt` from any thread; classification
//! and delivery of one message happen under a single re-entrant lock, so a
//! handler can call back into the dispatcher. Queue lookups read the
//! handler list under its own lock, and consumers otherwise only take the
//! lock of the queue they poll, so a producer waiting on a full bounded
//! queue never blocks them.
//!
//! ## Example
//!
//! ```rust
//! use hidpp_dispatch::prelude::*;
//! use std::time::Duration;
//!
//! let dispatcher = Dispatcher::new(DispatcherConfig::default())?;
//! dispatcher.add_feature_entry(0x00, 0x0000, 0);
//!
//! // Root.GetFeature response: feature 0x8100 lives at index 5.
//! let mut data = vec![0x11, 0x01, 0x00, 0x0E, 0x05, 0x00, 0x00];
//! data.resize(20, 0);
//! let mut message = TransportMessage::now(data);
//!
//! let delivery = dispatcher.process_interrupt(&mut message)?;
//! assert_eq!(delivery.map(|d| d.handler).as_deref(), Some("Important"));
//!
//! let record = dispatcher.queue("Important")?.get(Duration::from_millis(10))?;
//! assert_eq!(record.get_u64("index")?, 5);
//! # Ok::<(), hidpp_errors::HidppError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod handler;
pub mod index;
pub mod interface;
pub mod queue;
pub mod registry;
pub mod transport;

pub mod prelude;

pub use classifier::Classifier;
pub use config::{BOOT_KEYBOARD_REPORT_LEN, DispatcherConfig, DispatcherConfigBuilder};
pub use dispatcher::{Delivery, Dispatcher, SEQUENCE_PROPERTY};
pub use handler::{CallbackHandler, MessageHandler};
pub use index::{FeatureIndexTable, FeatureKey, IndexFamily};
pub use interface::{HidCollection, HidInterface, HidInterfaces, InterfaceTable, UsageCollection};
pub use queue::{DEFAULT_QUEUE_NAME, MessageQueue, builtin_queues};
pub use registry::{FeatureRegistry, FeatureTable, RegisterTable};
pub use transport::{TransportMessage, monotonic_ns};

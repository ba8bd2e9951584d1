//! Prelude for hidpp-dispatch.
//!
//! # Example
//!
//! ```rust
//! use hidpp_dispatch::prelude::*;
//!
//! let dispatcher = Dispatcher::new(DispatcherConfig::default())?;
//! assert!(dispatcher.get_queue_by_name(DEFAULT_QUEUE_NAME).is_some());
//! # Ok::<(), hidpp_errors::HidppError>(())
//! ```

pub use crate::config::{DispatcherConfig, DispatcherConfigBuilder};
pub use crate::dispatcher::{Delivery, Dispatcher};
pub use crate::handler::{CallbackHandler, MessageHandler};
pub use crate::interface::{HidCollection, HidInterface, UsageCollection};
pub use crate::queue::{DEFAULT_QUEUE_NAME, MessageQueue};
pub use crate::registry::FeatureRegistry;
pub use crate::transport::TransportMessage;

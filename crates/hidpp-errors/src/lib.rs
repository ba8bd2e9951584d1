//! Error taxonomy for the HID++ codec and dispatcher.
//!
//! Every component of the workspace reports failures through the types in
//! this crate, so that a test harness can classify any failure by category
//! and severity regardless of where it surfaced.
//!
//! # Architecture
//!
//! - [`codec`]: bit stream read/write failures (`OutOfBounds`, `ValueOutOfRange`)
//! - [`schema`]: record declaration and record access failures
//!   (`InvalidSchema`, `AmbiguousAttribute`, `NoMatchingParser`)
//! - [`registry`]: feature registry failures (`AmbiguousRegistryMapping`,
//!   `UnknownFeatureIndex`)
//! - [`queue`]: message queue outcomes (`Empty`)
//! - [`common`]: the umbrella [`HidppError`], its category and severity, and
//!   [`FrameContext`] for failures tied to one report
//!
//! Codec and schema errors propagate immediately. `UnknownFeatureIndex` and
//! `Empty` have [`ErrorSeverity::Expected`]: callers absorb them.
//!
//! # Example
//!
//! ```
//! use hidpp_errors::prelude::*;
//!
//! fn byte_at(data: &[u8], offset: usize) -> Result<u8> {
//!     data.get(offset)
//!         .copied()
//!         .ok_or_else(|| CodecError::out_of_bounds(offset * 8, 8, data.len() * 8).into())
//! }
//!
//! assert!(byte_at(&[0x10], 1).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod common;
pub mod prelude;
pub mod queue;
pub mod registry;
pub mod schema;

pub use codec::CodecError;
pub use common::{ErrorCategory, ErrorSeverity, FrameContext, HidppError, ResultExt};
pub use queue::QueueError;
pub use registry::RegistryError;
pub use schema::{FieldError, ListError, SchemaError};

/// A specialized `Result` type for HID++ harness operations.
pub type Result<T> = std::result::Result<T, HidppError>;

/// A specialized `Result` type for bit stream operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

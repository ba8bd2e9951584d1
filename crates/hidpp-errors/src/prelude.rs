//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use hidpp_errors::prelude::*;
//!
//! fn check_width(bits: usize) -> Result<()> {
//!     if bits > 64 {
//!         return Err(CodecError::WidthTooLarge { bits }.into());
//!     }
//!     Ok(())
//! }
//!
//! let report = [0x11, 0x01, 0x05, 0x0E];
//! let err = check_width(96).in_frame("parse", &report).unwrap_err();
//! assert!(err.is_programmer_error());
//! assert_eq!(err.category(), ErrorCategory::Codec);
//! ```

pub use crate::{
    CodecResult, Result,
    codec::CodecError,
    common::{ErrorCategory, ErrorSeverity, FrameContext, HidppError, ResultExt},
    queue::QueueError,
    registry::RegistryError,
    schema::{FieldError, ListError, SchemaError},
};

//! Field container model for HID++ records.
//!
//! A record type is a static [`Schema`]: an ordered table of
//! [`FieldDescriptor`]s plus an optional total length and a set of parent
//! schemas used for classification. A [`Record`] holds one optional
//! [`Value`] per field and knows how to serialize itself to, and parse
//! itself from, a bit stream.
//!
//! # Example
//!
//! ```
//! use hidpp_fields::{schema, FieldDescriptor, Record};
//!
//! schema! {
//!     pub static SET_LED = "SetLed", length = 32;
//!     FieldDescriptor::unsigned("led_index", 4),
//!     FieldDescriptor::unsigned("mode", 4),
//!     FieldDescriptor::unsigned("brightness", 8).with_default(0x80),
//!     FieldDescriptor::padding(0),
//! }
//!
//! let mut record = Record::new(&SET_LED)?;
//! record.set("led_index", 2u8)?.set("mode", 1u8)?;
//! let bytes = record.to_bytes()?;
//! assert_eq!(bytes, vec![0x21, 0x80, 0x00, 0x00]);
//! assert_eq!(Record::from_bytes(&SET_LED, &bytes)?, record);
//! # Ok::<(), hidpp_errors::HidppError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod codec;
pub mod descriptor;
pub mod list;
pub mod record;
pub mod schema;
pub mod summary;
pub mod value;

pub use descriptor::{
    Check, DefaultValue, FieldDescriptor, FieldKind, Interpreter, Presence, PresencePredicate,
};
pub use list::RecordList;
pub use record::Record;
pub use schema::{AcceptFn, Layout, Schema};
pub use value::Value;

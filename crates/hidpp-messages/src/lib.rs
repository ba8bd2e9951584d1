//! HID++ 1.0, HID++ 2.0 and VLP message records.
//!
//! Every record is a static [`Schema`](hidpp_fields::Schema) declared with
//! one of the family macros in [`header`]. Records derive from a wire
//! family marker and, for incoming messages, from a delivery category in
//! [`category`] that queue filters select on. The [`catalog`] tables map
//! classification keys to record schemas.
//!
//! ```
//! use hidpp_fields::Record;
//! use hidpp_messages::features::root;
//!
//! let mut request = Record::new(&root::GET_FEATURE)?;
//! request
//!     .set("device_index", 0x01u8)?
//!     .set("feature_index", 0x00u8)?
//!     .set(root::fields::FEATURE_ID, 0x8100u16)?;
//! assert_eq!(request.to_bytes()?, vec![0x10, 0x01, 0x00, 0x0F, 0x81, 0x00, 0x00]);
//! # Ok::<(), hidpp_errors::HidppError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod category;
pub mod features;
pub mod header;
pub mod hid;
pub mod hidpp1;
pub mod ids;
pub mod vlp;

pub use catalog::{CatalogEntry, RegisterCatalogEntry};
pub use header::{HidppHeader, ReportKind, VlpHeader};
pub use hid::HidFamily;

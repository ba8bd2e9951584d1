//! HID++ 2.0 feature records.
//!
//! Each module declares the requests, responses and events of one feature.
//! Response and event schemas are listed in [`crate::catalog`] under their
//! `(feature_id, version, function)` keys.

pub mod adjustable_dpi;
pub mod device_information;
pub mod error;
pub mod feature_set;
pub mod onboard_profiles;
pub mod profile_management;
pub mod root;
pub mod unified_battery;

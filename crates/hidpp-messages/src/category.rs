//! Marker schemas used as parents of concrete records.
//!
//! Queue filters name these markers to accept every record that derives from
//! them. A record may carry several: one wire family and one delivery
//! category.

use hidpp_fields::marker;

// Wire families.
marker! { pub static HIDPP_MESSAGE = "HidppMessage"; }
marker! { pub static HIDPP1_MESSAGE = "Hidpp1Message"; }
marker! { pub static VLP_MESSAGE = "VlpMessage"; }
marker! { pub static HID_REPORT = "HidReport"; }

// Delivery categories, in built-in queue order.
marker! { pub static IMPORTANT = "Important"; }
marker! { pub static COMMON = "Common"; }
marker! { pub static MOUSE = "Mouse"; }
marker! { pub static KEYBOARD = "Keyboard"; }
marker! { pub static TOUCHPAD = "Touchpad"; }
marker! { pub static GAMING = "Gaming"; }
marker! { pub static PERIPHERAL = "Peripheral"; }
marker! { pub static INTERFACE_DESCRIPTOR = "InterfaceDescriptor"; }
marker! { pub static EVENT = "Event"; }
marker! { pub static BATTERY_EVENT = "BatteryEvent"; }
marker! { pub static ERROR = "Error"; }
marker! { pub static HID = "Hid"; }
marker! { pub static RECEIVER_ERROR = "ReceiverError"; }
marker! { pub static RECEIVER_RESPONSE = "ReceiverResponse"; }
marker! { pub static RECEIVER_EVENT = "ReceiverEvent"; }
marker! { pub static RECEIVER_CONNECTION_EVENT = "ReceiverConnectionEvent"; }
marker! { pub static VLP_IMPORTANT = "VlpImportant"; }
marker! { pub static VLP_COMMON = "VlpCommon"; }
marker! { pub static VLP_EVENT = "VlpEvent"; }

//! HID input report records.
//!
//! These describe reports after the interface collection has turned the
//! LSB-first HID payload into an MSB-first byte string, so fields read in
//! declaration order like any other record.

use hidpp_fields::{FieldDescriptor, Schema, schema};

use crate::category::{HID, HID_REPORT};

/// Input report families a HID interface collection can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HidFamily {
    Mouse,
    Keyboard,
    KeyboardBitmap,
    ConsumerControl,
    SystemControl,
    CallStateManagement,
    Digitizer,
}

impl HidFamily {
    pub const ALL: [HidFamily; 7] = [
        HidFamily::Mouse,
        HidFamily::Keyboard,
        HidFamily::KeyboardBitmap,
        HidFamily::ConsumerControl,
        HidFamily::SystemControl,
        HidFamily::CallStateManagement,
        HidFamily::Digitizer,
    ];

    pub fn name(self) -> &'static str {
        schema_for(self).name()
    }
}

pub mod fields {
    pub const REPORT_ID: &str = "report_id";
    pub const BUTTONS: &str = "buttons";
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const WHEEL: &str = "wheel";
    pub const AC_PAN: &str = "ac_pan";
    pub const MODIFIER: &str = "modifier";
    pub const KEYS: [&str; 6] = ["key_1", "key_2", "key_3", "key_4", "key_5", "key_6"];
    pub const KEY_BITMAP: &str = "key_bitmap";
    pub const USAGE_1: &str = "usage_1";
    pub const USAGE_2: &str = "usage_2";
    pub const SYSTEM_CONTROL: &str = "system_control";
    pub const CALL_STATE: &str = "call_state";
    pub const TIP_SWITCH: &str = "tip_switch";
    pub const CONTACT_ID: &str = "contact_id";
    pub const CONTACT_COUNT: &str = "contact_count";
    pub const SCAN_TIME: &str = "scan_time";
}

/// Modifier bits as they read after bit reversal: the HID usage order
/// (left control in wire bit 0) starts at the most significant bit.
pub mod modifiers {
    pub const LEFT_CTRL: u64 = 0x80;
    pub const LEFT_SHIFT: u64 = 0x40;
    pub const LEFT_ALT: u64 = 0x20;
    pub const LEFT_GUI: u64 = 0x10;
    pub const RIGHT_CTRL: u64 = 0x08;
    pub const RIGHT_SHIFT: u64 = 0x04;
    pub const RIGHT_ALT: u64 = 0x02;
    pub const RIGHT_GUI: u64 = 0x01;
}

const REPORT_ID: FieldDescriptor = FieldDescriptor::unsigned(fields::REPORT_ID, 8);
const MODIFIER: FieldDescriptor = FieldDescriptor::unsigned(fields::MODIFIER, 8);
const RESERVED: FieldDescriptor = FieldDescriptor::unsigned("reserved", 8).with_default(0).with_elide_zero();

schema! {
    pub static MOUSE = "HidMouse", parents = [HID_REPORT, HID];
    REPORT_ID,
    FieldDescriptor::unsigned(fields::BUTTONS, 16),
    FieldDescriptor::signed(fields::X, 12),
    FieldDescriptor::signed(fields::Y, 12),
    FieldDescriptor::signed(fields::WHEEL, 8),
    FieldDescriptor::signed(fields::AC_PAN, 8),
}

schema! {
    pub static KEYBOARD = "HidKeyboard", parents = [HID_REPORT, HID];
    REPORT_ID,
    MODIFIER,
    RESERVED,
    FieldDescriptor::unsigned(fields::KEYS[0], 8),
    FieldDescriptor::unsigned(fields::KEYS[1], 8),
    FieldDescriptor::unsigned(fields::KEYS[2], 8),
    FieldDescriptor::unsigned(fields::KEYS[3], 8),
    FieldDescriptor::unsigned(fields::KEYS[4], 8),
    FieldDescriptor::unsigned(fields::KEYS[5], 8),
}

schema! {
    pub static BOOT_KEYBOARD = "HidBootKeyboard", parents = [HID_REPORT, HID];
    MODIFIER,
    RESERVED,
    FieldDescriptor::unsigned(fields::KEYS[0], 8),
    FieldDescriptor::unsigned(fields::KEYS[1], 8),
    FieldDescriptor::unsigned(fields::KEYS[2], 8),
    FieldDescriptor::unsigned(fields::KEYS[3], 8),
    FieldDescriptor::unsigned(fields::KEYS[4], 8),
    FieldDescriptor::unsigned(fields::KEYS[5], 8),
}

schema! {
    pub static KEYBOARD_BITMAP = "HidKeyboardBitmap", parents = [HID_REPORT, HID];
    REPORT_ID,
    MODIFIER,
    FieldDescriptor::tail(fields::KEY_BITMAP),
}

schema! {
    pub static CONSUMER_CONTROL = "HidConsumerControl", parents = [HID_REPORT, HID];
    REPORT_ID,
    FieldDescriptor::unsigned(fields::USAGE_1, 16),
    FieldDescriptor::unsigned(fields::USAGE_2, 16),
}

schema! {
    pub static SYSTEM_CONTROL = "HidSystemControl", parents = [HID_REPORT, HID];
    REPORT_ID,
    FieldDescriptor::unsigned(fields::SYSTEM_CONTROL, 8),
}

schema! {
    pub static CALL_STATE_MANAGEMENT = "HidCallStateManagement", parents = [HID_REPORT, HID];
    REPORT_ID,
    FieldDescriptor::unsigned(fields::CALL_STATE, 8),
    FieldDescriptor::tail("reserved"),
}

schema! {
    pub static DIGITIZER = "HidDigitizer", parents = [HID_REPORT, HID];
    REPORT_ID,
    FieldDescriptor::unsigned(fields::TIP_SWITCH, 1),
    FieldDescriptor::unsigned("reserved", 3).with_default(0).with_elide_zero(),
    FieldDescriptor::unsigned(fields::CONTACT_ID, 4),
    FieldDescriptor::unsigned(fields::X, 16),
    FieldDescriptor::unsigned(fields::Y, 16),
    FieldDescriptor::unsigned(fields::SCAN_TIME, 16),
    FieldDescriptor::unsigned(fields::CONTACT_COUNT, 8),
    FieldDescriptor::unsigned(fields::BUTTONS, 8),
}

/// Record schema parsing reports of `family`.
pub fn schema_for(family: HidFamily) -> &'static Schema {
    match family {
        HidFamily::Mouse => &MOUSE,
        HidFamily::Keyboard => &KEYBOARD,
        HidFamily::KeyboardBitmap => &KEYBOARD_BITMAP,
        HidFamily::ConsumerControl => &CONSUMER_CONTROL,
        HidFamily::SystemControl => &SYSTEM_CONTROL,
        HidFamily::CallStateManagement => &CALL_STATE_MANAGEMENT,
        HidFamily::Digitizer => &DIGITIZER,
    }
}

//! AdjustableDpi (0x2201).

use hidpp_fields::{Check, FieldDescriptor};

use crate::category::MOUSE;
use crate::hidpp_message;

pub mod fields {
    pub const SENSOR_COUNT: &str = "sensor_count";
    pub const SENSOR_IDX: &str = "sensor_idx";
    pub const DPI: &str = "dpi";
    pub const DEFAULT_DPI: &str = "default_dpi";
}

const SENSOR_IDX: FieldDescriptor =
    FieldDescriptor::unsigned(fields::SENSOR_IDX, 8).with_aliases(&["sensor_index"]);

hidpp_message! {
    pub static GET_SENSOR_COUNT = "GetSensorCount", Short, function = 0, software_id = 0xF, parents = [MOUSE];
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_SENSOR_COUNT_RESPONSE = "GetSensorCountResponse", Long, function = 0, parents = [MOUSE];
    FieldDescriptor::unsigned(fields::SENSOR_COUNT, 8),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_SENSOR_DPI = "GetSensorDpi", Short, function = 2, software_id = 0xF, parents = [MOUSE];
    SENSOR_IDX,
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_SENSOR_DPI_RESPONSE = "GetSensorDpiResponse", Long, function = 2, parents = [MOUSE];
    SENSOR_IDX,
    FieldDescriptor::unsigned(fields::DPI, 16),
    FieldDescriptor::unsigned(fields::DEFAULT_DPI, 16),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static SET_SENSOR_DPI = "SetSensorDpi", Long, function = 3, software_id = 0xF, parents = [MOUSE];
    SENSOR_IDX,
    FieldDescriptor::unsigned(fields::DPI, 16).with_checks(&[Check::Range { min: 1, max: 0xFFFF }]),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static SET_SENSOR_DPI_RESPONSE = "SetSensorDpiResponse", Long, function = 3, parents = [MOUSE];
    SENSOR_IDX,
    FieldDescriptor::unsigned(fields::DPI, 16),
    FieldDescriptor::padding(0),
}

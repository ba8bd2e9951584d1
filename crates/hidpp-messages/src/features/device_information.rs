//! DeviceInformation (0x0003).

use hidpp_fields::{Check, FieldDescriptor};

use crate::category::COMMON;
use crate::hidpp_message;

pub mod fields {
    pub const ENTITY_COUNT: &str = "entity_count";
    pub const UNIT_ID: &str = "unit_id";
    pub const TRANSPORT: &str = "transport";
    pub const MODEL_ID: &str = "model_id";
    pub const EXTENDED_MODEL_ID: &str = "extended_model_id";
    pub const CAPABILITIES: &str = "capabilities";
    pub const ENTITY_INDEX: &str = "entity_index";
    pub const FW_TYPE: &str = "fw_type";
    pub const FW_PREFIX: &str = "fw_prefix";
    pub const FW_NUMBER: &str = "fw_number";
    pub const REVISION: &str = "revision";
    pub const BUILD: &str = "build";
    pub const ACTIVE: &str = "active";
    pub const TRANSPORT_PID: &str = "transport_pid";
    pub const EXTRA_VERSION: &str = "extra_version";
}

pub const FW_TYPE_LABELS: &[(u64, &str)] = &[
    (0, "main application"),
    (1, "bootloader"),
    (2, "hardware"),
    (3, "touchpad"),
    (4, "optical sensor"),
    (5, "softdevice"),
    (6, "rf companion mcu"),
];

hidpp_message! {
    pub static GET_DEVICE_INFO = "GetDeviceInfo", Short, function = 0, software_id = 0xF, parents = [COMMON];
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_DEVICE_INFO_RESPONSE = "GetDeviceInfoResponse", Long, function = 0, parents = [COMMON];
    FieldDescriptor::unsigned(fields::ENTITY_COUNT, 8),
    FieldDescriptor::bytes(fields::UNIT_ID, 32),
    FieldDescriptor::unsigned(fields::TRANSPORT, 16),
    FieldDescriptor::bytes(fields::MODEL_ID, 48),
    FieldDescriptor::unsigned(fields::EXTENDED_MODEL_ID, 8),
    FieldDescriptor::unsigned(fields::CAPABILITIES, 8),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_FW_INFO = "GetFwInfo", Short, function = 1, software_id = 0xF, parents = [COMMON];
    FieldDescriptor::unsigned(fields::ENTITY_INDEX, 8).with_checks(&[Check::Range { min: 0, max: 15 }]),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_FW_INFO_RESPONSE = "GetFwInfoResponse", Long, function = 1, parents = [COMMON];
    FieldDescriptor::unsigned(fields::FW_TYPE, 8).with_interpreter(FW_TYPE_LABELS),
    FieldDescriptor::text(fields::FW_PREFIX, 24),
    FieldDescriptor::unsigned(fields::FW_NUMBER, 8),
    FieldDescriptor::unsigned(fields::REVISION, 8),
    FieldDescriptor::unsigned(fields::BUILD, 16),
    FieldDescriptor::unsigned(fields::ACTIVE, 8),
    FieldDescriptor::unsigned(fields::TRANSPORT_PID, 16),
    FieldDescriptor::bytes(fields::EXTRA_VERSION, 40).with_elide_zero(),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidpp_fields::Record;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_fw_info_response_fills_long_report() -> TestResult {
        let data = [
            0x11, 0x01, 0x03, 0x1A, 0x00, b'R', b'Q', b'M', 0x25, 0x01, 0x00, 0x0B, 0x01,
            0xC0, 0x8D, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let response = Record::from_bytes(&GET_FW_INFO_RESPONSE, &data)?;
        assert_eq!(response.get_text(fields::FW_PREFIX)?, "RQM");
        assert_eq!(response.get_u64(fields::BUILD)?, 0x000B);
        assert_eq!(response.get_u64(fields::TRANSPORT_PID)?, 0xC08D);
        assert_eq!(response.to_bytes()?, data.to_vec());
        Ok(())
    }

    #[test]
    fn test_entity_index_check() -> TestResult {
        let mut request = Record::new(&GET_FW_INFO)?;
        assert!(request.set(fields::ENTITY_INDEX, 16u8).is_err());
        request.set(fields::ENTITY_INDEX, 2u8)?;
        Ok(())
    }
}

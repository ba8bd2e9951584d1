//! HID++ 1.0 receiver registers and notifications.
//!
//! Register accesses carry the register address in byte 3; some registers
//! are further refined by their first parameter byte (`r0`).

use hidpp_fields::{Check, FieldDescriptor};

use crate::category::{
    RECEIVER_CONNECTION_EVENT, RECEIVER_ERROR, RECEIVER_EVENT, RECEIVER_RESPONSE,
};
use crate::header::ADDRESS;
use crate::hidpp1_message;
use crate::ids::{hidpp1_errors, registers, sub_ids};

pub mod fields {
    pub const ADDRESS: &str = "address";
    pub const R0: &str = "r0";
    pub const R1: &str = "r1";
    pub const R2: &str = "r2";
    pub const DATA: &str = "data";
    pub const ERROR_SUB_ID: &str = "error_sub_id";
    pub const ERROR_ADDRESS: &str = "error_address";
    pub const ERROR_CODE: &str = "error_code";
    pub const CONNECTED_DEVICES: &str = "connected_devices";
    pub const DESTINATION_ID: &str = "destination_id";
    pub const REPORT_INTERVAL: &str = "report_interval";
    pub const WIRELESS_PID: &str = "wireless_pid";
    pub const DEVICE_TYPE: &str = "device_type";
    pub const NAME_LENGTH: &str = "name_length";
    pub const NAME: &str = "name";
    pub const PROTOCOL_TYPE: &str = "protocol_type";
    pub const DEVICE_INFO: &str = "device_info";
    pub const DISCONNECTION_TYPE: &str = "disconnection_type";
}

pub const PROTOCOL_TYPE_LABELS: &[(u64, &str)] = &[
    (0x01, "bluetooth"),
    (0x02, "27 MHz"),
    (0x03, "eQuad"),
    (0x04, "unifying"),
    (0x05, "DFU lite"),
    (0x06, "eQuad lite"),
    (0x07, "eQuad gaming"),
    (0x08, "eQuad gamepad"),
    (0x0A, "lightspeed"),
    (0x0C, "lightspeed 1.1"),
    (0x10, "BLE pro"),
];

pub const DEVICE_TYPE_LABELS: &[(u64, &str)] = &[
    (0x00, "unknown"),
    (0x01, "keyboard"),
    (0x02, "mouse"),
    (0x03, "numpad"),
    (0x04, "presenter"),
    (0x07, "remote control"),
    (0x08, "trackball"),
    (0x09, "touchpad"),
    (0x0A, "tablet"),
    (0x0B, "gamepad"),
    (0x0C, "joystick"),
    (0x0D, "headset"),
];

const R0: FieldDescriptor = FieldDescriptor::unsigned(fields::R0, 8);
const R1: FieldDescriptor = FieldDescriptor::unsigned(fields::R1, 8);
const R2: FieldDescriptor = FieldDescriptor::unsigned(fields::R2, 8);

hidpp1_message! {
    pub static HIDPP1_ERROR = "Hidpp1Error", Short, sub_id = sub_ids::ERROR as u64, parents = [RECEIVER_ERROR];
    FieldDescriptor::unsigned(fields::ERROR_SUB_ID, 8),
    FieldDescriptor::unsigned(fields::ERROR_ADDRESS, 8),
    FieldDescriptor::unsigned(fields::ERROR_CODE, 8).with_interpreter(hidpp1_errors::LABELS),
    FieldDescriptor::padding(0),
}

// Short registers.

hidpp1_message! {
    pub static SET_REGISTER = "SetRegister", Short, sub_id = sub_ids::SET_REGISTER as u64;
    ADDRESS,
    R0,
    R1,
    R2,
}

hidpp1_message! {
    pub static SET_REGISTER_RESPONSE = "SetRegisterResponse", Short, sub_id = sub_ids::SET_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS,
    FieldDescriptor::padding(0),
}

hidpp1_message! {
    pub static GET_REGISTER = "GetRegister", Short, sub_id = sub_ids::GET_REGISTER as u64;
    ADDRESS,
    FieldDescriptor::padding(0),
}

hidpp1_message! {
    pub static GET_REGISTER_RESPONSE = "GetRegisterResponse", Short, sub_id = sub_ids::GET_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS,
    R0,
    R1,
    R2,
}

hidpp1_message! {
    pub static GET_ENABLE_HIDPP_REPORTING_RESPONSE = "GetEnableHidppReportingResponse", Short, sub_id = sub_ids::GET_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS.with_default(registers::ENABLE_HIDPP_REPORTING as u64),
    FieldDescriptor::unsigned("flags_0", 8),
    FieldDescriptor::unsigned("flags_1", 8),
    FieldDescriptor::unsigned("flags_2", 8),
}

hidpp1_message! {
    pub static GET_CONNECTION_STATE_RESPONSE = "GetConnectionStateResponse", Short, sub_id = sub_ids::GET_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS.with_default(registers::CONNECTION_STATE as u64),
    FieldDescriptor::unsigned("reserved", 8).with_elide_zero(),
    FieldDescriptor::unsigned(fields::CONNECTED_DEVICES, 8),
    FieldDescriptor::unsigned("reserved_2", 8).with_elide_zero(),
}

// Long registers.

hidpp1_message! {
    pub static SET_LONG_REGISTER = "SetLongRegister", Long, sub_id = sub_ids::SET_LONG_REGISTER as u64;
    ADDRESS,
    FieldDescriptor::bytes(fields::DATA, 128),
}

hidpp1_message! {
    pub static SET_LONG_REGISTER_RESPONSE = "SetLongRegisterResponse", Short, sub_id = sub_ids::SET_LONG_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS,
    FieldDescriptor::padding(0),
}

hidpp1_message! {
    pub static GET_LONG_REGISTER = "GetLongRegister", Short, sub_id = sub_ids::GET_LONG_REGISTER as u64;
    ADDRESS,
    R0,
    FieldDescriptor::padding(0),
}

hidpp1_message! {
    pub static GET_LONG_REGISTER_RESPONSE = "GetLongRegisterResponse", Long, sub_id = sub_ids::GET_LONG_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS,
    FieldDescriptor::bytes(fields::DATA, 128),
}

hidpp1_message! {
    pub static GET_PAIRING_INFO_RESPONSE = "GetPairingInfoResponse", Long, sub_id = sub_ids::GET_LONG_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS.with_default(registers::PAIRING_INFORMATION as u64),
    R0,
    FieldDescriptor::unsigned(fields::DESTINATION_ID, 8),
    FieldDescriptor::unsigned(fields::REPORT_INTERVAL, 8),
    FieldDescriptor::unsigned(fields::WIRELESS_PID, 16),
    FieldDescriptor::unsigned("reserved", 16).with_elide_zero(),
    FieldDescriptor::unsigned(fields::DEVICE_TYPE, 8).with_interpreter(DEVICE_TYPE_LABELS),
    FieldDescriptor::padding(0),
}

hidpp1_message! {
    pub static GET_DEVICE_NAME_RESPONSE = "GetDeviceNameResponse", Long, sub_id = sub_ids::GET_LONG_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS.with_default(registers::PAIRING_INFORMATION as u64),
    R0,
    FieldDescriptor::unsigned(fields::NAME_LENGTH, 8).with_checks(&[Check::Range { min: 0, max: 14 }]),
    FieldDescriptor::text(fields::NAME, 112),
}

// Very long registers.

hidpp1_message! {
    pub static SET_VERY_LONG_REGISTER = "SetVeryLongRegister", VeryLong, sub_id = sub_ids::SET_VERY_LONG_REGISTER as u64;
    ADDRESS,
    FieldDescriptor::bytes(fields::DATA, 480),
}

hidpp1_message! {
    pub static SET_VERY_LONG_REGISTER_RESPONSE = "SetVeryLongRegisterResponse", Short, sub_id = sub_ids::SET_VERY_LONG_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS,
    FieldDescriptor::padding(0),
}

hidpp1_message! {
    pub static GET_VERY_LONG_REGISTER = "GetVeryLongRegister", Short, sub_id = sub_ids::GET_VERY_LONG_REGISTER as u64;
    ADDRESS,
    FieldDescriptor::padding(0),
}

hidpp1_message! {
    pub static GET_VERY_LONG_REGISTER_RESPONSE = "GetVeryLongRegisterResponse", VeryLong, sub_id = sub_ids::GET_VERY_LONG_REGISTER as u64, parents = [RECEIVER_RESPONSE];
    ADDRESS,
    FieldDescriptor::bytes(fields::DATA, 480),
}

// Receiver notifications.

hidpp1_message! {
    pub static DEVICE_CONNECTION = "DeviceConnection", Short, sub_id = sub_ids::DEVICE_CONNECTION as u64, parents = [RECEIVER_CONNECTION_EVENT];
    FieldDescriptor::unsigned(fields::PROTOCOL_TYPE, 8).with_interpreter(PROTOCOL_TYPE_LABELS),
    FieldDescriptor::unsigned(fields::DEVICE_INFO, 8),
    FieldDescriptor::unsigned(fields::WIRELESS_PID, 16).little_endian(),
}

hidpp1_message! {
    pub static DEVICE_DISCONNECTION = "DeviceDisconnection", Short, sub_id = sub_ids::DEVICE_DISCONNECTION as u64, parents = [RECEIVER_EVENT];
    FieldDescriptor::unsigned(fields::DISCONNECTION_TYPE, 8),
    FieldDescriptor::padding(0),
}

/// Bit 6 of `device_info` in a connection notification.
pub const LINK_NOT_ESTABLISHED: u64 = 0x40;

#[cfg(test)]
mod tests {
    use super::*;
    use hidpp_fields::Record;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_get_register_request() -> TestResult {
        let mut request = Record::new(&GET_REGISTER)?;
        request.set("device_index", 0xFFu8)?.set(fields::ADDRESS, registers::CONNECTION_STATE)?;
        assert_eq!(request.to_bytes()?, vec![0x10, 0xFF, 0x81, 0x02, 0x00, 0x00, 0x00]);
        Ok(())
    }

    #[test]
    fn test_connection_state_response() -> TestResult {
        let response = Record::from_bytes(
            &GET_CONNECTION_STATE_RESPONSE,
            &[0x10, 0xFF, 0x81, 0x02, 0x00, 0x03, 0x00],
        )?;
        assert_eq!(response.get_u64(fields::CONNECTED_DEVICES)?, 3);
        Ok(())
    }

    #[test]
    fn test_device_connection_pid_is_little_endian() -> TestResult {
        let event = Record::from_bytes(&DEVICE_CONNECTION, &[0x10, 0x01, 0x41, 0x04, 0x02, 0x8D, 0xC0])?;
        assert_eq!(event.get_u64(fields::WIRELESS_PID)?, 0xC08D);
        assert_eq!(event.get_u64(fields::DEVICE_INFO)? & LINK_NOT_ESTABLISHED, 0);
        assert!(event.summary().contains("protocol_type : 0x04 (unifying)"));
        Ok(())
    }

    #[test]
    fn test_device_name() -> TestResult {
        let mut data = vec![0x11, 0xFF, 0x83, 0xB5, 0x41, 0x04];
        data.extend_from_slice(b"M720");
        data.resize(20, 0);
        let response = Record::from_bytes(&GET_DEVICE_NAME_RESPONSE, &data)?;
        assert_eq!(response.get_u64(fields::R0)?, 0x41);
        assert_eq!(response.get_text(fields::NAME)?, "M720");
        Ok(())
    }

    #[test]
    fn test_error_labels() -> TestResult {
        let error = Record::from_bytes(&HIDPP1_ERROR, &[0x10, 0xFF, 0x8F, 0x81, 0x02, 0x02, 0x00])?;
        assert!(error.summary().contains("error_code : 0x02 (InvalidAddress)"));
        Ok(())
    }
}

//! HID++ and VLP wire constants.

/// Report IDs that open every HID++ and VLP frame.
pub mod report_ids {
    /// HID++ short report (7 bytes).
    pub const SHORT: u8 = 0x10;
    /// HID++ long report (20 bytes).
    pub const LONG: u8 = 0x11;
    /// HID++ very long report (64 bytes).
    pub const VERY_LONG: u8 = 0x12;
    /// VLP report.
    pub const VLP_NORMAL: u8 = 0x13;
    /// VLP report on the extended channel.
    pub const VLP_EXTENDED: u8 = 0x14;

    pub const HIDPP: [u8; 3] = [SHORT, LONG, VERY_LONG];
    pub const VLP: [u8; 2] = [VLP_NORMAL, VLP_EXTENDED];
}

/// Frame lengths in bytes, report ID included.
pub mod report_lengths {
    pub const SHORT: usize = 7;
    pub const LONG: usize = 20;
    pub const VERY_LONG: usize = 64;
    /// VLP fixed header preceding the payload.
    pub const VLP_HEADER: usize = 7;

    pub const HIDPP: [usize; 3] = [SHORT, LONG, VERY_LONG];
}

/// HID++ 1.0 sub-IDs (byte 2 of a register access or notification).
pub mod sub_ids {
    pub const DEVICE_DISCONNECTION: u8 = 0x40;
    pub const DEVICE_CONNECTION: u8 = 0x41;
    pub const SET_REGISTER: u8 = 0x80;
    pub const GET_REGISTER: u8 = 0x81;
    pub const SET_LONG_REGISTER: u8 = 0x82;
    pub const GET_LONG_REGISTER: u8 = 0x83;
    pub const SET_VERY_LONG_REGISTER: u8 = 0x84;
    pub const GET_VERY_LONG_REGISTER: u8 = 0x85;
    /// HID++ 1.0 error report.
    pub const ERROR: u8 = 0x8F;
}

/// Receiver register addresses.
pub mod registers {
    pub const ENABLE_HIDPP_REPORTING: u8 = 0x00;
    pub const CONNECTION_STATE: u8 = 0x02;
    /// Non-volatile pairing information, refined by `r0`.
    pub const PAIRING_INFORMATION: u8 = 0xB5;

    /// `r0` selectors for [`PAIRING_INFORMATION`]; the low nibble is the
    /// paired device slot.
    pub mod pairing_r0 {
        pub const DEVICE_PAIRING_INFO: u8 = 0x20;
        pub const DEVICE_NAME: u8 = 0x40;
    }
}

/// HID++ 2.0 feature IDs.
pub mod feature_ids {
    pub const ROOT: u16 = 0x0000;
    pub const FEATURE_SET: u16 = 0x0001;
    pub const DEVICE_INFORMATION: u16 = 0x0003;
    pub const UNIFIED_BATTERY: u16 = 0x1004;
    pub const ADJUSTABLE_DPI: u16 = 0x2201;
    pub const ONBOARD_PROFILES: u16 = 0x8100;
    pub const PROFILE_MANAGEMENT: u16 = 0x8101;

    /// Pseudo feature seeded for HID++ 2.0 error reports.
    pub const HIDPP2_ERROR: u16 = 0x00FF;
    /// Pseudo feature seeded for HID++ 1.0 error reports.
    pub const HIDPP1_ERROR: u16 = 0x008F;
}

/// Reserved feature indexes carried by error reports.
pub mod error_tags {
    pub const HIDPP2: u8 = 0xFF;
    pub const HIDPP1: u8 = 0x8F;
    pub const VLP: u8 = 0xFF;

    /// Function index and software ID used to look up error records.
    pub const FUNCTION_INDEX: u8 = 0x0;
    pub const SOFTWARE_ID: u8 = 0xF;
}

/// HID++ 2.0 error codes with display labels.
pub mod hidpp2_errors {
    pub const NO_ERROR: u8 = 0x00;
    pub const UNKNOWN: u8 = 0x01;
    pub const INVALID_ARGUMENT: u8 = 0x02;
    pub const OUT_OF_RANGE: u8 = 0x03;
    pub const HW_ERROR: u8 = 0x04;
    pub const LOGITECH_INTERNAL: u8 = 0x05;
    pub const INVALID_FEATURE_INDEX: u8 = 0x06;
    pub const INVALID_FUNCTION_ID: u8 = 0x07;
    pub const BUSY: u8 = 0x08;
    pub const UNSUPPORTED: u8 = 0x09;

    pub const LABELS: &[(u64, &str)] = &[
        (0x00, "NoError"),
        (0x01, "Unknown"),
        (0x02, "InvalidArgument"),
        (0x03, "OutOfRange"),
        (0x04, "HwError"),
        (0x05, "LogitechInternal"),
        (0x06, "InvalidFeatureIndex"),
        (0x07, "InvalidFunctionId"),
        (0x08, "Busy"),
        (0x09, "Unsupported"),
    ];
}

/// HID++ 1.0 error codes with display labels.
pub mod hidpp1_errors {
    pub const SUCCESS: u8 = 0x00;
    pub const INVALID_SUB_ID: u8 = 0x01;
    pub const INVALID_ADDRESS: u8 = 0x02;
    pub const INVALID_VALUE: u8 = 0x03;
    pub const CONNECT_FAIL: u8 = 0x04;
    pub const TOO_MANY_DEVICES: u8 = 0x05;
    pub const ALREADY_EXISTS: u8 = 0x06;
    pub const BUSY: u8 = 0x07;
    pub const UNKNOWN_DEVICE: u8 = 0x08;
    pub const RESOURCE_ERROR: u8 = 0x09;
    pub const REQUEST_UNAVAILABLE: u8 = 0x0A;
    pub const INVALID_PARAM_VALUE: u8 = 0x0B;
    pub const WRONG_PIN_CODE: u8 = 0x0C;

    pub const LABELS: &[(u64, &str)] = &[
        (0x00, "Success"),
        (0x01, "InvalidSubId"),
        (0x02, "InvalidAddress"),
        (0x03, "InvalidValue"),
        (0x04, "ConnectFail"),
        (0x05, "TooManyDevices"),
        (0x06, "AlreadyExists"),
        (0x07, "Busy"),
        (0x08, "UnknownDevice"),
        (0x09, "ResourceError"),
        (0x0A, "RequestUnavailable"),
        (0x0B, "InvalidParamValue"),
        (0x0C, "WrongPinCode"),
    ];
}

/// Whether `report_id` opens a HID++ frame.
pub fn is_hidpp_report_id(report_id: u8) -> bool {
    report_ids::HIDPP.contains(&report_id)
}

/// Whether `report_id` opens a VLP frame.
pub fn is_vlp_report_id(report_id: u8) -> bool {
    report_ids::VLP.contains(&report_id)
}

/// Whether `data` has a HID++ report ID and one of the HID++ frame lengths.
///
/// Receivers may forward a short report ID in a long frame, so any HID++
/// report ID is accepted with any HID++ length.
pub fn is_hidpp_frame(data: &[u8]) -> bool {
    data.first().copied().is_some_and(is_hidpp_report_id)
        && report_lengths::HIDPP.contains(&data.len())
}

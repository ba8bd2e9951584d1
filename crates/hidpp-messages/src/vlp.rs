//! VLP records.
//!
//! VLP frames have no fixed length: the header announces the payload size
//! and the record ends with it.

use hidpp_fields::{FieldDescriptor, schema};

use crate::category::{VLP_EVENT, VLP_IMPORTANT, VLP_MESSAGE};
use crate::features::unified_battery::{BATTERY_LEVEL_LABELS, CHARGING_STATUS_LABELS};
use crate::header::{
    DEVICE_INDEX, FUNCTION_INDEX, REPORT_ID, SOFTWARE_ID, VLP_ACK, VLP_BEGIN, VLP_END,
    VLP_PAYLOAD_LENGTH, VLP_RESERVED, VLP_SEQUENCE_NUMBER,
};
use crate::ids::{error_tags, hidpp2_errors, report_ids};
use crate::vlp_message;

pub mod fields {
    pub const FEATURE_ID: &str = "feature_id";
    pub const INDEX: &str = "index";
    pub const FEATURE_TYPE: &str = "feature_type";
    pub const FEATURE_VERSION: &str = "feature_version";
    pub const ERROR_FEATURE_INDEX: &str = "error_feature_index";
    pub const ERROR_FUNCTION_INDEX: &str = "error_function_index";
    pub const ERROR_SOFTWARE_ID: &str = "error_software_id";
    pub const ERROR_CODE: &str = "error_code";
    pub const STATE_OF_CHARGE: &str = "state_of_charge";
    pub const BATTERY_LEVEL: &str = "battery_level";
    pub const CHARGING_STATUS: &str = "charging_status";
}

vlp_message! {
    pub static VLP_GET_FEATURE = "VlpGetFeature", function = 0, payload_bytes = 2, software_id = 0xF, parents = [VLP_IMPORTANT];
    FieldDescriptor::unsigned(fields::FEATURE_ID, 16),
}

vlp_message! {
    pub static VLP_GET_FEATURE_RESPONSE = "VlpGetFeatureResponse", function = 0, payload_bytes = 3, parents = [VLP_IMPORTANT];
    FieldDescriptor::unsigned(fields::INDEX, 8).with_aliases(&["feature_idx"]),
    FieldDescriptor::unsigned(fields::FEATURE_TYPE, 8),
    FieldDescriptor::unsigned(fields::FEATURE_VERSION, 8),
}

schema! {
    pub static VLP_ERROR = "VlpError", parents = [VLP_MESSAGE, VLP_IMPORTANT];
    REPORT_ID.with_default(report_ids::VLP_NORMAL as u64),
    DEVICE_INDEX,
    FieldDescriptor::unsigned("feature_index", 8).with_default(error_tags::VLP as u64),
    FUNCTION_INDEX.with_default(0),
    SOFTWARE_ID,
    VLP_BEGIN,
    VLP_END,
    VLP_ACK,
    VLP_RESERVED,
    VLP_SEQUENCE_NUMBER,
    VLP_PAYLOAD_LENGTH.with_default(3),
    FieldDescriptor::unsigned(fields::ERROR_FEATURE_INDEX, 8),
    FieldDescriptor::unsigned(fields::ERROR_FUNCTION_INDEX, 4),
    FieldDescriptor::unsigned(fields::ERROR_SOFTWARE_ID, 4),
    FieldDescriptor::unsigned(fields::ERROR_CODE, 8).with_interpreter(hidpp2_errors::LABELS),
}

vlp_message! {
    pub static VLP_BATTERY_STATUS_EVENT = "VlpBatteryStatusEvent", function = 0, payload_bytes = 3, parents = [VLP_EVENT];
    FieldDescriptor::unsigned(fields::STATE_OF_CHARGE, 8),
    FieldDescriptor::unsigned(fields::BATTERY_LEVEL, 8).with_interpreter(BATTERY_LEVEL_LABELS),
    FieldDescriptor::unsigned(fields::CHARGING_STATUS, 8).with_interpreter(CHARGING_STATUS_LABELS),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidpp_fields::Record;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_get_feature_request_header() -> TestResult {
        let mut request = Record::new(&VLP_GET_FEATURE)?;
        request
            .set("device_index", 0x01u8)?
            .set("feature_index", 0x00u8)?
            .set(fields::FEATURE_ID, 0x1004u16)?;
        assert_eq!(
            request.to_bytes()?,
            vec![0x13, 0x01, 0x00, 0x0F, 0xC0, 0x00, 0x02, 0x10, 0x04]
        );
        Ok(())
    }

    #[test]
    fn test_error_payload() -> TestResult {
        let data = [0x13, 0x01, 0xFF, 0x00, 0xC0, 0x00, 0x03, 0x02, 0x2F, 0x07];
        let error = Record::from_bytes(&VLP_ERROR, &data)?;
        assert_eq!(error.get_u64(fields::ERROR_FUNCTION_INDEX)?, 2);
        assert_eq!(error.get_u64(fields::ERROR_CODE)?, 7);
        assert_eq!(error.to_bytes()?, data.to_vec());
        Ok(())
    }
}

//! Root (0x0000): feature index discovery and protocol version.

use hidpp_fields::FieldDescriptor;

use crate::category::IMPORTANT;
use crate::hidpp_message;

pub mod fields {
    pub const FEATURE_ID: &str = "feature_id";
    pub const INDEX: &str = "index";
    pub const FEATURE_TYPE: &str = "feature_type";
    pub const FEATURE_VERSION: &str = "feature_version";
    pub const PROTOCOL_NUMBER: &str = "protocol_number";
    pub const TARGET_SOFTWARE: &str = "target_software";
    pub const PING_DATA: &str = "ping_data";
}

hidpp_message! {
    pub static GET_FEATURE = "GetFeature", Short, function = 0, software_id = 0xF, parents = [IMPORTANT];
    FieldDescriptor::unsigned(fields::FEATURE_ID, 16),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_FEATURE_RESPONSE_V0 = "GetFeatureResponseV0", Long, function = 0, parents = [IMPORTANT];
    FieldDescriptor::unsigned(fields::INDEX, 8).with_aliases(&["feature_idx"]),
    FieldDescriptor::unsigned(fields::FEATURE_TYPE, 8),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_FEATURE_RESPONSE_V1 = "GetFeatureResponseV1", Long, function = 0, parents = [IMPORTANT];
    FieldDescriptor::unsigned(fields::INDEX, 8).with_aliases(&["feature_idx"]),
    FieldDescriptor::unsigned(fields::FEATURE_TYPE, 8),
    FieldDescriptor::unsigned(fields::FEATURE_VERSION, 8),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_PROTOCOL_VERSION = "GetProtocolVersion", Short, function = 1, software_id = 0xF, parents = [IMPORTANT];
    FieldDescriptor::padding(16),
    FieldDescriptor::unsigned(fields::PING_DATA, 8).with_default(0x5A),
}

hidpp_message! {
    pub static GET_PROTOCOL_VERSION_RESPONSE = "GetProtocolVersionResponse", Long, function = 1, parents = [IMPORTANT];
    FieldDescriptor::unsigned(fields::PROTOCOL_NUMBER, 8),
    FieldDescriptor::unsigned(fields::TARGET_SOFTWARE, 8),
    FieldDescriptor::unsigned(fields::PING_DATA, 8),
    FieldDescriptor::padding(0),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidpp_fields::Record;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_get_feature_request_bytes() -> TestResult {
        let mut request = Record::new(&GET_FEATURE)?;
        request
            .set("device_index", 0x01u8)?
            .set("feature_index", 0x00u8)?
            .set(fields::FEATURE_ID, 0x8100u16)?;
        assert_eq!(request.to_bytes()?, vec![0x10, 0x01, 0x00, 0x0F, 0x81, 0x00, 0x00]);
        Ok(())
    }

    #[test]
    fn test_protocol_version_response() -> TestResult {
        let mut data = vec![0x11, 0xFF, 0x00, 0x1A, 0x04, 0x02, 0x5A];
        data.resize(20, 0);
        let response = Record::from_bytes(&GET_PROTOCOL_VERSION_RESPONSE, &data)?;
        assert_eq!(response.get_u64(fields::PROTOCOL_NUMBER)?, 4);
        assert_eq!(response.get_u64(fields::PING_DATA)?, 0x5A);
        assert_eq!(response.to_bytes()?, data);
        Ok(())
    }
}

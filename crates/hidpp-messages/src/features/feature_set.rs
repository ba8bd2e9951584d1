//! FeatureSet (0x0001): enumerate the features a device exposes.

use hidpp_fields::FieldDescriptor;

use crate::category::IMPORTANT;
use crate::hidpp_message;

pub mod fields {
    pub const COUNT: &str = "count";
    pub const INDEX: &str = "index";
    pub const FEATURE_ID: &str = "feature_id";
    pub const FEATURE_TYPE: &str = "feature_type";
    pub const FEATURE_VERSION: &str = "feature_version";
}

pub const FEATURE_TYPE_LABELS: &[(u64, &str)] = &[
    (0x00, "public"),
    (0x20, "engineering"),
    (0x40, "hidden"),
    (0x80, "obsolete"),
];

hidpp_message! {
    pub static GET_COUNT = "GetCount", Short, function = 0, software_id = 0xF, parents = [IMPORTANT];
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_COUNT_RESPONSE = "GetCountResponse", Long, function = 0, parents = [IMPORTANT];
    FieldDescriptor::unsigned(fields::COUNT, 8),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_FEATURE_ID = "GetFeatureId", Short, function = 1, software_id = 0xF, parents = [IMPORTANT];
    FieldDescriptor::unsigned(fields::INDEX, 8),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_FEATURE_ID_RESPONSE_V0 = "GetFeatureIdResponseV0", Long, function = 1, parents = [IMPORTANT];
    FieldDescriptor::unsigned(fields::FEATURE_ID, 16),
    FieldDescriptor::unsigned(fields::FEATURE_TYPE, 8).with_interpreter(FEATURE_TYPE_LABELS),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_FEATURE_ID_RESPONSE_V1 = "GetFeatureIdResponseV1", Long, function = 1, parents = [IMPORTANT];
    FieldDescriptor::unsigned(fields::FEATURE_ID, 16),
    FieldDescriptor::unsigned(fields::FEATURE_TYPE, 8).with_interpreter(FEATURE_TYPE_LABELS),
    FieldDescriptor::unsigned(fields::FEATURE_VERSION, 8),
    FieldDescriptor::padding(0),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidpp_fields::Record;

    #[test]
    fn test_feature_id_response_v1() -> Result<(), Box<dyn std::error::Error>> {
        let mut data = vec![0x11, 0x02, 0x01, 0x1C, 0x22, 0x01, 0x00, 0x02];
        data.resize(20, 0);
        let response = Record::from_bytes(&GET_FEATURE_ID_RESPONSE_V1, &data)?;
        assert_eq!(response.get_u64(fields::FEATURE_ID)?, 0x2201);
        assert_eq!(response.get_u64(fields::FEATURE_VERSION)?, 2);
        assert!(response.summary().contains("feature_type : 0x00 (public)"));
        Ok(())
    }
}

//! OnboardProfiles (0x8100).
//!
//! Versions 1 to 4 share the info layout of version 0; they get their own
//! record so a registry range entry can tell them apart in logs.

use hidpp_fields::{Check, FieldDescriptor};

use crate::category::{EVENT, GAMING};
use crate::hidpp_message;

pub mod fields {
    pub const MEMORY_MODEL_ID: &str = "memory_model_id";
    pub const PROFILE_FORMAT_ID: &str = "profile_format_id";
    pub const MACRO_FORMAT_ID: &str = "macro_format_id";
    pub const PROFILE_COUNT: &str = "profile_count";
    pub const PROFILE_COUNT_OOB: &str = "profile_count_oob";
    pub const BUTTON_COUNT: &str = "button_count";
    pub const SECTOR_COUNT: &str = "sector_count";
    pub const SECTOR_SIZE: &str = "sector_size";
    pub const MECHANICAL_LAYOUT: &str = "mechanical_layout";
    pub const VARIOUS_INFO: &str = "various_info";
    pub const SECTOR_COUNT_RULE: &str = "sector_count_rule";
    pub const ONBOARD_MODE: &str = "onboard_mode";
    pub const PROFILE_ID: &str = "profile_id";
}

pub mod onboard_mode {
    pub const NO_CHANGE: u64 = 0;
    pub const ONBOARD: u64 = 1;
    pub const HOST: u64 = 2;
    pub const EXTERNAL: u64 = 3;

    pub const LABELS: &[(u64, &str)] = &[(0, "no change"), (1, "onboard"), (2, "host"), (3, "external")];
}

hidpp_message! {
    pub static GET_ONBOARD_PROFILES_INFO = "GetOnboardProfilesInfo", Short, function = 0, software_id = 0xF, parents = [GAMING];
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_ONBOARD_PROFILES_INFO_RESPONSE_V0 = "GetOnboardProfilesInfoResponseV0", Long, function = 0, parents = [GAMING];
    FieldDescriptor::unsigned(fields::MEMORY_MODEL_ID, 8),
    FieldDescriptor::unsigned(fields::PROFILE_FORMAT_ID, 8),
    FieldDescriptor::unsigned(fields::MACRO_FORMAT_ID, 8),
    FieldDescriptor::unsigned(fields::PROFILE_COUNT, 8),
    FieldDescriptor::unsigned(fields::PROFILE_COUNT_OOB, 8),
    FieldDescriptor::unsigned(fields::BUTTON_COUNT, 8),
    FieldDescriptor::unsigned(fields::SECTOR_COUNT, 8),
    FieldDescriptor::unsigned(fields::SECTOR_SIZE, 16),
    FieldDescriptor::unsigned(fields::MECHANICAL_LAYOUT, 8),
    FieldDescriptor::unsigned(fields::VARIOUS_INFO, 8),
    FieldDescriptor::unsigned(fields::SECTOR_COUNT_RULE, 8),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_ONBOARD_PROFILES_INFO_RESPONSE_V1_TO_V4 = "GetOnboardProfilesInfoResponseV1ToV4", Long, function = 0, parents = [GAMING];
    FieldDescriptor::unsigned(fields::MEMORY_MODEL_ID, 8),
    FieldDescriptor::unsigned(fields::PROFILE_FORMAT_ID, 8),
    FieldDescriptor::unsigned(fields::MACRO_FORMAT_ID, 8),
    FieldDescriptor::unsigned(fields::PROFILE_COUNT, 8),
    FieldDescriptor::unsigned(fields::PROFILE_COUNT_OOB, 8),
    FieldDescriptor::unsigned(fields::BUTTON_COUNT, 8),
    FieldDescriptor::unsigned(fields::SECTOR_COUNT, 8),
    FieldDescriptor::unsigned(fields::SECTOR_SIZE, 16),
    FieldDescriptor::unsigned(fields::MECHANICAL_LAYOUT, 8),
    FieldDescriptor::unsigned(fields::VARIOUS_INFO, 8),
    FieldDescriptor::unsigned(fields::SECTOR_COUNT_RULE, 8),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static SET_ONBOARD_MODE = "SetOnboardMode", Short, function = 1, software_id = 0xF, parents = [GAMING];
    FieldDescriptor::unsigned(fields::ONBOARD_MODE, 8)
        .with_checks(&[Check::OneOf(&[onboard_mode::ONBOARD, onboard_mode::HOST, onboard_mode::EXTERNAL])])
        .with_interpreter(onboard_mode::LABELS),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static SET_ONBOARD_MODE_RESPONSE = "SetOnboardModeResponse", Long, function = 1, parents = [GAMING];
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_ONBOARD_MODE = "GetOnboardMode", Short, function = 2, software_id = 0xF, parents = [GAMING];
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_ONBOARD_MODE_RESPONSE = "GetOnboardModeResponse", Long, function = 2, parents = [GAMING];
    FieldDescriptor::unsigned(fields::ONBOARD_MODE, 8).with_interpreter(onboard_mode::LABELS),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static CURRENT_PROFILE_CHANGED_EVENT = "CurrentProfileChangedEvent", Long, function = 0, parents = [EVENT];
    FieldDescriptor::unsigned(fields::PROFILE_ID, 16),
    FieldDescriptor::padding(0),
}

//! Static classification tables.
//!
//! HID++ 2.0 and VLP entries are keyed by feature ID, the feature versions
//! they cover and the function (or event) indexes they answer. An entry
//! covering exactly one version and one function is an exact entry; any
//! other entry is a range entry consulted only when no exact entry matches.
//!
//! HID++ 1.0 entries are keyed by sub-ID, optionally refined by register
//! address and the high nibble of the first parameter byte.

use hidpp_fields::Schema;

use crate::features::{
    adjustable_dpi, device_information, error, feature_set, onboard_profiles, root,
    unified_battery,
};
use crate::hidpp1;
use crate::ids::{feature_ids, registers, sub_ids};
use crate::vlp;

/// One `(feature, versions, functions) -> record` mapping.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub feature_id: u16,
    pub versions: &'static [u8],
    pub functions: &'static [u8],
    pub schema: &'static Schema,
}

impl CatalogEntry {
    pub const fn new(
        feature_id: u16,
        versions: &'static [u8],
        functions: &'static [u8],
        schema: &'static Schema,
    ) -> Self {
        Self {
            feature_id,
            versions,
            functions,
            schema,
        }
    }

    /// Single version and single function.
    pub fn is_exact(&self) -> bool {
        self.versions.len() == 1 && self.functions.len() == 1
    }

    pub fn covers(&self, feature_id: u16, version: u8, function: u8) -> bool {
        self.feature_id == feature_id
            && self.versions.contains(&version)
            && self.functions.contains(&function)
    }
}

/// One HID++ 1.0 `(sub_id, address, r0) -> record` mapping.
#[derive(Debug, Clone, Copy)]
pub struct RegisterCatalogEntry {
    pub sub_id: u8,
    /// Register address (byte 3); `None` matches any address.
    pub address: Option<u8>,
    /// High nibble of `r0` (byte 4); `None` matches any value.
    pub r0: Option<u8>,
    pub schema: &'static Schema,
}

impl RegisterCatalogEntry {
    pub const fn new(sub_id: u8, address: Option<u8>, r0: Option<u8>, schema: &'static Schema) -> Self {
        Self {
            sub_id,
            address,
            r0,
            schema,
        }
    }

    /// Number of refining keys; more specific entries win.
    pub fn specificity(&self) -> usize {
        usize::from(self.address.is_some()) + usize::from(self.r0.is_some())
    }

    pub fn matches(&self, sub_id: u8, address: u8, r0: u8) -> bool {
        self.sub_id == sub_id
            && self.address.is_none_or(|expected| expected == address)
            && self.r0.is_none_or(|expected| expected == r0 & 0xF0)
    }
}

const V0: &[u8] = &[0];
const V0_TO_2: &[u8] = &[0, 1, 2];
const V0_TO_4: &[u8] = &[0, 1, 2, 3, 4];
const V1_TO_2: &[u8] = &[1, 2];
const V1_TO_4: &[u8] = &[1, 2, 3, 4];

const F0: &[u8] = &[0];
const F1: &[u8] = &[1];
const F2: &[u8] = &[2];
const F3: &[u8] = &[3];

pub static RESPONSES: &[CatalogEntry] = &[
    CatalogEntry::new(feature_ids::ROOT, V0, F0, &root::GET_FEATURE_RESPONSE_V0),
    CatalogEntry::new(feature_ids::ROOT, V1_TO_2, F0, &root::GET_FEATURE_RESPONSE_V1),
    CatalogEntry::new(feature_ids::ROOT, V0_TO_2, F1, &root::GET_PROTOCOL_VERSION_RESPONSE),
    CatalogEntry::new(feature_ids::FEATURE_SET, V0_TO_2, F0, &feature_set::GET_COUNT_RESPONSE),
    CatalogEntry::new(feature_ids::FEATURE_SET, V0, F1, &feature_set::GET_FEATURE_ID_RESPONSE_V0),
    CatalogEntry::new(feature_ids::FEATURE_SET, V1_TO_2, F1, &feature_set::GET_FEATURE_ID_RESPONSE_V1),
    CatalogEntry::new(
        feature_ids::DEVICE_INFORMATION,
        V0_TO_4,
        F0,
        &device_information::GET_DEVICE_INFO_RESPONSE,
    ),
    CatalogEntry::new(
        feature_ids::DEVICE_INFORMATION,
        V0_TO_4,
        F1,
        &device_information::GET_FW_INFO_RESPONSE,
    ),
    CatalogEntry::new(
        feature_ids::UNIFIED_BATTERY,
        V0_TO_2,
        F0,
        &unified_battery::GET_CAPABILITIES_RESPONSE,
    ),
    CatalogEntry::new(feature_ids::UNIFIED_BATTERY, V0_TO_2, F1, &unified_battery::GET_STATUS_RESPONSE),
    CatalogEntry::new(feature_ids::ADJUSTABLE_DPI, V0, F0, &adjustable_dpi::GET_SENSOR_COUNT_RESPONSE),
    CatalogEntry::new(feature_ids::ADJUSTABLE_DPI, V0, F2, &adjustable_dpi::GET_SENSOR_DPI_RESPONSE),
    CatalogEntry::new(feature_ids::ADJUSTABLE_DPI, V0, F3, &adjustable_dpi::SET_SENSOR_DPI_RESPONSE),
    CatalogEntry::new(
        feature_ids::ONBOARD_PROFILES,
        V0,
        F0,
        &onboard_profiles::GET_ONBOARD_PROFILES_INFO_RESPONSE_V0,
    ),
    CatalogEntry::new(
        feature_ids::ONBOARD_PROFILES,
        V1_TO_4,
        F0,
        &onboard_profiles::GET_ONBOARD_PROFILES_INFO_RESPONSE_V1_TO_V4,
    ),
    CatalogEntry::new(
        feature_ids::ONBOARD_PROFILES,
        V0_TO_4,
        F1,
        &onboard_profiles::SET_ONBOARD_MODE_RESPONSE,
    ),
    CatalogEntry::new(
        feature_ids::ONBOARD_PROFILES,
        V0_TO_4,
        F2,
        &onboard_profiles::GET_ONBOARD_MODE_RESPONSE,
    ),
    CatalogEntry::new(feature_ids::HIDPP2_ERROR, V0, F0, &error::HIDPP2_ERROR),
    CatalogEntry::new(feature_ids::HIDPP1_ERROR, V0, F0, &hidpp1::HIDPP1_ERROR),
];

pub static EVENTS: &[CatalogEntry] = &[
    CatalogEntry::new(
        feature_ids::UNIFIED_BATTERY,
        V0_TO_2,
        F0,
        &unified_battery::BATTERY_STATUS_EVENT,
    ),
    CatalogEntry::new(
        feature_ids::ONBOARD_PROFILES,
        V0_TO_4,
        F0,
        &onboard_profiles::CURRENT_PROFILE_CHANGED_EVENT,
    ),
];

pub static VLP_RESPONSES: &[CatalogEntry] = &[
    CatalogEntry::new(feature_ids::ROOT, V0, F0, &vlp::VLP_GET_FEATURE_RESPONSE),
    CatalogEntry::new(feature_ids::HIDPP2_ERROR, V0, F0, &vlp::VLP_ERROR),
];

pub static VLP_EVENTS: &[CatalogEntry] = &[CatalogEntry::new(
    feature_ids::UNIFIED_BATTERY,
    V0_TO_2,
    F0,
    &vlp::VLP_BATTERY_STATUS_EVENT,
)];

pub static RECEIVER_RESPONSES: &[RegisterCatalogEntry] = &[
    RegisterCatalogEntry::new(sub_ids::ERROR, None, None, &hidpp1::HIDPP1_ERROR),
    RegisterCatalogEntry::new(sub_ids::SET_REGISTER, None, None, &hidpp1::SET_REGISTER_RESPONSE),
    RegisterCatalogEntry::new(sub_ids::GET_REGISTER, None, None, &hidpp1::GET_REGISTER_RESPONSE),
    RegisterCatalogEntry::new(
        sub_ids::GET_REGISTER,
        Some(registers::ENABLE_HIDPP_REPORTING),
        None,
        &hidpp1::GET_ENABLE_HIDPP_REPORTING_RESPONSE,
    ),
    RegisterCatalogEntry::new(
        sub_ids::GET_REGISTER,
        Some(registers::CONNECTION_STATE),
        None,
        &hidpp1::GET_CONNECTION_STATE_RESPONSE,
    ),
    RegisterCatalogEntry::new(
        sub_ids::SET_LONG_REGISTER,
        None,
        None,
        &hidpp1::SET_LONG_REGISTER_RESPONSE,
    ),
    RegisterCatalogEntry::new(
        sub_ids::GET_LONG_REGISTER,
        None,
        None,
        &hidpp1::GET_LONG_REGISTER_RESPONSE,
    ),
    RegisterCatalogEntry::new(
        sub_ids::GET_LONG_REGISTER,
        Some(registers::PAIRING_INFORMATION),
        Some(registers::pairing_r0::DEVICE_PAIRING_INFO),
        &hidpp1::GET_PAIRING_INFO_RESPONSE,
    ),
    RegisterCatalogEntry::new(
        sub_ids::GET_LONG_REGISTER,
        Some(registers::PAIRING_INFORMATION),
        Some(registers::pairing_r0::DEVICE_NAME),
        &hidpp1::GET_DEVICE_NAME_RESPONSE,
    ),
    RegisterCatalogEntry::new(
        sub_ids::SET_VERY_LONG_REGISTER,
        None,
        None,
        &hidpp1::SET_VERY_LONG_REGISTER_RESPONSE,
    ),
    RegisterCatalogEntry::new(
        sub_ids::GET_VERY_LONG_REGISTER,
        None,
        None,
        &hidpp1::GET_VERY_LONG_REGISTER_RESPONSE,
    ),
];

pub static RECEIVER_EVENTS: &[RegisterCatalogEntry] = &[
    RegisterCatalogEntry::new(sub_ids::DEVICE_CONNECTION, None, None, &hidpp1::DEVICE_CONNECTION),
    RegisterCatalogEntry::new(
        sub_ids::DEVICE_DISCONNECTION,
        None,
        None,
        &hidpp1::DEVICE_DISCONNECTION,
    ),
];

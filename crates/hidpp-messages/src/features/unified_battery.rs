//! UnifiedBattery (0x1004).

use hidpp_fields::{Check, FieldDescriptor};

use crate::category::{BATTERY_EVENT, COMMON};
use crate::hidpp_message;

pub mod fields {
    pub const SUPPORTED_LEVEL_FILE: &str = "supported_level_file";
    pub const CAPABILITIES_FLAGS: &str = "capabilities_flags";
    pub const STATE_OF_CHARGE: &str = "state_of_charge";
    pub const BATTERY_LEVEL: &str = "battery_level";
    pub const CHARGING_STATUS: &str = "charging_status";
    pub const EXTERNAL_POWER_STATUS: &str = "external_power_status";
}

pub const BATTERY_LEVEL_LABELS: &[(u64, &str)] =
    &[(1, "critical"), (2, "low"), (4, "good"), (8, "full")];

pub const CHARGING_STATUS_LABELS: &[(u64, &str)] = &[
    (0, "discharging"),
    (1, "charging"),
    (2, "slow charging"),
    (3, "charge complete"),
    (4, "charge error"),
];

pub const EXTERNAL_POWER_LABELS: &[(u64, &str)] =
    &[(0, "no power"), (1, "wired"), (2, "wireless")];

const STATE_OF_CHARGE: FieldDescriptor = FieldDescriptor::unsigned(fields::STATE_OF_CHARGE, 8)
    .with_checks(&[Check::Range { min: 0, max: 100 }]);
const BATTERY_LEVEL: FieldDescriptor =
    FieldDescriptor::unsigned(fields::BATTERY_LEVEL, 8).with_interpreter(BATTERY_LEVEL_LABELS);
const CHARGING_STATUS: FieldDescriptor =
    FieldDescriptor::unsigned(fields::CHARGING_STATUS, 8).with_interpreter(CHARGING_STATUS_LABELS);
const EXTERNAL_POWER_STATUS: FieldDescriptor =
    FieldDescriptor::unsigned(fields::EXTERNAL_POWER_STATUS, 8).with_interpreter(EXTERNAL_POWER_LABELS);

hidpp_message! {
    pub static GET_CAPABILITIES = "GetCapabilities", Short, function = 0, software_id = 0xF, parents = [COMMON];
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_CAPABILITIES_RESPONSE = "GetCapabilitiesResponse", Long, function = 0, parents = [COMMON];
    FieldDescriptor::unsigned(fields::SUPPORTED_LEVEL_FILE, 8),
    FieldDescriptor::unsigned(fields::CAPABILITIES_FLAGS, 8),
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_STATUS = "GetStatus", Short, function = 1, software_id = 0xF, parents = [COMMON];
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static GET_STATUS_RESPONSE = "GetStatusResponse", Long, function = 1, parents = [COMMON];
    STATE_OF_CHARGE,
    BATTERY_LEVEL,
    CHARGING_STATUS,
    EXTERNAL_POWER_STATUS,
    FieldDescriptor::padding(0),
}

hidpp_message! {
    pub static BATTERY_STATUS_EVENT = "BatteryStatusEvent", Long, function = 0, parents = [BATTERY_EVENT];
    STATE_OF_CHARGE,
    BATTERY_LEVEL,
    CHARGING_STATUS,
    EXTERNAL_POWER_STATUS,
    FieldDescriptor::padding(0),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidpp_fields::Record;

    #[test]
    fn test_status_event_summary() -> Result<(), Box<dyn std::error::Error>> {
        let mut data = vec![0x11, 0x01, 0x04, 0x00, 0x32, 0x04, 0x01, 0x01];
        data.resize(20, 0);
        let event = Record::from_bytes(&BATTERY_STATUS_EVENT, &data)?;
        insta::assert_snapshot!(event.summary(), @r"
        BatteryStatusEvent
          report_id : 0x11 (long)
          device_index : 0x01
          feature_index : 0x04
          function_index : 0x00
          software_id : 0x00
          state_of_charge : 0x32
          battery_level : 0x04 (good)
          charging_status : 0x01 (charging)
          external_power_status : 0x01 (wired)
        ");
        Ok(())
    }

    #[test]
    fn test_state_of_charge_is_a_percentage() -> Result<(), Box<dyn std::error::Error>> {
        let mut event = Record::new(&BATTERY_STATUS_EVENT)?;
        assert!(event.set(fields::STATE_OF_CHARGE, 101u8).is_err());
        event.set(fields::STATE_OF_CHARGE, 100u8)?;
        Ok(())
    }
}

//! Dispatcher configuration.

use hidpp_errors::{HidppError, Result};
use serde::{Deserialize, Serialize};

/// Boot-protocol keyboard report length in bytes.
pub const BOOT_KEYBOARD_REPORT_LEN: usize = 8;

/// Dispatcher configuration.
///
/// The configuration is a plain value: callers build it in code or
/// deserialize it from whatever format they carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Maximum messages held per queue; `None` for unbounded queues.
    pub queue_capacity: Option<usize>,
    /// Reject setter names that only match a field after normalization.
    pub strict_attribute_names: bool,
    /// Length of a boot-protocol keyboard report.
    pub keyboard_boot_report_len: usize,
    /// The keyboard interface claims report-ID-less boot reports.
    pub keyboard_boot_protocol: bool,
    /// Report IDs owned by the mouse interface.
    pub mouse_report_ids: Vec<u8>,
    /// Report IDs owned by the keyboard interface.
    pub keyboard_report_ids: Vec<u8>,
    /// Report IDs owned by the digitizer interface.
    pub digitizer_report_ids: Vec<u8>,
    /// Device indexes for which HID++ 1.0 register resolution is tried;
    /// `None` tries every device index.
    pub hidpp_device_indexes: Option<Vec<u8>>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: None,
            strict_attribute_names: true,
            keyboard_boot_report_len: BOOT_KEYBOARD_REPORT_LEN,
            keyboard_boot_protocol: true,
            mouse_report_ids: Vec::new(),
            keyboard_report_ids: Vec::new(),
            digitizer_report_ids: Vec::new(),
            hidpp_device_indexes: None,
        }
    }
}

impl DispatcherConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `HidppError::Config` for a zero queue capacity, a zero boot
    /// report length, or a report ID claimed by two interfaces.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == Some(0) {
            return Err(HidppError::config("queue_capacity must be greater than 0"));
        }
        if self.keyboard_boot_report_len == 0 {
            return Err(HidppError::config(
                "keyboard_boot_report_len must be greater than 0",
            ));
        }
        let interfaces = [
            ("mouse", &self.mouse_report_ids),
            ("keyboard", &self.keyboard_report_ids),
            ("digitizer", &self.digitizer_report_ids),
        ];
        for (index, (name, ids)) in interfaces.iter().enumerate() {
            for (other, other_ids) in &interfaces[index + 1..] {
                if let Some(id) = ids.iter().find(|id| other_ids.contains(*id)) {
                    return Err(HidppError::config(format!(
                        "report id {id:#04x} is claimed by both the {name} and {other} interfaces"
                    )));
                }
            }
            if let Some(id) = ids.iter().find(|id| hidpp_messages::ids::is_hidpp_report_id(**id)) {
                return Err(HidppError::config(format!(
                    "report id {id:#04x} of the {name} interface is a HID++ report id"
                )));
            }
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> DispatcherConfigBuilder {
        DispatcherConfigBuilder::default()
    }
}

/// Builder for [`DispatcherConfig`].
#[derive(Debug, Default)]
pub struct DispatcherConfigBuilder {
    config: DispatcherConfig,
}

impl DispatcherConfigBuilder {
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn strict_attribute_names(mut self, strict: bool) -> Self {
        self.config.strict_attribute_names = strict;
        self
    }

    #[must_use]
    pub fn keyboard_boot_report_len(mut self, len: usize) -> Self {
        self.config.keyboard_boot_report_len = len;
        self
    }

    #[must_use]
    pub fn keyboard_boot_protocol(mut self, enabled: bool) -> Self {
        self.config.keyboard_boot_protocol = enabled;
        self
    }

    #[must_use]
    pub fn mouse_report_ids(mut self, ids: impl Into<Vec<u8>>) -> Self {
        self.config.mouse_report_ids = ids.into();
        self
    }

    #[must_use]
    pub fn keyboard_report_ids(mut self, ids: impl Into<Vec<u8>>) -> Self {
        self.config.keyboard_report_ids = ids.into();
        self
    }

    #[must_use]
    pub fn digitizer_report_ids(mut self, ids: impl Into<Vec<u8>>) -> Self {
        self.config.digitizer_report_ids = ids.into();
        self
    }

    #[must_use]
    pub fn hidpp_device_indexes(mut self, indexes: impl Into<Vec<u8>>) -> Self {
        self.config.hidpp_device_indexes = Some(indexes.into());
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<DispatcherConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_default_is_valid() -> TestResult {
        let config = DispatcherConfig::default();
        config.validate()?;
        assert!(config.strict_attribute_names);
        assert_eq!(config.keyboard_boot_report_len, 8);
        Ok(())
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = DispatcherConfig::builder().queue_capacity(0).build();
        assert!(matches!(result, Err(HidppError::Config(_))));
    }

    #[test]
    fn test_shared_report_id_rejected() {
        let result = DispatcherConfig::builder()
            .mouse_report_ids([0x02])
            .keyboard_report_ids([0x01, 0x02])
            .build();
        let Err(HidppError::Config(message)) = result else {
            panic!("expected a configuration error");
        };
        assert!(message.contains("mouse and keyboard"));
    }

    #[test]
    fn test_hidpp_report_id_rejected() {
        let result = DispatcherConfig::builder().digitizer_report_ids([0x11]).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_fills_defaults() -> TestResult {
        let config: DispatcherConfig =
            serde_json::from_str(r#"{"queue_capacity": 16, "mouse_report_ids": [2]}"#)?;
        assert_eq!(config.queue_capacity, Some(16));
        assert_eq!(config.mouse_report_ids, vec![2]);
        assert!(config.keyboard_boot_protocol);

        let text = serde_json::to_string(&config)?;
        let back: DispatcherConfig = serde_json::from_str(&text)?;
        assert_eq!(back, config);
        Ok(())
    }
}

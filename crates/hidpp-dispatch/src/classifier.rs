//! Raw interrupt to typed record classification.
//!
//! Families are tried in a fixed order: HID++ (1.0 register access first
//! unless the feature index is announced, then 2.0 features), VLP, then the
//! HID input interfaces. Inputs that no table knows yield `Ok(None)`; only
//! broken registry data and malformed frames for a resolved record surface
//! as errors.

use std::sync::Arc;

use hidpp_bitstream::reverse_bits_in_bytes;
use hidpp_errors::{RegistryError, Result};
use hidpp_fields::{Record, Schema};
use hidpp_messages::features::error;
use hidpp_messages::hid::{self, BOOT_KEYBOARD};
use hidpp_messages::ids::{self, error_tags};
use hidpp_messages::{HidppHeader, ReportKind, VlpHeader};
use tracing::{debug, trace};

use crate::config::DispatcherConfig;
use crate::index::FeatureIndexTable;
use crate::interface::{HidInterface, HidInterfaces};
use crate::registry::FeatureRegistry;
use crate::transport::TransportMessage;

/// Classification state of one device session.
///
/// The registry is shared and immutable; the index tables and interface
/// collections change as the session goes on and are guarded by the
/// dispatcher lock.
#[derive(Debug, Clone)]
pub struct Classifier {
    registry: Arc<FeatureRegistry>,
    hidpp_index: FeatureIndexTable,
    vlp_index: FeatureIndexTable,
    interfaces: HidInterfaces,
    strict_attribute_names: bool,
    keyboard_boot_protocol: bool,
    keyboard_boot_report_len: usize,
    hidpp_device_indexes: Option<Vec<u8>>,
}

impl Classifier {
    pub fn new(registry: Arc<FeatureRegistry>, config: &DispatcherConfig) -> Self {
        let mut interfaces = HidInterfaces::new();
        interfaces
            .table_mut(HidInterface::Mouse)
            .set_report_ids(config.mouse_report_ids.iter().copied());
        interfaces
            .table_mut(HidInterface::Keyboard)
            .set_report_ids(config.keyboard_report_ids.iter().copied());
        interfaces
            .table_mut(HidInterface::Digitizer)
            .set_report_ids(config.digitizer_report_ids.iter().copied());
        Self {
            registry,
            hidpp_index: FeatureIndexTable::hidpp(),
            vlp_index: FeatureIndexTable::vlp(),
            interfaces,
            strict_attribute_names: config.strict_attribute_names,
            keyboard_boot_protocol: config.keyboard_boot_protocol,
            keyboard_boot_report_len: config.keyboard_boot_report_len,
            hidpp_device_indexes: config.hidpp_device_indexes.clone(),
        }
    }

    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        &self.registry
    }

    pub fn hidpp_index(&self) -> &FeatureIndexTable {
        &self.hidpp_index
    }

    pub fn hidpp_index_mut(&mut self) -> &mut FeatureIndexTable {
        &mut self.hidpp_index
    }

    pub fn vlp_index(&self) -> &FeatureIndexTable {
        &self.vlp_index
    }

    pub fn vlp_index_mut(&mut self) -> &mut FeatureIndexTable {
        &mut self.vlp_index
    }

    pub fn interfaces(&self) -> &HidInterfaces {
        &self.interfaces
    }

    pub fn interfaces_mut(&mut self) -> &mut HidInterfaces {
        &mut self.interfaces
    }

    /// Classify one transport message.
    ///
    /// # Errors
    ///
    /// `AmbiguousRegistryMapping` for overlapping registry entries, codec
    /// errors when a resolved record cannot be parsed from the frame.
    pub fn classify(&self, message: &TransportMessage) -> Result<Option<Record>> {
        let data = message.data.as_slice();
        let Some(&report_id) = data.first() else {
            return Ok(None);
        };

        let record = if ids::is_hidpp_frame(data) {
            let register = if self.hidpp1_candidate(data)? {
                self.classify_hidpp1(data)?
            } else {
                None
            };
            match register {
                Some(record) => Some(record),
                None => self.classify_hidpp2(data)?,
            }
        } else if ids::is_vlp_report_id(report_id) {
            self.classify_vlp(data)?
        } else {
            self.classify_hid(data)?
        };

        Ok(record.map(|mut record| {
            record.set_timestamp(message.timestamp);
            record.set_strict_names(self.strict_attribute_names);
            record
        }))
    }

    /// An announced feature index wins over a HID++ 1.0 sub-ID with the same
    /// value; the 1.0 error tag is always a register error.
    fn hidpp1_candidate(&self, data: &[u8]) -> Result<bool> {
        let header = HidppHeader::parse(data)?;
        Ok(header.feature_index == error_tags::HIDPP1 || self.hidpp_index.get(header.feature_index).is_none())
    }

    fn classify_hidpp1(&self, data: &[u8]) -> Result<Option<Record>> {
        let header = HidppHeader::parse(data)?;
        let sub_id = header.sub_id();
        if !self.registry.knows_sub_id(sub_id) {
            return Ok(None);
        }
        let device_allowed = self
            .hidpp_device_indexes
            .as_ref()
            .is_none_or(|indexes| indexes.contains(&header.device_index));
        if !device_allowed {
            return Ok(None);
        }
        let r0 = data.get(4).copied().unwrap_or_default();
        let Some(schema) = self.registry.resolve_register(sub_id, header.address(), r0)? else {
            return Ok(None);
        };
        trace!(sub_id, address = header.address(), r0, schema = schema.name(), "HID++ 1.0 register");
        parse(schema, data).map(Some)
    }

    fn classify_hidpp2(&self, data: &[u8]) -> Result<Option<Record>> {
        let header = HidppHeader::parse(data)?;
        let Some(key) = self.hidpp_index.get(header.feature_index) else {
            debug!(
                error = %RegistryError::UnknownFeatureIndex(header.feature_index),
                "HID++ 2.0 message left unclassified"
            );
            return Ok(None);
        };

        let resolved = if header.feature_index == error_tags::HIDPP2 || header.feature_index == error_tags::HIDPP1
        {
            self.registry
                .responses
                .lookup(key.feature_id, key.version, error_tags::FUNCTION_INDEX)?
                .map(|schema| sized_error(schema, data))
        } else {
            self.registry.resolve(
                key.feature_id,
                key.version,
                header.function_index,
                header.is_event(),
            )?
        };
        let Some(schema) = resolved else {
            debug!(
                feature_id = key.feature_id,
                version = key.version,
                function = header.function_index,
                software_id = header.software_id,
                "no HID++ 2.0 record for key"
            );
            return Ok(None);
        };
        parse(schema, data).map(Some)
    }

    fn classify_vlp(&self, data: &[u8]) -> Result<Option<Record>> {
        let header = VlpHeader::parse(data)?;
        let Some(key) = self.vlp_index.get(header.feature_index) else {
            debug!(
                error = %RegistryError::UnknownFeatureIndex(header.feature_index),
                "VLP message left unclassified"
            );
            return Ok(None);
        };

        let is_error = header.feature_index == error_tags::VLP;
        let function = if is_error {
            error_tags::FUNCTION_INDEX
        } else {
            header.function_index
        };
        let use_responses = is_error || !header.is_event();
        let Some(schema) = self
            .registry
            .resolve_vlp(key.feature_id, key.version, function, use_responses)?
        else {
            debug!(
                feature_id = key.feature_id,
                version = key.version,
                function,
                "no VLP record for key"
            );
            return Ok(None);
        };
        parse(schema, data).map(Some)
    }

    fn classify_hid(&self, data: &[u8]) -> Result<Option<Record>> {
        let report_id = data.first().copied().unwrap_or_default();
        let keyboard_is_boot = self.keyboard_boot_protocol
            && data.len() == self.keyboard_boot_report_len
            && self
                .interfaces
                .table(HidInterface::Keyboard)
                .is_none_or(|table| !table.has_collections());

        let owner = self.interfaces.owner_of(report_id);
        let collection = owner.and_then(|(_, table)| table.collection(report_id));
        match (owner, collection) {
            (Some((interface, _)), Some(collection)) => {
                let family = collection.family();
                let Some(payload) = data.get(1..) else {
                    return Ok(None);
                };
                let mut bytes = Vec::with_capacity(data.len());
                bytes.push(report_id);
                bytes.extend(collection.deserialize(&reverse_bits_in_bytes(payload))?);
                trace!(%interface, report_id, family = family.name(), "HID input report");
                parse(hid::schema_for(family), &bytes).map(Some)
            }
            (None, _) | (Some((HidInterface::Keyboard, _)), None) if keyboard_is_boot => {
                let mut bytes = data.to_vec();
                if let Some(modifier) = bytes.first_mut() {
                    *modifier = modifier.reverse_bits();
                }
                trace!("boot keyboard report");
                parse(&BOOT_KEYBOARD, &bytes).map(Some)
            }
            _ => {
                debug!(report_id, len = data.len(), "no interface claims the report");
                Ok(None)
            }
        }
    }
}

/// Long and very long HID++ 2.0 errors keep their frame size.
fn sized_error(schema: &'static Schema, data: &[u8]) -> &'static Schema {
    let kind = data.first().copied().and_then(ReportKind::from_report_id);
    match kind {
        Some(kind) if std::ptr::eq(schema, &error::HIDPP2_ERROR) => error::hidpp2_error_for(kind),
        _ => schema,
    }
}

fn parse(schema: &'static Schema, data: &[u8]) -> Result<Record> {
    Record::from_bytes(schema, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidpp_messages::features::{feature_set, root};
    use hidpp_messages::ids::feature_ids;
    use hidpp_messages::{hidpp1, vlp};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn classifier() -> std::result::Result<Classifier, Box<dyn std::error::Error>> {
        let registry = Arc::new(FeatureRegistry::standard()?);
        Ok(Classifier::new(registry, &DispatcherConfig::default()))
    }

    #[test]
    fn test_empty_message() -> TestResult {
        let classifier = classifier()?;
        assert!(classifier.classify(&TransportMessage::new(Vec::new(), 0))?.is_none());
        Ok(())
    }

    #[test]
    fn test_root_response_with_timestamp() -> TestResult {
        let mut classifier = classifier()?;
        classifier.hidpp_index_mut().add(0x00, feature_ids::ROOT, 0);
        let mut data = vec![0u8; 20];
        data[..7].copy_from_slice(&[0x11, 0x01, 0x00, 0x0E, 0x05, 0x00, 0x02]);
        let record = classifier.classify(&TransportMessage::new(data, 42))?;
        let record = record.ok_or("root response not classified")?;
        assert!(record.is_a(&root::GET_FEATURE_RESPONSE_V0));
        assert_eq!(record.timestamp(), Some(42));
        Ok(())
    }

    #[test]
    fn test_hidpp2_error_forces_function_zero() -> TestResult {
        let classifier = classifier()?;
        let data = vec![0x10, 0x01, 0xFF, 0x05, 0x1E, 0x02, 0x00];
        let record = classifier
            .classify(&TransportMessage::new(data, 0))?
            .ok_or("error report not classified")?;
        assert!(record.is_a(&error::HIDPP2_ERROR));
        assert_eq!(record.get_u64("error_code")?, 0x02);
        Ok(())
    }

    #[test]
    fn test_hidpp1_error_and_connection() -> TestResult {
        let classifier = classifier()?;
        let error = vec![0x10, 0xFF, 0x8F, 0x81, 0xB5, 0x02, 0x00];
        let record = classifier
            .classify(&TransportMessage::new(error, 0))?
            .ok_or("register error not classified")?;
        assert!(record.is_a(&hidpp1::HIDPP1_ERROR));

        let connection = vec![0x10, 0x01, 0x41, 0x04, 0x04, 0x6D, 0x40];
        let record = classifier
            .classify(&TransportMessage::new(connection, 0))?
            .ok_or("connection not classified")?;
        assert!(record.is_a(&hidpp1::DEVICE_CONNECTION));
        Ok(())
    }

    #[test]
    fn test_device_index_filter_skips_registers() -> TestResult {
        let registry = Arc::new(FeatureRegistry::standard()?);
        let config = DispatcherConfig::builder().hidpp_device_indexes([0xFF]).build()?;
        let mut classifier = Classifier::new(registry, &config);
        classifier.hidpp_index_mut().add(0x81, feature_ids::FEATURE_SET, 1);

        // Device 1: 0x81 is a feature index, not a get-register sub-id.
        let mut data = vec![0x11, 0x01, 0x81, 0x1E, 0x22, 0x01, 0x00, 0x02];
        data.resize(20, 0);
        let record = classifier
            .classify(&TransportMessage::new(data, 0))?
            .ok_or("feature set response not classified")?;
        assert!(record.is_a(&feature_set::GET_FEATURE_ID_RESPONSE_V1));
        assert_eq!(record.get_u64(feature_set::fields::FEATURE_ID)?, 0x2201);
        Ok(())
    }

    #[test]
    fn test_announced_feature_index_shadows_register_sub_id() -> TestResult {
        let mut classifier = classifier()?;
        classifier.hidpp_index_mut().add(0x41, feature_ids::FEATURE_SET, 1);

        let mut data = vec![0x11, 0x01, 0x41, 0x1E, 0x22, 0x01, 0x00, 0x02];
        data.resize(20, 0);
        let record = classifier
            .classify(&TransportMessage::new(data, 0))?
            .ok_or("feature set response not classified")?;
        assert!(record.is_a(&feature_set::GET_FEATURE_ID_RESPONSE_V1));
        assert_eq!(record.get_u64(feature_set::fields::FEATURE_ID)?, 0x2201);

        // The 1.0 error tag is seeded in the table and still reads as a register error.
        let error = vec![0x10, 0xFF, 0x8F, 0x81, 0xB5, 0x02, 0x00];
        let record = classifier
            .classify(&TransportMessage::new(error, 0))?
            .ok_or("register error not classified")?;
        assert!(record.is_a(&hidpp1::HIDPP1_ERROR));
        Ok(())
    }

    #[test]
    fn test_long_hidpp2_error_round_trips() -> TestResult {
        let classifier = classifier()?;
        let mut data = vec![0x11, 0x01, 0xFF, 0x05, 0x1E, 0x02];
        data.resize(20, 0);
        let record = classifier
            .classify(&TransportMessage::new(data.clone(), 0))?
            .ok_or("long error report not classified")?;
        assert!(record.is_a(&error::HIDPP2_ERROR));
        assert!(record.is_a(&error::HIDPP2_ERROR_LONG));
        assert_eq!(record.to_bytes()?, data);
        Ok(())
    }

    #[test]
    fn test_vlp_event_and_error() -> TestResult {
        let mut classifier = classifier()?;
        classifier.vlp_index_mut().add(0x04, 0x1004, 1);

        let event = vec![0x13, 0x01, 0x04, 0x00, 0xC0, 0x00, 0x03, 0x50, 0x04, 0x00];
        let record = classifier
            .classify(&TransportMessage::new(event, 0))?
            .ok_or("VLP event not classified")?;
        assert!(record.is_a(&vlp::VLP_BATTERY_STATUS_EVENT));
        assert_eq!(record.get_u64(vlp::fields::STATE_OF_CHARGE)?, 0x50);

        let error = vec![0x13, 0x01, 0xFF, 0x0F, 0xC0, 0x00, 0x03, 0x04, 0x1F, 0x05];
        let record = classifier
            .classify(&TransportMessage::new(error, 0))?
            .ok_or("VLP error not classified")?;
        assert!(record.is_a(&vlp::VLP_ERROR));
        Ok(())
    }

    #[test]
    fn test_unclaimed_hid_report() -> TestResult {
        let classifier = classifier()?;
        assert!(classifier.classify(&TransportMessage::new(vec![0x05, 0x01, 0x02], 0))?.is_none());
        Ok(())
    }
}

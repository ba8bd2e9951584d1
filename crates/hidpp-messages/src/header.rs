//! Report headers shared by every HID++ and VLP record.
//!
//! Header fields are plain descriptor constants spliced in front of each
//! record's payload by the `hidpp_message!`, `hidpp1_message!` and
//! `vlp_message!` declaration macros. The [`HidppHeader`] and [`VlpHeader`]
//! views decode just the header for classification, without building a
//! record.

use hidpp_bitstream::BitReader;
use hidpp_errors::CodecResult;
use hidpp_fields::{DefaultValue, FieldDescriptor};

use crate::ids::{report_ids, report_lengths};

pub const REPORT_ID_LABELS: &[(u64, &str)] = &[
    (0x10, "short"),
    (0x11, "long"),
    (0x12, "very long"),
    (0x13, "vlp"),
    (0x14, "vlp extended"),
];

pub const REPORT_ID: FieldDescriptor =
    FieldDescriptor::unsigned("report_id", 8).with_interpreter(REPORT_ID_LABELS);
pub const DEVICE_INDEX: FieldDescriptor =
    FieldDescriptor::unsigned("device_index", 8).with_default(0xFF);
pub const FEATURE_INDEX: FieldDescriptor = FieldDescriptor::unsigned("feature_index", 8);
pub const FUNCTION_INDEX: FieldDescriptor = FieldDescriptor::unsigned("function_index", 4);
pub const SOFTWARE_ID: FieldDescriptor = FieldDescriptor::unsigned("software_id", 4).with_default(0);

pub const SUB_ID: FieldDescriptor = FieldDescriptor::unsigned("sub_id", 8);
pub const ADDRESS: FieldDescriptor = FieldDescriptor::unsigned("address", 8);

pub const VLP_BEGIN: FieldDescriptor = FieldDescriptor::unsigned("begin", 1).with_default(1);
pub const VLP_END: FieldDescriptor = FieldDescriptor::unsigned("end", 1).with_default(1);
pub const VLP_ACK: FieldDescriptor = FieldDescriptor::unsigned("ack", 1).with_default(0);
pub const VLP_RESERVED: FieldDescriptor = FieldDescriptor::unsigned("reserved", 1)
    .with_default_value(DefaultValue::Unsigned(0))
    .with_elide_zero();
pub const VLP_SEQUENCE_NUMBER: FieldDescriptor =
    FieldDescriptor::unsigned("sequence_number", 4).with_default(0);
pub const VLP_PAYLOAD_LENGTH: FieldDescriptor = FieldDescriptor::unsigned("payload_length", 16);

/// HID++ frame sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Short,
    Long,
    VeryLong,
}

impl ReportKind {
    pub const fn report_id(self) -> u8 {
        match self {
            ReportKind::Short => report_ids::SHORT,
            ReportKind::Long => report_ids::LONG,
            ReportKind::VeryLong => report_ids::VERY_LONG,
        }
    }

    /// Frame length in bytes.
    pub const fn length(self) -> usize {
        match self {
            ReportKind::Short => report_lengths::SHORT,
            ReportKind::Long => report_lengths::LONG,
            ReportKind::VeryLong => report_lengths::VERY_LONG,
        }
    }

    pub const fn bits(self) -> usize {
        self.length() * 8
    }

    pub fn from_report_id(report_id: u8) -> Option<Self> {
        match report_id {
            report_ids::SHORT => Some(ReportKind::Short),
            report_ids::LONG => Some(ReportKind::Long),
            report_ids::VERY_LONG => Some(ReportKind::VeryLong),
            _ => None,
        }
    }

    pub fn from_length(length: usize) -> Option<Self> {
        match length {
            report_lengths::SHORT => Some(ReportKind::Short),
            report_lengths::LONG => Some(ReportKind::Long),
            report_lengths::VERY_LONG => Some(ReportKind::VeryLong),
            _ => None,
        }
    }
}

/// The four header bytes of a HID++ frame.
///
/// For HID++ 1.0 frames `feature_index` holds the sub-ID and the nibbles
/// hold the register address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HidppHeader {
    pub report_id: u8,
    pub device_index: u8,
    pub feature_index: u8,
    pub function_index: u8,
    pub software_id: u8,
}

impl HidppHeader {
    /// # Errors
    ///
    /// Returns `OutOfBounds` for frames shorter than four bytes.
    pub fn parse(data: &[u8]) -> CodecResult<Self> {
        let mut reader = BitReader::new(data);
        Ok(Self {
            report_id: reader.read_u8()?,
            device_index: reader.read_u8()?,
            feature_index: reader.read_u8()?,
            function_index: reader.read_bits(4)? as u8,
            software_id: reader.read_bits(4)? as u8,
        })
    }

    /// HID++ 1.0 sub-ID (same byte as the feature index).
    pub fn sub_id(&self) -> u8 {
        self.feature_index
    }

    /// HID++ 1.0 register address (same byte as the function nibbles).
    pub fn address(&self) -> u8 {
        (self.function_index << 4) | self.software_id
    }

    /// Software ID zero marks a device-initiated event.
    pub fn is_event(&self) -> bool {
        self.software_id == 0
    }
}

/// The fixed seven-byte header of a VLP frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VlpHeader {
    pub report_id: u8,
    pub device_index: u8,
    pub feature_index: u8,
    pub function_index: u8,
    pub software_id: u8,
    pub begin: bool,
    pub end: bool,
    pub ack: bool,
    pub sequence_number: u8,
    pub payload_length: u16,
}

impl VlpHeader {
    /// # Errors
    ///
    /// Returns `OutOfBounds` for frames shorter than the header.
    pub fn parse(data: &[u8]) -> CodecResult<Self> {
        let mut reader = BitReader::new(data);
        let report_id = reader.read_u8()?;
        let device_index = reader.read_u8()?;
        let feature_index = reader.read_u8()?;
        let function_index = reader.read_bits(4)? as u8;
        let software_id = reader.read_bits(4)? as u8;
        let begin = reader.read_bits(1)? == 1;
        let end = reader.read_bits(1)? == 1;
        let ack = reader.read_bits(1)? == 1;
        reader.skip_bits(1)?;
        let sequence_number = reader.read_bits(4)? as u8;
        let payload_length = reader.read_u16_be()?;
        Ok(Self {
            report_id,
            device_index,
            feature_index,
            function_index,
            software_id,
            begin,
            end,
            ack,
            sequence_number,
            payload_length,
        })
    }

    pub fn is_event(&self) -> bool {
        self.software_id == 0
    }
}

/// Declare a HID++ 2.0 message: the five header fields, then the payload.
///
/// The schema length is the frame length, so a trailing `padding(0)` field
/// fills whatever the payload leaves.
#[macro_export]
macro_rules! hidpp_message {
    (
        $vis:vis static $ident:ident = $name:literal, $kind:ident, function = $function:expr
        $(, software_id = $software_id:expr)?
        $(, parents = [$($parent:path),* $(,)?])?
        ;
        $($field:expr),* $(,)?
    ) => {
        ::hidpp_fields::schema! {
            $vis static $ident = $name,
            length = $crate::header::ReportKind::$kind.bits(),
            parents = [$crate::category::HIDPP_MESSAGE $($(, $parent)*)?];
            $crate::header::REPORT_ID.with_default($crate::header::ReportKind::$kind.report_id() as u64),
            $crate::header::DEVICE_INDEX,
            $crate::header::FEATURE_INDEX,
            $crate::header::FUNCTION_INDEX.with_default($function),
            $crate::header::SOFTWARE_ID $(.with_default($software_id))?,
            $($field,)*
        }
    };
}

/// Declare a HID++ 1.0 message: report ID, device index and sub-ID, then
/// the payload (register address included).
#[macro_export]
macro_rules! hidpp1_message {
    (
        $vis:vis static $ident:ident = $name:literal, $kind:ident, sub_id = $sub_id:expr
        $(, parents = [$($parent:path),* $(,)?])?
        ;
        $($field:expr),* $(,)?
    ) => {
        ::hidpp_fields::schema! {
            $vis static $ident = $name,
            length = $crate::header::ReportKind::$kind.bits(),
            parents = [$crate::category::HIDPP1_MESSAGE $($(, $parent)*)?];
            $crate::header::REPORT_ID.with_default($crate::header::ReportKind::$kind.report_id() as u64),
            $crate::header::DEVICE_INDEX,
            $crate::header::SUB_ID.with_default($sub_id),
            $($field,)*
        }
    };
}

/// Declare a VLP message: the fixed header, then a fixed payload of
/// `payload_bytes` bytes.
#[macro_export]
macro_rules! vlp_message {
    (
        $vis:vis static $ident:ident = $name:literal, function = $function:expr, payload_bytes = $payload:expr
        $(, software_id = $software_id:expr)?
        $(, parents = [$($parent:path),* $(,)?])?
        ;
        $($field:expr),* $(,)?
    ) => {
        ::hidpp_fields::schema! {
            $vis static $ident = $name,
            parents = [$crate::category::VLP_MESSAGE $($(, $parent)*)?];
            $crate::header::REPORT_ID.with_default($crate::ids::report_ids::VLP_NORMAL as u64),
            $crate::header::DEVICE_INDEX,
            $crate::header::FEATURE_INDEX,
            $crate::header::FUNCTION_INDEX.with_default($function),
            $crate::header::SOFTWARE_ID $(.with_default($software_id))?,
            $crate::header::VLP_BEGIN,
            $crate::header::VLP_END,
            $crate::header::VLP_ACK,
            $crate::header::VLP_RESERVED,
            $crate::header::VLP_SEQUENCE_NUMBER,
            $crate::header::VLP_PAYLOAD_LENGTH.with_default($payload),
            $($field,)*
        }
    };
}

//! HID++ 2.0 error report (feature index 0xFF).

use hidpp_fields::{FieldDescriptor, Schema, schema};

use crate::category::{ERROR, HIDPP_MESSAGE};
use crate::header::{DEVICE_INDEX, REPORT_ID, ReportKind};
use crate::ids::{error_tags, hidpp2_errors};

pub mod fields {
    pub const ERROR_FEATURE_INDEX: &str = "error_feature_index";
    pub const ERROR_FUNCTION_INDEX: &str = "error_function_index";
    pub const ERROR_SOFTWARE_ID: &str = "error_software_id";
    pub const ERROR_CODE: &str = "error_code";
}

// The error tag replaces the feature index, and the failing request's
// header follows it. Devices answer in the report size of the request.
macro_rules! hidpp2_error {
    ($vis:vis static $ident:ident = $name:literal, $kind:ident, parents = [$($parent:path),*]) => {
        schema! {
            $vis static $ident = $name, length = ReportKind::$kind.bits(), parents = [$($parent),*];
            REPORT_ID.with_default(ReportKind::$kind.report_id() as u64),
            DEVICE_INDEX,
            FieldDescriptor::unsigned("feature_index", 8).with_default(error_tags::HIDPP2 as u64),
            FieldDescriptor::unsigned(fields::ERROR_FEATURE_INDEX, 8),
            FieldDescriptor::unsigned(fields::ERROR_FUNCTION_INDEX, 4),
            FieldDescriptor::unsigned(fields::ERROR_SOFTWARE_ID, 4),
            FieldDescriptor::unsigned(fields::ERROR_CODE, 8).with_interpreter(hidpp2_errors::LABELS),
            FieldDescriptor::padding(0),
        }
    };
}

hidpp2_error! { pub static HIDPP2_ERROR = "Hidpp2Error", Short, parents = [HIDPP_MESSAGE, ERROR] }
hidpp2_error! { pub static HIDPP2_ERROR_LONG = "Hidpp2ErrorLong", Long, parents = [HIDPP2_ERROR] }
hidpp2_error! {
    pub static HIDPP2_ERROR_VERY_LONG = "Hidpp2ErrorVeryLong", VeryLong, parents = [HIDPP2_ERROR]
}

/// The error layout sized for `kind`. [`HIDPP2_ERROR`] is the one listed in
/// the catalog; the larger layouts derive from it.
pub fn hidpp2_error_for(kind: ReportKind) -> &'static Schema {
    match kind {
        ReportKind::Short => &HIDPP2_ERROR,
        ReportKind::Long => &HIDPP2_ERROR_LONG,
        ReportKind::VeryLong => &HIDPP2_ERROR_VERY_LONG,
    }
}

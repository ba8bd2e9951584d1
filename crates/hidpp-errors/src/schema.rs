//! Record declaration and record access errors.

use crate::codec::CodecError;
use crate::common::ErrorSeverity;

/// A record schema violates its declaration invariants.
///
/// These are raised the first time a schema is resolved and always denote
/// a bug in the record declaration, never bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Generic declaration violation.
    #[error("Invalid schema {schema}: {reason}")]
    InvalidSchema {
        /// Schema name
        schema: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two fields share a name or alias.
    #[error("Invalid schema {schema}: duplicate field name '{name}'")]
    DuplicateName {
        /// Schema name
        schema: String,
        /// The repeated name
        name: String,
    },

    /// Two fields share an identifier.
    #[error("Invalid schema {schema}: duplicate field identifier {fid}")]
    DuplicateIdentifier {
        /// Schema name
        schema: String,
        /// The repeated identifier
        fid: i32,
    },
}

impl SchemaError {
    /// Create an invalid-schema error.
    #[must_use]
    pub fn invalid(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            schema: schema.into(),
            reason: reason.into(),
        }
    }

    /// Schema errors are always bugs in a declaration.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Declaration
    }
}

/// Failures while reading, writing or encoding a single record field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// A setter name is confusable with a declared field but not an exact match.
    #[error("Ambiguous attribute '{requested}' on {schema}: did you mean '{declared}'?")]
    AmbiguousAttribute {
        /// Schema name
        schema: String,
        /// Name passed by the caller
        requested: String,
        /// Declared field name it collides with
        declared: String,
    },

    /// No field with that name or identifier exists.
    #[error("{schema} has no field '{name}'")]
    UnknownField {
        /// Schema name
        schema: String,
        /// Requested name or identifier
        name: String,
    },

    /// The value kind does not match the field kind.
    #[error("Field '{field}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Expected value kind
        expected: &'static str,
        /// Provided value kind
        actual: &'static str,
    },

    /// A field validator rejected the value.
    #[error("Field '{field}' rejected value: {reason}")]
    CheckFailed {
        /// Field name
        field: String,
        /// Validator message
        reason: String,
    },

    /// A required field has neither a value nor a default.
    #[error("Field '{field}' of {schema} is unset and has no default")]
    MissingValue {
        /// Schema name
        schema: String,
        /// Field name
        field: String,
    },

    /// The codec failed while processing a field.
    #[error("Field '{field}': {source}")]
    Codec {
        /// Field name
        field: String,
        /// Underlying codec failure
        #[source]
        source: CodecError,
    },
}

impl FieldError {
    /// Create an unknown-field error.
    #[must_use]
    pub fn unknown(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownField {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Create a check-failed error.
    #[must_use]
    pub fn check_failed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CheckFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attach a field name to a codec failure.
    #[must_use]
    pub fn codec(field: impl Into<String>, source: CodecError) -> Self {
        Self::Codec {
            field: field.into(),
            source,
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FieldError::AmbiguousAttribute { .. }
            | FieldError::UnknownField { .. }
            | FieldError::TypeMismatch { .. }
            | FieldError::CheckFailed { .. }
            | FieldError::MissingValue { .. } => ErrorSeverity::Misuse,
            FieldError::Codec { source, .. } => source.severity(),
        }
    }
}

/// Failures while parsing a heterogeneous list of records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// None of the registered candidate schemas accepted the next element.
    #[error("No parser in {list} accepts data at byte offset {offset}")]
    NoMatchingParser {
        /// List declaration name
        list: String,
        /// Byte offset of the unparsed element
        offset: usize,
    },

    /// A candidate accepted but consumed no bytes, which would loop forever.
    #[error("Parser {schema} in {list} consumed no data at byte offset {offset}")]
    NoProgress {
        /// List declaration name
        list: String,
        /// Accepting schema
        schema: String,
        /// Byte offset of the element
        offset: usize,
    },
}

impl ListError {
    /// List elements come off the wire, so a failure is the device's.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::DeviceFault
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_attribute_mentions_both_names() {
        let err = FieldError::AmbiguousAttribute {
            schema: "GetFeatureResponseV0".to_string(),
            requested: "FeatureIndex".to_string(),
            declared: "feature_index".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("FeatureIndex"));
        assert!(msg.contains("feature_index"));
    }

    #[test]
    fn test_codec_severity_is_forwarded() {
        let err = FieldError::codec("padding", CodecError::WidthTooLarge { bits: 96 });
        assert_eq!(err.severity(), ErrorSeverity::Declaration);
    }

    #[test]
    fn test_schema_error_is_a_declaration_bug() {
        let err = SchemaError::invalid("Broken", "tagged field with negative identifier");
        assert_eq!(err.severity(), ErrorSeverity::Declaration);
        assert!(err.to_string().contains("Broken"));
    }
}

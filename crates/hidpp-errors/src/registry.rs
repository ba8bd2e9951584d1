//! Feature registry errors.

use crate::common::ErrorSeverity;

/// Failures raised while resolving a classification key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// More than one record type matches a key. This is a bug in the
    /// registry data and must be caught by tests.
    #[error(
        "Ambiguous mapping for feature {feature_id:#06x} v{version} function {function}: {candidates:?}"
    )]
    AmbiguousRegistryMapping {
        /// Feature identifier
        feature_id: u16,
        /// Feature version
        version: u8,
        /// Function (or event) index
        function: u8,
        /// Names of all matching record types
        candidates: Vec<String>,
    },

    /// The feature index has not been announced by the device yet.
    #[error("Unknown feature index {0:#04x}")]
    UnknownFeatureIndex(u8),

    /// An exact key was registered twice.
    #[error("Duplicate registry entry for feature {feature_id:#06x} v{version} function {function}")]
    DuplicateEntry {
        /// Feature identifier
        feature_id: u16,
        /// Feature version
        version: u8,
        /// Function (or event) index
        function: u8,
    },
}

impl RegistryError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RegistryError::AmbiguousRegistryMapping { .. } => ErrorSeverity::Declaration,
            RegistryError::UnknownFeatureIndex(_) => ErrorSeverity::Expected,
            RegistryError::DuplicateEntry { .. } => ErrorSeverity::Declaration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_index_is_informational() {
        let err = RegistryError::UnknownFeatureIndex(0x05);
        assert_eq!(err.to_string(), "Unknown feature index 0x05");
        assert_eq!(err.severity(), ErrorSeverity::Expected);
    }

    #[test]
    fn test_ambiguous_mapping_lists_candidates() {
        let err = RegistryError::AmbiguousRegistryMapping {
            feature_id: 0x8100,
            version: 1,
            function: 0,
            candidates: vec!["A".to_string(), "B".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("0x8100"));
        assert!(msg.contains("\"A\""));
        assert_eq!(err.severity(), ErrorSeverity::Declaration);
    }
}

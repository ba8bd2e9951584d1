//! The umbrella error type and its classification.
//!
//! Component errors convert into [`HidppError`] with `?`. Errors raised while
//! handling one report can be wrapped with the report bytes through
//! [`ResultExt::in_frame`]; the wrapper keeps the category and severity of
//! the underlying failure.

use core::fmt;

use crate::{CodecError, FieldError, ListError, QueueError, RegistryError, SchemaError};

/// Top-level error type that can wrap every component error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HidppError {
    /// Bit stream codec errors
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    /// Record declaration errors
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),

    /// Record field access and encoding errors
    #[error("field: {0}")]
    Field(#[from] FieldError),

    /// Record list parsing errors
    #[error("list: {0}")]
    List(#[from] ListError),

    /// Feature registry errors
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    /// Queue outcomes
    #[error("queue: {0}")]
    Queue(#[from] QueueError),

    /// A failure tied to one report on the wire.
    #[error("{context}: {source}")]
    Frame {
        /// What was being done, and to which bytes.
        context: FrameContext,
        /// The underlying failure.
        #[source]
        source: Box<HidppError>,
    },

    /// Invalid dispatcher or interface configuration
    #[error("configuration: {0}")]
    Config(String),

    /// Failures from ancillary decoders
    #[error("{0}")]
    Other(String),
}

impl HidppError {
    /// The innermost error, with every [`HidppError::Frame`] wrapper removed.
    pub fn root(&self) -> &HidppError {
        let mut error = self;
        while let HidppError::Frame { source, .. } = error {
            error = &**source;
        }
        error
    }

    /// Category of the innermost error.
    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            HidppError::Codec(_) => ErrorCategory::Codec,
            HidppError::Schema(_) => ErrorCategory::Schema,
            HidppError::Field(_) | HidppError::List(_) => ErrorCategory::Field,
            HidppError::Registry(_) => ErrorCategory::Registry,
            HidppError::Queue(_) => ErrorCategory::Queue,
            HidppError::Config(_) => ErrorCategory::Config,
            HidppError::Other(_) | HidppError::Frame { .. } => ErrorCategory::Other,
        }
    }

    /// Severity of the innermost error.
    pub fn severity(&self) -> ErrorSeverity {
        match self.root() {
            HidppError::Codec(e) => e.severity(),
            HidppError::Schema(e) => e.severity(),
            HidppError::Field(e) => e.severity(),
            HidppError::List(e) => e.severity(),
            HidppError::Registry(e) => e.severity(),
            HidppError::Queue(e) => e.severity(),
            HidppError::Config(_) => ErrorSeverity::Misuse,
            HidppError::Other(_) | HidppError::Frame { .. } => ErrorSeverity::DeviceFault,
        }
    }

    /// Broken declarations or registry tables.
    pub fn is_programmer_error(&self) -> bool {
        self.severity() == ErrorSeverity::Declaration
    }

    /// Outcomes a polling harness absorbs, such as an empty queue.
    pub fn is_expected(&self) -> bool {
        self.severity() == ErrorSeverity::Expected
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        HidppError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        HidppError::Other(msg.into())
    }
}

/// Component an error comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bit stream reads and writes
    Codec,
    /// Record declarations
    Schema,
    /// Field access and record lists
    Field,
    /// Feature index and record tables
    Registry,
    /// Message queues
    Queue,
    /// Configuration
    Config,
    /// Anything else
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCategory::Codec => "codec",
            ErrorCategory::Schema => "schema",
            ErrorCategory::Field => "field",
            ErrorCategory::Registry => "registry",
            ErrorCategory::Queue => "queue",
            ErrorCategory::Config => "config",
            ErrorCategory::Other => "other",
        })
    }
}

/// Who has to act on an error, from least to most serious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// A normal outcome: an empty queue, a feature index not yet announced.
    Expected,
    /// The device sent something malformed.
    DeviceFault,
    /// The caller passed a bad name, value or configuration.
    Misuse,
    /// A schema or registry table is wrong.
    Declaration,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorSeverity::Expected => "expected",
            ErrorSeverity::DeviceFault => "device fault",
            ErrorSeverity::Misuse => "misuse",
            ErrorSeverity::Declaration => "declaration",
        })
    }
}

/// The report an error was raised for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameContext {
    /// Operation applied to the report, e.g. `"classify"`.
    pub operation: &'static str,
    /// Raw report bytes, report id first.
    pub report: Vec<u8>,
}

impl FrameContext {
    /// Context for `operation` applied to `report`.
    pub fn new(operation: &'static str, report: &[u8]) -> Self {
        Self {
            operation,
            report: report.to_vec(),
        }
    }
}

impl fmt::Display for FrameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.operation)?;
        for (index, byte) in self.report.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        f.write_str("]")
    }
}

/// Attach report context to component errors.
pub trait ResultExt<T> {
    /// Wrap the error in [`HidppError::Frame`] for `operation` on `report`.
    ///
    /// # Errors
    ///
    /// The original error, wrapped.
    fn in_frame(self, operation: &'static str, report: &[u8]) -> Result<T, HidppError>;
}

impl<T, E: Into<HidppError>> ResultExt<T> for std::result::Result<T, E> {
    fn in_frame(self, operation: &'static str, report: &[u8]) -> Result<T, HidppError> {
        self.map_err(|e| HidppError::Frame {
            context: FrameContext::new(operation, report),
            source: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Expected < ErrorSeverity::DeviceFault);
        assert!(ErrorSeverity::Misuse < ErrorSeverity::Declaration);
        assert_eq!(ErrorSeverity::DeviceFault.to_string(), "device fault");
    }

    #[test]
    fn test_hidpp_error_category() {
        let err: HidppError = CodecError::out_of_bounds(0, 8, 0).into();
        assert_eq!(err.category(), ErrorCategory::Codec);
        assert_eq!(err.severity(), ErrorSeverity::DeviceFault);

        let err: HidppError = RegistryError::UnknownFeatureIndex(3).into();
        assert_eq!(err.category(), ErrorCategory::Registry);
        assert!(err.is_expected());
        assert!(!err.is_programmer_error());

        let err: HidppError = SchemaError::invalid("X", "bad").into();
        assert!(err.is_programmer_error());
    }

    #[test]
    fn test_frame_context_keeps_classification() {
        let report = [0x13, 0x01];
        let result: std::result::Result<(), CodecError> = Err(CodecError::out_of_bounds(16, 8, 16));
        let Err(err) = result.in_frame("classify", &report) else {
            panic!("context must keep the error");
        };
        assert_eq!(err.category(), ErrorCategory::Codec);
        assert_eq!(err.severity(), ErrorSeverity::DeviceFault);
        assert!(matches!(err.root(), HidppError::Codec(CodecError::OutOfBounds { .. })));
        assert_eq!(
            err.to_string(),
            "classify [13 01]: codec: read of 8 bits at bit offset 16 exceeds buffer of 16 bits"
        );
    }

    #[test]
    fn test_nested_frames_unwrap_to_root() {
        let inner: std::result::Result<(), QueueError> = Err(QueueError::UnknownQueue("Mouse".to_string()));
        let outer = inner.in_frame("deliver", &[0x11]).in_frame("process_interrupt", &[0x11]);
        let Err(err) = outer else {
            panic!("context must keep the error");
        };
        assert!(matches!(err.root(), HidppError::Queue(QueueError::UnknownQueue(_))));
        assert_eq!(err.category(), ErrorCategory::Queue);
    }
}

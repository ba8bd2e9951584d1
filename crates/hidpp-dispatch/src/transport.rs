//! Raw interrupt data handed over by the transport layer.

use std::sync::OnceLock;
use std::time::Instant;

use hidpp_bitstream::HexList;

fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Nanoseconds on a process-wide monotonic clock.
pub fn monotonic_ns() -> u64 {
    u64::try_from(epoch().elapsed().as_nanos()).unwrap_or(u64::MAX)
}

/// One interrupt report as received from a device interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    pub data: Vec<u8>,
    /// Monotonic receive time in nanoseconds.
    pub timestamp: u64,
    /// Name of the record the dispatcher classified this message as.
    pub record_name: Option<String>,
}

impl TransportMessage {
    pub fn new(data: impl Into<Vec<u8>>, timestamp: u64) -> Self {
        Self {
            data: data.into(),
            timestamp,
            record_name: None,
        }
    }

    /// Stamp `data` with the current monotonic time.
    pub fn now(data: impl Into<Vec<u8>>) -> Self {
        Self::new(data, monotonic_ns())
    }

    pub fn report_id(&self) -> Option<u8> {
        self.data.first().copied()
    }

    pub fn hex(&self) -> HexList {
        HexList::new(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let first = TransportMessage::now([0x10]);
        let second = TransportMessage::now([0x10]);
        assert!(second.timestamp >= first.timestamp);
        assert_eq!(first.report_id(), Some(0x10));
        assert!(TransportMessage::new(Vec::new(), 0).report_id().is_none());
    }
}

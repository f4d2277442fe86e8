use thiserror::Error;

use crate::record::MessageKind;

/// Errors returned by packet dispatch and the per-kind decoders.
///
/// # Examples
/// ```
/// use trackdecode_core::PacketError;
///
/// let err = PacketError::Truncated { needed: 20, actual: 12 };
/// assert!(err.to_string().contains("truncated packet"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("truncated packet: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("{kind} sample count {count} out of range 1..={max}")]
    SampleCountOutOfRange {
        kind: MessageKind,
        count: u8,
        max: u8,
    },
    /// Returned by the epoch conversion helpers for values `time` cannot
    /// represent. No packet layout reaches it: an `i32` epoch plus an `i16`
    /// delta or at most 3 × 65535 s of sensor offsets always stays in range.
    #[error("timestamp out of range: {millis} ms since epoch")]
    TimestampOutOfRange { millis: i64 },
}

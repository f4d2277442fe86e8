//! Decoder core for battery-powered tracker telemetry packets.
//!
//! Trackers emit fixed-width binary packets (GPS fixes, current-sensor
//! samples, or management status) that reach us hex-encoded inside webhook
//! payloads. This crate turns those bytes into typed records with a stable,
//! labelled serialization. Parsing is byte-oriented and side-effect free;
//! transport, secrets and forwarding stay with the caller.
//!
//! Invariants:
//! - Every field is read from a fixed offset; the layout length is checked
//!   before any read.
//! - One packet decodes into exactly one record; nothing is cached.
//! - Serialized labels follow schema [`SCHEMA_VERSION`].
//!
//! Version française (résumé):
//! Cette crate décode les paquets binaires des balises (GPS, capteur de
//! courant, gestion) en enregistrements typés. Le décodage est pur, sans E/S ;
//! la longueur du paquet est vérifiée avant toute lecture.
//!
//! # Examples
//! ```
//! use trackdecode_core::{DecodePolicy, DecodedRecord, decode_hex_packet};
//!
//! let record = decode_hex_packet(
//!     "0100105e5f128000008000003c00ffffff000000",
//!     DecodePolicy::Lenient,
//! )?;
//! match record {
//!     DecodedRecord::Gps(gps) => assert_eq!(gps.fixes.len(), 2),
//!     other => panic!("unexpected record: {other:?}"),
//! }
//! # Ok::<(), trackdecode_core::DecodeError>(())
//! ```

use thiserror::Error;

mod encoding;
mod packet;
mod record;
mod webhook;

pub use encoding::{HexError, decode_hex};
pub use packet::error::PacketError;
pub use packet::{DecodePolicy, parse_packet};
pub use record::{
    DecodedRecord, GeoCoordinate, GpsFix, GpsRecord, ManagementRecord, MessageKind, SensorRecord,
    SensorSample, format_timestamp,
};
pub use webhook::{Measurement, WebhookError, WebhookTimestamp, decode_webhook};

/// Current label schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors returned when decoding a hex-encoded packet.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error(transparent)]
    Hex(#[from] HexError),
    #[error(transparent)]
    Packet(#[from] PacketError),
}

/// Decode raw packet bytes with the default (lenient) policy.
///
/// # Examples
/// ```
/// use trackdecode_core::{MessageKind, PacketError, decode_packet};
///
/// let mut packet = [0u8; 20];
/// packet[0] = 0x02;
/// assert_eq!(decode_packet(&packet)?.kind(), MessageKind::Management);
///
/// let err = decode_packet(&packet[..8]).unwrap_err();
/// assert_eq!(err, PacketError::Truncated { needed: 20, actual: 8 });
/// # Ok::<(), PacketError>(())
/// ```
pub fn decode_packet(packet: &[u8]) -> Result<DecodedRecord, PacketError> {
    parse_packet(packet, DecodePolicy::default())
}

/// Decode a hex-encoded packet.
pub fn decode_hex_packet(input: &str, policy: DecodePolicy) -> Result<DecodedRecord, DecodeError> {
    let packet = decode_hex(input)?;
    Ok(parse_packet(&packet, policy)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_hex_is_reported_before_dispatch() {
        let err = decode_hex_packet("02zz", DecodePolicy::Lenient).unwrap_err();
        assert!(matches!(err, DecodeError::Hex(_)));
        assert!(err.to_string().contains("malformed hex packet"));
    }

    #[test]
    fn truncated_hex_packet_is_packet_error() {
        let err = decode_hex_packet("0200", DecodePolicy::Lenient).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Packet(PacketError::Truncated {
                needed: 20,
                actual: 2
            })
        );
    }

    #[test]
    fn grouped_hex_decodes_like_compact_hex() {
        let grouped = "02 00105e5f 2a00 ffff ffffff 000000 0700 54 fbff";
        let compact = "0200105e5f2a00ffffffffff000000070054fbff";
        assert_eq!(
            decode_hex_packet(grouped, DecodePolicy::Lenient).unwrap(),
            decode_hex_packet(compact, DecodePolicy::Lenient).unwrap()
        );
    }
}

use tracing::{debug, warn};

use super::error::PacketError;
use super::gps::decode_gps;
use super::layout;
use super::management::decode_management;
use super::reader::PacketReader;
use super::sensor::decode_sensor;
use crate::record::{DecodedRecord, MessageKind};

/// How the dispatcher treats sample counts outside the modelled range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Pass the declared count through and emit whatever samples match.
    #[default]
    Lenient,
    /// Reject counts of 0 or above the per-kind maximum.
    Strict,
}

/// Dispatch a raw packet to the GPS, sensor or management decoder.
///
/// Byte 0 selects management; otherwise the high nibble of byte 5 selects
/// GPS (`1`) or sensor (anything else) and the low nibble is the sample
/// count.
pub fn parse_packet(packet: &[u8], policy: DecodePolicy) -> Result<DecodedRecord, PacketError> {
    let reader = PacketReader::new(packet);
    let discriminant = reader.read_u8(layout::DISCRIMINANT_OFFSET)?;
    if discriminant == layout::MANAGEMENT_DISCRIMINANT {
        debug!(len = packet.len(), "decoding management packet");
        return decode_management(&reader).map(DecodedRecord::Management);
    }

    // GPS and sensor share the same length, so the selected layout is known
    // before the header byte is read.
    reader.require_len(layout::GPS_LEN.max(layout::SENSOR_LEN))?;
    let header = reader.read_data_header()?;
    let (kind, max) = if header.subtype == layout::SUBTYPE_GPS {
        (MessageKind::Gps, layout::GPS_MAX_SAMPLES)
    } else {
        (MessageKind::Sensor, layout::SENSOR_MAX_SAMPLES)
    };
    debug!(
        %kind,
        discriminant,
        subtype = header.subtype,
        sample_count = header.sample_count,
        "decoding data packet"
    );
    check_sample_count(kind, header.sample_count, max, policy)?;

    match kind {
        MessageKind::Gps => decode_gps(&reader, header.sample_count).map(DecodedRecord::Gps),
        _ => decode_sensor(&reader, header.sample_count).map(DecodedRecord::Sensor),
    }
}

fn check_sample_count(
    kind: MessageKind,
    count: u8,
    max: u8,
    policy: DecodePolicy,
) -> Result<(), PacketError> {
    if (1..=max).contains(&count) {
        return Ok(());
    }
    match policy {
        DecodePolicy::Strict => Err(PacketError::SampleCountOutOfRange { kind, count, max }),
        DecodePolicy::Lenient => {
            warn!(%kind, count, max, "sample count out of range, decoding best effort");
            Ok(())
        }
    }
}

use super::error::PacketError;
use super::layout;
use super::reader::{PacketReader, timestamp_from_seconds};
use crate::record::{GpsFix, GpsRecord};

/// Decodes a GPS packet carrying up to two fixes.
///
/// Fix 2 stores a signed seconds delta relative to fix 1 rather than an
/// absolute epoch. A sample count of 0 yields a record without fixes; it
/// still serializes its `MessageType` and `DataCount` header keys.
pub fn decode_gps(reader: &PacketReader<'_>, sample_count: u8) -> Result<GpsRecord, PacketError> {
    reader.require_len(layout::GPS_LEN)?;

    let epoch = reader.read_epoch_seconds()?;
    let diagnostics = reader.read_u8(layout::DATA_HEADER_OFFSET)?;
    let first = GpsFix {
        location: reader.read_coordinate(
            layout::GPS_FIRST_LAT_RANGE,
            layout::GPS_FIRST_LON_RANGE,
        )?,
        time: timestamp_from_seconds(epoch)?,
    };

    let fixes = match sample_count {
        0 => Vec::new(),
        1 => vec![first],
        _ => {
            let delta = reader.read_i16_le(layout::GPS_SECOND_DELTA_RANGE)?;
            let second = GpsFix {
                location: reader.read_coordinate(
                    layout::GPS_SECOND_LAT_RANGE,
                    layout::GPS_SECOND_LON_RANGE,
                )?,
                time: timestamp_from_seconds(epoch + i64::from(delta))?,
            };
            vec![first, second]
        }
    };

    Ok(GpsRecord {
        sample_count,
        diagnostics,
        fixes,
    })
}

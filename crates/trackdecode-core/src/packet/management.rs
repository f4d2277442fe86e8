use super::error::PacketError;
use super::layout;
use super::reader::{PacketReader, battery_volts, timestamp_from_seconds};
use crate::record::ManagementRecord;

pub fn decode_management(reader: &PacketReader<'_>) -> Result<ManagementRecord, PacketError> {
    reader.require_len(layout::MANAGEMENT_LEN)?;

    Ok(ManagementRecord {
        message_time: timestamp_from_seconds(reader.read_epoch_seconds()?)?,
        readings: reader.read_i16_le(layout::MANAGEMENT_READINGS_RANGE)?,
        errors: reader.read_i16_le(layout::MANAGEMENT_ERRORS_RANGE)?,
        location: reader
            .read_coordinate(layout::MANAGEMENT_LAT_RANGE, layout::MANAGEMENT_LON_RANGE)?,
        user_messages: reader.read_i16_le(layout::MANAGEMENT_USER_MESSAGES_RANGE)?,
        battery_volts: battery_volts(reader.read_u8(layout::MANAGEMENT_BATTERY_OFFSET)?),
        temperature_c: reader.read_i16_le(layout::MANAGEMENT_TEMPERATURE_RANGE)?,
    })
}

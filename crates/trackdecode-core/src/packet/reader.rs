use std::ops::Range;

use time::OffsetDateTime;

use super::error::PacketError;
use super::layout;
use crate::record::GeoCoordinate;

/// Sub-type and sample count packed into byte 5 of GPS/sensor packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    pub subtype: u8,
    pub sample_count: u8,
}

pub struct PacketReader<'a> {
    packet: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(packet: &'a [u8]) -> Self {
        Self { packet }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), PacketError> {
        if self.packet.len() < needed {
            return Err(PacketError::Truncated {
                needed,
                actual: self.packet.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, PacketError> {
        self.packet
            .get(offset)
            .copied()
            .ok_or(PacketError::Truncated {
                needed: offset + 1,
                actual: self.packet.len(),
            })
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], PacketError> {
        self.packet
            .get(range.clone())
            .ok_or(PacketError::Truncated {
                needed: range.end,
                actual: self.packet.len(),
            })
    }

    pub fn read_u16_le(&self, range: Range<usize>) -> Result<u16, PacketError> {
        let bytes = self.read_array::<2>(range)?;
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn read_i16_le(&self, range: Range<usize>) -> Result<i16, PacketError> {
        let bytes = self.read_array::<2>(range)?;
        Ok(i16::from_le_bytes(bytes))
    }

    pub fn read_i32_le(&self, range: Range<usize>) -> Result<i32, PacketError> {
        let bytes = self.read_array::<4>(range)?;
        Ok(i32::from_le_bytes(bytes))
    }

    pub fn read_u24_be(&self, range: Range<usize>) -> Result<u32, PacketError> {
        let [b0, b1, b2] = self.read_array::<3>(range)?;
        Ok(u32::from_be_bytes([0, b0, b1, b2]))
    }

    pub fn read_data_header(&self) -> Result<DataHeader, PacketError> {
        let byte = self.read_u8(layout::DATA_HEADER_OFFSET)?;
        Ok(DataHeader {
            subtype: byte >> 4,
            sample_count: byte & 0x0F,
        })
    }

    pub fn read_epoch_seconds(&self) -> Result<i64, PacketError> {
        self.read_i32_le(layout::EPOCH_RANGE).map(i64::from)
    }

    pub fn read_coordinate(
        &self,
        lat: Range<usize>,
        lon: Range<usize>,
    ) -> Result<GeoCoordinate, PacketError> {
        let lat = self.read_u24_be(lat)?;
        let lon = self.read_u24_be(lon)?;
        Ok(GeoCoordinate {
            lat: fraction_to_degrees(lat, layout::LATITUDE_SPAN, layout::LATITUDE_MIN),
            lon: fraction_to_degrees(lon, layout::LONGITUDE_SPAN, layout::LONGITUDE_MIN),
        })
    }

    fn read_array<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], PacketError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| PacketError::Truncated {
            needed: N,
            actual: bytes.len(),
        })
    }
}

/// Maps a 24-bit fraction linearly onto `[min, min + span]`, rounded to 7
/// decimals.
pub(crate) fn fraction_to_degrees(raw: u32, span: f64, min: f64) -> f64 {
    let degrees = f64::from(raw) / f64::from(layout::FRACTION_MAX) * span + min;
    round_half_up(degrees, layout::COORDINATE_DECIMALS)
}

/// Rounds ties toward positive infinity, so `-0.5` becomes `0`.
pub(crate) fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

pub(crate) fn battery_volts(raw: u8) -> f64 {
    round_half_up(
        f64::from(raw) * layout::BATTERY_VOLTS_PER_UNIT,
        layout::BATTERY_DECIMALS,
    )
}

pub(crate) fn timestamp_from_seconds(seconds: i64) -> Result<OffsetDateTime, PacketError> {
    timestamp_from_millis(seconds.saturating_mul(1000))
}

pub(crate) fn timestamp_from_millis(millis: i64) -> Result<OffsetDateTime, PacketError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map_err(|_| PacketError::TimestampOutOfRange { millis })
}

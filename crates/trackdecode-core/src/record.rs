//! Decoded record types and their labelled (schema v1) serialization.
//!
//! Records are plain typed structs; labels only exist at serialization time.
//! Per-sample labels are numbered from 1 (`GPSData1Time`, `SensorData3CurrentUA`)
//! and a sample that was not emitted has no key at all.

use std::fmt;

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use time::OffsetDateTime;
use time::macros::format_description;

const MESSAGE_TYPE: &str = "MessageType";
const DATA_COUNT: &str = "DataCount";

/// Message family selected by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Gps,
    Sensor,
    Management,
}

impl MessageKind {
    /// Literal type tag emitted under `MessageType`.
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::Gps => "GPS Message",
            MessageKind::Sensor => "Sensor Message",
            MessageKind::Management => "Management Message",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Gps => "GPS",
            MessageKind::Sensor => "sensor",
            MessageKind::Management => "management",
        };
        f.write_str(name)
    }
}

/// Latitude/longitude pair in decimal degrees, 7 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpsFix {
    pub location: GeoCoordinate,
    pub time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpsRecord {
    /// Sample count as declared in the packet header, unchecked.
    pub sample_count: u8,
    /// Raw byte 5; kept for diagnostics, never serialized.
    pub diagnostics: u8,
    /// Zero, one or two fixes depending on `sample_count`.
    pub fixes: Vec<GpsFix>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    pub time: OffsetDateTime,
    /// Raw current reading in microamps.
    pub current_ua: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    pub sample_count: u8,
    pub diagnostics: u8,
    /// Always at least one sample; at most four.
    pub samples: Vec<SensorSample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagementRecord {
    pub message_time: OffsetDateTime,
    pub readings: i16,
    pub errors: i16,
    pub location: GeoCoordinate,
    pub user_messages: i16,
    pub battery_volts: f64,
    pub temperature_c: i16,
}

/// One decoded packet.
///
/// # Examples
/// ```
/// use trackdecode_core::{DecodePolicy, MessageKind, decode_hex_packet};
///
/// let record = decode_hex_packet(
///     "0200105e5f2a00ffffffffff000000070054fbff",
///     DecodePolicy::Lenient,
/// )?;
/// assert_eq!(record.kind(), MessageKind::Management);
/// let value = serde_json::to_value(&record)?;
/// assert_eq!(value["BatteryVoltageV"], 8.4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedRecord {
    Gps(GpsRecord),
    Sensor(SensorRecord),
    Management(ManagementRecord),
}

impl DecodedRecord {
    pub fn kind(&self) -> MessageKind {
        match self {
            DecodedRecord::Gps(_) => MessageKind::Gps,
            DecodedRecord::Sensor(_) => MessageKind::Sensor,
            DecodedRecord::Management(_) => MessageKind::Management,
        }
    }
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(ts: &OffsetDateTime) -> Result<String, time::error::Format> {
    ts.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))
}

struct Iso8601<'a>(&'a OffsetDateTime);

impl Serialize for Iso8601<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = format_timestamp(self.0).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl Serialize for GpsRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.fixes.len() * 2))?;
        map.serialize_entry(MESSAGE_TYPE, MessageKind::Gps.label())?;
        map.serialize_entry(DATA_COUNT, &self.sample_count)?;
        for (index, fix) in self.fixes.iter().enumerate() {
            let n = index + 1;
            map.serialize_entry(&format!("GPSData{n}Location"), &fix.location)?;
            map.serialize_entry(&format!("GPSData{n}Time"), &Iso8601(&fix.time))?;
        }
        map.end()
    }
}

impl Serialize for SensorRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.samples.len() * 2))?;
        map.serialize_entry(MESSAGE_TYPE, MessageKind::Sensor.label())?;
        map.serialize_entry(DATA_COUNT, &self.sample_count)?;
        for (index, sample) in self.samples.iter().enumerate() {
            let n = index + 1;
            map.serialize_entry(&format!("SensorData{n}Time"), &Iso8601(&sample.time))?;
            map.serialize_entry(&format!("SensorData{n}CurrentUA"), &sample.current_ua)?;
        }
        map.end()
    }
}

impl Serialize for ManagementRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(8))?;
        map.serialize_entry(MESSAGE_TYPE, MessageKind::Management.label())?;
        map.serialize_entry("MessageTime", &Iso8601(&self.message_time))?;
        map.serialize_entry("NumberOfReadings", &self.readings)?;
        map.serialize_entry("NumberOfErrors", &self.errors)?;
        map.serialize_entry("Location", &self.location)?;
        map.serialize_entry("UserMessageCount", &self.user_messages)?;
        map.serialize_entry("BatteryVoltageV", &self.battery_volts)?;
        map.serialize_entry("TemperatureDegC", &self.temperature_c)?;
        map.end()
    }
}

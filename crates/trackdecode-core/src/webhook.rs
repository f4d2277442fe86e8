//! Offline decoding of captured webhook bodies.
//!
//! The integration posts `{"Data": "<json>", "timestamp": ...}` where the
//! `Data` string holds `{"Packets": [{"TerminalId", "Value", "Timestamp"}]}`.
//! Every packet is decoded in order; the first failure aborts the batch.
//! The body `timestamp` is stamped on every measurement, and a packet's own
//! `Timestamp` is only used when the body has none.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::record::DecodedRecord;
use crate::{DecodeError, DecodePolicy, SCHEMA_VERSION, decode_hex_packet};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook body: {0}")]
    Body(#[source] serde_json::Error),
    #[error("invalid packet batch in Data field: {0}")]
    Batch(#[source] serde_json::Error),
    #[error("webhook carries no packets")]
    NoPackets,
    #[error("packet {index} from device {device_id}: {source}")]
    Packet {
        index: usize,
        device_id: String,
        #[source]
        source: DecodeError,
    },
}

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(rename = "Data")]
    data: String,
    #[serde(default)]
    timestamp: Option<WebhookTimestamp>,
}

#[derive(Debug, Deserialize)]
struct PacketBatch {
    #[serde(rename = "Packets")]
    packets: Vec<WebhookPacket>,
}

#[derive(Debug, Deserialize)]
struct WebhookPacket {
    #[serde(rename = "TerminalId", deserialize_with = "terminal_id")]
    terminal_id: String,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "Timestamp", default)]
    timestamp: Option<WebhookTimestamp>,
}

/// Timestamp as the network sent it: text or a numeric epoch.
///
/// It is forwarded unchanged, so a number stays a number in the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebhookTimestamp {
    Text(String),
    Epoch(serde_json::Number),
}

/// Decoded packet ready to be forwarded for one device.
///
/// # Examples
/// ```
/// use trackdecode_core::{DecodePolicy, decode_webhook};
///
/// let body = r#"{"Data": "{\"Packets\":[{\"TerminalId\":7,\"Value\":\"0200105e5f2a00ffffffffff000000070054fbff\"}]}"}"#;
/// let measurements = decode_webhook(body, DecodePolicy::Lenient)?;
/// assert_eq!(measurements[0].device_id, "7");
/// assert!(measurements[0].timestamp.is_none());
/// # Ok::<(), trackdecode_core::WebhookError>(())
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    /// Terminal identifier reported by the network.
    pub device_id: String,
    /// Webhook `timestamp`, falling back to the packet `Timestamp` when the
    /// body has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<WebhookTimestamp>,
    /// Label schema version of `measurements`.
    pub schema_version: u32,
    pub measurements: DecodedRecord,
}

pub fn decode_webhook(body: &str, policy: DecodePolicy) -> Result<Vec<Measurement>, WebhookError> {
    let body: WebhookBody = serde_json::from_str(body).map_err(WebhookError::Body)?;
    let batch: PacketBatch = serde_json::from_str(&body.data).map_err(WebhookError::Batch)?;
    if batch.packets.is_empty() {
        return Err(WebhookError::NoPackets);
    }

    batch
        .packets
        .into_iter()
        .enumerate()
        .map(|(index, packet)| {
            debug!(index, device_id = %packet.terminal_id, "decoding webhook packet");
            let measurements = match decode_hex_packet(&packet.value, policy) {
                Ok(record) => record,
                Err(source) => {
                    return Err(WebhookError::Packet {
                        index,
                        device_id: packet.terminal_id,
                        source,
                    });
                }
            };
            Ok(Measurement {
                device_id: packet.terminal_id,
                timestamp: body.timestamp.clone().or(packet.timestamp),
                schema_version: SCHEMA_VERSION,
                measurements,
            })
        })
        .collect()
}

fn terminal_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(de::Error::custom(format!(
            "TerminalId must be a string or number, got {other}"
        ))),
    }
}

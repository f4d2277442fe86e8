use super::error::PacketError;
use super::layout;
use super::reader::{PacketReader, timestamp_from_millis};
use crate::record::{SensorRecord, SensorSample};

/// Decodes a current-sensor packet carrying up to four samples.
///
/// Sample 1 is always present. Each following sample stores an unsigned
/// seconds delta relative to the previous one; sample `k` is emitted only
/// when the declared count is strictly greater than `k - 1`.
pub fn decode_sensor(
    reader: &PacketReader<'_>,
    sample_count: u8,
) -> Result<SensorRecord, PacketError> {
    reader.require_len(layout::SENSOR_LEN)?;

    let mut elapsed_ms = reader.read_epoch_seconds()? * 1000;
    let diagnostics = reader.read_u8(layout::DATA_HEADER_OFFSET)?;

    let mut samples = Vec::with_capacity(usize::from(layout::SENSOR_MAX_SAMPLES));
    samples.push(SensorSample {
        time: timestamp_from_millis(elapsed_ms)?,
        current_ua: reader.read_u16_le(layout::SENSOR_FIRST_CURRENT_RANGE)?,
    });

    for (index, slot) in layout::SENSOR_FOLLOWING_SLOTS.iter().enumerate() {
        if usize::from(sample_count) <= index + 1 {
            break;
        }
        elapsed_ms += i64::from(reader.read_u16_le(slot.delta.clone())?) * 1000;
        samples.push(SensorSample {
            time: timestamp_from_millis(elapsed_ms)?,
            current_ua: reader.read_u16_le(slot.current.clone())?,
        });
    }

    Ok(SensorRecord {
        sample_count,
        diagnostics,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::decode_sensor;
    use crate::packet::layout;
    use crate::packet::reader::PacketReader;

    const BASE: i64 = 1_600_000_000;

    fn sensor_packet() -> Vec<u8> {
        let mut packet = vec![0u8; layout::SENSOR_LEN];
        packet[0] = 0x01;
        packet[layout::EPOCH_RANGE].copy_from_slice(&(BASE as i32).to_le_bytes());
        packet[layout::DATA_HEADER_OFFSET] = 0x04;
        packet[layout::SENSOR_FIRST_CURRENT_RANGE].copy_from_slice(&1500u16.to_le_bytes());
        let pairs = [(10u16, 1600u16), (20, 250), (30, u16::MAX)];
        for (slot, (delta, current)) in layout::SENSOR_FOLLOWING_SLOTS.iter().zip(pairs) {
            packet[slot.delta.clone()].copy_from_slice(&delta.to_le_bytes());
            packet[slot.current.clone()].copy_from_slice(&current.to_le_bytes());
        }
        packet
    }

    fn times(count: u8) -> Vec<i64> {
        let packet = sensor_packet();
        decode_sensor(&PacketReader::new(&packet), count)
            .unwrap()
            .samples
            .iter()
            .map(|sample| sample.time.unix_timestamp())
            .collect()
    }

    #[test]
    fn four_samples_accumulate_deltas() {
        assert_eq!(times(4), vec![BASE, BASE + 10, BASE + 30, BASE + 60]);
        let packet = sensor_packet();
        let record = decode_sensor(&PacketReader::new(&packet), 4).unwrap();
        let currents: Vec<u16> = record.samples.iter().map(|s| s.current_ua).collect();
        assert_eq!(currents, vec![1500, 1600, 250, u16::MAX]);
    }

    #[test]
    fn gates_are_strictly_greater_than() {
        assert_eq!(times(1).len(), 1);
        assert_eq!(times(2).len(), 2);
        assert_eq!(times(3).len(), 3);
    }

    #[test]
    fn out_of_range_counts_are_best_effort() {
        assert_eq!(times(0), vec![BASE]);
        assert_eq!(times(15).len(), 4);
    }

    #[test]
    fn short_packet_is_truncated() {
        let packet = sensor_packet();
        let err = decode_sensor(&PacketReader::new(&packet[..19]), 4).unwrap_err();
        assert!(err.to_string().contains("truncated packet"));
    }
}

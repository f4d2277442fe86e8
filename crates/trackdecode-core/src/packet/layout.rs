use std::ops::Range;

pub const DISCRIMINANT_OFFSET: usize = 0;
pub const MANAGEMENT_DISCRIMINANT: u8 = 0x02;

pub const EPOCH_RANGE: Range<usize> = 1..5;
pub const DATA_HEADER_OFFSET: usize = 5;
pub const SUBTYPE_GPS: u8 = 0x1;

pub const LATITUDE_SPAN: f64 = 180.0;
pub const LATITUDE_MIN: f64 = -90.0;
pub const LONGITUDE_SPAN: f64 = 360.0;
pub const LONGITUDE_MIN: f64 = -180.0;
pub const FRACTION_MAX: u32 = 0x00FF_FFFF;
pub const COORDINATE_DECIMALS: i32 = 7;

pub const GPS_LEN: usize = 20;
pub const GPS_MAX_SAMPLES: u8 = 2;
pub const GPS_FIRST_LAT_RANGE: Range<usize> = 6..9;
pub const GPS_FIRST_LON_RANGE: Range<usize> = 9..12;
pub const GPS_SECOND_DELTA_RANGE: Range<usize> = 12..14;
pub const GPS_SECOND_LAT_RANGE: Range<usize> = 14..17;
pub const GPS_SECOND_LON_RANGE: Range<usize> = 17..20;

pub const SENSOR_LEN: usize = 20;
pub const SENSOR_MAX_SAMPLES: u8 = 4;
pub const SENSOR_FIRST_CURRENT_RANGE: Range<usize> = 6..8;

/// Delta/current pair for samples 2..=4; the delta is relative to the
/// previous sample.
pub struct SensorSlot {
    pub delta: Range<usize>,
    pub current: Range<usize>,
}

pub const SENSOR_FOLLOWING_SLOTS: [SensorSlot; 3] = [
    SensorSlot {
        delta: 8..10,
        current: 10..12,
    },
    SensorSlot {
        delta: 12..14,
        current: 14..16,
    },
    SensorSlot {
        delta: 16..18,
        current: 18..20,
    },
];

pub const MANAGEMENT_LEN: usize = 20;
pub const MANAGEMENT_READINGS_RANGE: Range<usize> = 5..7;
pub const MANAGEMENT_ERRORS_RANGE: Range<usize> = 7..9;
pub const MANAGEMENT_LAT_RANGE: Range<usize> = 9..12;
pub const MANAGEMENT_LON_RANGE: Range<usize> = 12..15;
pub const MANAGEMENT_USER_MESSAGES_RANGE: Range<usize> = 15..17;
pub const MANAGEMENT_BATTERY_OFFSET: usize = 17;
pub const MANAGEMENT_TEMPERATURE_RANGE: Range<usize> = 18..20;

pub const BATTERY_VOLTS_PER_UNIT: f64 = 0.1;
pub const BATTERY_DECIMALS: i32 = 1;

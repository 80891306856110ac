use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::error::DecodeError;
use super::fields;
use super::layout::{self, Format};
use super::reader::RawV2Reader;
use crate::address::Address;
use crate::measurement::Measurement;

/// One decoded advertisement.
///
/// `captured_at` is supplied by the caller and never derived from the packet.
/// Acceleration is `Absent` for the cut layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Layout the payload was decoded with.
    pub format: Format,
    pub format_tag: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub captured_at: OffsetDateTime,
    /// Degrees Celsius.
    pub temperature: Measurement<f32>,
    /// Relative humidity, percent.
    pub humidity: Measurement<f32>,
    /// Pascals.
    pub pressure: Measurement<u32>,
    /// Milli-g.
    pub acceleration_x: Measurement<i16>,
    pub acceleration_y: Measurement<i16>,
    pub acceleration_z: Measurement<i16>,
    /// Volts.
    pub battery_voltage: Measurement<f32>,
    /// dBm.
    pub transmit_power: Measurement<i16>,
    pub movement_counter: Measurement<u8>,
    pub sequence_number: Measurement<u16>,
    pub address: Address,
}

/// Decode a RAWv2 (`0x05`) or cut RAWv2 (`0xC5`) advertisement.
///
/// The payload must not include the manufacturer ID; see
/// [`strip_manufacturer_id`]. Decoding is optimistic: once the layout's
/// minimum length is present every field is decoded, and sentinel values
/// surface as [`Measurement::Invalid`]. Bytes past the layout are ignored.
///
/// # Examples
/// ```
/// use rawv2_core::{Measurement, decode};
/// use time::OffsetDateTime;
///
/// let payload = [
///     0x05, 0x12, 0xfc, 0x53, 0x94, 0xc3, 0x7c, 0x00, 0x04, 0xff, 0xfc, 0x04,
///     0x0c, 0xac, 0x36, 0x42, 0x00, 0xcd, 0xcb, 0xb8, 0x33, 0x4c, 0x88, 0x4f,
/// ];
/// let reading = decode(&payload, OffsetDateTime::UNIX_EPOCH)?;
/// assert_eq!(reading.pressure, Measurement::Valid(100_044));
/// assert_eq!(reading.address.to_string(), "cb:b8:33:4c:88:4f");
/// # Ok::<(), rawv2_core::DecodeError>(())
/// ```
///
/// # Errors
/// [`DecodeError::UnsupportedFormat`] for an unknown leading tag (reported
/// before any length check), [`DecodeError::TooShort`] when the payload is
/// empty or shorter than the tag's layout.
pub fn decode(buffer: &[u8], captured_at: OffsetDateTime) -> Result<Reading, DecodeError> {
    let reader = RawV2Reader::new(buffer);
    let format_tag = reader.read_u8(layout::FORMAT_TAG_OFFSET)?;
    let format =
        Format::from_tag(format_tag).ok_or(DecodeError::UnsupportedFormat { tag: format_tag })?;
    reader.require_len(format.min_len())?;

    let temperature = fields::temperature(reader.read_u16_be(layout::TEMPERATURE_RANGE)?);
    let humidity = fields::humidity(reader.read_u16_be(layout::HUMIDITY_RANGE)?);
    let pressure = fields::pressure(reader.read_u16_be(layout::PRESSURE_RANGE)?);

    let (acceleration_x, acceleration_y, acceleration_z) = match format {
        Format::Full => (
            fields::acceleration(reader.read_u16_be(layout::ACCELERATION_X_RANGE)?),
            fields::acceleration(reader.read_u16_be(layout::ACCELERATION_Y_RANGE)?),
            fields::acceleration(reader.read_u16_be(layout::ACCELERATION_Z_RANGE)?),
        ),
        Format::Cut => (Measurement::Absent, Measurement::Absent, Measurement::Absent),
    };

    let tail = format.tail();
    let power_info = reader.read_u16_be(tail.power_info.clone())?;
    let movement_counter = fields::movement_counter(reader.read_u8(tail.movement_counter)?);
    let sequence_number =
        fields::sequence_number(reader.read_u16_be(tail.sequence_number.clone())?);
    let address = reader.read_address(tail.address.clone())?;

    Ok(Reading {
        format,
        format_tag,
        captured_at,
        temperature,
        humidity,
        pressure,
        acceleration_x,
        acceleration_y,
        acceleration_z,
        battery_voltage: fields::battery_voltage(power_info),
        transmit_power: fields::transmit_power(power_info),
        movement_counter,
        sequence_number,
        address,
    })
}

/// Same as [`decode`], stamped with the current UTC time.
pub fn decode_now(buffer: &[u8]) -> Result<Reading, DecodeError> {
    decode(buffer, OffsetDateTime::now_utc())
}

/// Drop a leading Ruuvi manufacturer ID (`99 04`) when present.
///
/// # Examples
/// ```
/// use rawv2_core::strip_manufacturer_id;
///
/// assert_eq!(strip_manufacturer_id(&[0x99, 0x04, 0x05]), &[0x05]);
/// assert_eq!(strip_manufacturer_id(&[0x05, 0x12]), &[0x05, 0x12]);
/// ```
pub fn strip_manufacturer_id(payload: &[u8]) -> &[u8] {
    payload
        .strip_prefix(&layout::MANUFACTURER_ID_PREFIX[..])
        .unwrap_or(payload)
}

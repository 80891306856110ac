//! Per-field transforms from raw wire integers to measurements.
//!
//! Every function is pure and independent: battery voltage and transmit power
//! share one raw 16-bit word but are decoded separately from it.

use crate::measurement::Measurement;

pub const TEMPERATURE_SENTINEL: u16 = 0x8000;
pub const HUMIDITY_SENTINEL: u16 = 0xFFFF;
pub const PRESSURE_SENTINEL: u16 = 0xFFFF;
pub const ACCELERATION_SENTINEL: u16 = 0x8000;
pub const BATTERY_VOLTAGE_SENTINEL: u16 = 0x07FF;
pub const TRANSMIT_POWER_SENTINEL: u16 = 0x1F;
pub const MOVEMENT_COUNTER_SENTINEL: u8 = 0xFF;
pub const SEQUENCE_NUMBER_SENTINEL: u16 = 0xFFFF;

const TEMPERATURE_STEP_C: f32 = 0.005;
const HUMIDITY_STEP_PERCENT: f32 = 0.0025;
const PRESSURE_OFFSET_PA: u32 = 50_000;
const BATTERY_VOLTAGE_SHIFT: u32 = 5;
const BATTERY_VOLTAGE_OFFSET_V: f32 = 1.6;
const TRANSMIT_POWER_MASK: u16 = 0x1F;
const TRANSMIT_POWER_OFFSET_DBM: i16 = -40;

/// Temperature in degrees Celsius.
pub fn temperature(raw: u16) -> Measurement<f32> {
    let value = f32::from(raw as i16) * TEMPERATURE_STEP_C;
    Measurement::new(value, raw != TEMPERATURE_SENTINEL)
}

/// Relative humidity in percent.
pub fn humidity(raw: u16) -> Measurement<f32> {
    let value = f32::from(raw) * HUMIDITY_STEP_PERCENT;
    Measurement::new(value, raw != HUMIDITY_SENTINEL)
}

/// Pressure in pascals; widened so the offset cannot overflow.
pub fn pressure(raw: u16) -> Measurement<u32> {
    let value = u32::from(raw) + PRESSURE_OFFSET_PA;
    Measurement::new(value, raw != PRESSURE_SENTINEL)
}

/// One acceleration axis in milli-g.
pub fn acceleration(raw: u16) -> Measurement<i16> {
    Measurement::new(raw as i16, raw != ACCELERATION_SENTINEL)
}

/// Battery voltage in volts, from the top 11 bits of the power word.
pub fn battery_voltage(power_info: u16) -> Measurement<f32> {
    let raw = power_info >> BATTERY_VOLTAGE_SHIFT;
    let value = f32::from(raw) / 1000.0 + BATTERY_VOLTAGE_OFFSET_V;
    Measurement::new(value, raw != BATTERY_VOLTAGE_SENTINEL)
}

/// Transmit power in dBm, from the bottom 5 bits of the power word.
pub fn transmit_power(power_info: u16) -> Measurement<i16> {
    let raw = power_info & TRANSMIT_POWER_MASK;
    let value = (raw as i16) * 2 + TRANSMIT_POWER_OFFSET_DBM;
    Measurement::new(value, raw != TRANSMIT_POWER_SENTINEL)
}

pub fn movement_counter(raw: u8) -> Measurement<u8> {
    Measurement::new(raw, raw != MOVEMENT_COUNTER_SENTINEL)
}

pub fn sequence_number(raw: u16) -> Measurement<u16> {
    Measurement::new(raw, raw != SEQUENCE_NUMBER_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: Option<f32>, expected: f32) -> bool {
        actual.is_some_and(|value| (value - expected).abs() < 1e-4)
    }

    #[test]
    fn temperature_transform_and_sentinel() {
        assert!(approx(temperature(0x12FC).value(), 24.3));
        assert!(approx(temperature(0x7FFF).value(), 163.835));
        assert!(approx(temperature(0x8001).value(), -163.835));
        assert!(!temperature(TEMPERATURE_SENTINEL).is_valid());
    }

    #[test]
    fn humidity_transform_and_sentinel() {
        assert!(approx(humidity(0x5394).value(), 53.49));
        assert!(approx(humidity(0xFFFE).value(), 163.835));
        assert!(approx(humidity(0).value(), 0.0));
        assert!(!humidity(HUMIDITY_SENTINEL).is_valid());
    }

    #[test]
    fn pressure_transform_and_sentinel() {
        assert_eq!(pressure(0xC37C).value(), Some(100_044));
        assert_eq!(pressure(0).value(), Some(50_000));
        assert_eq!(pressure(0xFFFE).value(), Some(115_534));
        let sentinel = pressure(PRESSURE_SENTINEL);
        assert!(!sentinel.is_valid());
        assert_eq!(sentinel.raw_value(), Some(115_535));
    }

    #[test]
    fn acceleration_is_unscaled() {
        assert_eq!(acceleration(0x0004).value(), Some(4));
        assert_eq!(acceleration(0xFFFC).value(), Some(-4));
        assert_eq!(acceleration(0x8001).value(), Some(-32767));
        assert!(!acceleration(ACCELERATION_SENTINEL).is_valid());
    }

    #[test]
    fn power_word_decodes_both_halves() {
        assert!(approx(battery_voltage(0xAC36).value(), 2.977));
        assert_eq!(transmit_power(0xAC36).value(), Some(4));

        assert!(approx(battery_voltage(0xFFDE).value(), 3.646));
        assert_eq!(transmit_power(0xFFDE).value(), Some(20));

        assert!(approx(battery_voltage(0).value(), 1.6));
        assert_eq!(transmit_power(0).value(), Some(-40));
    }

    #[test]
    fn power_word_halves_are_independent() {
        // Battery at sentinel, power valid.
        let word = (BATTERY_VOLTAGE_SENTINEL << 5) | 0x16;
        assert!(!battery_voltage(word).is_valid());
        assert_eq!(transmit_power(word).value(), Some(4));

        // Power at sentinel, battery valid.
        let word = (0x561 << 5) | TRANSMIT_POWER_SENTINEL;
        assert!(approx(battery_voltage(word).value(), 2.977));
        assert!(!transmit_power(word).is_valid());

        assert!(!battery_voltage(0xFFFF).is_valid());
        assert!(!transmit_power(0xFFFF).is_valid());
    }

    #[test]
    fn counters_pass_through() {
        assert_eq!(movement_counter(0x42).value(), Some(0x42));
        assert!(!movement_counter(MOVEMENT_COUNTER_SENTINEL).is_valid());
        assert_eq!(sequence_number(0x00CD).value(), Some(205));
        assert_eq!(sequence_number(0xFFFE).value(), Some(0xFFFE));
        assert!(!sequence_number(SEQUENCE_NUMBER_SENTINEL).is_valid());
    }
}

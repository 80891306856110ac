use std::ops::Range;

use serde::{Deserialize, Serialize};

pub const FORMAT_TAG_OFFSET: usize = 0;

pub const FORMAT_FULL: u8 = 0x05;
pub const FORMAT_CUT: u8 = 0xC5;

pub const FULL_MIN_LEN: usize = 24;
pub const CUT_MIN_LEN: usize = 18;

/// Ruuvi Innovations company identifier.
pub const RUUVI_MANUFACTURER_ID: u16 = 0x0499;
/// Company identifier as it precedes manufacturer data on the air (little-endian).
pub const MANUFACTURER_ID_PREFIX: [u8; 2] = RUUVI_MANUFACTURER_ID.to_le_bytes();

pub const TEMPERATURE_RANGE: Range<usize> = 1..3;
pub const HUMIDITY_RANGE: Range<usize> = 3..5;
pub const PRESSURE_RANGE: Range<usize> = 5..7;

pub const ACCELERATION_X_RANGE: Range<usize> = 7..9;
pub const ACCELERATION_Y_RANGE: Range<usize> = 9..11;
pub const ACCELERATION_Z_RANGE: Range<usize> = 11..13;

/// Offsets following the optional acceleration block.
#[derive(Debug)]
pub struct TailLayout {
    pub power_info: Range<usize>,
    pub movement_counter: usize,
    pub sequence_number: Range<usize>,
    pub address: Range<usize>,
}

pub static FULL_TAIL: TailLayout = TailLayout {
    power_info: 13..15,
    movement_counter: 15,
    sequence_number: 16..18,
    address: 18..24,
};

pub static CUT_TAIL: TailLayout = TailLayout {
    power_info: 7..9,
    movement_counter: 9,
    sequence_number: 10..12,
    address: 12..18,
};

/// Recognized wire layouts, keyed by the leading format tag.
///
/// # Examples
/// ```
/// use rawv2_core::Format;
///
/// assert_eq!(Format::from_tag(0x05), Some(Format::Full));
/// assert_eq!(Format::from_tag(0xC5).map(Format::min_len), Some(18));
/// assert_eq!(Format::from_tag(0x03), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Full,
    Cut,
}

impl Format {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            FORMAT_FULL => Some(Self::Full),
            FORMAT_CUT => Some(Self::Cut),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::Full => FORMAT_FULL,
            Self::Cut => FORMAT_CUT,
        }
    }

    pub fn min_len(self) -> usize {
        match self {
            Self::Full => FULL_MIN_LEN,
            Self::Cut => CUT_MIN_LEN,
        }
    }

    pub fn tail(self) -> &'static TailLayout {
        match self {
            Self::Full => &FULL_TAIL,
            Self::Cut => &CUT_TAIL,
        }
    }
}

//! Hardware address carried in the tail of every advertisement.
//!
//! The textual form is always rendered as lower-case, zero-padded,
//! colon-separated hex (`cb:b8:33:4c:88:4f`). Parsing accepts lower-case and
//! upper-case digits; each byte pair is matched on its own, so different pairs
//! may use different cases while a single pair may not mix them.
//!
//! Some older Ruuvi tooling accepted mixed case inside a pair (`cB`). Such
//! stored addresses must be lower-cased before parsing here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of octets in an address.
pub const ADDRESS_LEN: usize = 6;
/// Length of the canonical textual form (`xx:xx:xx:xx:xx:xx`).
pub const ADDRESS_TEXT_LEN: usize = ADDRESS_LEN * 3 - 1;

const SEPARATOR: u8 = b':';

/// Errors returned by the address text codec.
///
/// # Examples
/// ```
/// use rawv2_core::{Address, AddressError};
///
/// let err = "cb-b8-33-4c-88-4f".parse::<Address>().unwrap_err();
/// assert!(matches!(err, AddressError::InvalidAddress { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("not a valid address: {input:?}")]
    InvalidAddress { input: String },
}

/// Six-octet hardware address.
///
/// # Examples
/// ```
/// use rawv2_core::Address;
///
/// let address = Address::new([0xcb, 0xb8, 0x33, 0x4c, 0x88, 0x4f]);
/// assert_eq!(address.to_string(), "cb:b8:33:4c:88:4f");
/// assert_eq!("CB:B8:33:4C:88:4F".parse::<Address>().unwrap(), address);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(octets: [u8; ADDRESS_LEN]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; ADDRESS_LEN] {
        self.0
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(octets: [u8; ADDRESS_LEN]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::InvalidAddress {
            input: input.to_string(),
        };

        let bytes = input.as_bytes();
        if bytes.len() != ADDRESS_TEXT_LEN {
            return Err(invalid());
        }

        let mut octets = [0u8; ADDRESS_LEN];
        for (index, octet) in octets.iter_mut().enumerate() {
            let start = index * 3;
            if index > 0 && bytes[start - 1] != SEPARATOR {
                return Err(invalid());
            }
            *octet = parse_pair(bytes[start], bytes[start + 1]).ok_or_else(invalid)?;
        }
        Ok(Self(octets))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse one byte pair; both digits must share a case (digits fit either).
fn parse_pair(high: u8, low: u8) -> Option<u8> {
    let lower = lower_hex_digit(high).zip(lower_hex_digit(low));
    let upper = upper_hex_digit(high).zip(upper_hex_digit(low));
    let (high, low) = lower.or(upper)?;
    Some((high << 4) | low)
}

fn lower_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

fn upper_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Address, AddressError};

    const SAMPLE: Address = Address::new([0xcb, 0xb8, 0x33, 0x4c, 0x88, 0x4f]);

    fn assert_invalid(input: &str) {
        let err = input.parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            AddressError::InvalidAddress {
                input: input.to_string()
            },
            "{input:?} should be rejected"
        );
    }

    #[test]
    fn renders_lower_case_zero_padded() {
        let address = Address::new([0x01, 0x02, 0x03, 0x04, 0x05, 0xf6]);
        let text = address.to_string();
        assert_eq!(text, "01:02:03:04:05:f6");
        assert_eq!(text.len(), super::ADDRESS_TEXT_LEN);
    }

    #[test]
    fn parses_lower_case() {
        let parsed: Address = "06:05:04:a3:02:01".parse().unwrap();
        assert_eq!(parsed.octets(), [0x06, 0x05, 0x04, 0xa3, 0x02, 0x01]);
    }

    #[test]
    fn parses_upper_case() {
        let parsed: Address = "06:05:04:F3:02:01".parse().unwrap();
        assert_eq!(parsed.octets(), [0x06, 0x05, 0x04, 0xf3, 0x02, 0x01]);
    }

    #[test]
    fn both_cases_yield_same_octets() {
        let lower: Address = "cb:b8:33:4c:88:4f".parse().unwrap();
        let upper: Address = "CB:B8:33:4C:88:4F".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower, SAMPLE);
    }

    #[test]
    fn accepts_different_case_per_pair() {
        let parsed: Address = "cb:B8:33:4c:88:4F".parse().unwrap();
        assert_eq!(parsed, SAMPLE);
    }

    #[test]
    fn rejects_mixed_case_within_pair() {
        assert_invalid("cB:b8:33:4c:88:4f");
    }

    #[test]
    fn lower_casing_recovers_mixed_case_pairs() {
        let address: Address = "cB:b8:33:4C:88:4f".to_ascii_lowercase().parse().unwrap();
        assert_eq!(address, SAMPLE);
    }

    #[test]
    fn rejects_non_hex_digits() {
        assert_invalid("06:05:04:F3:02:XY");
    }

    #[test]
    fn rejects_wrong_length() {
        assert_invalid("");
        assert_invalid("cb:b8:33:4c:88");
        assert_invalid("cb:b8:33:4c:88:4f:00");
        assert_invalid("cb:b8:33:4c:88:4");
    }

    #[test]
    fn rejects_wrong_delimiter() {
        assert_invalid("cb-b8-33-4c-88-4f");
        assert_invalid("cbb8334c884f00000");
        assert_invalid("cb:b8:33:4c:88.4f");
    }

    #[test]
    fn text_round_trip() {
        for octets in [[0u8; 6], [0xff; 6], [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]] {
            let address = Address::new(octets);
            assert_eq!(address.to_string().parse::<Address>().unwrap(), address);
        }
    }

    #[test]
    fn serde_uses_text_form() {
        let json = serde_json::to_string(&SAMPLE).unwrap();
        assert_eq!(json, "\"cb:b8:33:4c:88:4f\"");

        let upper: Address = serde_json::from_str("\"CB:B8:33:4C:88:4F\"").unwrap();
        assert_eq!(upper, SAMPLE);

        let err = serde_json::from_str::<Address>("\"not-an-address\"").unwrap_err();
        assert!(err.to_string().contains("not a valid address"));
    }
}

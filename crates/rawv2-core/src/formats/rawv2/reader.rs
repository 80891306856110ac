use std::ops::Range;

use super::error::DecodeError;
use crate::address::{ADDRESS_LEN, Address};

pub struct RawV2Reader<'a> {
    payload: &'a [u8],
}

impl<'a> RawV2Reader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.payload.len() < needed {
            return Err(DecodeError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(DecodeError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_u16_be(&self, range: Range<usize>) -> Result<u16, DecodeError> {
        let needed = range.end;
        let bytes = self.read_slice(range)?;
        let word: [u8; 2] = bytes.try_into().map_err(|_| DecodeError::TooShort {
            needed,
            actual: self.payload.len(),
        })?;
        Ok(u16::from_be_bytes(word))
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.payload.get(range.clone()).ok_or(DecodeError::TooShort {
            needed: range.end,
            actual: self.payload.len(),
        })
    }

    pub fn read_address(&self, range: Range<usize>) -> Result<Address, DecodeError> {
        let needed = range.end;
        let bytes = self.read_slice(range)?;
        let octets: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| DecodeError::TooShort {
            needed,
            actual: self.payload.len(),
        })?;
        Ok(Address::new(octets))
    }
}

#[cfg(test)]
mod tests {
    use super::RawV2Reader;
    use crate::formats::rawv2::error::DecodeError;

    #[test]
    fn reads_big_endian() {
        let reader = RawV2Reader::new(&[0x12, 0xfc, 0x53]);
        assert_eq!(reader.read_u16_be(0..2).unwrap(), 0x12fc);
        assert_eq!(reader.read_u8(2).unwrap(), 0x53);
    }

    #[test]
    fn read_past_end_reports_too_short() {
        let reader = RawV2Reader::new(&[0x05]);
        let err = reader.read_u16_be(1..3).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                needed: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn read_past_end_reports_payload_length() {
        let reader = RawV2Reader::new(&[0xc5, 0x12, 0xfc]);
        assert_eq!(
            reader.read_u16_be(2..4).unwrap_err(),
            DecodeError::TooShort {
                needed: 4,
                actual: 3
            }
        );
        assert_eq!(
            reader.read_address(1..7).unwrap_err(),
            DecodeError::TooShort {
                needed: 7,
                actual: 3
            }
        );
    }

    #[test]
    fn read_u8_on_empty_payload() {
        let reader = RawV2Reader::new(&[]);
        assert_eq!(
            reader.read_u8(0).unwrap_err(),
            DecodeError::TooShort {
                needed: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn require_len_boundary() {
        let payload = [0u8; 18];
        let reader = RawV2Reader::new(&payload);
        assert!(reader.require_len(18).is_ok());
        assert!(reader.require_len(19).is_err());
    }

    #[test]
    fn reads_address_octets() {
        let reader = RawV2Reader::new(&[0x00, 0xcb, 0xb8, 0x33, 0x4c, 0x88, 0x4f]);
        let address = reader.read_address(1..7).unwrap();
        assert_eq!(address.to_string(), "cb:b8:33:4c:88:4f");
    }
}

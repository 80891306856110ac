use serde::{Deserialize, Serialize};

/// A single decoded field together with its validity.
///
/// `Invalid` keeps the transformed sentinel so callers can log it, but the
/// value is not a measurement. `Absent` marks fields the decoded layout does
/// not carry at all.
///
/// # Examples
/// ```
/// use rawv2_core::Measurement;
///
/// let valid = Measurement::new(24.3_f32, true);
/// assert_eq!(valid.value(), Some(24.3));
///
/// let sentinel = Measurement::new(-163.84_f32, false);
/// assert_eq!(sentinel.value(), None);
/// assert_eq!(sentinel.raw_value(), Some(-163.84));
///
/// let absent: Measurement<i16> = Measurement::Absent;
/// assert_eq!(absent.raw_value(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Measurement<T> {
    Valid(T),
    Invalid(T),
    Absent,
}

impl<T: Copy> Measurement<T> {
    pub fn new(value: T, valid: bool) -> Self {
        if valid {
            Self::Valid(value)
        } else {
            Self::Invalid(value)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Value of a valid field.
    pub fn value(&self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(*value),
            _ => None,
        }
    }

    /// Decoded value regardless of validity; `None` only when absent.
    pub fn raw_value(&self) -> Option<T> {
        match self {
            Self::Valid(value) | Self::Invalid(value) => Some(*value),
            Self::Absent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Measurement;
    use serde_json::json;

    #[test]
    fn new_maps_validity() {
        assert_eq!(Measurement::new(4_i16, true), Measurement::Valid(4));
        assert_eq!(Measurement::new(4_i16, false), Measurement::Invalid(4));
    }

    #[test]
    fn invalid_and_absent_are_distinct() {
        let sentinel = Measurement::new(i16::MIN, false);
        let absent: Measurement<i16> = Measurement::Absent;
        assert!(!sentinel.is_valid());
        assert!(!absent.is_valid());
        assert!(!sentinel.is_absent());
        assert!(absent.is_absent());
        assert_ne!(sentinel, absent);
    }

    #[test]
    fn serializes_state_and_value() {
        let valid = serde_json::to_value(Measurement::Valid(100_044_u32)).unwrap();
        assert_eq!(valid, json!({"state": "valid", "value": 100044}));

        let invalid = serde_json::to_value(Measurement::Invalid(255_u8)).unwrap();
        assert_eq!(invalid, json!({"state": "invalid", "value": 255}));

        let absent = serde_json::to_value(Measurement::<i16>::Absent).unwrap();
        assert_eq!(absent, json!({"state": "absent"}));
    }

    #[test]
    fn deserializes_absent_without_value() {
        let absent: Measurement<i16> = serde_json::from_value(json!({"state": "absent"})).unwrap();
        assert_eq!(absent, Measurement::Absent);
    }
}

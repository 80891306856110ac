use thiserror::Error;

/// Errors returned by RAWv2 decoding.
///
/// Both variants describe the whole advertisement; no field-level failure
/// exists once the length check passes.
///
/// # Examples
/// ```
/// use rawv2_core::DecodeError;
///
/// let err = DecodeError::UnsupportedFormat { tag: 0x03 };
/// assert!(err.to_string().contains("unsupported format"));
/// assert_eq!(err.kind(), "unsupported_format");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported format tag: 0x{tag:02x}")]
    UnsupportedFormat { tag: u8 },
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}

impl DecodeError {
    /// Stable identifier used when tallying errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::TooShort { .. } => "too_short",
        }
    }
}

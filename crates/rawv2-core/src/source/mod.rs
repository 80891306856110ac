mod hexline;

pub use hexline::HexLineSource;

use thiserror::Error;
use time::OffsetDateTime;

/// Raw advertisement payload as captured by a collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Advertisement {
    /// 1-based line (or record) number in the input.
    pub line: u64,
    pub captured_at: Option<OffsetDateTime>,
    pub payload: Vec<u8>,
}

pub trait AdvertisementSource {
    fn next_advertisement(&mut self) -> Result<Option<Advertisement>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: malformed record: {message}")]
    MalformedLine { line: u64, message: String },
    #[error("line {line}: invalid hex payload: {message}")]
    InvalidHex { line: u64, message: String },
    #[error("line {line}: invalid timestamp: {message}")]
    InvalidTimestamp { line: u64, message: String },
}

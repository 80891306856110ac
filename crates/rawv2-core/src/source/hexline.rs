//! Hex-per-line capture files.
//!
//! Each non-empty line holds one advertisement payload, optionally preceded by
//! its RFC 3339 capture time:
//!
//! ```text
//! # comment
//! 2024-05-01T12:00:00Z 0512FC5394C37C0004FFFC040CAC364200CDCBB8334C884F
//! C512FC5394C37CAC364200CDCBB8334C884F
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::{Advertisement, AdvertisementSource, SourceError};

const COMMENT_PREFIX: char = '#';

pub struct HexLineSource<R> {
    reader: R,
    line: u64,
    buf: String,
}

impl HexLineSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> HexLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> AdvertisementSource for HexLineSource<R> {
    fn next_advertisement(&mut self) -> Result<Option<Advertisement>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            if let Some(advertisement) = parse_line(self.line, &self.buf)? {
                return Ok(Some(advertisement));
            }
        }
    }
}

/// Parse one record; `Ok(None)` for blank and comment lines.
fn parse_line(line: u64, text: &str) -> Result<Option<Advertisement>, SourceError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with(COMMENT_PREFIX) {
        return Ok(None);
    }

    let mut parts = text.split_whitespace();
    let (captured_at, hex_text) = match (parts.next(), parts.next(), parts.next()) {
        (Some(hex_text), None, _) => (None, hex_text),
        (Some(ts), Some(hex_text), None) => (Some(parse_timestamp(line, ts)?), hex_text),
        _ => {
            return Err(SourceError::MalformedLine {
                line,
                message: "expected `[timestamp] hex`".to_string(),
            });
        }
    };

    let hex_text = hex_text
        .strip_prefix("0x")
        .or_else(|| hex_text.strip_prefix("0X"))
        .unwrap_or(hex_text);
    let payload = hex::decode(hex_text).map_err(|e| SourceError::InvalidHex {
        line,
        message: e.to_string(),
    })?;

    Ok(Some(Advertisement {
        line,
        captured_at,
        payload,
    }))
}

fn parse_timestamp(line: u64, text: &str) -> Result<OffsetDateTime, SourceError> {
    OffsetDateTime::parse(text, &Rfc3339).map_err(|e| SourceError::InvalidTimestamp {
        line,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{HexLineSource, parse_line};
    use crate::source::{AdvertisementSource, SourceError};

    #[test]
    fn skips_blank_and_comment_lines() {
        assert!(parse_line(1, "").unwrap().is_none());
        assert!(parse_line(2, "   \n").unwrap().is_none());
        assert!(parse_line(3, "# header").unwrap().is_none());
    }

    #[test]
    fn parses_bare_hex_any_case() {
        let ad = parse_line(7, "C512fc\n").unwrap().unwrap();
        assert_eq!(ad.line, 7);
        assert_eq!(ad.captured_at, None);
        assert_eq!(ad.payload, vec![0xc5, 0x12, 0xfc]);

        let ad = parse_line(8, "0xC512").unwrap().unwrap();
        assert_eq!(ad.payload, vec![0xc5, 0x12]);
    }

    #[test]
    fn parses_timestamp_prefix() {
        let ad = parse_line(1, "2024-05-01T12:00:00Z 05ff").unwrap().unwrap();
        let ts = ad.captured_at.expect("timestamp");
        assert_eq!(ts.unix_timestamp(), 1_714_564_800);
        assert_eq!(ad.payload, vec![0x05, 0xff]);
    }

    #[test]
    fn rejects_bad_hex() {
        let err = parse_line(4, "05zz").unwrap_err();
        assert!(matches!(err, SourceError::InvalidHex { line: 4, .. }));
        let err = parse_line(5, "05f").unwrap_err();
        assert!(matches!(err, SourceError::InvalidHex { line: 5, .. }));
    }

    #[test]
    fn rejects_bad_timestamp() {
        let err = parse_line(2, "yesterday 05ff").unwrap_err();
        assert!(matches!(err, SourceError::InvalidTimestamp { line: 2, .. }));
    }

    #[test]
    fn rejects_extra_fields() {
        let err = parse_line(3, "2024-05-01T12:00:00Z 05ff 00").unwrap_err();
        assert!(err.to_string().contains("malformed record"));
    }

    #[test]
    fn source_tracks_line_numbers() {
        let input = "# capture\n05aa\n\nc5bb\n";
        let mut source = HexLineSource::new(Cursor::new(input));

        let first = source.next_advertisement().unwrap().unwrap();
        assert_eq!(first.line, 2);
        let second = source.next_advertisement().unwrap().unwrap();
        assert_eq!(second.line, 4);
        assert_eq!(second.payload, vec![0xc5, 0xbb]);
        assert!(source.next_advertisement().unwrap().is_none());
    }
}

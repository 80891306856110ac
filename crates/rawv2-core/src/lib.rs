//! Decoder for Ruuvi RAWv2 environmental sensor advertisements.
//!
//! The core is [`decode`]: a pure function from a raw advertisement payload
//! and a caller-supplied capture time to a strongly typed [`Reading`], with
//! per-field validity carried by [`Measurement`]. Two layouts are recognized,
//! the full format (`0x05`, 24 bytes) and the cut format (`0xC5`, 18 bytes,
//! no acceleration). Decoding has no I/O and no shared state, so it can be
//! called from any number of threads at once.
//!
//! Around the decoder sit the collaborator layers used by the CLI: `source`
//! reads captured payloads (hex per line), `analysis` decodes a whole capture
//! into a deterministic [`Report`], and `config` maps addresses to sensor
//! names.
//!
//! Invariants:
//! - An unknown format tag is reported before any length check.
//! - Once the layout's minimum length is present, every field decodes.
//! - Addresses always render as lower-case colon-hex.
//!
//! # Examples
//! ```
//! use rawv2_core::{Measurement, decode};
//! use time::OffsetDateTime;
//!
//! let payload = [
//!     0xc5, 0x12, 0xfc, 0x53, 0x94, 0xc3, 0x7c, 0xac, 0x36, 0x42, 0x00, 0xcd,
//!     0xcb, 0xb8, 0x33, 0x4c, 0x88, 0x4f,
//! ];
//! let reading = decode(&payload, OffsetDateTime::UNIX_EPOCH)?;
//! assert_eq!(reading.transmit_power, Measurement::Valid(4));
//! assert_eq!(reading.acceleration_x, Measurement::Absent);
//! # Ok::<(), rawv2_core::DecodeError>(())
//! ```

use serde::{Deserialize, Serialize};

mod address;
mod analysis;
mod config;
mod formats;
mod measurement;
mod source;

pub use address::{ADDRESS_LEN, ADDRESS_TEXT_LEN, Address, AddressError};
pub use analysis::{AnalysisError, analyze_hex_file, analyze_source};
pub use config::{ConfigError, SensorAlias, SensorConfig};
pub use formats::rawv2::layout::{
    CUT_MIN_LEN, FORMAT_CUT, FORMAT_FULL, FULL_MIN_LEN, RUUVI_MANUFACTURER_ID,
};
pub use formats::rawv2::{
    DecodeError, Format, Reading, decode, decode_now, fields, strip_manufacturer_id,
};
pub use measurement::Measurement;
pub use source::{Advertisement, AdvertisementSource, HexLineSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Batch decoding report with deterministic ordering.
///
/// # Examples
/// ```
/// use rawv2_core::make_stub_report;
///
/// let report = make_stub_report("capture.hex");
/// assert_eq!(report.report_version, rawv2_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 time of the latest decoded advertisement.
    pub generated_at: String,
    pub input: InputInfo,
    pub summary: DecodeSummary,
    /// Per-sensor summaries sorted by address.
    pub sensors: Vec<SensorSummary>,
    /// Decode failures sorted by kind.
    pub errors: Vec<ErrorSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer (`-` for stdin).
    pub path: String,
}

/// Advertisement counts for a whole input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSummary {
    pub advertisements_total: u64,
    pub decoded: u64,
    pub full_format: u64,
    pub cut_format: u64,
}

/// Everything observed for one sensor address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSummary {
    pub address: Address,
    /// Configured alias, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub readings: u64,
    /// RFC3339 timestamp of the earliest reading.
    pub first_seen: String,
    /// RFC3339 timestamp of the latest reading.
    pub last_seen: String,
    /// Jumps of more than one between consecutive valid sequence numbers.
    pub sequence_gaps: u64,
    /// Repeated sequence numbers (the same advertisement heard twice).
    pub duplicates: u64,
    pub latest: Reading,
}

/// Decode failures of one kind.
///
/// # Examples
/// ```
/// use rawv2_core::ErrorSummary;
///
/// let summary = ErrorSummary {
///     kind: "too_short".to_string(),
///     count: 1,
///     examples: vec!["line 3: payload too short: need 24 bytes, got 23".to_string()],
/// };
/// assert_eq!(summary.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Stable kind identifier (`unsupported_format`, `too_short`).
    pub kind: String,
    pub count: u64,
    /// At most three examples, formatted as `line N: <error>`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
pub fn make_stub_report(input_path: &str) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "rawv2".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
        },
        summary: DecodeSummary::default(),
        sensors: vec![],
        errors: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_empty() {
        let payload = [
            0xc5, 0x12, 0xfc, 0x53, 0x94, 0xc3, 0x7c, 0xac, 0x36, 0x42, 0x00, 0xcd, 0xcb, 0xb8,
            0x33, 0x4c, 0x88, 0x4f,
        ];
        let mut report = make_stub_report("capture.hex");
        report.sensors.push(SensorSummary {
            address: Address::new([0xcb, 0xb8, 0x33, 0x4c, 0x88, 0x4f]),
            name: None,
            readings: 1,
            first_seen: DEFAULT_GENERATED_AT.to_string(),
            last_seen: DEFAULT_GENERATED_AT.to_string(),
            sequence_gaps: 0,
            duplicates: 0,
            latest: decode(&payload, time::OffsetDateTime::UNIX_EPOCH).expect("decode"),
        });
        report.errors.push(ErrorSummary {
            kind: "too_short".to_string(),
            count: 0,
            examples: vec![],
        });

        let value = serde_json::to_value(&report).expect("report json");
        let sensor = &value["sensors"][0];
        assert!(sensor.get("name").is_none());
        assert_eq!(sensor["address"], "cb:b8:33:4c:88:4f");
        assert!(value["errors"][0].get("examples").is_none());
        assert_eq!(value["tool"]["name"], "rawv2");
    }
}

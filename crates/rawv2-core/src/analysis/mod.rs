use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, warn};

use crate::config::SensorConfig;
use crate::formats::rawv2::{Format, decode, strip_manufacturer_id};
use crate::source::{Advertisement, AdvertisementSource, HexLineSource, SourceError};
use crate::{DEFAULT_GENERATED_AT, Report, make_stub_report};

mod errors;
mod sensors;

use errors::ErrorTally;
use sensors::{SensorStats, add_reading, build_sensor_summaries};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn analyze_hex_file(path: &Path, config: &SensorConfig) -> Result<Report, AnalysisError> {
    let source = HexLineSource::open(path)?;
    analyze_source(&path.display().to_string(), source, config)
}

/// Decode every advertisement from `source` into a deterministic report.
///
/// Decode failures are tallied and never abort the run; source failures do.
/// Records without a capture time are stamped with the Unix epoch.
pub fn analyze_source<S: AdvertisementSource>(
    input_path: &str,
    mut source: S,
    config: &SensorConfig,
) -> Result<Report, AnalysisError> {
    let mut report = make_stub_report(input_path);
    let mut sensors: BTreeMap<_, SensorStats> = BTreeMap::new();
    let mut errors = ErrorTally::default();
    let mut last_ts: Option<OffsetDateTime> = None;

    while let Some(Advertisement {
        line,
        captured_at,
        payload,
    }) = source.next_advertisement()?
    {
        report.summary.advertisements_total += 1;
        let payload = if config.strip_manufacturer_id {
            strip_manufacturer_id(&payload)
        } else {
            payload.as_slice()
        };
        let captured_at = captured_at.unwrap_or(OffsetDateTime::UNIX_EPOCH);

        match decode(payload, captured_at) {
            Ok(reading) => {
                report.summary.decoded += 1;
                match reading.format {
                    Format::Full => report.summary.full_format += 1,
                    Format::Cut => report.summary.cut_format += 1,
                }
                last_ts = Some(last_ts.map_or(captured_at, |ts| ts.max(captured_at)));
                add_reading(&mut sensors, reading);
            }
            Err(err) => {
                debug!(line, error = %err, "skipping advertisement");
                errors.record(line, &err);
            }
        }
    }

    if errors.total() > 0 {
        warn!(
            input = input_path,
            failed = errors.total(),
            total = report.summary.advertisements_total,
            "some advertisements could not be decoded"
        );
    }

    report.generated_at = last_ts
        .map(format_rfc3339)
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.sensors = build_sensor_summaries(sensors, config);
    report.errors = errors.into_summaries();
    Ok(report)
}

pub(crate) fn format_rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_GENERATED_AT.to_string())
}

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use time::OffsetDateTime;

use super::format_rfc3339;
use crate::SensorSummary;
use crate::address::Address;
use crate::config::SensorConfig;
use crate::formats::rawv2::Reading;
use crate::formats::rawv2::fields::SEQUENCE_NUMBER_SENTINEL;

/// Running statistics for one sensor address.
#[derive(Debug)]
pub(crate) struct SensorStats {
    readings: u64,
    first_seen: OffsetDateTime,
    last_seen: OffsetDateTime,
    last_sequence: Option<u16>,
    sequence_gaps: u64,
    duplicates: u64,
    latest: Reading,
}

impl SensorStats {
    fn new(reading: Reading) -> Self {
        Self {
            readings: 1,
            first_seen: reading.captured_at,
            last_seen: reading.captured_at,
            last_sequence: reading.sequence_number.value(),
            sequence_gaps: 0,
            duplicates: 0,
            latest: reading,
        }
    }

    fn observe(&mut self, reading: Reading) {
        self.readings += 1;
        self.first_seen = self.first_seen.min(reading.captured_at);
        self.last_seen = self.last_seen.max(reading.captured_at);

        if let Some(sequence) = reading.sequence_number.value() {
            if let Some(previous) = self.last_sequence {
                match sequence_step(previous, sequence) {
                    0 => self.duplicates += 1,
                    1 => {}
                    _ => self.sequence_gaps += 1,
                }
            }
            self.last_sequence = Some(sequence);
        }

        // Ties go to the later record in input order.
        if reading.captured_at >= self.latest.captured_at {
            self.latest = reading;
        }
    }
}

/// Forward distance between two valid sequence numbers.
///
/// Valid values run `0..=0xFFFE`, so the counter wraps modulo `0xFFFF`.
pub(crate) fn sequence_step(previous: u16, current: u16) -> u32 {
    let modulus = u32::from(SEQUENCE_NUMBER_SENTINEL);
    (u32::from(current) + modulus - u32::from(previous)) % modulus
}

pub(crate) fn add_reading(sensors: &mut BTreeMap<Address, SensorStats>, reading: Reading) {
    match sensors.entry(reading.address) {
        Entry::Vacant(entry) => {
            entry.insert(SensorStats::new(reading));
        }
        Entry::Occupied(mut entry) => entry.get_mut().observe(reading),
    }
}

pub(crate) fn build_sensor_summaries(
    sensors: BTreeMap<Address, SensorStats>,
    config: &SensorConfig,
) -> Vec<SensorSummary> {
    sensors
        .into_iter()
        .map(|(address, stats)| SensorSummary {
            address,
            name: config.name_for(&address).map(str::to_string),
            readings: stats.readings,
            first_seen: format_rfc3339(stats.first_seen),
            last_seen: format_rfc3339(stats.last_seen),
            sequence_gaps: stats.sequence_gaps,
            duplicates: stats.duplicates,
            latest: stats.latest,
        })
        .collect()
}

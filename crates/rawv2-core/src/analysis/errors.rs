use std::collections::BTreeMap;

use crate::ErrorSummary;
use crate::formats::rawv2::DecodeError;

const MAX_EXAMPLES: usize = 3;

/// Decode failures grouped by kind, with the first few occurrences kept.
#[derive(Debug, Default)]
pub(crate) struct ErrorTally {
    by_kind: BTreeMap<&'static str, (u64, Vec<String>)>,
}

impl ErrorTally {
    pub(crate) fn record(&mut self, line: u64, err: &DecodeError) {
        let (count, examples) = self.by_kind.entry(err.kind()).or_default();
        *count += 1;
        if examples.len() < MAX_EXAMPLES {
            examples.push(format!("line {line}: {err}"));
        }
    }

    pub(crate) fn total(&self) -> u64 {
        self.by_kind.values().map(|(count, _)| count).sum()
    }

    pub(crate) fn into_summaries(self) -> Vec<ErrorSummary> {
        self.by_kind
            .into_iter()
            .map(|(kind, (count, examples))| ErrorSummary {
                kind: kind.to_string(),
                count,
                examples,
            })
            .collect()
    }
}

use crate::prelude::{CoreResult, MatchError, Series};
use crate::records::MatchResult;
use serde::{Deserialize, Serialize};

/// Per-run counts reported alongside the match results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub truth_total: usize,
    pub sensor_total: usize,
    pub matched: usize,
    pub within_tolerance: usize,
    pub no_match: usize,
    pub truth_invalid_coordinate: usize,
    pub truth_malformed_timestamp: usize,
    pub sensor_invalid_coordinate: usize,
    pub sensor_malformed_timestamp: usize,
    /// Truth samples never examined because the run was cancelled.
    pub unprocessed: usize,
    pub cancelled: bool,
}

impl MatchSummary {
    /// Truth samples that produced no result for any reason other than cancellation.
    pub fn skipped(&self) -> usize {
        self.no_match + self.truth_invalid_coordinate + self.truth_malformed_timestamp
    }

    pub fn match_rate(&self) -> f64 {
        if self.truth_total == 0 {
            0.0
        } else {
            self.matched as f64 / self.truth_total as f64
        }
    }

    /// Fails with `EmptyInput` when either series had no rows at all.
    pub fn ensure_inputs(&self) -> CoreResult<()> {
        if self.truth_total == 0 {
            return Err(MatchError::EmptyInput {
                series: Series::Truth,
            });
        }
        if self.sensor_total == 0 {
            return Err(MatchError::EmptyInput {
                series: Series::Sensor,
            });
        }
        Ok(())
    }
}

/// Ordered results of one matching run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub results: Vec<MatchResult>,
    pub summary: MatchSummary,
}

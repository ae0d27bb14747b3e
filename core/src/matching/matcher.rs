use crate::ingest::{ingest_sensor, ingest_truth, SensorRecord, TruthRecord};
use crate::math::geodesy::{distance, validate_position};
use crate::matching::cancel::CancellationFlag;
use crate::matching::search::{CandidateSearch, LinearScan, SortedIndex};
use crate::matching::summary::{MatchOutcome, MatchSummary};
use crate::prelude::{CoreResult, MatchConfig, SearchStrategy};
use crate::records::{GeoSample, MatchResult};
use crate::telemetry::{LogManager, MetricsRecorder};
use rayon::prelude::*;

/// Pairs each truth sample with its time-closest sensor sample inside the window.
pub struct TemporalMatcher {
    config: MatchConfig,
    logger: LogManager,
}

impl TemporalMatcher {
    pub fn new(config: MatchConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            logger: LogManager::new("TemporalMatcher"),
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Normalises raw rows, then matches the surviving samples.
    ///
    /// Rows rejected during normalisation are counted in the summary and
    /// never reach the search.
    pub fn match_records(
        &self,
        truth: &[TruthRecord],
        sensor: &[SensorRecord],
        cancel: Option<&CancellationFlag>,
    ) -> MatchOutcome {
        let truth_report = ingest_truth(truth);
        let sensor_report = ingest_sensor(sensor);

        let mut outcome =
            self.match_samples(&truth_report.samples, &sensor_report.samples, cancel);
        let summary = &mut outcome.summary;
        summary.truth_total = truth_report.total();
        summary.sensor_total = sensor_report.total();
        summary.truth_invalid_coordinate += truth_report.rejected_coordinates();
        summary.truth_malformed_timestamp = truth_report.rejected_timestamps();
        summary.sensor_invalid_coordinate += sensor_report.rejected_coordinates();
        summary.sensor_malformed_timestamp = sensor_report.rejected_timestamps();

        if !sensor_report.rejected.is_empty() {
            self.logger.caution(&format!(
                "{} of {} sensor rows rejected during ingest",
                sensor_report.rejected.len(),
                sensor_report.total()
            ));
        }
        outcome
    }

    /// Matches already-normalised samples. Output follows truth order.
    ///
    /// Sensor samples with out-of-range coordinates are excluded before the
    /// search and counted in `sensor_invalid_coordinate`.
    pub fn match_samples(
        &self,
        truth: &[GeoSample],
        sensor: &[GeoSample],
        cancel: Option<&CancellationFlag>,
    ) -> MatchOutcome {
        if truth.is_empty() || sensor.is_empty() {
            self.logger.caution(&format!(
                "empty input: {} truth samples, {} sensor samples",
                truth.len(),
                sensor.len()
            ));
        }

        let usable: Vec<GeoSample> = sensor
            .iter()
            .filter(|sample| match validate_position(&sample.position) {
                Ok(()) => true,
                Err(err) => {
                    self.logger.detail(&format!(
                        "excluding sensor sample at {}: {}",
                        sample.timestamp, err
                    ));
                    false
                }
            })
            .copied()
            .collect();

        let search: Box<dyn CandidateSearch + '_> = match self.config.strategy {
            SearchStrategy::Linear => Box::new(LinearScan::new(&usable, self.config.window_ms)),
            SearchStrategy::Indexed => Box::new(SortedIndex::new(&usable, self.config.window_ms)),
        };
        let mut outcome = self.run(truth, &usable, search.as_ref(), cancel);
        outcome.summary.sensor_total = sensor.len();
        outcome.summary.sensor_invalid_coordinate = sensor.len() - usable.len();
        outcome
    }

    fn run(
        &self,
        truth: &[GeoSample],
        sensor: &[GeoSample],
        search: &dyn CandidateSearch,
        cancel: Option<&CancellationFlag>,
    ) -> MatchOutcome {
        let metrics = MetricsRecorder::new();
        let is_cancelled = || cancel.map_or(false, CancellationFlag::is_cancelled);

        let results: Vec<MatchResult> = if self.config.parallel {
            let mut tagged: Vec<(usize, Option<MatchResult>)> = truth
                .par_iter()
                .enumerate()
                .filter(|_| !is_cancelled())
                .map(|(idx, sample)| (idx, self.match_one(sample, sensor, search, &metrics)))
                .collect();
            tagged.sort_by_key(|(idx, _)| *idx);
            tagged.into_iter().filter_map(|(_, result)| result).collect()
        } else {
            let mut results = Vec::new();
            for sample in truth {
                if is_cancelled() {
                    break;
                }
                if let Some(result) = self.match_one(sample, sensor, search, &metrics) {
                    results.push(result);
                }
            }
            results
        };

        let counts = metrics.snapshot();
        let summary = MatchSummary {
            truth_total: truth.len(),
            sensor_total: sensor.len(),
            matched: counts.matched,
            within_tolerance: counts.within_tolerance,
            no_match: counts.no_match,
            truth_invalid_coordinate: counts.invalid_coordinate,
            unprocessed: truth.len() - counts.processed,
            cancelled: counts.processed < truth.len(),
            ..Default::default()
        };

        self.logger.record(&format!(
            "matched {}/{} truth samples (window {} ms, tolerance {} m, {} within tolerance)",
            summary.matched,
            summary.truth_total,
            self.config.window_ms,
            self.config.tolerance_m,
            summary.within_tolerance
        ));
        if summary.cancelled {
            self.logger.caution(&format!(
                "run cancelled with {} truth samples unprocessed",
                summary.unprocessed
            ));
        }

        MatchOutcome { results, summary }
    }

    fn match_one(
        &self,
        truth: &GeoSample,
        sensor: &[GeoSample],
        search: &dyn CandidateSearch,
        metrics: &MetricsRecorder,
    ) -> Option<MatchResult> {
        let target_ms = truth.epoch_ms();
        let Some(candidate) = search.nearest(target_ms).and_then(|idx| sensor.get(idx)) else {
            self.logger
                .detail(&format!("no sensor sample within window of {}", truth.timestamp));
            metrics.record_no_match();
            return None;
        };

        match distance(&truth.position, &candidate.position) {
            Ok(measurement) => {
                let within_tolerance = measurement.meters <= self.config.tolerance_m;
                metrics.record_match(within_tolerance);
                Some(MatchResult {
                    timestamp: truth.timestamp,
                    truth_position: truth.position,
                    sensor_position: candidate.position,
                    distance_m: measurement.meters,
                    measurement: measurement.kind,
                    within_tolerance,
                    time_delta_ms: candidate.epoch_ms() - target_ms,
                })
            }
            Err(err) => {
                self.logger
                    .detail(&format!("skipping truth sample at {}: {}", truth.timestamp, err));
                metrics.record_invalid_coordinate();
                None
            }
        }
    }
}

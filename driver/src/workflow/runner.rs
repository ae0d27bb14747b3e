use crate::dataset::reader::{read_sensor_file, read_truth_file};
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use matchcore::ingest::{SensorRecord, TruthRecord};
use matchcore::matching::{CancellationFlag, MatchOutcome, TemporalMatcher};
use matchcore::report::{self, MatchRow};
use std::path::Path;

pub struct WorkflowResult {
    pub rows: Vec<MatchRow>,
    pub outcome: MatchOutcome,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn execute(
        &self,
        truth: &[TruthRecord],
        sensor: &[SensorRecord],
        cancel: Option<&CancellationFlag>,
    ) -> anyhow::Result<WorkflowResult> {
        let matcher = TemporalMatcher::new(self.config.to_match_config())
            .context("building temporal matcher")?;
        let outcome = matcher.match_records(truth, sensor, cancel);
        let rows = report::to_rows(&outcome.results);
        Ok(WorkflowResult { rows, outcome })
    }

    pub fn execute_files(
        &self,
        truth_path: &Path,
        sensor_path: &Path,
        cancel: Option<&CancellationFlag>,
    ) -> anyhow::Result<WorkflowResult> {
        let truth = read_truth_file(truth_path)?;
        let sensor = read_sensor_file(sensor_path)?;
        self.execute(&truth, &sensor, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::writer::write_records;
    use crate::generator::profile::{build_flight, FlightConfig};
    use matchcore::prelude::SearchStrategy;
    use tempfile::tempdir;

    #[test]
    fn runner_executes_workflow() {
        let cfg = WorkflowConfig::from_args(100, 25.0, SearchStrategy::Linear, false);
        let flight = build_flight(&FlightConfig {
            samples: 120,
            ..Default::default()
        })
        .unwrap();
        let result = Runner::new(cfg).execute(&flight.truth, &flight.sensor, None).unwrap();
        let summary = &result.outcome.summary;
        assert_eq!(summary.truth_total, 120);
        assert_eq!(result.rows.len(), summary.matched);
        assert_eq!(summary.matched + summary.skipped(), 120);
        assert!(summary.matched > 100);
        assert!(result.rows.iter().all(|row| row.measurement.as_str() == "3D"));
    }

    #[test]
    fn runner_reads_files_from_disk() {
        let dir = tempdir().unwrap();
        let flight = build_flight(&FlightConfig {
            samples: 30,
            dropout: 0.0,
            ..Default::default()
        })
        .unwrap();
        let truth_path = dir.path().join("truth.csv");
        let sensor_path = dir.path().join("sensor.csv");
        write_records(&flight.truth, &truth_path).unwrap();
        write_records(&flight.sensor, &sensor_path).unwrap();

        let cfg = WorkflowConfig::from_args(100, 50.0, SearchStrategy::Indexed, true);
        let result = Runner::new(cfg)
            .execute_files(&truth_path, &sensor_path, None)
            .unwrap();
        assert_eq!(result.outcome.summary.matched, 30);
        assert_eq!(result.outcome.summary.within_tolerance, 30);
    }

    #[test]
    fn runner_rejects_invalid_tolerance() {
        let cfg = WorkflowConfig::from_args(100, -1.0, SearchStrategy::Linear, false);
        assert!(Runner::new(cfg).execute(&[], &[], None).is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let cfg = WorkflowConfig::from_args(100, 5.0, SearchStrategy::Linear, false);
        let err = Runner::new(cfg)
            .execute_files(Path::new("/nonexistent/truth.csv"), Path::new("x.csv"), None)
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("truth"));
    }
}

use matchcore::ingest::{SensorRecord, TruthRecord};
use matchcore::matching::MatchSummary;
use matchcore::report::MatchRow;
use serde::{Deserialize, Serialize};

/// Body of `POST /match`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRequest {
    pub truth: Vec<TruthRecord>,
    pub sensor: Vec<SensorRecord>,
    #[serde(default)]
    pub window_ms: Option<u64>,
    #[serde(default)]
    pub tolerance_m: Option<f64>,
}

/// Latest report served by `GET /report`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportModel {
    pub rows: Vec<MatchRow>,
    pub summary: MatchSummary,
}

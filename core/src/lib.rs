//! Truth/sensor trajectory matching core.
//!
//! Pairs every truth sample with the time-closest sensor sample inside a
//! fixed window, measures the 2D or 3D distance between them and judges it
//! against a tolerance. Raw rows are normalised in [`ingest`]; the search and
//! run bookkeeping live in [`matching`].

pub mod ingest;
pub mod math;
pub mod matching;
pub mod prelude;
pub mod records;
pub mod report;
pub mod telemetry;

pub use ingest::{SensorRecord, TruthRecord};
pub use matching::{CancellationFlag, MatchOutcome, MatchSummary, TemporalMatcher};
pub use prelude::{CoreResult, MatchConfig, MatchError, SearchStrategy, Series};
pub use records::{GeoPosition, GeoSample, MatchResult, MeasurementType};
pub use report::MatchRow;

pub mod match_result;
pub mod sample;

pub use match_result::{MatchResult, MeasurementType};
pub use sample::{GeoPosition, GeoSample};

pub mod geodesy;

pub use geodesy::{distance, haversine_m, validate_position, Measurement, EARTH_RADIUS_M};

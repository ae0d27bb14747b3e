use crate::records::GeoSample;

/// Finds the sensor sample closest in time to a truth instant.
///
/// Implementations return the index into the original sensor slice of the
/// sample minimising `|sensor - target|` subject to that difference being
/// strictly below the window. Ties go to the lowest index.
pub trait CandidateSearch: Sync {
    fn nearest(&self, target_ms: i64) -> Option<usize>;
}

/// Single pass over the whole sensor series.
pub struct LinearScan<'a> {
    sensor: &'a [GeoSample],
    window_ms: u64,
}

impl<'a> LinearScan<'a> {
    pub fn new(sensor: &'a [GeoSample], window_ms: u64) -> Self {
        Self { sensor, window_ms }
    }
}

impl CandidateSearch for LinearScan<'_> {
    fn nearest(&self, target_ms: i64) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (idx, sample) in self.sensor.iter().enumerate() {
            let diff = sample.epoch_ms().abs_diff(target_ms);
            if diff >= self.window_ms {
                continue;
            }
            if best.map_or(true, |(_, best_diff)| diff < best_diff) {
                best = Some((idx, diff));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

/// Sensor series sorted once by `(timestamp, input index)`.
pub struct SortedIndex {
    order: Vec<(i64, usize)>,
    window_ms: i64,
}

impl SortedIndex {
    pub fn new(sensor: &[GeoSample], window_ms: u64) -> Self {
        let mut order: Vec<(i64, usize)> = sensor
            .iter()
            .enumerate()
            .map(|(idx, sample)| (sample.epoch_ms(), idx))
            .collect();
        order.sort_unstable();
        Self {
            order,
            window_ms: i64::try_from(window_ms).unwrap_or(i64::MAX),
        }
    }
}

impl CandidateSearch for SortedIndex {
    fn nearest(&self, target_ms: i64) -> Option<usize> {
        // candidates satisfy target - w < ts < target + w
        let lower = target_ms.saturating_sub(self.window_ms);
        let upper = target_ms.saturating_add(self.window_ms);
        let start = self.order.partition_point(|&(ts, _)| ts <= lower);
        let end = self.order.partition_point(|&(ts, _)| ts < upper);

        self.order
            .get(start..end)?
            .iter()
            .map(|&(ts, idx)| (ts.abs_diff(target_ms), idx))
            .min()
            .map(|(_, idx)| idx)
    }
}

use std::sync::Mutex;

/// Thread-safe per-run outcome counters, shared by matcher workers.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub processed: usize,
    pub matched: usize,
    pub within_tolerance: usize,
    pub no_match: usize,
    pub invalid_coordinate: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_match(&self, within_tolerance: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
            metrics.matched += 1;
            if within_tolerance {
                metrics.within_tolerance += 1;
            }
        }
    }

    pub fn record_no_match(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
            metrics.no_match += 1;
        }
    }

    pub fn record_invalid_coordinate(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
            metrics.invalid_coordinate += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

use std::time::{Duration, Instant};

/// Statistics for one classification run.
#[derive(Debug, Clone)]
pub struct InferenceStats {
    /// Total execution time, tokenization included.
    pub total_time: Duration,
    /// Number of sentences classified.
    pub items_processed: usize,
    /// Padded sequence length of the batch.
    pub padded_len: usize,
}

impl InferenceStats {
    /// Create a new stats tracker (call at start of operation).
    pub(crate) fn start() -> InferenceStatsBuilder {
        InferenceStatsBuilder {
            start_time: Instant::now(),
        }
    }

    pub fn items_per_second(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs > 0.0 {
            self.items_processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Tracks timing from creation to finish.
pub(crate) struct InferenceStatsBuilder {
    start_time: Instant,
}

impl InferenceStatsBuilder {
    pub fn finish(self, items_processed: usize, padded_len: usize) -> InferenceStats {
        InferenceStats {
            total_time: self.start_time.elapsed(),
            items_processed,
            padded_len,
        }
    }
}

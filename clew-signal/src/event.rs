//! Basecalled event record

/// One basecalled event from a read container.
///
/// `confidence` is the basecaller's probability that `kmer` is the correct
/// call for this event; calibration and normalization only consider events
/// above the configured confidence threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub mean: f64,
    pub kmer: String,
    pub confidence: f64,
}

impl Event {
    pub fn new(mean: f64, kmer: impl Into<String>, confidence: f64) -> Self {
        Self {
            mean,
            kmer: kmer.into(),
            confidence,
        }
    }
}

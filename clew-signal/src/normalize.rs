//! Read normalization

use crate::calibrate::{estimate_calibration, Calibration};
use crate::event::Event;
use crate::fast5::Fast5File;
use clew_bio::PoreModel;
use clew_core::ClewResult;
use std::path::Path;

/// Apply a calibration to a read's events.
///
/// Re-filters by the same confidence threshold as calibration — the two
/// passes are kept separate on purpose — and preserves original event
/// order, which is positionally meaningful downstream.
pub fn normalize_events(
    events: &[Event],
    calibration: &Calibration,
    min_confidence: f64,
) -> Vec<f64> {
    events
        .iter()
        .filter(|e| e.confidence > min_confidence)
        .map(|e| e.mean / calibration.scale - calibration.shift)
        .collect()
}

/// Full per-read pipeline: open the container, extract events, calibrate
/// against the model, and normalize. Any failure is local to this read.
pub fn normalize_read<P: AsRef<Path>>(
    path: P,
    model: &PoreModel,
    min_confidence: f64,
) -> ClewResult<Vec<f64>> {
    let fast5 = Fast5File::open(path)?;
    let events = fast5.events()?;
    let calibration = estimate_calibration(&events, model, min_confidence)?;
    Ok(normalize_events(&events, &calibration, min_confidence))
}

//! Per-read shift/scale calibration
//!
//! Each read sees the pore slightly differently, so observed signal means
//! are related to the model's by an affine correction. The correction is
//! recovered by weighted least squares over the read's confident events:
//! each event contributes its model mean `m` and observed mean `e` with
//! weight `w = 1/stdv²`, accumulating the normal equations
//!
//! ```text
//! | Σw      Σw·m   | |shift|   | Σw·e   |
//! | Σw·m    Σw·m²  | |scale| = | Σw·e·m |
//! ```
//!
//! solved in closed form. A singular system (fewer than two distinct
//! qualifying events, or degenerate model means) discards the read.

use crate::event::Event;
use clew_bio::PoreModel;
use clew_core::{ClewError, ClewResult};
use tracing::warn;

/// Determinant magnitude below which the system is treated as singular.
pub const SINGULARITY_EPSILON: f64 = 1e-12;

/// Per-read affine calibration. Owned by the read it was computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub shift: f64,
    pub scale: f64,
}

/// Solve a 2×2 linear system `a·x = b` by Cramer's rule.
pub fn solve_2x2(a: [[f64; 2]; 2], b: [f64; 2]) -> ClewResult<[f64; 2]> {
    let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
    if det.abs() < SINGULARITY_EPSILON {
        return Err(ClewError::SingularMatrix { det });
    }
    Ok([
        (b[0] * a[1][1] - b[1] * a[0][1]) / det,
        (a[0][0] * b[1] - a[1][0] * b[0]) / det,
    ])
}

/// Estimate the calibration for one read from its events.
///
/// Only events with `confidence > min_confidence` participate. Events
/// whose called k-mer is absent from the model are skipped and counted
/// rather than aborting the read; the count is surfaced as a warning.
pub fn estimate_calibration(
    events: &[Event],
    model: &PoreModel,
    min_confidence: f64,
) -> ClewResult<Calibration> {
    let mut a = [[0.0f64; 2]; 2];
    let mut b = [0.0f64; 2];
    let mut unknown_kmers = 0usize;

    for event in events.iter().filter(|e| e.confidence > min_confidence) {
        let level = match model.get(&event.kmer) {
            Some(level) => level,
            None => {
                unknown_kmers += 1;
                continue;
            }
        };

        let w = 1.0 / (level.stdv * level.stdv);
        a[0][0] += w;
        a[1][0] += w * level.mean;
        a[1][1] += w * level.mean * level.mean;
        b[0] += w * event.mean;
        b[1] += w * event.mean * level.mean;
    }
    // A is symmetric
    a[0][1] = a[1][0];

    if unknown_kmers > 0 {
        warn!(
            skipped = unknown_kmers,
            "events with k-mers absent from the pore model were excluded from calibration"
        );
    }

    let [shift, scale] = solve_2x2(a, b)?;
    Ok(Calibration { shift, scale })
}

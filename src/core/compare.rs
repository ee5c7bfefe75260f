//! Deviation statistics between a normalized model curve and its baseline.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::curve::NormalizedCurve;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    /// Largest absolute difference `|model - baseline|`.
    pub max_abs: f64,
    /// Wavelength at which `max_abs` occurs.
    pub at_wavelength: f64,
    pub rms: f64,
    /// Number of wavelengths that entered the statistics.
    pub samples: usize,
}

/// Compares `model` against `baseline` at the wavelengths of both curves.
///
/// Only wavelengths inside both curves' domains and inside `window` are used,
/// so a feature present in only one of the curves is still sampled.
/// Returns `None` when the curves do not overlap there.
pub fn deviation(model: &NormalizedCurve, baseline: &NormalizedCurve, window: (f64, f64)) -> Option<Deviation> {
    let (mmin, mmax) = model.curve.domain();
    let (bmin, bmax) = baseline.curve.domain();
    let lo = window.0.max(mmin).max(bmin);
    let hi = window.1.min(mmax).min(bmax);

    let mut grid: Vec<f64> = model
        .points()
        .iter()
        .chain(baseline.points())
        .map(|&(x, _)| x)
        .filter(|x| *x >= lo && *x <= hi)
        .collect();
    grid.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    grid.dedup();

    let mut max_abs = 0.0_f64;
    let mut at_wavelength = f64::NAN;
    let mut sum_sq = 0.0;
    let mut samples = 0usize;

    for x in grid {
        let (Ok(y), Ok(reference)) = (model.curve.interpolate(x), baseline.curve.interpolate(x)) else {
            continue;
        };
        let diff = (y - reference).abs();
        if diff > max_abs || samples == 0 {
            max_abs = diff;
            at_wavelength = x;
        }
        sum_sq += diff * diff;
        samples += 1;
    }

    (samples > 0).then(|| Deviation {
        max_abs,
        at_wavelength,
        rms: (sum_sq / samples as f64).sqrt(),
        samples,
    })
}

//! # Curve Module / 曲线模块
//!
//! Turns a parsed [`SpectrumSample`] into a wavelength-ordered curve, and
//! normalizes it so that it equals 1.0 at a reference wavelength.
//!
//! 将解析后的 `SpectrumSample` 转换为按波长排序的曲线，
//! 并对其归一化，使其在参考波长处等于 1.0。

use std::cmp::Ordering;
use std::path::PathBuf;

use crate::core::error::{ComparisonError, ComparisonResult};
use crate::core::spectrum::{Abscissa, SpectrumSample, flux_nu_to_flux_lambda, frequency_to_wavelength};

/// A spectrum as (wavelength [Å], flux per unit wavelength) pairs, ascending in wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: String,
    pub source: PathBuf,
    points: Vec<(f64, f64)>,
}

/// A curve scaled so that its interpolated value at `reference` is 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCurve {
    pub curve: Curve,
    pub reference: f64,
    /// The divisor that was applied, i.e. the raw interpolated flux at `reference`.
    pub scale: f64,
}

impl Curve {
    /// Builds a curve from raw samples.
    ///
    /// Frequency data is converted to wavelength and flux per unit wavelength.
    /// The points are sorted ascending in wavelength; duplicate or non-finite
    /// wavelengths are rejected.
    pub fn from_sample(label: impl Into<String>, sample: &SpectrumSample, abscissa: Abscissa) -> ComparisonResult<Self> {
        if sample.is_empty() {
            return Err(ComparisonError::EmptySpectrum {
                path: sample.source.clone(),
            });
        }

        let mut points: Vec<(f64, f64)> = sample
            .records
            .iter()
            .map(|r| match abscissa {
                Abscissa::Frequency => {
                    let lam = frequency_to_wavelength(r.abscissa);
                    (lam, flux_nu_to_flux_lambda(r.flux, lam))
                }
                Abscissa::Wavelength => (r.abscissa, r.flux),
            })
            .collect();

        if let Some(bad) = points.iter().position(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(ComparisonError::MalformedInput {
                path: sample.source.clone(),
                line: sample.records[bad].line,
                reason: "non-finite value after unit conversion".to_string(),
            });
        }

        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        if let Some(pair) = points.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ComparisonError::NonMonotonic {
                path: sample.source.clone(),
                x: pair[0].0,
            });
        }

        Ok(Self {
            label: label.into(),
            source: sample.source.clone(),
            points,
        })
    }

    /// Builds a curve from points that are already known to be valid.
    /// Points are sorted; callers are trusted not to pass duplicates.
    pub fn from_points(label: impl Into<String>, mut points: Vec<(f64, f64)>) -> Self {
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        Self {
            label: label.into(),
            source: PathBuf::new(),
            points,
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// The wavelength domain `[min, max]` covered by the curve.
    pub fn domain(&self) -> (f64, f64) {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first.0, last.0),
            _ => (f64::NAN, f64::NAN),
        }
    }

    /// Linear interpolation at `x`. Fails instead of extrapolating.
    pub fn interpolate(&self, x: f64) -> ComparisonResult<f64> {
        let (min, max) = self.domain();
        if !(x >= min && x <= max) {
            return Err(ComparisonError::InterpolationDomain { x, min, max });
        }
        Ok(interp_one(x, &self.points))
    }

    /// The part of the curve inside `[x0, x1]`, with segments that cross an
    /// edge cut at the edge by interpolation.
    pub fn clipped(&self, x0: f64, x1: f64) -> Vec<(f64, f64)> {
        let (min, max) = self.domain();
        let mut out = Vec::new();
        if min <= x0 && x0 <= max {
            out.push((x0, interp_one(x0, &self.points)));
        }
        out.extend(self.points.iter().copied().filter(|&(x, _)| x > x0 && x < x1));
        if x1 > x0 && min <= x1 && x1 <= max {
            out.push((x1, interp_one(x1, &self.points)));
        }
        out
    }

    /// Divides every flux value by the interpolated flux at `reference`.
    pub fn normalize_at(self, reference: f64) -> ComparisonResult<NormalizedCurve> {
        let scale = self.interpolate(reference)?;
        if scale == 0.0 || !scale.is_finite() {
            return Err(ComparisonError::DegenerateNormalization {
                x: reference,
                value: scale,
            });
        }
        let points = self.points.iter().map(|&(x, y)| (x, y / scale)).collect();
        Ok(NormalizedCurve {
            curve: Curve { points, ..self },
            reference,
            scale,
        })
    }
}

impl NormalizedCurve {
    pub fn label(&self) -> &str {
        &self.curve.label
    }

    pub fn points(&self) -> &[(f64, f64)] {
        self.curve.points()
    }
}

/// Interpolates a single value from ascending `(x, y)` points, clamping at the ends.
fn interp_one(x: f64, points: &[(f64, f64)]) -> f64 {
    let (first, last) = (points[0], points[points.len() - 1]);
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }

    let idx = points.partition_point(|&(px, _)| px < x);
    if points[idx].0 == x {
        return points[idx].1;
    }
    let (x0, y0) = points[idx - 1];
    let (x1, y1) = points[idx];
    let t = (x - x0) / (x1 - x0);
    y0 + t * (y1 - y0)
}

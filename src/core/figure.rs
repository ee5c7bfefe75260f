//! # Figure Module / 图形模块
//!
//! An explicit figure object holding the curves and axis limits of one report
//! page. A fresh `Figure` is created for every comparison, so nothing leaks
//! between cases.
//!
//! 显式的图形对象，保存单个报告页面的曲线和坐标轴范围。
//! 每次比较都会创建新的 `Figure`，因此用例之间不会互相影响。

use crate::core::curve::NormalizedCurve;

/// Default visible wavelength range in ångström.
pub const DEFAULT_X_RANGE: (f64, f64) = (2000.0, 10000.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    x_range: Option<(f64, f64)>,
    curves: Vec<NormalizedCurve>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: "Wavelength (Å)".to_string(),
            y_label: "Normalized flux".to_string(),
            x_range: None,
            curves: Vec::new(),
        }
    }

    pub fn add_curve(&mut self, curve: NormalizedCurve) {
        self.curves.push(curve);
    }

    pub fn curves(&self) -> &[NormalizedCurve] {
        &self.curves
    }

    /// Restricts the visible x-axis. An empty or inverted range is ignored.
    pub fn set_x_range(&mut self, min: f64, max: f64) {
        if min < max {
            self.x_range = Some((min, max));
        }
    }

    /// The visible x-domain: the explicit range if one was set, otherwise the
    /// union of all curve domains.
    pub fn x_range(&self) -> (f64, f64) {
        if let Some(range) = self.x_range {
            return range;
        }
        self.curves
            .iter()
            .map(|c| c.curve.domain())
            .fold(None, |acc: Option<(f64, f64)>, (lo, hi)| match acc {
                None => Some((lo, hi)),
                Some((a, b)) => Some((a.min(lo), b.max(hi))),
            })
            .unwrap_or(DEFAULT_X_RANGE)
    }

    /// Y-limits fitted to the curves as clipped to the visible x-range, with a 5% margin.
    pub fn y_range(&self) -> (f64, f64) {
        let (x0, x1) = self.x_range();
        let (lo, hi) = self
            .curves
            .iter()
            .flat_map(|c| c.curve.clipped(x0, x1))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| (lo.min(y), hi.max(y)));

        if !lo.is_finite() || !hi.is_finite() {
            return (0.0, 2.0);
        }
        let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
        (lo - pad, hi + pad)
    }
}

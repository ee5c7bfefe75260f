//! # Comparison Execution Module / 比较执行模块
//!
//! The spectrum comparison pipeline for a single case: launch the simulation,
//! load and normalize both spectra, plot them onto one figure, append the
//! figure to the report, optionally wait for an acknowledgment, and remove
//! the simulation's artifacts.
//!
//! 单个用例的光谱比较流程：启动模拟，加载并归一化两条光谱，将其绘制到同一图形上，
//! 将图形追加到报告，可选地等待确认，并删除模拟产生的产物。

use colored::*;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::{
    compare::{self, Deviation},
    config::ComparisonCase,
    curve::{Curve, NormalizedCurve},
    error::{ComparisonError, ComparisonResult},
    figure::Figure,
    models::{CaseReport, CaseResult},
    spectrum::load_spectrum,
};
use crate::infra::{
    command::{LaunchSpec, run_launch},
    fs::{Workspace, remove_artifacts},
    prompt::Acknowledge,
    t,
};
use crate::reporting::{
    page::{ReportPage, ReportSink},
    plot::render_svg,
};

/// Label of the simulation curve on the report page.
pub const MODEL_LABEL: &str = "model";
/// Label of the reference curve on the report page.
pub const BASELINE_LABEL: &str = "baseline";

/// Everything produced by a successful comparison.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub figure: Figure,
    pub report: CaseReport,
    pub output: String,
}

/// Builds the comparison figure from the spectrum files in `workdir`.
///
/// Both curves are normalized at the case's reference wavelength and the
/// visible x-range is set from the case.
pub fn build_figure(case: &ComparisonCase, workdir: &Path) -> ComparisonResult<Figure> {
    let mut figure = Figure::new(case.name.clone());

    let model = load_normalized(MODEL_LABEL, workdir, case, Spectrum::Model)?;
    figure.add_curve(model);

    let baseline = load_normalized(BASELINE_LABEL, workdir, case, Spectrum::Baseline)?;
    figure.add_curve(baseline);

    let [lo, hi] = case.x_range;
    figure.set_x_range(lo, hi);
    Ok(figure)
}

enum Spectrum {
    Model,
    Baseline,
}

fn load_normalized(
    label: &str,
    workdir: &Path,
    case: &ComparisonCase,
    which: Spectrum,
) -> ComparisonResult<NormalizedCurve> {
    let (file, skip_rows, abscissa) = match which {
        Spectrum::Model => (&case.model.file, case.model.skip_rows, case.model.abscissa),
        Spectrum::Baseline => (&case.baseline.file, case.baseline.skip_rows, case.baseline.abscissa),
    };
    let sample = load_spectrum(&workdir.join(file), skip_rows)?;
    let curve = Curve::from_sample(label, &sample, abscissa)?.normalize_at(case.reference_wavelength)?;
    log::debug!(
        "{}: {} normalized by {:e} at {} Å ({} points)",
        case.name,
        label,
        curve.scale,
        curve.reference,
        curve.points().len()
    );
    Ok(curve)
}

/// Deviation of the model curve from the baseline within the figure's x-range.
pub fn figure_deviation(figure: &Figure) -> Option<Deviation> {
    match figure.curves() {
        [model, baseline, ..] => compare::deviation(model, baseline, figure.x_range()),
        _ => None,
    }
}

/// Runs one comparison case in `workdir`.
///
/// The steps run in a fixed order: launch, build the figure, append it to
/// `report`, acknowledge (when `pause` is given), clean up. Cleanup runs even
/// when an earlier step fails; the earlier error is then returned and a
/// cleanup error is only logged.
pub async fn run_comparison(
    case: &ComparisonCase,
    workdir: &Path,
    report: &mut dyn ReportSink,
    pause: Option<Arc<dyn Acknowledge>>,
    cancel: &CancellationToken,
) -> ComparisonResult<ComparisonOutcome> {
    let body = compare_in(case, workdir, report, pause, cancel).await;
    let cleanup = remove_artifacts(workdir, &case.cleanup);

    match (body, cleanup) {
        (Ok(mut outcome), Ok(removed)) => {
            outcome.report.removed = removed.iter().map(|p| p.display().to_string()).collect();
            Ok(outcome)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(_)) => Err(e),
        (Err(e), Err(cleanup_err)) => {
            log::warn!("{}: cleanup after failure also failed: {cleanup_err}", case.name);
            Err(e)
        }
    }
}

impl ComparisonOutcome {
    /// Fails with `DeviationExceeded` when the curves differ by more than `limit`,
    /// and with `NoOverlap` when a limit is set but nothing could be compared.
    pub fn check_deviation(&self, limit: Option<f64>) -> ComparisonResult<()> {
        match (limit, self.report.deviation) {
            (Some(limit), Some(dev)) if dev.max_abs > limit => Err(ComparisonError::DeviationExceeded {
                max: dev.max_abs,
                limit,
            }),
            (Some(_), None) => {
                let (min, max) = self.figure.x_range();
                Err(ComparisonError::NoOverlap { min, max })
            }
            _ => Ok(()),
        }
    }
}

async fn compare_in(
    case: &ComparisonCase,
    workdir: &Path,
    report: &mut dyn ReportSink,
    pause: Option<Arc<dyn Acknowledge>>,
    cancel: &CancellationToken,
) -> ComparisonResult<ComparisonOutcome> {
    let spec = LaunchSpec::from_case(case)?;
    let timeout = case.timeout_secs.map(Duration::from_secs);
    let launched = run_launch(&spec, workdir, timeout, cancel).await?;
    log::debug!("{}: `{}` finished in {:.2?}", case.name, spec.display(), launched.duration);

    let figure = build_figure(case, workdir)?;
    let deviation = figure_deviation(&figure);

    let svg = render_svg(&figure).map_err(ComparisonError::Report)?;
    let page = report
        .append_page(ReportPage {
            title: case.name.clone(),
            svg: svg.clone(),
        })
        .map_err(|e| ComparisonError::Report(format!("{e:#}")))?;

    if let Some(pause) = pause {
        acknowledge(&case.name, &svg, pause).await?;
    }

    let [model_scale, baseline_scale] = match figure.curves() {
        [m, b, ..] => [m.scale, b.scale],
        _ => [f64::NAN, f64::NAN],
    };

    Ok(ComparisonOutcome {
        figure,
        report: CaseReport {
            page,
            model_scale,
            baseline_scale,
            deviation,
            removed: Vec::new(),
        },
        output: launched.output,
    })
}

/// Writes the page to a preview file and blocks (off the async threads) until acknowledged.
async fn acknowledge(title: &str, svg: &str, pause: Arc<dyn Acknowledge>) -> ComparisonResult<()> {
    let mut preview = tempfile::Builder::new()
        .prefix("spectrum_regress_preview_")
        .suffix(".svg")
        .tempfile()
        .map_err(|e| ComparisonError::Acknowledge(e.to_string()))?;
    preview
        .write_all(svg.as_bytes())
        .and_then(|_| preview.flush())
        .map_err(|e| ComparisonError::Acknowledge(e.to_string()))?;

    let title = title.to_string();
    tokio::task::spawn_blocking(move || {
        let result = pause.acknowledge(&title, preview.path());
        drop(preview);
        result
    })
    .await
    .map_err(|e| ComparisonError::Acknowledge(e.to_string()))?
    .map_err(|e| ComparisonError::Acknowledge(format!("{e:#}")))
}

/// Runs a case end to end and folds the outcome into a [`CaseResult`].
///
/// Prepares the working directory (in place or as an isolated copy), runs the
/// comparison and prints progress lines.
pub async fn run_case(
    case: ComparisonCase,
    report: &mut dyn ReportSink,
    pause: Option<Arc<dyn Acknowledge>>,
    cancel: CancellationToken,
    locale: &str,
) -> CaseResult {
    if cancel.is_cancelled() {
        return CaseResult::Skipped { case };
    }

    println!("{}", t!("run.running_case", locale = locale, name = &case.name).blue());
    let start = Instant::now();

    let workspace = if case.isolate {
        Workspace::isolated(&case.directory, &case.name)
    } else {
        Workspace::in_place(&case.directory)
    };

    let result = match workspace {
        Ok(ws) => run_comparison(&case, ws.path(), report, pause, &cancel).await,
        Err(e) => Err(e),
    };
    let duration = start.elapsed();
    let secs = format!("{:.2}", duration.as_secs_f64());

    let (error, output, case_report) = match result {
        Ok(outcome) => match outcome.check_deviation(case.max_deviation) {
            Ok(()) => {
                println!(
                    "{}",
                    t!("run.case_passed", locale = locale, name = &case.name, duration = &secs).green()
                );
                return CaseResult::Passed {
                    case,
                    report: outcome.report,
                    output: outcome.output,
                    duration,
                };
            }
            Err(e) => (e, outcome.output, Some(outcome.report)),
        },
        Err(ComparisonError::Cancelled) => return CaseResult::Skipped { case },
        Err(e) => {
            let output = e.command_output().unwrap_or_default().to_string();
            (e, output, None)
        }
    };

    println!(
        "{}",
        t!("run.case_failed", locale = locale, name = &case.name, duration = &secs).red()
    );
    CaseResult::Failed {
        reason: error.reason(),
        message: error.to_string(),
        case,
        output,
        report: case_report,
        duration,
    }
}

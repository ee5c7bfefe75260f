//! # Comparison Pipeline Integration Tests / 比较流程集成测试
//!
//! Runs whole cases against a fake simulation: launch, normalization, the
//! appended report page, acknowledgment and cleanup.
//!
//! 针对模拟的替身运行完整用例：启动、归一化、追加的报告页面、确认和清理。

#![cfg(unix)]

mod common;

use anyhow::Result;
use spectrum_regress::core::config::ComparisonCase;
use spectrum_regress::core::error::ComparisonError;
use spectrum_regress::core::execution::{BASELINE_LABEL, MODEL_LABEL, build_figure, run_case, run_comparison};
use spectrum_regress::core::models::{CaseResult, FailureReason};
use spectrum_regress::core::spectrum::Abscissa;
use spectrum_regress::infra::prompt::Acknowledge;
use spectrum_regress::reporting::{PageBuffer, ReportSink};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

fn fake_case(name: &str, dir: &Path) -> ComparisonCase {
    ComparisonCase {
        name: name.to_string(),
        directory: dir.to_path_buf(),
        program: Some("sh".to_string()),
        args: vec!["-c".to_string(), common::FAKE_SIMULATION.to_string()],
        timeout_secs: Some(30),
        ..ComparisonCase::default()
    }
}

/// Records every acknowledgment instead of waiting for a person.
#[derive(Default)]
struct RecordingAck {
    seen: Mutex<Vec<(String, bool)>>,
}

impl Acknowledge for RecordingAck {
    fn acknowledge(&self, title: &str, preview: &Path) -> Result<()> {
        let ok = std::fs::read_to_string(preview)?.contains("<svg");
        self.seen.lock().unwrap().push((title.to_string(), ok));
        Ok(())
    }
}

#[test]
fn test_figure_normalizes_both_curves_at_reference() {
    let dir = tempfile::tempdir().unwrap();
    common::write_spectra(dir.path());
    let case = fake_case("figure", dir.path());

    let figure = build_figure(&case, dir.path()).unwrap();
    assert_eq!(figure.x_range(), (2000.0, 10000.0));

    let curves = figure.curves();
    assert_eq!(curves.len(), 2);
    assert_eq!(curves[0].label(), MODEL_LABEL);
    assert_eq!(curves[1].label(), BASELINE_LABEL);

    for curve in curves {
        let at_ref = curve.curve.interpolate(8000.0).unwrap();
        assert!((at_ref - 1.0).abs() < 1e-9, "{} is {at_ref} at 8000 Å", curve.label());
    }

    // flux_nu / lambda^2 at 10000 Å relative to 8000 Å: 2.0 / 1e8 over 1.0 / 6.4e7.
    let model_last = curves[0].points().last().copied().unwrap();
    assert!((model_last.0 - 10000.0).abs() < 1e-6);
    assert!((model_last.1 - 1.28).abs() < 1e-9);
}

#[tokio::test]
async fn test_full_comparison_appends_one_page_and_cleans_up() {
    let dir = common::setup_simulation_dir();
    let case = fake_case("end-to-end", dir.path());
    let mut report = PageBuffer::new();

    let outcome = run_comparison(&case, dir.path(), &mut report, None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.page_count(), 1);
    assert_eq!(report.pages()[0].title, "end-to-end");
    assert!(report.pages()[0].svg.contains("<svg"));
    assert_eq!(outcome.report.page, 1);
    assert!(outcome.output.contains("simulation done"));

    for gone in ["out_spectrum_1.dat", "ray_1", "ray_2", "gomc"] {
        assert!(!dir.path().join(gone).exists(), "{gone} should have been removed");
    }
    assert!(dir.path().join("spectrum_1.dat").exists());
    assert!(dir.path().join("synow_spectrum.dat").exists());
    assert_eq!(outcome.report.removed.len(), 4);

    let deviation = outcome.report.deviation.unwrap();
    assert!((deviation.max_abs - 0.72).abs() < 1e-9);
    assert!((deviation.at_wavelength - 10000.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_pause_sees_the_rendered_page() {
    let dir = common::setup_simulation_dir();
    let case = fake_case("paused", dir.path());
    let ack = Arc::new(RecordingAck::default());
    let mut report = PageBuffer::new();

    run_comparison(&case, dir.path(), &mut report, Some(ack.clone() as Arc<dyn Acknowledge>), &CancellationToken::new())
        .await
        .unwrap();

    let seen = ack.seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[("paused".to_string(), true)]);
}

#[tokio::test]
async fn test_failed_simulation_still_cleans_up() {
    let dir = common::setup_simulation_dir();
    let mut case = fake_case("crashing", dir.path());
    case.args = vec!["-c".into(), "touch ray_7 gomc; echo diverged; exit 2".into()];
    let mut report = PageBuffer::new();

    let err = run_comparison(&case, dir.path(), &mut report, None, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ComparisonError::ExternalCommand { .. }));
    assert_eq!(report.page_count(), 0);
    assert!(!dir.path().join("ray_7").exists());
    assert!(!dir.path().join("gomc").exists());
}

#[tokio::test]
async fn test_missing_model_spectrum_is_an_input_failure() {
    let dir = common::setup_simulation_dir();
    let mut case = fake_case("no-output", dir.path());
    case.args = vec!["-c".into(), "true".into()];

    let result = run_case(case, &mut PageBuffer::new(), None, CancellationToken::new(), "en").await;
    match result {
        CaseResult::Failed { reason, report, .. } => {
            assert_eq!(reason, FailureReason::InputFile);
            assert!(report.is_none());
        }
        other => panic!("expected failure, got {other}"),
    }
}

#[tokio::test]
async fn test_deviation_limit_fails_but_keeps_the_page() {
    let dir = common::setup_simulation_dir();
    let mut case = fake_case("strict", dir.path());
    case.max_deviation = Some(0.1);
    let mut report = PageBuffer::new();

    let result = run_case(case, &mut report, None, CancellationToken::new(), "en").await;
    match &result {
        CaseResult::Failed { reason, report: Some(page), .. } => {
            assert_eq!(*reason, FailureReason::Deviation);
            assert_eq!(page.page, 1);
        }
        other => panic!("expected deviation failure, got {other}"),
    }
    assert_eq!(report.page_count(), 1);
    assert!(result.is_unexpected_failure());
}

/// Wavelength-gridded spectra whose sample points never coincide: the model
/// at 7000 and 9000 Å, the baseline at 7500, 8000 and 8500 Å.
fn interleaved_case(name: &str, dir: &Path) -> ComparisonCase {
    std::fs::write(dir.join("spectrum_1.dat"), "7000 1.0\n9000 1.0\n").unwrap();
    std::fs::write(dir.join("synow_spectrum.dat"), "7500 2.0\n8000 1.0\n8500 2.0\n").unwrap();
    let mut case = fake_case(name, dir);
    case.args = vec!["-c".into(), "true".into()];
    case.model.abscissa = Abscissa::Wavelength;
    case.model.skip_rows = 0;
    case.max_deviation = Some(0.0);
    case
}

#[tokio::test]
async fn test_deviation_limit_sees_baseline_only_features() {
    let dir = tempfile::tempdir().unwrap();
    let case = interleaved_case("interleaved", dir.path());

    let result = run_case(case, &mut PageBuffer::new(), None, CancellationToken::new(), "en").await;
    match result {
        CaseResult::Failed { reason, report: Some(page), .. } => {
            assert_eq!(reason, FailureReason::Deviation);
            let deviation = page.deviation.unwrap();
            assert_eq!(deviation.samples, 3);
            assert!((deviation.max_abs - 1.0).abs() < 1e-12);
        }
        other => panic!("expected deviation failure, got {other}"),
    }
}

#[tokio::test]
async fn test_deviation_limit_without_overlap_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut case = interleaved_case("disjoint", dir.path());
    case.x_range = [2000.0, 7400.0];

    let result = run_case(case, &mut PageBuffer::new(), None, CancellationToken::new(), "en").await;
    match result {
        CaseResult::Failed { reason, message, report: Some(page), .. } => {
            assert_eq!(reason, FailureReason::Deviation);
            assert!(message.contains("no common wavelengths"), "{message}");
            assert!(page.deviation.is_none());
        }
        other => panic!("expected deviation failure, got {other}"),
    }
}

#[tokio::test]
async fn test_isolated_case_leaves_source_directory_untouched() {
    let dir = common::setup_simulation_dir();
    let mut case = fake_case("isolated", dir.path());
    case.isolate = true;

    let result = run_case(case, &mut PageBuffer::new(), None, CancellationToken::new(), "en").await;
    assert!(matches!(result, CaseResult::Passed { .. }), "{result}");

    let entries: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries, vec![dir.path().join("synow_spectrum.dat")]);
}

#[tokio::test]
async fn test_cancelled_before_start_is_skipped() {
    let dir = common::setup_simulation_dir();
    let token = CancellationToken::new();
    token.cancel();

    let result = run_case(fake_case("late", dir.path()), &mut PageBuffer::new(), None, token, "en").await;
    assert!(matches!(result, CaseResult::Skipped { .. }));
}

#[tokio::test]
async fn test_timeout_is_reported_as_timeout() {
    let dir = common::setup_simulation_dir();
    let mut case = fake_case("slow", dir.path());
    case.args = vec!["-c".into(), "sleep 5".into()];
    case.timeout_secs = Some(1);

    let result = run_case(case, &mut PageBuffer::new(), None, CancellationToken::new(), "en").await;
    match result {
        CaseResult::Failed { reason, .. } => assert_eq!(reason, FailureReason::Timeout),
        other => panic!("expected timeout, got {other}"),
    }
}

#[test]
fn test_cleanup_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ray_1"), "x").unwrap();
    let patterns = ComparisonCase::default().cleanup;

    let first = spectrum_regress::infra::fs::remove_artifacts(dir.path(), &patterns).unwrap();
    let second = spectrum_regress::infra::fs::remove_artifacts(dir.path(), &patterns).unwrap();
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}

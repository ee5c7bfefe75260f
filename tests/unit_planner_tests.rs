//! # Planner Unit Tests / 执行计划单元测试

use spectrum_regress::core::config::{ComparisonCase, SpectrumSuite};
use spectrum_regress::core::planner::{PlanOptions, plan_execution};
use std::path::PathBuf;

fn case(name: &str, dir: &str) -> ComparisonCase {
    ComparisonCase {
        name: name.to_string(),
        directory: PathBuf::from(dir),
        command: Some("./gomc".to_string()),
        ..ComparisonCase::default()
    }
}

fn suite(cases: Vec<ComparisonCase>) -> SpectrumSuite {
    SpectrumSuite {
        language: "en".to_string(),
        viewer: None,
        cases,
    }
}

fn names(cases: &[ComparisonCase]) -> Vec<&str> {
    cases.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn test_keeps_suite_order_and_moves_flaky_cases_last() {
    let mut flaky = case("flaky", "c");
    flaky.allow_failure = vec![std::env::consts::OS.to_string()];
    let s = suite(vec![flaky, case("a", "a"), case("b", "b")]);

    let plan = plan_execution(s, &PlanOptions::default()).unwrap();
    assert_eq!(names(&plan.cases_to_run), vec!["a", "b", "flaky"]);
    assert_eq!(plan.flaky_cases_count, 1);
    assert!(!plan.is_distributed);
}

#[test]
fn test_selection_by_name() {
    let s = suite(vec![case("a", "a"), case("b", "b"), case("c", "c")]);
    let options = PlanOptions {
        selected: vec!["c".into(), "a".into()],
        ..PlanOptions::default()
    };
    let plan = plan_execution(s, &options).unwrap();
    assert_eq!(names(&plan.cases_to_run), vec!["a", "c"]);
}

#[test]
fn test_unknown_selection_is_an_error() {
    let s = suite(vec![case("a", "a")]);
    let options = PlanOptions {
        selected: vec!["nope".into()],
        ..PlanOptions::default()
    };
    let err = plan_execution(s, &options).unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[test]
fn test_sharding_splits_round_robin() {
    let cases = || (0..5).map(|i| case(&format!("c{i}"), &format!("d{i}"))).collect();
    let shard = |index| {
        let options = PlanOptions {
            total_runners: Some(2),
            runner_index: Some(index),
            ..PlanOptions::default()
        };
        plan_execution(suite(cases()), &options).unwrap()
    };

    let first = shard(0);
    let second = shard(1);
    assert!(first.is_distributed);
    assert_eq!(names(&first.cases_to_run), vec!["c0", "c2", "c4"]);
    assert_eq!(names(&second.cases_to_run), vec!["c1", "c3"]);
}

#[test]
fn test_sharding_requires_both_values_in_range() {
    let only_total = PlanOptions {
        total_runners: Some(2),
        ..PlanOptions::default()
    };
    assert!(plan_execution(suite(vec![case("a", "a")]), &only_total).is_err());

    let out_of_range = PlanOptions {
        total_runners: Some(2),
        runner_index: Some(2),
        ..PlanOptions::default()
    };
    assert!(plan_execution(suite(vec![case("a", "a")]), &out_of_range).is_err());
}

#[test]
fn test_interactive_forces_one_job() {
    let options = PlanOptions {
        jobs: Some(8),
        interactive: true,
        ..PlanOptions::default()
    };
    let plan = plan_execution(suite(vec![case("a", "a"), case("b", "b")]), &options).unwrap();
    assert_eq!(plan.jobs, 1);
}

#[test]
fn test_shared_directory_forces_one_job_unless_isolated() {
    let options = PlanOptions {
        jobs: Some(4),
        ..PlanOptions::default()
    };

    let plan = plan_execution(suite(vec![case("a", "same"), case("b", "same")]), &options).unwrap();
    assert_eq!(plan.jobs, 1);
    assert_eq!(plan.shared_directory, Some(PathBuf::from("same")));

    let mut isolated = case("b", "same");
    isolated.isolate = true;
    let plan = plan_execution(suite(vec![case("a", "same"), isolated]), &options).unwrap();
    assert_eq!(plan.jobs, 4);
    assert!(plan.shared_directory.is_none());
}

#[test]
fn test_jobs_never_zero() {
    let options = PlanOptions {
        jobs: Some(0),
        ..PlanOptions::default()
    };
    let plan = plan_execution(suite(vec![case("a", "a")]), &options).unwrap();
    assert_eq!(plan.jobs, 1);
}

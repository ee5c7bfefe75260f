//! # Execution Planner Module / 执行计划模块
//!
//! This module decides which comparison cases run, in which order, and how
//! many may run at once: selection by name, CI sharding, and the parallelism
//! limit derived from interactivity and shared working directories.
//!
//! 此模块决定运行哪些比较用例、按什么顺序运行以及可以同时运行多少个：
//! 按名称选择、CI 分片，以及根据交互模式和共享工作目录得出的并行度限制。

use anyhow::{Result, bail};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::core::config::{ComparisonCase, SpectrumSuite};

/// Options that shape an execution plan, usually taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Only run these cases (by name). Empty means all.
    pub selected: Vec<String>,
    pub jobs: Option<usize>,
    pub interactive: bool,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
}

/// Represents a complete execution plan for a suite.
/// 表示套件的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Cases in report order.
    /// 按报告顺序排列的用例。
    pub cases_to_run: Vec<ComparisonCase>,
    /// Number of cases allowed to fail on the current platform.
    /// 在当前平台上允许失败的用例数量。
    pub flaky_cases_count: usize,
    /// How many cases may run concurrently.
    /// 可以并发运行的用例数量。
    pub jobs: usize,
    /// Set when parallelism was forced down to 1 by two in-place cases sharing a directory.
    pub shared_directory: Option<PathBuf>,
    pub is_distributed: bool,
}

/// Creates an execution plan for `suite`.
///
/// Cases keep their suite order, except that cases allowed to fail on this OS
/// are moved to the end. Sharding assigns case `i` to runner `i % total`.
pub fn plan_execution(suite: SpectrumSuite, options: &PlanOptions) -> Result<ExecutionPlan> {
    let mut cases = suite.cases;

    if !options.selected.is_empty() {
        let known: HashSet<&str> = cases.iter().map(|c| c.name.as_str()).collect();
        if let Some(unknown) = options.selected.iter().find(|s| !known.contains(s.as_str())) {
            bail!("unknown case '{unknown}'");
        }
        cases.retain(|c| options.selected.iter().any(|s| *s == c.name));
    }

    let (safe_cases, flaky_cases): (Vec<_>, Vec<_>) =
        cases.into_iter().partition(|case| !case.is_allowed_to_fail_here());
    let flaky_cases_count = flaky_cases.len();
    let mut combined = safe_cases;
    combined.extend(flaky_cases);

    let (cases_to_run, is_distributed) = match (options.total_runners, options.runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 || index >= total {
                bail!("Runner index must be less than total runners.");
            }
            let distributed = combined
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, case)| case)
                .collect();
            (distributed, true)
        }
        (None, None) => (combined, false),
        _ => bail!("Both --total-runners and --runner-index must be provided."),
    };

    let shared_directory = find_shared_directory(&cases_to_run);
    let jobs = if options.interactive || shared_directory.is_some() {
        1
    } else {
        options.jobs.unwrap_or(num_cpus::get() / 2 + 1).max(1)
    };

    Ok(ExecutionPlan {
        cases_to_run,
        flaky_cases_count,
        jobs,
        shared_directory,
        is_distributed,
    })
}

/// Two in-place cases in the same directory would race on the simulation's fixed output names.
fn find_shared_directory(cases: &[ComparisonCase]) -> Option<PathBuf> {
    let mut seen = HashSet::new();
    cases
        .iter()
        .filter(|c| !c.isolate)
        .map(|c| c.directory.clone())
        .find(|dir| !seen.insert(dir.clone()))
}

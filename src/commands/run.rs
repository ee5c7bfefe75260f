// src/commands/run.rs

use anyhow::{Context, Result};
use colored::*;
use futures::{StreamExt, stream};
use std::{fs, path::Path, path::PathBuf, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{ComparisonCase, SpectrumSuite},
        execution::run_case,
        models::CaseResult,
        planner::{self, PlanOptions},
    },
    infra::{
        prompt::{Acknowledge, ConsolePause},
        t,
    },
    reporting::{
        HtmlReport, PageBuffer, ReportSink, SvgDirectoryReport, print_summary, print_unexpected_failure_details,
    },
};

/// Parsed arguments of the `run` subcommand.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub config: PathBuf,
    pub report: Option<PathBuf>,
    pub svg_dir: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub interactive: bool,
    pub cases: Vec<String>,
    pub jobs: Option<usize>,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
}

/// Fans appended pages out to every configured sink.
struct Sinks {
    html: Option<HtmlReport>,
    svg: Option<SvgDirectoryReport>,
    count: usize,
}

impl ReportSink for Sinks {
    fn append_page(&mut self, page: crate::reporting::ReportPage) -> Result<usize> {
        if let Some(svg) = &mut self.svg {
            svg.append_page(page.clone())?;
        }
        if let Some(html) = &mut self.html {
            html.append_page(page)?;
        }
        self.count += 1;
        Ok(self.count)
    }

    fn page_count(&self) -> usize {
        self.count
    }
}

pub async fn execute(args: RunArgs, explicit_locale: Option<String>) -> Result<()> {
    let suite = SpectrumSuite::load(&args.config)?;
    let locale_owned = explicit_locale.unwrap_or_else(|| suite.language.clone());
    let locale = locale_owned.as_str();
    rust_i18n::set_locale(locale);

    println!(
        "{}",
        t!("loading_suite", locale = locale, path = args.config.display())
    );

    let viewer = suite.viewer.clone();
    let plan = planner::plan_execution(
        suite,
        &PlanOptions {
            selected: args.cases.clone(),
            jobs: args.jobs,
            interactive: args.interactive,
            total_runners: args.total_runners,
            runner_index: args.runner_index,
        },
    )?;

    if plan.flaky_cases_count > 0 {
        println!(
            "{}",
            t!("flaky_cases_found", locale = locale, count = plan.flaky_cases_count).yellow()
        );
    }
    if let Some(dir) = &plan.shared_directory {
        println!(
            "{}",
            t!("shared_directory_sequential", locale = locale, path = dir.display()).yellow()
        );
    }
    if let (Some(total), Some(index)) = (args.total_runners, args.runner_index) {
        println!(
            "{}",
            t!(
                "running_as_split_runner",
                locale = locale,
                index = index + 1,
                total = total,
                count = plan.cases_to_run.len()
            )
            .bold()
        );
    }

    if plan.cases_to_run.is_empty() {
        println!("{}", t!("no_cases_to_run", locale = locale).green());
        return Ok(());
    }

    let mut sinks = Sinks {
        html: args.report.as_ref().map(|_| HtmlReport::new()),
        svg: args.svg_dir.as_deref().map(SvgDirectoryReport::create).transpose()?,
        count: 0,
    };

    let pause: Option<Arc<dyn Acknowledge>> = args
        .interactive
        .then(|| Arc::new(ConsolePause::new(viewer, locale)) as Arc<dyn Acknowledge>);

    let stop_token = setup_signal_handler(locale);
    let results = run_cases(plan.cases_to_run, plan.jobs, &mut sinks, pause, stop_token, locale).await?;

    print_summary(&results, locale);

    if let (Some(path), Some(html)) = (&args.report, &sinks.html) {
        println!("\n{}", t!("writing_html_report", locale = locale, path = path.display()));
        if let Err(e) = html.write(path, &results, locale) {
            eprintln!("{} {:#}", t!("html_report_failed", locale = locale).red(), e);
        }
    }
    if let Some(path) = &args.json {
        write_json(path, &results)?;
    }

    let unexpected: Vec<_> = results.iter().filter(|r| r.is_unexpected_failure()).collect();
    if unexpected.is_empty() {
        println!("\n{}", t!("all_cases_passed", locale = locale).green().bold());
        Ok(())
    } else {
        print_unexpected_failure_details(&unexpected, locale);
        anyhow::bail!(t!("suite_failed", locale = locale, count = unexpected.len()).to_string());
    }
}

/// Runs the planned cases with at most `jobs` in flight.
///
/// With one job every case writes straight into `sink`. With more, each case
/// collects its page in a private buffer, and pages are moved to `sink` in
/// suite order as results arrive (the stream yields results in input order).
pub async fn run_cases(
    cases: Vec<ComparisonCase>,
    jobs: usize,
    sink: &mut dyn ReportSink,
    pause: Option<Arc<dyn Acknowledge>>,
    stop_token: CancellationToken,
    locale: &str,
) -> Result<Vec<CaseResult>> {
    if jobs <= 1 {
        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            results.push(run_case(case, sink, pause.clone(), stop_token.clone(), locale).await);
        }
        return Ok(results);
    }

    let mut ordered = stream::iter(cases.into_iter().map(|case| {
        let stop_token = stop_token.clone();
        let locale = locale.to_string();
        tokio::spawn(async move {
            let mut buffer = PageBuffer::new();
            let result = run_case(case, &mut buffer, None, stop_token, &locale).await;
            (result, buffer)
        })
    }))
    .buffered(jobs);

    let mut results = Vec::new();
    while let Some(joined) = ordered.next().await {
        let (mut result, buffer) = joined.context("comparison task panicked")?;
        let mut last_page = None;
        for page in buffer.into_pages() {
            last_page = Some(sink.append_page(page)?);
        }
        if let Some(page) = last_page {
            renumber(&mut result, page);
        }
        results.push(result);
    }
    Ok(results)
}

/// Rewrites the page number recorded in `result` after its page moved to the shared sink.
fn renumber(result: &mut CaseResult, page: usize) {
    match result {
        CaseResult::Passed { report, .. } => report.page = page,
        CaseResult::Failed { report: Some(report), .. } => report.page = page,
        _ => {}
    }
}

fn write_json(path: &Path, results: &[CaseResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
    fs::write(path, json).with_context(|| format!("Failed to write results file: {}", path.display()))
}

fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal", locale = locale.as_str()).yellow());
            token_clone.cancel();
        }
    });

    token
}

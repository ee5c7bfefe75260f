//! # HTML Reporting Module / HTML 报告模块
//!
//! A multi-page HTML report: a summary table of all case results followed by
//! one section per appended figure, with the SVG inlined.
//!
//! 多页 HTML 报告：所有用例结果的摘要表格，随后是每个追加图形的一个章节，SVG 内联嵌入。

use anyhow::{Context, Result};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;

use crate::core::models::CaseResult;
use crate::infra::t;
use crate::reporting::page::{ReportPage, ReportSink};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Collects pages in memory and renders them into a single HTML document.
/// 在内存中收集页面，并将其渲染为单个 HTML 文档。
#[derive(Debug, Default)]
pub struct HtmlReport {
    pages: Vec<ReportPage>,
}

impl HtmlReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[ReportPage] {
        &self.pages
    }

    /// Renders the summary table for `results` and every collected page.
    pub fn render(&self, results: &[CaseResult], locale: &str) -> Markup {
        let text = |key: &str| t!(key, locale = locale).to_string();

        let total = results.len();
        let passed = results.iter().filter(|r| matches!(r, CaseResult::Passed { .. })).count();
        let failed = results.iter().filter(|r| r.is_failure()).count();
        let skipped = total - passed - failed;
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (text("html_report.title")) }
                    style { (PreEscaped(HTML_STYLE)) }
                }
                body {
                    h1 { (text("html_report.main_header")) }
                    div.generated { (t!("html_report.generated_at", locale = locale, time = generated).to_string()) }

                    div.summary-container {
                        div.summary-item {
                            span.count { (total) }
                            span.label { (text("html_report.summary.total")) }
                        }
                        div.summary-item {
                            span.count.passed-text { (passed) }
                            span.label { (text("html_report.summary.passed")) }
                        }
                        div.summary-item {
                            span.count.failed-text { (failed) }
                            span.label { (text("html_report.summary.failed")) }
                        }
                        div.summary-item {
                            span.count.skipped-text { (skipped) }
                            span.label { (text("html_report.summary.skipped")) }
                        }
                    }

                    table {
                        thead {
                            tr {
                                th { (text("html_report.table.header.name")) }
                                th { (text("html_report.table.header.status")) }
                                th.numeric-cell { (text("html_report.table.header.page")) }
                                th.numeric-cell { (text("html_report.table.header.max_deviation")) }
                                th.duration-cell { (text("html_report.table.header.duration")) }
                            }
                        }
                        tbody {
                            @for result in results {
                                (result_row(result, locale))
                            }
                        }
                    }

                    @for (i, page) in self.pages.iter().enumerate() {
                        section.page id=(format!("page-{}", i + 1)) {
                            h2 { (i + 1) ". " (page.title) }
                            (PreEscaped(page.svg.as_str()))
                        }
                    }
                }
            }
        }
    }

    /// Writes the rendered report to `output_path`.
    ///
    /// # Errors
    /// Fails if the file cannot be written.
    pub fn write(&self, output_path: &Path, results: &[CaseResult], locale: &str) -> Result<()> {
        let markup = self.render(results, locale);
        fs::write(output_path, markup.into_string())
            .with_context(|| format!("Failed to write HTML report: {}", output_path.display()))?;
        Ok(())
    }
}

impl ReportSink for HtmlReport {
    fn append_page(&mut self, page: ReportPage) -> Result<usize> {
        self.pages.push(page);
        Ok(self.pages.len())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn result_row(result: &CaseResult, locale: &str) -> Markup {
    let duration = result
        .get_duration()
        .map(|d| format!("{:.2}s", d.as_secs_f64()))
        .unwrap_or_else(|| "N/A".to_string());
    let report = result.report();
    let page = report.map(|r| r.page);
    let deviation = report
        .and_then(|r| r.deviation)
        .map(|d| format!("{:.4}", d.max_abs))
        .unwrap_or_default();

    html! {
        tr {
            td { (result.case_name()) }
            td {
                div class=(format!("status-cell {}", result.get_status_class())) {
                    (result.get_status_str(locale))
                }
            }
            td.numeric-cell {
                @if let Some(page) = page {
                    a href=(format!("#page-{page}")) { (page) }
                }
            }
            td.numeric-cell { (deviation) }
            td.duration-cell { (duration) }
        }
        @if let CaseResult::Failed { reason, message, output, .. } = result {
            tr {
                td colspan="5" {
                    details {
                        summary { (reason.label(locale)) ": " (message) }
                        @if !output.trim().is_empty() {
                            pre.output-content { (output) }
                        }
                    }
                }
            }
        }
    }
}

//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints colorful, formatted summaries of comparison results to
//! the console with internationalization support.
//!
//! 此模块在控制台打印比较结果的彩色格式化摘要，支持国际化。

use colored::*;

use crate::core::models::CaseResult;
use crate::infra::t;

/// Prints a formatted summary of case results to the console.
///
/// # Output Format / 输出格式
/// ```text
/// --- Comparison Summary ---
///   - Passed           | silicon_atmosphere                       |      1.23s  page 1, max dev 0.0312
///   - Failed           | lte_atmosphere                           |      0.45s
///   - Skipped          | nlte_atmosphere                          |        N/A
/// ```
pub fn print_summary(results: &[CaseResult], locale: &str) {
    println!("\n{}", t!("summary_banner", locale = locale).bold());

    for result in results {
        let status_str = result.get_status_str(locale);
        let duration_str = result
            .get_duration()
            .map(|d| format!("{:.2?}", d))
            .unwrap_or_else(|| "N/A".to_string());

        let details = match result.report() {
            Some(report) => match report.deviation {
                Some(dev) => t!(
                    "summary_page_with_deviation",
                    locale = locale,
                    page = report.page,
                    deviation = format!("{:.4}", dev.max_abs)
                )
                .to_string(),
                None => t!("summary_page", locale = locale, page = report.page).to_string(),
            },
            None => String::new(),
        };

        let status_colored = match result {
            CaseResult::Passed { .. } => status_str.green(),
            CaseResult::Failed { .. } if result.is_allowed_failure() => status_str.yellow(),
            CaseResult::Failed { .. } => status_str.red(),
            CaseResult::Skipped { .. } => status_str.dimmed(),
        };

        println!(
            "  - {:<18} | {:<40} | {:>10}  {}",
            status_colored,
            result.case_name(),
            duration_str,
            details.dimmed()
        );
    }
}

/// Prints detailed information about unexpected failures: the failure
/// category, the error message and the captured simulation output.
///
/// 打印意外失败的详细信息：失败类别、错误消息以及捕获的模拟输出。
pub fn print_unexpected_failure_details(unexpected_failures: &[&CaseResult], locale: &str) {
    if unexpected_failures.is_empty() {
        return;
    }

    println!("\n{}", t!("unexpected_failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in unexpected_failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            unexpected_failures.len(),
            t!("report_header_failure", locale = locale).red(),
            result.case_name().cyan()
        );

        if let CaseResult::Failed {
            reason,
            message,
            output,
            ..
        } = result
        {
            println!("({}) {}", reason.label(locale).yellow(), message);
            if !output.trim().is_empty() {
                println!("\n--- {} ---\n", t!("simulation_log", locale = locale).yellow());
                println!("{}", output.trim_end());
            }
            println!("\n{}", "-".repeat(80));
        }
    }
}

//! # Data Models Module / 数据模型模块
//!
//! This module defines the result types produced by the comparison runner:
//! per-case outcomes, failure categories, and the details of a successful
//! comparison.
//!
//! 此模块定义比较运行器产生的结果类型：
//! 每个用例的结果、失败类别以及成功比较的详细信息。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::core::compare::Deviation;
use crate::core::config::ComparisonCase;
use crate::infra::t;

/// Enumerates the possible reasons for a comparison case failure.
/// 枚举比较用例失败的可能原因。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum FailureReason {
    /// The simulation could not be launched or exited unsuccessfully.
    /// 模拟无法启动或以失败状态退出。
    ExternalCommand,
    /// The simulation exceeded its configured timeout.
    /// 模拟超出了配置的超时时间。
    Timeout,
    /// A spectrum file was missing or could not be parsed.
    /// 光谱文件缺失或无法解析。
    InputFile,
    /// A curve could not be normalized at the reference wavelength.
    /// 曲线无法在参考波长处归一化。
    Normalization,
    /// The normalized curves differ by more than the configured limit.
    /// 归一化曲线的差异超过配置的限制。
    Deviation,
    /// Rendering, storing or acknowledging the report page failed.
    /// 渲染、存储或确认报告页面失败。
    Report,
    /// The working directory could not be prepared.
    /// 无法准备工作目录。
    Setup,
    /// Generated artifacts could not be removed.
    /// 无法删除生成的产物。
    Cleanup,
    /// The run was interrupted before the case finished.
    /// 运行在用例完成前被中断。
    Cancelled,
}

impl FailureReason {
    pub fn label(&self, locale: &str) -> String {
        let key = match self {
            FailureReason::ExternalCommand => "reason.external_command",
            FailureReason::Timeout => "reason.timeout",
            FailureReason::InputFile => "reason.input_file",
            FailureReason::Normalization => "reason.normalization",
            FailureReason::Deviation => "reason.deviation",
            FailureReason::Report => "reason.report",
            FailureReason::Setup => "reason.setup",
            FailureReason::Cleanup => "reason.cleanup",
            FailureReason::Cancelled => "reason.cancelled",
        };
        t!(key, locale = locale).to_string()
    }
}

/// Details of a comparison that produced a report page.
/// 生成了报告页面的比较的详细信息。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    /// 1-based page number in the report.
    pub page: usize,
    /// Raw model flux at the reference wavelength (the normalization divisor).
    pub model_scale: f64,
    pub baseline_scale: f64,
    pub deviation: Option<Deviation>,
    /// Paths removed during cleanup.
    pub removed: Vec<String>,
}

/// Represents the final result of a single comparison case.
/// 表示单个比较用例的最终结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CaseResult {
    /// The comparison completed and its page was appended to the report.
    /// 比较完成，页面已追加到报告中。
    Passed {
        case: ComparisonCase,
        report: CaseReport,
        /// Combined stdout/stderr of the simulation.
        /// 模拟的合并标准输出/标准错误。
        output: String,
        duration: Duration,
    },
    /// The comparison failed. `report` is present when a page was still produced.
    /// 比较失败。若仍生成了页面，则 `report` 存在。
    Failed {
        case: ComparisonCase,
        reason: FailureReason,
        message: String,
        output: String,
        report: Option<CaseReport>,
        duration: Duration,
    },
    /// The case was not run (interrupted before it started).
    /// 用例未运行（在开始前被中断）。
    Skipped { case: ComparisonCase },
}

impl CaseResult {
    pub fn case(&self) -> &ComparisonCase {
        match self {
            CaseResult::Passed { case, .. }
            | CaseResult::Failed { case, .. }
            | CaseResult::Skipped { case } => case,
        }
    }

    pub fn case_name(&self) -> &str {
        &self.case().name
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CaseResult::Failed { .. })
    }

    /// A failure that was not explicitly allowed for the current OS.
    pub fn is_unexpected_failure(&self) -> bool {
        match self {
            CaseResult::Failed { case, .. } => !case.is_allowed_to_fail_here(),
            _ => false,
        }
    }

    pub fn is_allowed_failure(&self) -> bool {
        match self {
            CaseResult::Failed { case, .. } => case.is_allowed_to_fail_here(),
            _ => false,
        }
    }

    pub fn report(&self) -> Option<&CaseReport> {
        match self {
            CaseResult::Passed { report, .. } => Some(report),
            CaseResult::Failed { report, .. } => report.as_ref(),
            CaseResult::Skipped { .. } => None,
        }
    }

    pub fn get_duration(&self) -> Option<Duration> {
        match self {
            CaseResult::Passed { duration, .. } | CaseResult::Failed { duration, .. } => Some(*duration),
            CaseResult::Skipped { .. } => None,
        }
    }

    /// CSS class used by the HTML report.
    pub fn get_status_class(&self) -> &'static str {
        match self {
            CaseResult::Passed { .. } => "status-Passed",
            CaseResult::Failed { reason, .. } => {
                if self.is_allowed_failure() {
                    "status-Allowed-Failure"
                } else if *reason == FailureReason::Timeout {
                    "status-Timeout"
                } else {
                    "status-Failed"
                }
            }
            CaseResult::Skipped { .. } => "status-Skipped",
        }
    }

    /// Gets the status of the result as a localized string for display.
    /// 以本地化字符串形式获取结果状态以供显示。
    pub fn get_status_str(&self, locale: &str) -> String {
        match self {
            CaseResult::Passed { .. } => t!("report.status_passed", locale = locale).to_string(),
            CaseResult::Failed { reason, .. } => {
                if *reason == FailureReason::Timeout {
                    t!("report.status_timeout", locale = locale).to_string()
                } else if self.is_allowed_failure() {
                    t!("report.status_allowed_failure", locale = locale).to_string()
                } else {
                    t!("report.status_failed", locale = locale).to_string()
                }
            }
            CaseResult::Skipped { .. } => t!("report.status_skipped", locale = locale).to_string(),
        }
    }

    pub fn get_output(&self) -> &str {
        match self {
            CaseResult::Passed { output, .. } | CaseResult::Failed { output, .. } => output,
            CaseResult::Skipped { .. } => "",
        }
    }
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseResult::Passed { case, .. } => write!(f, "{}: passed", case.name),
            CaseResult::Failed { case, reason, message, .. } => {
                write!(f, "{}: failed ({:?}): {}", case.name, reason, message)
            }
            CaseResult::Skipped { case } => write!(f, "{}: skipped", case.name),
        }
    }
}

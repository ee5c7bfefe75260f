//! # Reporting Module / 报告模块
//!
//! This module turns comparison figures into report pages and prints result
//! summaries. Pages go to a [`ReportSink`]: an HTML document or a directory of
//! SVG files.
//!
//! 此模块将比较图形转换为报告页面并打印结果摘要。
//! 页面写入 `ReportSink`：HTML 文档或 SVG 文件目录。

pub mod console;
pub mod html;
pub mod page;
pub mod plot;

// Re-export common reporting items
pub use console::{print_summary, print_unexpected_failure_details};
pub use html::HtmlReport;
pub use page::{PageBuffer, ReportPage, ReportSink, SvgDirectoryReport};

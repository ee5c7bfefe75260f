//! # Spectrum Regress Library / Spectrum Regress 库
//!
//! This library provides the core functionality for the Spectrum Regress tool,
//! a configuration-driven regression runner for radiative-transfer
//! simulations. Each case launches the simulation, normalizes its output
//! spectrum and a baseline spectrum at a reference wavelength, and overlays
//! both on a page of a multi-page report.
//!
//! 此库为 Spectrum Regress 工具提供核心功能，
//! 这是一个配置驱动的辐射转移模拟回归运行器。每个用例启动模拟，
//! 在参考波长处归一化其输出光谱和基准光谱，并将两者叠加绘制在多页报告的一页上。
//!
//! ## Modules / 模块
//!
//! - `core` - Spectrum model, normalization, configuration and the comparison pipeline
//! - `infra` - Process execution, file system operations and the interactive pause
//! - `reporting` - Plot rendering, report sinks and console summaries
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 光谱模型、归一化、配置和比较流程
//! - `infra` - 进程执行、文件系统操作和交互暂停
//! - `reporting` - 图形渲染、报告输出和控制台摘要
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod commands;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::execution;
pub use core::models;

/// Picks the UI language: an explicit choice if it is available, otherwise
/// the system locale, matched first in full (e.g. "zh-CN") and then by
/// language code (e.g. "en" from "en-US"), falling back to "en".
pub fn resolve_locale(explicit: Option<&str>) -> String {
    let available = rust_i18n::available_locales!();
    let wanted = explicit
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());

    if available.contains(&wanted.as_str()) {
        return wanted;
    }
    wanted
        .split('-')
        .next()
        .filter(|lang_code| available.contains(lang_code))
        .unwrap_or("en")
        .to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");

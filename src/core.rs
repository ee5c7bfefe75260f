//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Spectrum Regress:
//! spectrum loading, curve normalization, the figure model, suite
//! configuration, planning and the comparison pipeline itself.
//!
//! 此模块包含 Spectrum Regress 的核心功能：
//! 光谱加载、曲线归一化、图形模型、套件配置、执行计划以及比较流程本身。

pub mod compare;
pub mod config;
pub mod curve;
pub mod error;
pub mod execution;
pub mod figure;
pub mod models;
pub mod planner;
pub mod spectrum;

// Re-exports
pub use config::SpectrumSuite;
pub use error::ComparisonError;
pub use execution::{run_case, run_comparison};
pub use models::CaseResult;

//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Spectrum Regress,
//! including process execution, file system operations, the interactive
//! pause, and i18n support.
//!
//! 此模块为 Spectrum Regress 提供基础设施服务，
//! 包括进程执行、文件系统操作、交互暂停和国际化支持。

pub mod command;
pub mod fs;
pub mod prompt;

// Re-export i18n functions for easier access
pub use rust_i18n::t;

//! # Suite Initialization Module / 套件初始化模块
//!
//! An interactive wizard that writes a starter `SpectrumSuite.toml` with one
//! comparison case. `--non-interactive` writes the default suite directly.
//!
//! 通过交互式向导生成包含一个比较用例的 `SpectrumSuite.toml` 初始文件。
//! 使用 `--non-interactive` 时直接写入默认套件。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::{ComparisonCase, SpectrumSuite};
use crate::infra::t;

pub const DEFAULT_SUITE_FILE: &str = "SpectrumSuite.toml";

/// Runs the wizard in the current directory.
/// 在当前目录中运行向导。
pub fn run_init_wizard(language: &str, non_interactive: bool) -> Result<()> {
    init_in(Path::new(DEFAULT_SUITE_FILE), language, non_interactive)
}

/// Runs the wizard, writing the suite to `config_path`.
pub fn init_in(config_path: &Path, language: &str, non_interactive: bool) -> Result<()> {
    let theme = ColorfulTheme::default();

    if non_interactive {
        return write_config(config_path, &default_suite(language), language);
    }

    println!("\n{}", t!("init_wizard_welcome", locale = language).cyan().bold());
    println!("{}", t!("init_wizard_description", locale = language));

    if config_path.exists() {
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init_overwrite_prompt", locale = language, path = config_path.display()))
            .default(false)
            .interact()
            .context(t!("init_user_confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init_aborted", locale = language));
            return Ok(());
        }
    }

    let defaults = ComparisonCase::default();

    let name: String = Input::with_theme(&theme)
        .with_prompt(t!("init_case_name_prompt", locale = language))
        .default("synow-comparison".to_string())
        .interact_text()?;
    let directory: String = Input::with_theme(&theme)
        .with_prompt(t!("init_directory_prompt", locale = language))
        .default(".".to_string())
        .interact_text()?;
    let command: String = Input::with_theme(&theme)
        .with_prompt(t!("init_command_prompt", locale = language))
        .default("./gomc".to_string())
        .interact_text()?;
    let reference_wavelength: f64 = Input::with_theme(&theme)
        .with_prompt(t!("init_reference_prompt", locale = language))
        .default(defaults.reference_wavelength)
        .validate_with(|v: &f64| {
            if *v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(t!("init_reference_invalid", locale = language).to_string())
            }
        })
        .interact_text()?;
    let isolate = Confirm::with_theme(&theme)
        .with_prompt(t!("init_isolate_prompt", locale = language))
        .default(false)
        .interact()
        .context(t!("init_user_confirmation_failed", locale = language).to_string())?;

    let case = ComparisonCase {
        name,
        directory: PathBuf::from(directory),
        command: Some(command),
        reference_wavelength,
        isolate,
        timeout_secs: Some(600),
        ..defaults
    };
    case.validate()?;

    let suite = SpectrumSuite {
        language: language.to_string(),
        viewer: None,
        cases: vec![case],
    };
    write_config(config_path, &suite, language)
}

/// The suite written by `init --non-interactive`.
pub fn default_suite(language: &str) -> SpectrumSuite {
    SpectrumSuite {
        language: language.to_string(),
        viewer: None,
        cases: vec![ComparisonCase {
            name: "synow-comparison".to_string(),
            command: Some("./gomc".to_string()),
            timeout_secs: Some(600),
            ..ComparisonCase::default()
        }],
    }
}

fn write_config(path: &Path, suite: &SpectrumSuite, language: &str) -> Result<()> {
    let toml_string =
        toml::to_string_pretty(suite).context(t!("init_serialize_failed", locale = language).to_string())?;

    fs::write(path, toml_string)
        .with_context(|| t!("init_write_failed", locale = language, path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init_success_created", locale = language, path = path.display()).bold()
    );
    println!("{}", t!("init_usage_hint", locale = language));

    Ok(())
}

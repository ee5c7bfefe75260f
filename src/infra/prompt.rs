//! # Interactive Pause Module / 交互暂停模块
//!
//! The capability to show a freshly appended report page to a person and wait
//! for them to acknowledge it before the run continues. Automated runs simply
//! pass no acknowledger.
//!
//! 将刚追加的报告页面展示给用户，并在继续运行前等待其确认的能力。
//! 自动化运行只需不提供确认器即可。

use anyhow::{Context, Result};
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use std::path::Path;
use std::thread::JoinHandle;

use crate::infra::t;

/// Shows a rendered page and blocks until it is acknowledged.
pub trait Acknowledge: Send + Sync {
    /// `title` names the page; `preview` is an SVG file holding it.
    fn acknowledge(&self, title: &str, preview: &Path) -> Result<()>;
}

/// Opens the preview with an optional viewer program and waits for Enter on the terminal.
/// 使用可选的查看器程序打开预览，并在终端等待回车。
#[derive(Debug, Clone, Default)]
pub struct ConsolePause {
    /// Viewer command, split with shell-word rules, the preview path is appended.
    pub viewer: Option<String>,
    pub locale: String,
}

impl ConsolePause {
    pub fn new(viewer: Option<String>, locale: &str) -> Self {
        Self {
            viewer,
            locale: locale.to_string(),
        }
    }

    /// Launches the viewer without waiting for it. The returned thread reaps
    /// the viewer process once it exits.
    fn open_viewer(&self, preview: &Path) -> Result<Option<JoinHandle<()>>> {
        let Some(viewer) = &self.viewer else {
            return Ok(None);
        };
        let parts = shlex::split(viewer).with_context(|| format!("Failed to parse viewer command: {viewer}"))?;
        let Some((program, args)) = parts.split_first() else {
            return Ok(None);
        };
        let mut child = std::process::Command::new(program)
            .args(args)
            .arg(preview)
            .spawn()
            .with_context(|| format!("Failed to launch viewer `{viewer}`"))?;
        let viewer = viewer.clone();
        Ok(Some(std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => log::debug!("viewer `{viewer}` exited with {status}"),
            Ok(_) => {}
            Err(e) => log::warn!("failed to wait for viewer `{viewer}`: {e}"),
        })))
    }
}

impl Acknowledge for ConsolePause {
    fn acknowledge(&self, title: &str, preview: &Path) -> Result<()> {
        let locale = self.locale.as_str();
        println!(
            "{}",
            t!("pause.preview_written", locale = locale, name = title, path = preview.display())
        );
        if let Err(e) = self.open_viewer(preview) {
            log::warn!("{e:#}");
        }
        let _: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("pause.prompt", locale = locale).to_string())
            .allow_empty(true)
            .interact_text()
            .context(t!("pause.read_failed", locale = locale).to_string())?;
        Ok(())
    }
}

//! # Suite Configuration Module / 套件配置模块
//!
//! Defines the TOML schema of a regression suite: global settings plus one
//! entry per comparison case, and the validation applied after parsing.
//!
//! 定义回归套件的 TOML 模式：全局设置以及每个比较用例的条目，
//! 以及解析后执行的校验。

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::figure::DEFAULT_X_RANGE;
use crate::core::spectrum::Abscissa;

/// Spectrum produced by the simulation.
/// 模拟生成的光谱。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelSpectrum {
    #[serde(default = "default_model_file")]
    pub file: PathBuf,
    /// Header rows to skip before parsing.
    #[serde(default = "default_model_skip_rows")]
    pub skip_rows: usize,
    #[serde(default = "default_model_abscissa")]
    pub abscissa: Abscissa,
}

impl Default for ModelSpectrum {
    fn default() -> Self {
        Self {
            file: default_model_file(),
            skip_rows: default_model_skip_rows(),
            abscissa: default_model_abscissa(),
        }
    }
}

/// Pre-existing reference spectrum the model is compared against.
/// 与模型进行比较的预先存在的参考光谱。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BaselineSpectrum {
    #[serde(default = "default_baseline_file")]
    pub file: PathBuf,
    #[serde(default)]
    pub skip_rows: usize,
    #[serde(default = "default_baseline_abscissa")]
    pub abscissa: Abscissa,
}

impl Default for BaselineSpectrum {
    fn default() -> Self {
        Self {
            file: default_baseline_file(),
            skip_rows: 0,
            abscissa: default_baseline_abscissa(),
        }
    }
}

/// A single comparison case of the suite.
/// 套件中的单个比较用例。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComparisonCase {
    /// Unique name, used in logs and as the report page title.
    /// 唯一名称，用于日志和报告页面标题。
    pub name: String,

    /// Working directory of the simulation. Relative paths are resolved
    /// against the directory of the suite file.
    /// 模拟的工作目录。相对路径相对于套件文件所在目录解析。
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Command line to launch, split with shell-word rules after `~`/`$VAR` expansion.
    /// Mutually exclusive with `program`.
    #[serde(default)]
    pub command: Option<String>,

    /// Executable to launch with `args`, without any shell processing.
    #[serde(default)]
    pub program: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Kill the simulation and fail the case after this many seconds.
    /// 超过该秒数后终止模拟并判定用例失败。
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub model: ModelSpectrum,

    #[serde(default)]
    pub baseline: BaselineSpectrum,

    /// Wavelength (Å) at which both curves are normalized to 1.0.
    #[serde(default = "default_reference_wavelength")]
    pub reference_wavelength: f64,

    /// Visible wavelength range of the report page.
    #[serde(default = "default_x_range")]
    pub x_range: [f64; 2],

    /// File-name glob patterns removed from the working directory after the run.
    /// 运行结束后从工作目录中删除的文件名 glob 模式。
    #[serde(default = "default_cleanup")]
    pub cleanup: Vec<String>,

    /// Fail the case if the normalized curves differ by more than this anywhere in `x_range`.
    #[serde(default)]
    pub max_deviation: Option<f64>,

    /// Run inside a temporary copy of `directory`.
    /// 在 `directory` 的临时副本中运行。
    #[serde(default)]
    pub isolate: bool,

    /// Operating systems (e.g. "windows") on which a failure does not fail the run.
    /// 允许失败而不影响整体结果的操作系统列表（例如 "windows"）。
    #[serde(default)]
    pub allow_failure: Vec<String>,
}

impl Default for ComparisonCase {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            directory: default_directory(),
            command: None,
            program: None,
            args: vec![],
            timeout_secs: None,
            model: ModelSpectrum::default(),
            baseline: BaselineSpectrum::default(),
            reference_wavelength: default_reference_wavelength(),
            x_range: default_x_range(),
            cleanup: default_cleanup(),
            max_deviation: None,
            isolate: false,
            allow_failure: vec![],
        }
    }
}

impl ComparisonCase {
    pub fn is_allowed_to_fail_here(&self) -> bool {
        self.allow_failure.iter().any(|os| os == std::env::consts::OS)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        match (&self.command, &self.program) {
            (Some(_), Some(_)) => bail!("case '{}': set either `command` or `program`, not both", self.name),
            (None, None) => bail!("case '{}': one of `command` or `program` is required", self.name),
            (Some(c), None) if c.trim().is_empty() => bail!("case '{}': `command` is empty", self.name),
            _ => {}
        }
        if !(self.reference_wavelength > 0.0 && self.reference_wavelength.is_finite()) {
            bail!(
                "case '{}': reference_wavelength must be a positive number, got {}",
                self.name,
                self.reference_wavelength
            );
        }
        let [lo, hi] = self.x_range;
        if !(lo < hi) {
            bail!("case '{}': x_range must be ascending, got [{lo}, {hi}]", self.name);
        }
        if let Some(limit) = self.max_deviation {
            if !(limit >= 0.0) {
                bail!("case '{}': max_deviation must not be negative", self.name);
            }
        }
        for pattern in &self.cleanup {
            glob::Pattern::new(pattern)
                .with_context(|| format!("case '{}': invalid cleanup pattern `{pattern}`", self.name))?;
            if pattern.contains('/') || pattern.contains('\\') {
                bail!(
                    "case '{}': cleanup pattern `{pattern}` must be a plain file name",
                    self.name
                );
            }
        }
        Ok(())
    }
}

/// The whole suite configuration, loaded from a TOML file.
/// 从 TOML 文件加载的完整套件配置。
#[derive(Debug, Deserialize, Serialize)]
pub struct SpectrumSuite {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    /// Program used to open the preview of a page in interactive mode, e.g. "xdg-open".
    /// 交互模式下用于打开页面预览的程序，例如 "xdg-open"。
    #[serde(default)]
    pub viewer: Option<String>,

    pub cases: Vec<ComparisonCase>,
}

impl SpectrumSuite {
    /// Reads, parses and validates a suite file. Relative case directories are
    /// rewritten to be relative to the suite file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file: {}", path.display()))?;
        let mut suite: SpectrumSuite =
            toml::from_str(&content).with_context(|| format!("Failed to parse suite file: {}", path.display()))?;
        suite.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for case in &mut suite.cases {
            if case.directory.is_relative() {
                case.directory = base.join(&case.directory);
            }
        }
        Ok(suite)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for case in &self.cases {
            if !seen.insert(case.name.as_str()) {
                bail!("duplicate case name '{}'", case.name);
            }
            case.validate()?;
        }
        Ok(())
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_model_file() -> PathBuf {
    PathBuf::from("spectrum_1.dat")
}

fn default_model_skip_rows() -> usize {
    1
}

fn default_model_abscissa() -> Abscissa {
    Abscissa::Frequency
}

fn default_baseline_file() -> PathBuf {
    PathBuf::from("synow_spectrum.dat")
}

fn default_baseline_abscissa() -> Abscissa {
    Abscissa::Wavelength
}

fn default_reference_wavelength() -> f64 {
    8000.0
}

fn default_x_range() -> [f64; 2] {
    [DEFAULT_X_RANGE.0, DEFAULT_X_RANGE.1]
}

fn default_cleanup() -> Vec<String> {
    vec![
        "out_spectrum_1.dat".to_string(),
        "ray_*".to_string(),
        "gomc".to_string(),
    ]
}

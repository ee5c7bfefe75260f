//! # Spectrum Loading Module / 光谱加载模块
//!
//! Reads whitespace-delimited numeric spectrum files and provides the unit
//! conversions applied to simulation output: frequency to wavelength in
//! ångström, and flux density per unit frequency to flux density per unit
//! wavelength.
//!
//! 读取以空白分隔的数值光谱文件，并提供对模拟输出应用的单位转换：
//! 频率转换为埃单位波长，以及单位频率通量密度转换为单位波长通量密度。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{ComparisonError, ComparisonResult};

/// Speed of light in cm/s, as used by the simulation output.
pub const SPEED_OF_LIGHT_CM_PER_S: f64 = 3e10;

/// Centimetres to ångström.
pub const CM_TO_ANGSTROM: f64 = 1e8;

/// Physical meaning of the first column of a spectrum file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Abscissa {
    /// Frequency in Hz; flux is per unit frequency.
    Frequency,
    /// Wavelength in ångström; flux is per unit wavelength.
    Wavelength,
}

/// One data row of a spectrum file.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumRecord {
    /// 1-based line number in the source file.
    pub line: usize,
    pub abscissa: f64,
    pub flux: f64,
    /// Any trailing columns (e.g. error estimates). Not used by the comparison.
    pub extra: Vec<f64>,
}

/// The parsed content of a spectrum file, in file order.
#[derive(Debug, Clone)]
pub struct SpectrumSample {
    pub source: PathBuf,
    pub records: Vec<SpectrumRecord>,
}

impl SpectrumSample {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Columns per record, taken from the first row.
    pub fn column_count(&self) -> usize {
        self.records.first().map(|r| 2 + r.extra.len()).unwrap_or(0)
    }
}

/// Reads and parses a spectrum file.
///
/// # Arguments
/// * `path` - The file to read.
/// * `skip_rows` - Number of leading lines (header rows) to discard before parsing.
///
/// # Errors
/// `MissingInput` if the file cannot be read, otherwise whatever
/// [`parse_spectrum`] reports.
pub fn load_spectrum(path: &Path, skip_rows: usize) -> ComparisonResult<SpectrumSample> {
    let text = fs::read_to_string(path).map_err(|source| ComparisonError::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded {} ({} bytes)", path.display(), text.len());
    parse_spectrum(&text, skip_rows, path)
}

/// Parses whitespace-delimited numeric columns.
///
/// The first `skip_rows` lines are discarded. Blank lines and `#` comments are
/// ignored. Every remaining row needs at least two columns and the same column
/// count as the first data row.
pub fn parse_spectrum(text: &str, skip_rows: usize, source: &Path) -> ComparisonResult<SpectrumSample> {
    let mut records = Vec::new();
    let mut expected_columns: Option<usize> = None;

    for (index, line) in text.lines().enumerate().skip(skip_rows) {
        let line_no = index + 1;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let values = content
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().map_err(|_| ComparisonError::MalformedInput {
                    path: source.to_path_buf(),
                    line: line_no,
                    reason: format!("`{field}` is not a number"),
                })
            })
            .collect::<ComparisonResult<Vec<f64>>>()?;

        if values.len() < 2 {
            return Err(ComparisonError::MalformedInput {
                path: source.to_path_buf(),
                line: line_no,
                reason: format!("expected at least 2 columns, found {}", values.len()),
            });
        }
        match expected_columns {
            None => expected_columns = Some(values.len()),
            Some(n) if n != values.len() => {
                return Err(ComparisonError::MalformedInput {
                    path: source.to_path_buf(),
                    line: line_no,
                    reason: format!("expected {n} columns, found {}", values.len()),
                });
            }
            Some(_) => {}
        }

        records.push(SpectrumRecord {
            line: line_no,
            abscissa: values[0],
            flux: values[1],
            extra: values[2..].to_vec(),
        });
    }

    Ok(SpectrumSample {
        source: source.to_path_buf(),
        records,
    })
}

/// Converts a frequency in Hz to a wavelength in ångström.
pub fn frequency_to_wavelength(frequency: f64) -> f64 {
    SPEED_OF_LIGHT_CM_PER_S / frequency * CM_TO_ANGSTROM
}

/// Converts flux density per unit frequency to flux density per unit wavelength.
///
/// Constant factors are dropped; the result is only meaningful after normalization.
pub fn flux_nu_to_flux_lambda(flux_nu: f64, wavelength: f64) -> f64 {
    flux_nu / (wavelength * wavelength)
}

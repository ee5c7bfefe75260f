//! # File System Operations Module / 文件系统操作模块
//!
//! Working-directory preparation for a comparison case and removal of the
//! artifacts the simulation leaves behind.
//!
//! 为比较用例准备工作目录，并删除模拟遗留的产物。

use fs_extra::dir::{CopyOptions, copy};
use glob::Pattern;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::core::error::{ComparisonError, ComparisonResult};

/// The directory a case runs in. When isolated, the temporary copy is
/// deleted when this value is dropped.
/// 用例运行所在的目录。隔离运行时，该值被丢弃时会删除临时副本。
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    _temp_root: Option<TempDir>,
}

impl Workspace {
    /// Runs directly in `dir`.
    pub fn in_place(dir: &Path) -> ComparisonResult<Self> {
        if !dir.is_dir() {
            return Err(ComparisonError::Isolation(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(Self {
            path: dir.to_path_buf(),
            _temp_root: None,
        })
    }

    /// Copies the contents of `dir` into a fresh temporary directory.
    pub fn isolated(dir: &Path, case_name: &str) -> ComparisonResult<Self> {
        let sanitized: String = case_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let temp = tempfile::Builder::new()
            .prefix(&format!("spectrum_regress_{sanitized}_"))
            .tempdir()
            .map_err(|e| ComparisonError::Isolation(format!("failed to create temporary directory: {e}")))?;

        let mut options = CopyOptions::new();
        options.overwrite = true;
        options.content_only = true;
        copy(dir, temp.path(), &options).map_err(|e| {
            ComparisonError::Isolation(format!(
                "failed to copy {} to {}: {e}",
                dir.display(),
                temp.path().display()
            ))
        })?;

        Ok(Self {
            path: temp.path().to_path_buf(),
            _temp_root: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_isolated(&self) -> bool {
        self._temp_root.is_some()
    }
}

/// Removes every entry of `dir` whose file name matches one of `patterns`.
///
/// Entries that vanish before they are removed are ignored, so calling this
/// twice in a row succeeds and the second call removes nothing. Any other I/O
/// error stops the cleanup and is returned, as does a pattern that is not a
/// valid glob.
///
/// # Returns
/// The removed paths, sorted.
pub fn remove_artifacts(dir: &Path, patterns: &[String]) -> ComparisonResult<Vec<PathBuf>> {
    let compiled = patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| ComparisonError::Cleanup {
                path: dir.join(p),
                source: std::io::Error::new(ErrorKind::InvalidInput, format!("invalid pattern: {e}")),
            })
        })
        .collect::<ComparisonResult<Vec<Pattern>>>()?;
    if compiled.is_empty() {
        return Ok(Vec::new());
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ComparisonError::Cleanup {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut removed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ComparisonError::Cleanup {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !compiled.iter().any(|p| p.matches(name)) {
            continue;
        }

        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let result = if is_dir {
            fs_extra::dir::remove(&path).map_err(|e| std::io::Error::other(e.to_string()))
        } else {
            fs::remove_file(&path)
        };

        match result {
            Ok(()) => {
                log::debug!("removed {}", path.display());
                removed.push(path);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(ComparisonError::Cleanup { path, source }),
        }
    }

    removed.sort();
    Ok(removed)
}

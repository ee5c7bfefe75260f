//! # Report Page Module / 报告页面模块
//!
//! The multi-page report abstraction the comparison runner writes into, and a
//! sink that stores every page as its own SVG file.
//!
//! 比较运行器写入的多页报告抽象，以及将每一页存储为单独 SVG 文件的输出端。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One rendered figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    pub title: String,
    pub svg: String,
}

/// A multi-page document that figures are appended to.
/// 可向其追加图形的多页文档。
pub trait ReportSink: Send {
    /// Appends `page` as the next page. Returns its 1-based page number.
    fn append_page(&mut self, page: ReportPage) -> Result<usize>;

    fn page_count(&self) -> usize;
}

/// Keeps pages in memory. Used to collect pages from parallel cases before
/// handing them to the real sink in suite order.
#[derive(Debug, Default)]
pub struct PageBuffer {
    pages: Vec<ReportPage>,
}

impl PageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[ReportPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<ReportPage> {
        self.pages
    }
}

impl ReportSink for PageBuffer {
    fn append_page(&mut self, page: ReportPage) -> Result<usize> {
        self.pages.push(page);
        Ok(self.pages.len())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Writes each page immediately as `NNN-<title>.svg` in a directory.
/// 将每一页立即写入目录中的 `NNN-<title>.svg`。
#[derive(Debug)]
pub struct SvgDirectoryReport {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl SvgDirectoryReport {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create report directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ReportSink for SvgDirectoryReport {
    fn append_page(&mut self, page: ReportPage) -> Result<usize> {
        let number = self.written.len() + 1;
        let path = self.dir.join(format!("{number:03}-{}.svg", sanitize_file_stem(&page.title)));
        fs::write(&path, &page.svg).with_context(|| format!("Failed to write page: {}", path.display()))?;
        self.written.push(path);
        Ok(number)
    }

    fn page_count(&self) -> usize {
        self.written.len()
    }
}

/// Replaces anything but ASCII alphanumerics, `-` and `_` with `_`.
pub fn sanitize_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str) -> ReportPage {
        ReportPage {
            title: title.to_string(),
            svg: "<svg></svg>".to_string(),
        }
    }

    #[test]
    fn svg_directory_numbers_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = SvgDirectoryReport::create(&dir.path().join("pages")).unwrap();
        assert_eq!(sink.append_page(page("a b")).unwrap(), 1);
        assert_eq!(sink.append_page(page("c/d")).unwrap(), 2);
        assert_eq!(sink.page_count(), 2);
        assert!(dir.path().join("pages").join("001-a_b.svg").exists());
        assert!(dir.path().join("pages").join("002-c_d.svg").exists());
    }

    #[test]
    fn buffer_keeps_order() {
        let mut buf = PageBuffer::new();
        buf.append_page(page("first")).unwrap();
        buf.append_page(page("second")).unwrap();
        let titles: Vec<_> = buf.into_pages().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, ["first", "second"]);
    }
}

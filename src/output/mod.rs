pub mod report;

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::records::{CrawlRecord, RedirectHop};

pub use report::{ReportTemplate, TemplateError};

/// Flattened, render-ready projection of one crawl record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayRow {
    pub url: String,
    pub title: String,
    pub redirects_text: String,
    pub screenshot: String,
    pub path: String,
    pub status_code: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSummary {
    pub rows: usize,
    pub bytes: usize,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create output file: {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output file: {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn format_redirects(chain: &[RedirectHop]) -> String {
    let mut out = String::new();
    for hop in chain {
        // Writing into a String cannot fail.
        let _ = write!(out, "Location: {}\nConnection: {}\n\n", hop.location, hop.connection);
    }
    out
}

pub fn to_display_row(record: &CrawlRecord) -> DisplayRow {
    DisplayRow {
        url: record.response_url.clone(),
        title: record.title.clone(),
        redirects_text: format_redirects(&record.redirect_chain),
        screenshot: record.screenshot_ref.clone(),
        path: record.path.clone(),
        status_code: record.status_code,
    }
}

pub fn build_rows(records: &[CrawlRecord]) -> Vec<DisplayRow> {
    records.iter().map(to_display_row).collect()
}

/// Renders `rows` into `template` and writes the page to `path`.
///
/// The file is truncated first and written in place; a failure halfway
/// through can leave a partial document behind.
pub fn render(
    rows: &[DisplayRow],
    template: &ReportTemplate,
    path: &Path,
) -> Result<RenderSummary, RenderError> {
    let html = report::render_html(rows, template);

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| RenderError::Create {
            path: path.to_path_buf(),
            source,
        })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(html.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), bytes = html.len(), "report written");
    Ok(RenderSummary {
        rows: rows.len(),
        bytes: html.len(),
        path: path.to_path_buf(),
    })
}

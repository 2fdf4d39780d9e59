pub mod document;
pub mod stream;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use self::document::CrawlDocument;
use self::stream::{DocumentStream, RawDocument, StreamError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedirectHop {
    pub location: String,
    pub connection: String,
    pub status_code: i64,
    pub redirect_uri: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrawlRecord {
    pub response_url: String,
    pub title: String,
    pub redirect_chain: Vec<RedirectHop>,
    pub screenshot_ref: String,
    pub path: String,
    pub status_code: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Malformed(String),
    Truncated,
}

/// A document that was skipped while loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentFailure {
    pub index: usize,
    pub offset: u64,
    pub kind: FailureKind,
}

#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    pub records: Vec<CrawlRecord>,
    pub failures: Vec<DocumentFailure>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open input file: {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn load_records(path: &Path) -> Result<LoadReport, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "reading crawl records");
    read_records(BufReader::new(file)).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes every document in `reader`, skipping the ones that fail.
///
/// A malformed or truncated document is logged and decoding resumes after it.
/// Whole documents found inside a failed frame are recovered, so a document
/// that never closes its brackets does not take the ones after it down too.
pub fn read_records<R: BufRead>(reader: R) -> io::Result<LoadReport> {
    let mut report = LoadReport::default();

    for item in DocumentStream::new(reader) {
        let (failed, kind) = match item {
            Ok(raw) => match decode_document(&raw.bytes) {
                Ok(record) => {
                    report.records.push(record);
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        document = raw.index,
                        offset = raw.offset,
                        "skipping malformed document: {e}"
                    );
                    (raw, FailureKind::Malformed(e))
                }
            },
            Err(StreamError::Truncated(raw)) => {
                tracing::warn!(
                    document = raw.index,
                    offset = raw.offset,
                    "input ends inside a document"
                );
                (raw, FailureKind::Truncated)
            }
            Err(StreamError::Io(e)) => return Err(e),
        };

        report.failures.push(DocumentFailure {
            index: failed.index,
            offset: failed.offset,
            kind,
        });
        for (offset, record) in recover_embedded(&failed) {
            tracing::info!(
                document = failed.index,
                offset,
                "recovered document from inside a failed one"
            );
            report.records.push(record);
        }
    }

    tracing::info!(
        records = report.records.len(),
        skipped = report.failures.len(),
        "finished decoding input"
    );
    Ok(report)
}

// Going through `Value` first means a repeated key keeps its last value.
fn decode_document(bytes: &[u8]) -> Result<CrawlRecord, String> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    decode_value(value)
}

fn decode_value(value: Value) -> Result<CrawlRecord, String> {
    match value {
        // Decoding `null` leaves every field at its zero value.
        Value::Null => Ok(CrawlRecord::default()),
        Value::Object(_) => CrawlDocument::deserialize(value)
            .map(CrawlRecord::from)
            .map_err(|e| e.to_string()),
        _ => Err("expected a JSON object".to_string()),
    }
}

/// Scans a failed frame for embedded documents, trying each `{` after its
/// first byte as a document start. A candidate only counts if it decodes and
/// has a `result` object, so the nested objects of a broken document are not
/// mistaken for records.
fn recover_embedded(failed: &RawDocument) -> Vec<(u64, CrawlRecord)> {
    let bytes = &failed.bytes;
    let mut found = Vec::new();
    let mut from = 1;

    while let Some(start) = next_open_brace(bytes, from) {
        from = start + 1;
        let Some(Ok(candidate)) = DocumentStream::new(&bytes[start..]).next() else {
            continue;
        };
        let value: Value = match serde_json::from_slice(&candidate.bytes) {
            Ok(value) => value,
            Err(_) => continue,
        };
        if !value.get("result").is_some_and(Value::is_object) {
            continue;
        }
        if let Ok(record) = decode_value(value) {
            found.push((failed.offset + start as u64, record));
            from = start + candidate.bytes.len();
        }
    }
    found
}

fn next_open_brace(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == b'{')
        .map(|pos| from + pos)
}

use crate::core::{DataSource, FileEntry, LoadedData, Row, Storage};
use crate::utils::error::{PushError, Result};
use serde_json::Value;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Only `.csv` is read as a delimited table; everything else is JSON.
pub fn is_tabular(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

pub struct DataLoader<S: Storage> {
    storage: S,
    delimiter: u8,
}

impl<S: Storage> DataLoader<S> {
    pub fn new(storage: S, delimiter: u8) -> Self {
        Self { storage, delimiter }
    }

    /// Expands a source into the ordered list of entries it stands for.
    pub async fn resolve_entries(&self, source: &DataSource) -> Result<Vec<FileEntry>> {
        match source {
            DataSource::Files(entries) => Ok(entries.clone()),
            DataSource::Folder(dir) => {
                let files = self.storage.list_files(dir).await?;
                tracing::debug!("Found {} files under {}", files.len(), dir);
                Ok(files.into_iter().map(FileEntry::Single).collect())
            }
        }
    }

    pub async fn load_entry(&self, entry: &FileEntry) -> Result<LoadedData> {
        match entry {
            FileEntry::Single(path) => self.load_file(path).await,
            FileEntry::Group(paths) => {
                let mut items = Vec::with_capacity(paths.len());
                for path in paths {
                    items.push(self.load_file(path).await?);
                }
                Ok(LoadedData::Group(items))
            }
        }
    }

    pub async fn load_file(&self, path: &str) -> Result<LoadedData> {
        let bytes = self.storage.read_file(path).await?;
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

        if is_tabular(path) {
            tracing::debug!("Reading {} as delimited text", path);
            parse_tabular(path, content, self.delimiter).map(LoadedData::Rows)
        } else {
            tracing::debug!("Reading {} as JSON", path);
            parse_json(path, content).map(LoadedData::Document)
        }
    }
}

pub fn parse_json(path: &str, content: &[u8]) -> Result<Value> {
    serde_json::from_slice(content).map_err(|e| PushError::ParseError {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Header row gives the column names; every value stays a string.
pub fn parse_tabular(path: &str, content: &[u8], delimiter: u8) -> Result<Vec<Row>> {
    let parse_error = |e: csv::Error| PushError::ParseError {
        path: path.to_string(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(content);

    let headers = reader.headers().map_err(parse_error)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

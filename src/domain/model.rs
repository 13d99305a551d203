use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// One row of a delimited file: column name to literal string value.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMethod {
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    pub const SUPPORTED: [&'static str; 4] = ["post", "put", "patch", "delete"];

    /// Case-insensitive; `None` for anything outside post/put/patch/delete.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "post" => Some(RequestMethod::Post),
            "put" => Some(RequestMethod::Put),
            "patch" => Some(RequestMethod::Patch),
            "delete" => Some(RequestMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A data file entry: one path, or a group of paths loaded together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Single(String),
    Group(Vec<String>),
}

impl FileEntry {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            FileEntry::Single(path) => vec![path.as_str()],
            FileEntry::Group(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileEntry::Single(path) => f.write_str(path),
            FileEntry::Group(paths) => write!(f, "[{}]", paths.join(", ")),
        }
    }
}

/// Where a set of entries comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Files(Vec<FileEntry>),
    /// Every file under the folder, recursively, one entry per file.
    Folder(String),
}

/// The contents of one entry after loading.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedData {
    Document(Value),
    Rows(Vec<Row>),
    Group(Vec<LoadedData>),
}

impl LoadedData {
    pub fn into_value(self) -> Value {
        match self {
            LoadedData::Document(value) => value,
            LoadedData::Rows(rows) => Value::Array(rows.into_iter().map(Value::Object).collect()),
            LoadedData::Group(items) => {
                Value::Array(items.into_iter().map(LoadedData::into_value).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub status: u16,
    pub bytes: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatches: u64,
    pub cycles: u64,
    pub bytes_sent: u64,
}

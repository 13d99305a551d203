use crate::core::Storage;
use crate::utils::error::{PushError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem storage. Relative paths resolve against `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        fs::read(&full_path).map_err(|source| PushError::FileAccessError {
            path: full_path.display().to_string(),
            source,
        })
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let root = self.resolve(dir);
        if !root.is_dir() {
            return Err(PushError::FileAccessError {
                path: root.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| PushError::FileAccessError {
                path: root.display().to_string(),
                source: e.into(),
            })?;
            if entry.file_type().is_file() {
                // Keep paths relative to the configured folder so they resolve the same way.
                let relative = entry.path().strip_prefix(&self.base_path).unwrap_or(entry.path());
                files.push(relative.to_string_lossy().into_owned());
            }
        }
        Ok(files)
    }
}

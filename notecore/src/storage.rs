//! Storage utilities for the editor
//!
//! Text file I/O, recent files, and the config/documents directories.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Not a UTF-8 text file: {0}")]
    NotUtf8(PathBuf),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Read a whole text file.
pub fn read_text(path: &Path) -> Result<String> {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8(bytes).map_err(|_| StorageError::NotUtf8(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(StorageError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Write `text` to `path`, replacing any existing content.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote file");
    Ok(())
}

/// Load a JSON value, creating nothing on failure.
pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = read_text(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save a JSON value, creating the parent directory if needed.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Recent files tracking
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecentFiles {
    pub files: Vec<PathBuf>,
    pub max_entries: usize,
}

impl RecentFiles {
    pub fn new(max_entries: usize) -> Self {
        Self {
            files: Vec::new(),
            max_entries,
        }
    }

    /// Move `path` to the front, trimming to `max_entries`.
    pub fn add(&mut self, path: PathBuf) {
        self.files.retain(|p| p != &path);
        self.files.insert(0, path);
        self.files.truncate(self.max_entries);
    }

    pub fn remove(&mut self, path: &Path) {
        self.files.retain(|p| p != path);
    }

    pub fn load(config_path: &Path) -> Result<Self> {
        load_json(config_path)
    }

    pub fn save(&self, config_path: &Path) -> Result<()> {
        save_json(config_path, self)
    }
}

/// Config directory for the editor
pub fn config_dir(app_name: &str) -> PathBuf {
    directories::ProjectDirs::from("org", "notepad", app_name)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// The user's documents directory, falling back to the working directory
pub fn documents_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// File name for display, `"untitled"` when there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "untitled".to_string())
}

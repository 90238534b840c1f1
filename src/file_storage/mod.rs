//! File-based persistence helpers
//!
//! Chats are stored as one JSON file per chat plus a small index for
//! ordering, under the configured data directory. All writes go through
//! `atomic_write` (temp file + rename) so a crash never leaves a partial
//! file behind.

pub mod chats;

pub use chats::{ChatIndexEntry, ChatStore};

use std::fs;
use std::path::Path;

/// Result alias for file storage operations
pub type FileResult<T> = Result<T, String>;

/// Create a directory (and parents) if it does not exist
pub fn ensure_dir(path: &Path) -> FileResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Read and deserialize a JSON file
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> FileResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Write a file atomically: write to a sibling temp file, then rename over
/// the destination
pub fn atomic_write(path: &Path, content: &str) -> FileResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, content)
        .map_err(|e| format!("Failed to write {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, path)
        .map_err(|e| format!("Failed to rename {} into place: {}", tmp_path.display(), e))?;
    Ok(())
}

/// Serialize a value and write it atomically as pretty JSON
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> FileResult<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize {}: {}", path.display(), e))?;
    atomic_write(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_and_read_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("value.json");

        write_json(&path, &serde_json::json!({"a": 1})).unwrap();
        let value: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(value["a"], 1);

        // No temp file left behind
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_read_json_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result: FileResult<serde_json::Value> = read_json(&temp_dir.path().join("nope.json"));
        assert!(result.is_err());
    }
}

//
//  rested-api
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O
//!
//! Thin file helpers used by [`Config`](super::Config). Errors carry the path
//! they concern.

use std::path::Path;

use anyhow::{Context, Result};

/// Reads a configuration file into a string.
///
/// # Errors
///
/// Fails if the file cannot be read or is not UTF-8.
pub fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))
}

/// Writes a configuration file, creating parent directories as needed.
///
/// # Parameters
///
/// * `path` - Destination path
/// * `content` - Full file content; any existing file is overwritten
///
/// # Errors
///
/// Fails if a parent directory cannot be created or the file cannot be written.
pub fn write_config_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file {}", path.display()))
}

/// Whether a configuration file exists at `path`.
pub fn config_exists(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/config.toml");

        assert!(!config_exists(&path));
        write_config_file(&path, "[client]\n").unwrap();
        assert!(config_exists(&path));
        assert_eq!(read_config_file(&path).unwrap(), "[client]\n");
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let err = read_config_file(Path::new("/nonexistent/rested.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rested.toml"));
    }
}

//! Input file collection
//!
//! Resolves the user's input path into the ordered list of files to upload.
//! Directories are listed one level deep; subdirectories are ignored.

use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::{Error, Result};

/// Options controlling which files are picked up and in which order
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Glob matched against the file name, e.g. `*.png`
    pub include: Option<String>,

    /// Upload in reverse path order
    pub reverse: bool,
}

/// Collect the files to upload from a file or directory path
pub fn collect_files(path: &Path, options: &CollectOptions) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "Path {} does not exist",
            path.display()
        )));
    }

    let pattern = options.include.as_deref().map(Pattern::new).transpose()?;

    let mut files = if path.is_dir() {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() {
                files.push(entry_path);
            }
        }
        files
    } else {
        vec![path.to_path_buf()]
    };

    if let Some(pattern) = &pattern {
        files.retain(|f| {
            f.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| pattern.matches(n))
        });
    }

    if files.is_empty() {
        return Err(Error::NotFound(format!(
            "No files found in {}",
            path.display()
        )));
    }

    files.sort();
    if options.reverse {
        files.reverse();
    }

    tracing::debug!(count = files.len(), path = %path.display(), "collected input files");
    Ok(files)
}

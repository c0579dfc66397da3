//! Plain-text failure log.
//!
//! Truncated once per batch, then appended to for every failed run:
//!
//! ```text
//! === iteration 2 | 2026-10-17 14:03:11 ===
//! <full diagnostic>
//!
//! ```

use chrono::{DateTime, Local};
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp format used in block headers
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Single-writer handle on the failure log
#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
    file: File,
}

impl FailureLog {
    /// Create or truncate the log at `path`, creating parent directories.
    pub fn create(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).write(true).truncate(true).open(&path)?;
        debug!("Truncated failure log {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one block for a failed run and flush it to disk.
    pub fn append(&mut self, index: u32, at: DateTime<Local>, diagnostic: &str) -> std::io::Result<()> {
        let block = format_block(index, at, diagnostic);
        self.file.write_all(block.as_bytes())?;
        self.file.flush()
    }
}

/// Render one failure block: header, diagnostic, blank separator.
pub fn format_block(index: u32, at: DateTime<Local>, diagnostic: &str) -> String {
    let mut block = format!("=== iteration {} | {} ===\n", index, at.format(TIMESTAMP_FORMAT));
    let body = diagnostic.trim_end_matches(['\n', '\r']);
    if !body.is_empty() {
        block.push_str(body);
        block.push('\n');
    }
    block.push('\n');
    block
}

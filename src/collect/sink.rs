// src/collect/sink.rs
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::collect::types::{Post, PostSink};

/// Appends one JSON object per line, `{"text": ...}`, to a run-scoped file.
pub struct JsonLinesSink {
    file: File,
}

impl JsonLinesSink {
    /// Opens `path` in append+create mode, creating the parent directory
    /// first if needed. Re-opening an existing file never truncates it.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            ensure_output_dir(dir)?;
        }
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("opening post file {}", path.display()))?;
        Ok(Self { file })
    }
}

impl PostSink for JsonLinesSink {
    fn append(&mut self, post: &Post) -> Result<()> {
        // Record and separator go out in a single write, so a crash between
        // appends can only lose the record being written, never frame an
        // earlier line incompletely.
        let mut line = serde_json::to_vec(post).context("serializing post")?;
        line.push(b'\n');
        self.file.write_all(&line).context("appending post record")?;
        Ok(())
    }
}

/// Creates the output directory if it is missing; reuses it otherwise.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        tracing::debug!(target: "collect", dir = %dir.display(), "output directory already exists");
        return Ok(());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    tracing::info!(target: "collect", dir = %dir.display(), "output directory created");
    Ok(())
}

/// `<channel>_posts_<YYYYMMDDHHMMSS>.json`, unique across runs of the same
/// channel.
pub fn unique_post_path(output_dir: &Path, channel: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    output_dir.join(format!("{channel}_posts_{timestamp}.json"))
}

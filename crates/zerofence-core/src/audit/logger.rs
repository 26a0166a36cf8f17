//! JSON-lines traffic audit writer.
//!
//! A thin file sink for [`TrafficLogEntry`] records. Writes are serialized
//! through a mutex and flushed per record so the trail survives a crash;
//! corrupt lines are skipped on read.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

use super::TrafficLogEntry;

/// A file-backed JSON-lines audit log.
pub struct FileAuditLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileAuditLog {
    /// Open (or create) the audit file at `path`, creating parent
    /// directories as needed. Records are appended.
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating parent dirs for {}", path.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening audit log {}", path.display()))?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Path of the underlying audit file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single entry and flush it to disk.
    pub fn log(&self, entry: &TrafficLogEntry) -> Result<()> {
        let json = serde_json::to_string(entry)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("audit writer lock poisoned"))?;
        writeln!(writer, "{json}")?;
        writer.flush()?;
        Ok(())
    }

    /// Read every entry back from the file, skipping corrupt lines.
    pub fn read_all(&self) -> Result<Vec<TrafficLogEntry>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<TrafficLogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(_) => continue, // Skip corrupt lines.
            }
        }
        Ok(entries)
    }
}

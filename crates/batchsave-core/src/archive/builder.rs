//! In-memory ZIP assembly.

use std::io::{Cursor, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::job::FetchedItem;
use crate::url_model::{derive_save_name, sanitize_job_name};

use super::names::ArchiveNameTable;

/// Finished archive, ready for the file sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBlob {
    /// `<sanitized job name>.zip`
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Stored entry names in insertion order.
    pub entries: Vec<String>,
}

/// Accumulates entries into a deflate-compressed ZIP held in memory.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: ArchiveNameTable,
    entries: Vec<String>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: ArchiveNameTable::new(),
            entries: Vec::new(),
        }
    }

    /// Adds one payload; returns the collision-free name it was stored under.
    ///
    /// Path separators and control characters never reach the entry name, so every
    /// entry extracts into the archive's top level.
    pub fn add(&mut self, display_name: &str, bytes: &[u8]) -> Result<String, ZipError> {
        let stored = self.names.assign(&derive_save_name(display_name, None));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(bytes.len() as u64 >= u32::MAX as u64);
        self.writer.start_file(stored.as_str(), options)?;
        self.writer.write_all(bytes)?;
        self.entries.push(stored.clone());
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the central directory and names the archive after the sanitized job name.
    pub fn finish(self, job_name: &str, max_name_len: usize) -> Result<ArchiveBlob, ZipError> {
        let cursor = self.writer.finish()?;
        Ok(ArchiveBlob {
            filename: format!("{}.zip", sanitize_job_name(job_name, max_name_len)),
            bytes: cursor.into_inner(),
            entries: self.entries,
        })
    }
}

/// Builds one archive from fetched items in the given (arrival) order.
pub fn build_archive(
    items: &[FetchedItem],
    job_name: &str,
    max_name_len: usize,
) -> Result<ArchiveBlob, ZipError> {
    let mut builder = ArchiveBuilder::new();
    for item in items {
        let stored = builder.add(&item.display_name, &item.bytes)?;
        if stored != item.display_name {
            tracing::debug!(display_name = %item.display_name, stored = %stored, "renamed archive entry");
        }
    }
    builder.finish(job_name, max_name_len)
}

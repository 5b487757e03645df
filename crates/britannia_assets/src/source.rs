//! # Record Sources
//!
//! Where raw records come from. A source only locates and reads bytes; it
//! never interprets them.
//!
//! ## Indexed File Layout
//!
//! ```text
//! *idx.mul                          *.mul
//! ┌────────┬────────┬────────┐      ┌─────────────────────────┐
//! │ offset │ length │ extra  │ ───> │ record bytes            │
//! │  i32   │  i32   │  i32   │      │ (format depends on kind)│
//! └────────┴────────┴────────┘      └─────────────────────────┘
//! offset == -1 or length <= 0: no record
//! ```

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Size of one index entry in bytes.
pub const INDEX_ENTRY_SIZE: usize = 12;

/// Glyphs stored per font in `fonts.mul`.
pub const ASCII_GLYPHS_PER_FONT: usize = 224;

/// One raw record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Logical id the record was read for.
    pub id: u32,
    /// Record bytes.
    pub data: Vec<u8>,
    /// Kind-specific metadata from the index (gump dimensions).
    pub extra: i32,
}

impl Record {
    /// Creates a record without metadata.
    #[must_use]
    pub fn new(id: u32, data: Vec<u8>) -> Self {
        Self { id, data, extra: 0 }
    }

    /// Sets the index metadata.
    #[must_use]
    pub fn with_extra(mut self, extra: i32) -> Self {
        self.extra = extra;
        self
    }
}

/// Locates raw records inside the install.
pub trait RecordSource: Send + Sync {
    /// Reads the record for `id`.
    ///
    /// Returns `Ok(None)` when the install has no such record.
    fn read(&self, id: u32) -> io::Result<Option<Record>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

#[derive(Clone, Copy, Debug)]
struct IndexEntry {
    offset: i32,
    length: i32,
    extra: i32,
}

impl IndexEntry {
    fn is_present(&self) -> bool {
        self.offset >= 0 && self.length > 0
    }
}

/// A classic `*idx.mul` + `*.mul` pair.
pub struct IndexedFile {
    entries: Vec<IndexEntry>,
    data: Mutex<File>,
    data_len: u64,
    data_path: PathBuf,
}

impl IndexedFile {
    /// Opens an index/data pair. The index is read into memory.
    pub fn open(index_path: &Path, data_path: &Path) -> io::Result<Self> {
        let raw = fs::read(index_path)?;
        let entries = raw
            .chunks_exact(INDEX_ENTRY_SIZE)
            .map(|chunk| IndexEntry {
                offset: i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
                length: i32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]),
                extra: i32::from_le_bytes([chunk[8], chunk[9], chunk[10], chunk[11]]),
            })
            .collect();

        let file = File::open(data_path)?;
        let data_len = file.metadata()?.len();

        Ok(Self {
            entries,
            data: Mutex::new(file),
            data_len,
            data_path: data_path.to_path_buf(),
        })
    }

    /// Number of index slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordSource for IndexedFile {
    fn read(&self, id: u32) -> io::Result<Option<Record>> {
        let Some(entry) = self.entries.get(id as usize).copied() else {
            return Ok(None);
        };
        if !entry.is_present() {
            return Ok(None);
        }

        // Widen before adding so a corrupt entry cannot overflow.
        let offset = u64::from(entry.offset.unsigned_abs());
        let length = u64::from(entry.length.unsigned_abs());
        if offset + length > self.data_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "entry {id} points past the end of {}",
                    self.data_path.display()
                ),
            ));
        }

        let mut data = vec![0u8; length as usize];
        {
            let mut file = self.data.lock();
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut data)?;
        }

        Ok(Some(Record {
            id,
            data,
            extra: entry.extra,
        }))
    }

    fn describe(&self) -> String {
        format!("{} ({} entries)", self.data_path.display(), self.entries.len())
    }
}

/// One whole file per record id (`unifont.mul`, `unifont1.mul`, ...).
pub struct FilePerRecord {
    files: Vec<Option<PathBuf>>,
}

impl FilePerRecord {
    /// Creates a source where record `i` is `files[i]`.
    #[must_use]
    pub fn new(files: Vec<Option<PathBuf>>) -> Self {
        Self { files }
    }
}

impl RecordSource for FilePerRecord {
    fn read(&self, id: u32) -> io::Result<Option<Record>> {
        match self.files.get(id as usize) {
            Some(Some(path)) => Ok(Some(Record::new(id, fs::read(path)?))),
            _ => Ok(None),
        }
    }

    fn describe(&self) -> String {
        let present = self.files.iter().filter(|f| f.is_some()).count();
        format!("{present} font files")
    }
}

/// `fonts.mul`: fonts stored back to back, found by walking.
pub struct AsciiFontFile {
    path: PathBuf,
}

impl AsciiFontFile {
    /// Creates a source over `fonts.mul`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Byte length of the font starting at `start`, or `None` if truncated.
    fn font_len(bytes: &[u8], start: usize) -> Option<usize> {
        let mut pos = start + 1; // header byte
        for _ in 0..ASCII_GLYPHS_PER_FONT {
            let w = usize::from(*bytes.get(pos)?);
            let h = usize::from(*bytes.get(pos + 1)?);
            pos += 3 + w * h * 2;
            if pos > bytes.len() {
                return None;
            }
        }
        Some(pos - start)
    }
}

impl RecordSource for AsciiFontFile {
    fn read(&self, id: u32) -> io::Result<Option<Record>> {
        let bytes = fs::read(&self.path)?;
        let mut start = 0usize;

        for index in 0..=id {
            if start >= bytes.len() {
                return Ok(None);
            }
            let Some(len) = Self::font_len(&bytes, start) else {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("font {index} in {} is truncated", self.path.display()),
                ));
            };
            if index == id {
                return Ok(Some(Record::new(id, bytes[start..start + len].to_vec())));
            }
            start += len;
        }

        Ok(None)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Records held in memory.
#[derive(Default)]
pub struct MemorySource {
    records: HashMap<u32, Record>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, replacing any record with the same id.
    #[must_use]
    pub fn with(mut self, record: Record) -> Self {
        self.records.insert(record.id, record);
        self
    }

    /// Adds a record in place.
    pub fn insert(&mut self, record: Record) {
        self.records.insert(record.id, record);
    }
}

impl RecordSource for MemorySource {
    fn read(&self, id: u32) -> io::Result<Option<Record>> {
        Ok(self.records.get(&id).cloned())
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}

/// Stands in for data files the install does not ship.
#[derive(Clone, Debug)]
pub struct EmptySource {
    reason: String,
}

impl EmptySource {
    /// Creates an empty source and records why it is empty.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl RecordSource for EmptySource {
    fn read(&self, _id: u32) -> io::Result<Option<Record>> {
        Ok(None)
    }

    fn describe(&self) -> String {
        format!("empty ({})", self.reason)
    }
}

//! Archive Packager
//!
//! Writes a compiled artifact as a deflate zip with fixed entry metadata, so
//! the same artifact always yields the same bytes. Output is handed to a sink
//! entry by entry instead of being buffered whole.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::io::{self, Seek, SeekFrom, Write};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub const LAYOUT_PATH: &str = "layout/theme.liquid";
pub const MANIFEST_PATH: &str = "templates/index.json";
pub const SETTINGS_SCHEMA_PATH: &str = "config/settings_schema.json";

pub fn section_path(section_type: &str) -> String {
    format!("sections/{}.liquid", section_type)
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Archive consumer went away")]
    Aborted,
}

/// Archive path to file bytes. Insertion order is archive order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledArtifact {
    entries: IndexMap<String, Vec<u8>>,
}

impl CompiledArtifact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), content.into());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn section_paths(&self) -> Vec<&str> {
        self.paths()
            .into_iter()
            .filter(|p| p.starts_with("sections/"))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Pack the whole artifact into memory.
pub fn pack(artifact: &CompiledArtifact) -> Result<Vec<u8>, PackageError> {
    let mut archive = Vec::new();
    pack_into(artifact, |chunk| {
        archive.extend_from_slice(&chunk);
        Ok(())
    })?;
    Ok(archive)
}

/// Pack the artifact, handing finalized bytes to `sink` as each entry starts
/// and the remainder after the central directory. Returns total bytes emitted.
pub fn pack_into<F>(artifact: &CompiledArtifact, mut sink: F) -> Result<usize, PackageError>
where
    F: FnMut(Vec<u8>) -> Result<(), PackageError>,
{
    let spill = Rc::new(RefCell::new(SpillBuffer::default()));
    let mut zip = ZipWriter::new(SpillWriter(Rc::clone(&spill)));
    let mut emitted = 0;

    for (path, content) in artifact.iter() {
        let previous_end = spill.borrow().end();
        zip.start_file(path, entry_options())?;

        // Starting an entry finalizes the previous one. Everything before
        // the new local header is never rewritten.
        let boundary = spill
            .borrow()
            .local_header_start(path)
            .unwrap_or(previous_end);
        let ready = spill.borrow_mut().take_until(boundary);
        if !ready.is_empty() {
            emitted += ready.len();
            sink(ready)?;
        }

        zip.write_all(content)?;
        debug!(path, bytes = content.len(), "archived entry");
    }

    zip.finish()?;
    let rest = spill.borrow_mut().take_all();
    if !rest.is_empty() {
        emitted += rest.len();
        sink(rest)?;
    }

    Ok(emitted)
}

const LOCAL_HEADER_SIGNATURE: [u8; 4] = [b'P', b'K', 3, 4];
const LOCAL_HEADER_LEN: usize = 30;

fn read_u16(bytes: &[u8], at: usize) -> usize {
    usize::from(u16::from_le_bytes([bytes[at], bytes[at + 1]]))
}

/// In-memory write window. Bytes before `base` have been handed off and
/// can no longer be seeked to.
#[derive(Debug, Default)]
struct SpillBuffer {
    base: u64,
    buf: Vec<u8>,
    pos: u64,
}

impl SpillBuffer {
    fn end(&self) -> u64 {
        self.base + self.buf.len() as u64
    }

    /// Offset of the local file header for `name` when it is the last thing
    /// in the buffer, as it is right after `start_file`.
    fn local_header_start(&self, name: &str) -> Option<u64> {
        let fixed = LOCAL_HEADER_LEN + name.len();
        for extra in 0..=usize::from(u16::MAX) {
            let start = self.buf.len().checked_sub(fixed + extra)?;
            let header = &self.buf[start..];
            if header[..4] == LOCAL_HEADER_SIGNATURE
                && read_u16(header, 26) == name.len()
                && read_u16(header, 28) == extra
                && &header[LOCAL_HEADER_LEN..fixed] == name.as_bytes()
            {
                return Some(self.base + start as u64);
            }
        }
        None
    }

    fn take_until(&mut self, offset: u64) -> Vec<u8> {
        let count = offset.saturating_sub(self.base).min(self.buf.len() as u64) as usize;
        let taken: Vec<u8> = self.buf.drain(..count).collect();
        self.base += count as u64;
        taken
    }

    fn take_all(&mut self) -> Vec<u8> {
        let end = self.end();
        self.take_until(end)
    }
}

struct SpillWriter(Rc<RefCell<SpillBuffer>>);

impl Write for SpillWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut spill = self.0.borrow_mut();
        if spill.pos < spill.base {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "write into already streamed region",
            ));
        }

        let start = (spill.pos - spill.base) as usize;
        let overlap = data.len().min(spill.buf.len().saturating_sub(start));
        if start > spill.buf.len() {
            spill.buf.resize(start, 0);
        }
        spill.buf[start..start + overlap].copy_from_slice(&data[..overlap]);
        spill.buf.extend_from_slice(&data[overlap..]);
        spill.pos += data.len() as u64;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for SpillWriter {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let mut spill = self.0.borrow_mut();
        let next = match target {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => spill.end().checked_add_signed(delta),
            SeekFrom::Current(delta) => spill.pos.checked_add_signed(delta),
        };

        match next {
            Some(offset) if offset >= spill.base => {
                spill.pos = offset;
                Ok(offset)
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek into already streamed region",
            )),
        }
    }
}

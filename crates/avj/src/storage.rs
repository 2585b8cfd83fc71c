//! .avj file reader/writer.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::decoder::{decode, decode_view, AvjView};
use crate::encoder::encode;
use crate::header::Variant;
use crate::types::{AvjRecord, AvjResult};

/// Writer for .avj files.
pub struct AvjWriter;

/// Reader for .avj files.
pub struct AvjReader;

impl AvjWriter {
    /// Encode a record and write it to a file.
    pub fn write_to_file(record: &AvjRecord, path: &Path) -> AvjResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Encode before creating the file so a rejected record leaves any
        // existing file intact.
        let buf = encode(record)?;
        let mut file = File::create(path)?;
        file.write_all(&buf)?;
        tracing::debug!("Wrote {} bytes to {}", buf.len(), path.display());
        Ok(())
    }

    /// Encode a record into any writer, returning the number of bytes written.
    pub fn write_to<W: Write>(record: &AvjRecord, writer: &mut W) -> AvjResult<usize> {
        let buf = encode(record)?;
        writer.write_all(&buf)?;
        Ok(buf.len())
    }
}

impl AvjReader {
    /// Read and decode a file.
    pub fn read_from_file(path: &Path, variant: Variant) -> AvjResult<AvjRecord> {
        let mut file = File::open(path)?;
        Self::read_from(&mut file, variant)
    }

    /// Read everything from `reader` and decode it.
    pub fn read_from<R: Read>(reader: &mut R, variant: Variant) -> AvjResult<AvjRecord> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        decode(&buf, variant)
    }
}

/// A memory-mapped .avj file for zero-copy access.
pub struct MappedAvj {
    mmap: Mmap,
}

impl MappedAvj {
    /// Map a file read-only.
    pub fn open(path: &Path) -> AvjResult<Self> {
        let file = File::open(path)?;
        // SAFETY: the map is read-only; callers must not truncate the file
        // while it is mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        tracing::debug!("Mapped {} ({} bytes)", path.display(), mmap.len());
        Ok(Self { mmap })
    }

    /// Decode the mapped bytes. The view borrows from this map.
    pub fn view(&self, variant: Variant) -> AvjResult<AvjView<'_>> {
        decode_view(&self.mmap, variant)
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

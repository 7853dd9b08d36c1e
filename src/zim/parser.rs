//! Low-level ZIM archive parser.
//!
//! This module handles the binary parsing of ZIM structures, reading from
//! any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! ZIM files are designed to be read from the front:
//! 1. The fixed 80-byte header gives the positions of every pointer list
//! 2. The URL pointer list maps an entry index to its directory entry
//! 3. The cluster pointer list maps a cluster number to its raw bytes
//!
//! Directory entries have no stored length, so they are read with a
//! growing window until both NUL-terminated strings fit.

use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;

use crate::io::ReadAt;

use super::error::{Result, ZimError};
use super::structures::*;

/// First read window for a directory entry
const ENTRY_WINDOW: usize = 256;

/// Largest directory entry we are willing to read
const MAX_ENTRY_SIZE: usize = 1 << 20;

/// Upper bound on the MIME type list
const MAX_MIME_LIST_SIZE: u64 = 64 * 1024;

/// Low-level ZIM file parser.
///
/// Typically used through [`Archive`](super::Archive) rather than directly.
pub struct ZimParser {
    /// The underlying data source
    reader: Arc<dyn ReadAt>,
    /// Total size of the archive in bytes
    size: u64,
}

impl ZimParser {
    pub fn new(reader: Arc<dyn ReadAt>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read and validate the archive header.
    ///
    /// Fails with [`ZimError::Format`] if the magic number is wrong or any
    /// pointer list lies outside the file.
    pub async fn read_header(&self) -> Result<Header> {
        if self.size < Header::SIZE as u64 {
            return Err(ZimError::format("file is shorter than a ZIM header"));
        }

        let mut buf = [0u8; Header::SIZE];
        self.reader.read_exact_at(0, &mut buf).await?;
        let header = Header::from_bytes(&buf)?;

        let inside = |end: Option<u64>| end.is_some_and(|end| end <= self.size);
        if !inside(pointer_list_end(header.url_ptr_pos, header.entry_count))
            || !inside(pointer_list_end(header.cluster_ptr_pos, header.cluster_count))
            || header.mime_list_pos >= self.size
        {
            return Err(ZimError::format("pointer list lies outside the file"));
        }

        Ok(header)
    }

    pub async fn read_mime_list(&self, header: &Header) -> Result<Vec<String>> {
        let len = (self.size - header.mime_list_pos).min(MAX_MIME_LIST_SIZE);
        let mut buf = vec![0u8; len as usize];
        self.reader
            .read_exact_at(header.mime_list_pos, &mut buf)
            .await?;
        parse_mime_list(&buf)
    }

    /// Read the directory entry with the given URL-order index.
    pub async fn read_entry(&self, header: &Header, index: u32) -> Result<DirEntry> {
        if index >= header.entry_count {
            return Err(ZimError::EntryNotFound {
                index,
                count: header.entry_count,
            });
        }

        let offset = self
            .read_pointer(header.url_ptr_pos + 8 * index as u64)
            .await?;
        if offset >= self.size {
            return Err(ZimError::format(format!(
                "entry {} points past the end of the file",
                index
            )));
        }

        let mut window = ENTRY_WINDOW;
        loop {
            let len = (window as u64).min(self.size - offset) as usize;
            let mut buf = vec![0u8; len];
            self.reader.read_exact_at(offset, &mut buf).await?;

            if let Some(entry) = DirEntry::parse(index, &buf)? {
                return Ok(entry);
            }
            if len < window || window >= MAX_ENTRY_SIZE {
                return Err(ZimError::format(format!("entry {} is truncated", index)));
            }
            window *= 2;
        }
    }

    /// Read the raw bytes of a cluster, info byte included.
    pub async fn read_cluster(&self, header: &Header, cluster: u32) -> Result<Vec<u8>> {
        if cluster >= header.cluster_count {
            return Err(ZimError::format(format!(
                "cluster {} out of range (archive has {})",
                cluster, header.cluster_count
            )));
        }

        let start = self
            .read_pointer(header.cluster_ptr_pos + 8 * cluster as u64)
            .await?;
        let end = if cluster + 1 < header.cluster_count {
            self.read_pointer(header.cluster_ptr_pos + 8 * (cluster as u64 + 1))
                .await?
        } else if header.checksum_pos > start && header.checksum_pos <= self.size {
            header.checksum_pos
        } else {
            self.size
        };

        if start >= end || end > self.size {
            return Err(ZimError::format(format!(
                "cluster {} has an invalid extent {}..{}",
                cluster, start, end
            )));
        }

        let mut buf = vec![0u8; (end - start) as usize];
        self.reader.read_exact_at(start, &mut buf).await?;
        Ok(buf)
    }

    async fn read_pointer(&self, position: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.reader.read_exact_at(position, &mut buf).await?;
        Ok(LittleEndian::read_u64(&buf))
    }
}

/// End of a list of `count` 64-bit pointers at `pos`, if it fits in a `u64`
fn pointer_list_end(pos: u64, count: u32) -> Option<u64> {
    (count as u64).checked_mul(8)?.checked_add(pos)
}

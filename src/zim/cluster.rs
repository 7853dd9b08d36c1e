//! Cluster decoding.
//!
//! A cluster is laid out as one info byte followed by a payload, compressed
//! as a whole according to the info byte. The decompressed payload starts
//! with a table of blob offsets (4 or 8 bytes each, relative to the payload
//! start); blob `i` spans `offsets[i]..offsets[i + 1]`.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use super::error::{Result, ZimError};
use super::structures::Compression;

/// Info byte flag for 64-bit blob offsets
const EXTENDED_FLAG: u8 = 0x10;

/// A decompressed cluster
#[derive(Debug)]
pub struct Cluster {
    data: Vec<u8>,
    offsets: Vec<u64>,
}

impl Cluster {
    /// Decode a raw cluster (info byte included)
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        let (&info, payload) = raw
            .split_first()
            .ok_or_else(|| ZimError::format("empty cluster"))?;

        let compression = Compression::from_info(info)?;
        let data = decompress(compression, payload)?;
        let offset_size = if info & EXTENDED_FLAG != 0 { 8 } else { 4 };
        let offsets = read_offsets(&data, offset_size)?;

        Ok(Self { data, offsets })
    }

    pub fn blob_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn blob(&self, index: u32) -> Result<&[u8]> {
        let i = index as usize;
        if i >= self.blob_count() {
            return Err(ZimError::format(format!(
                "blob {} out of range (cluster has {})",
                index,
                self.blob_count()
            )));
        }
        Ok(&self.data[self.offsets[i] as usize..self.offsets[i + 1] as usize])
    }
}

fn decompress(compression: Compression, payload: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match compression {
        Compression::None => out.extend_from_slice(payload),
        Compression::Zlib => {
            flate2::read::ZlibDecoder::new(payload).read_to_end(&mut out)?;
        }
        Compression::Bzip2 => {
            bzip2::read::BzDecoder::new(payload).read_to_end(&mut out)?;
        }
        Compression::Xz => {
            xz2::read::XzDecoder::new(payload).read_to_end(&mut out)?;
        }
        Compression::Zstd => {
            out = zstd::stream::decode_all(payload)?;
        }
    }
    Ok(out)
}

fn read_offsets(data: &[u8], offset_size: usize) -> Result<Vec<u64>> {
    let wide = offset_size == 8;
    let mut cursor = Cursor::new(data);

    let first = read_offset(&mut cursor, wide)
        .map_err(|_| ZimError::format("cluster too short for its offset table"))?;
    if first == 0 || first % offset_size as u64 != 0 || first > data.len() as u64 {
        return Err(ZimError::format(format!("bad first blob offset {}", first)));
    }

    let count = (first / offset_size as u64) as usize;
    let mut offsets = Vec::with_capacity(count);
    offsets.push(first);
    for _ in 1..count {
        let offset = read_offset(&mut cursor, wide)?;
        let previous = offsets[offsets.len() - 1];
        if offset < previous || offset > data.len() as u64 {
            return Err(ZimError::format(format!("bad blob offset {}", offset)));
        }
        offsets.push(offset);
    }

    Ok(offsets)
}

fn read_offset(cursor: &mut Cursor<&[u8]>, wide: bool) -> Result<u64> {
    Ok(if wide {
        cursor.read_u64::<LittleEndian>()?
    } else {
        cursor.read_u32::<LittleEndian>()? as u64
    })
}

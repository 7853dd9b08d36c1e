use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{BufRead, Cursor, Read};

use super::error::{Result, ZimError};

/// Sentinel used by the header for "no main page / no layout page"
pub const NO_PAGE: u32 = 0xFFFF_FFFF;

/// MIME index values with special meaning in a directory entry
pub const REDIRECT_MIME: u16 = 0xFFFF;
pub const LINK_TARGET_MIME: u16 = 0xFFFE;
pub const DELETED_MIME: u16 = 0xFFFD;

/// ZIM file header - 80 bytes at offset 0
#[derive(Debug, Clone)]
pub struct Header {
    pub major_version: u16,
    pub minor_version: u16,
    pub uuid: [u8; 16],
    pub entry_count: u32,
    pub cluster_count: u32,
    pub url_ptr_pos: u64,
    pub title_ptr_pos: u64,
    pub cluster_ptr_pos: u64,
    pub mime_list_pos: u64,
    pub main_page: u32,
    pub layout_page: u32,
    pub checksum_pos: u64,
}

impl Header {
    pub const MAGIC: u32 = 72173914;
    pub const SIZE: usize = 80;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(ZimError::format("file is shorter than a ZIM header"));
        }

        let mut cursor = Cursor::new(data);
        let magic = cursor.read_u32::<LittleEndian>()?;
        if magic != Self::MAGIC {
            return Err(ZimError::format(format!("bad magic number {:#010x}", magic)));
        }

        let major_version = cursor.read_u16::<LittleEndian>()?;
        let minor_version = cursor.read_u16::<LittleEndian>()?;
        let mut uuid = [0u8; 16];
        cursor.read_exact(&mut uuid)?;

        Ok(Self {
            major_version,
            minor_version,
            uuid,
            entry_count: cursor.read_u32::<LittleEndian>()?,
            cluster_count: cursor.read_u32::<LittleEndian>()?,
            url_ptr_pos: cursor.read_u64::<LittleEndian>()?,
            title_ptr_pos: cursor.read_u64::<LittleEndian>()?,
            cluster_ptr_pos: cursor.read_u64::<LittleEndian>()?,
            mime_list_pos: cursor.read_u64::<LittleEndian>()?,
            main_page: cursor.read_u32::<LittleEndian>()?,
            layout_page: cursor.read_u32::<LittleEndian>()?,
            checksum_pos: cursor.read_u64::<LittleEndian>()?,
        })
    }

    pub fn main_page(&self) -> Option<u32> {
        (self.main_page != NO_PAGE).then_some(self.main_page)
    }

    /// Hex rendering of the archive UUID
    pub fn uuid_string(&self) -> String {
        self.uuid.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Parse the MIME type list: NUL-terminated strings closed by an empty one
pub fn parse_mime_list(data: &[u8]) -> Result<Vec<String>> {
    let mut cursor = Cursor::new(data);
    let mut types = Vec::new();

    loop {
        let mut raw = Vec::new();
        let n = cursor.read_until(0, &mut raw)?;
        if n == 0 || raw.last() != Some(&0) {
            return Err(ZimError::format("unterminated MIME type list"));
        }
        raw.pop();
        if raw.is_empty() {
            return Ok(types);
        }
        types.push(String::from_utf8_lossy(&raw).into_owned());
    }
}

/// Cluster compression types (low nibble of the cluster info byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Zlib,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    pub fn from_info(info: u8) -> Result<Self> {
        match info & 0x0F {
            0 | 1 => Ok(Compression::None),
            2 => Ok(Compression::Zlib),
            3 => Ok(Compression::Bzip2),
            4 => Ok(Compression::Xz),
            5 => Ok(Compression::Zstd),
            other => Err(ZimError::UnsupportedCompression(other)),
        }
    }
}

/// What a directory entry points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Content { mime_index: u16, cluster: u32, blob: u32 },
    Redirect { target: u32 },
    LinkTarget,
    Deleted,
}

/// Parsed ZIM directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Position in the URL-ordered directory
    pub index: u32,
    pub namespace: char,
    pub url: String,
    /// Empty when the entry has no title of its own
    pub title: String,
    pub revision: u32,
    pub kind: EntryKind,
}

impl DirEntry {
    /// Fixed part of a content entry, before the URL
    pub const CONTENT_HEADER_SIZE: usize = 16;
    /// Fixed part of a redirect entry, before the URL
    pub const REDIRECT_HEADER_SIZE: usize = 12;

    /// Parse an entry from a buffer starting at its first byte.
    ///
    /// Returns `Ok(None)` when the buffer ends before the entry does, so the
    /// caller can retry with a larger read.
    pub fn parse(index: u32, data: &[u8]) -> Result<Option<Self>> {
        if data.len() < Self::REDIRECT_HEADER_SIZE {
            return Ok(None);
        }

        let mut cursor = Cursor::new(data);
        let mime = cursor.read_u16::<LittleEndian>()?;
        let parameter_len = cursor.read_u8()? as u64;
        let namespace = cursor.read_u8()? as char;
        let revision = cursor.read_u32::<LittleEndian>()?;

        let kind = match mime {
            REDIRECT_MIME => EntryKind::Redirect {
                target: cursor.read_u32::<LittleEndian>()?,
            },
            LINK_TARGET_MIME | DELETED_MIME => {
                // Both carry the same 8 unused bytes as a content entry
                if data.len() < Self::CONTENT_HEADER_SIZE {
                    return Ok(None);
                }
                cursor.set_position(Self::CONTENT_HEADER_SIZE as u64);
                if mime == LINK_TARGET_MIME {
                    EntryKind::LinkTarget
                } else {
                    EntryKind::Deleted
                }
            }
            mime_index => {
                if data.len() < Self::CONTENT_HEADER_SIZE {
                    return Ok(None);
                }
                EntryKind::Content {
                    mime_index,
                    cluster: cursor.read_u32::<LittleEndian>()?,
                    blob: cursor.read_u32::<LittleEndian>()?,
                }
            }
        };

        let Some(url) = read_cstring(&mut cursor)? else {
            return Ok(None);
        };
        let Some(title) = read_cstring(&mut cursor)? else {
            return Ok(None);
        };
        if cursor.position() + parameter_len > data.len() as u64 {
            return Ok(None);
        }

        Ok(Some(Self {
            index,
            namespace,
            url,
            title,
            revision,
            kind,
        }))
    }

    /// Path as exposed to users: bare URL in the `C` namespace, `NS/url` elsewhere
    pub fn path(&self) -> String {
        if self.namespace == 'C' {
            self.url.clone()
        } else {
            format!("{}/{}", self.namespace, self.url)
        }
    }

    /// The title, falling back to the URL when the entry has none
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.kind, EntryKind::Redirect { .. })
    }
}

/// Read a NUL-terminated string; `None` if the terminator is missing
fn read_cstring(cursor: &mut Cursor<&[u8]>) -> Result<Option<String>> {
    let mut raw = Vec::new();
    cursor.read_until(0, &mut raw)?;
    if raw.pop() != Some(0) {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_entry(ns: u8, url: &str, title: &str) -> Vec<u8> {
        let mut data = vec![0x02, 0x00, 0x00, ns, 0, 0, 0, 0];
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(url.as_bytes());
        data.push(0);
        data.extend_from_slice(title.as_bytes());
        data.push(0);
        data
    }

    #[test]
    fn parses_content_entry() {
        let data = content_entry(b'C', "Rust_(language)", "Rust");
        let entry = DirEntry::parse(4, &data).unwrap().unwrap();
        assert_eq!(entry.index, 4);
        assert_eq!(entry.namespace, 'C');
        assert_eq!(entry.path(), "Rust_(language)");
        assert_eq!(entry.display_title(), "Rust");
        assert_eq!(
            entry.kind,
            EntryKind::Content {
                mime_index: 2,
                cluster: 7,
                blob: 3
            }
        );
    }

    #[test]
    fn truncated_entry_asks_for_more_data() {
        let data = content_entry(b'A', "Some_long_url", "");
        assert!(DirEntry::parse(0, &data[..data.len() - 1]).unwrap().is_none());
        assert!(DirEntry::parse(0, &data[..10]).unwrap().is_none());
    }

    #[test]
    fn parses_redirect_and_old_namespace_paths() {
        let mut data = vec![0xFF, 0xFF, 0x00, b'A', 0, 0, 0, 0];
        data.extend_from_slice(&9u32.to_le_bytes());
        data.extend_from_slice(b"Colour\0\0");
        let entry = DirEntry::parse(1, &data).unwrap().unwrap();
        assert!(entry.is_redirect());
        assert_eq!(entry.kind, EntryKind::Redirect { target: 9 });
        assert_eq!(entry.path(), "A/Colour");
        assert_eq!(entry.display_title(), "Colour");
    }

    #[test]
    fn mime_list_stops_at_empty_string() {
        let types = parse_mime_list(b"text/html\0image/png\0\0junk").unwrap();
        assert_eq!(types, vec!["text/html", "image/png"]);
        assert!(parse_mime_list(b"text/html\0image").is_err());
    }

    #[test]
    fn header_rejects_bad_magic() {
        let data = [0u8; Header::SIZE];
        assert!(matches!(Header::from_bytes(&data), Err(ZimError::Format(_))));
    }

    #[test]
    fn compression_from_info_byte() {
        assert_eq!(Compression::from_info(0x01).unwrap(), Compression::None);
        assert_eq!(Compression::from_info(0x15).unwrap(), Compression::Zstd);
        assert_eq!(Compression::from_info(0x04).unwrap(), Compression::Xz);
        assert!(matches!(
            Compression::from_info(0x09),
            Err(ZimError::UnsupportedCompression(9))
        ));
    }
}

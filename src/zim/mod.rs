//! Read-only ZIM archive access.
//!
//! This module reads ZIM archives (the offline wiki container used by Kiwix)
//! from any [`ReadAt`](crate::io::ReadAt) source.
//!
//! ## Architecture
//!
//! - [`structures`]: header, MIME list and directory entry layouts
//! - [`parser`]: low-level reads of those structures from a source
//! - [`cluster`]: cluster decompression and blob slicing
//! - [`archive`]: high-level entry lookup, redirects and content access
//!
//! ## ZIM Format Overview
//!
//! A ZIM file consists of:
//! 1. An 80-byte header with the positions of the lists below
//! 2. A MIME type list
//! 3. URL and title pointer lists into the directory entries
//! 4. Directory entries (content or redirect)
//! 5. A cluster pointer list and the clusters themselves
//! 6. An MD5 checksum
//!
//! ## Supported Features
//!
//! - Old (`A` namespace) and new (`C` namespace) layouts
//! - Uncompressed, zlib, bzip2, xz and zstd clusters
//! - Extended clusters with 64-bit blob offsets
//!
//! ## Limitations
//!
//! - The checksum is not verified
//! - Split archives (`.zimaa`, `.zimab`, ...) are not supported
//! - The full-text Xapian index is not read

mod archive;
mod cluster;
mod error;
mod parser;
mod structures;

pub use archive::{Archive, DEFAULT_CLUSTER_CACHE};
pub use cluster::Cluster;
pub use error::{Result, ZimError};
pub use parser::ZimParser;
pub use structures::*;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::io::ReadAt;

use super::cluster::Cluster;
use super::error::{Result, ZimError};
use super::parser::ZimParser;
use super::structures::{DirEntry, EntryKind, Header};

/// Redirect chains longer than this are treated as loops
const MAX_REDIRECTS: usize = 32;

/// Number of decompressed clusters kept by default
pub const DEFAULT_CLUSTER_CACHE: usize = 4;

/// Read-only view of an opened ZIM archive
pub struct Archive {
    parser: ZimParser,
    header: Header,
    mime_types: Vec<String>,
    clusters: Mutex<ClusterCache>,
}

impl Archive {
    /// Open an archive from any random-access source.
    pub async fn open(reader: Arc<dyn ReadAt>) -> Result<Self> {
        Self::with_cluster_cache(reader, DEFAULT_CLUSTER_CACHE).await
    }

    pub async fn with_cluster_cache(reader: Arc<dyn ReadAt>, capacity: usize) -> Result<Self> {
        let parser = ZimParser::new(reader);
        let header = parser.read_header().await?;
        let mime_types = parser.read_mime_list(&header).await?;

        tracing::debug!(
            version = %format!("{}.{}", header.major_version, header.minor_version),
            uuid = %header.uuid_string(),
            entries = header.entry_count,
            clusters = header.cluster_count,
            "opened ZIM archive"
        );

        Ok(Self {
            parser,
            header,
            mime_types,
            clusters: Mutex::new(ClusterCache::new(capacity)),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn entry_count(&self) -> u32 {
        self.header.entry_count
    }

    pub fn size(&self) -> u64 {
        self.parser.size()
    }

    /// Look up a directory entry by its index.
    pub async fn entry(&self, index: u32) -> Result<DirEntry> {
        self.parser.read_entry(&self.header, index).await
    }

    /// Follow redirects until a non-redirect entry is reached.
    pub async fn resolve(&self, mut entry: DirEntry) -> Result<DirEntry> {
        for _ in 0..MAX_REDIRECTS {
            match entry.kind {
                EntryKind::Redirect { target } => entry = self.entry(target).await?,
                _ => return Ok(entry),
            }
        }
        Err(ZimError::format(format!(
            "redirect chain from '{}' does not terminate",
            entry.path()
        )))
    }

    /// The archive's main page, with redirects followed.
    pub async fn main_entry(&self) -> Result<Option<DirEntry>> {
        match self.header.main_page() {
            Some(index) => {
                let entry = self.entry(index).await?;
                Ok(Some(self.resolve(entry).await?))
            }
            None => Ok(None),
        }
    }

    /// MIME type of a content entry.
    pub fn mime_type(&self, entry: &DirEntry) -> Option<&str> {
        match entry.kind {
            EntryKind::Content { mime_index, .. } => {
                self.mime_types.get(mime_index as usize).map(String::as_str)
            }
            _ => None,
        }
    }

    /// Raw content of an entry (redirects are not followed).
    pub async fn content(&self, entry: &DirEntry) -> Result<Vec<u8>> {
        let EntryKind::Content { cluster, blob, .. } = entry.kind else {
            return Err(ZimError::format(format!(
                "entry '{}' has no content",
                entry.path()
            )));
        };

        let cluster = self.cluster(cluster).await?;
        Ok(cluster.blob(blob)?.to_vec())
    }

    async fn cluster(&self, number: u32) -> Result<Arc<Cluster>> {
        if let Some(hit) = self.cache().get(number) {
            return Ok(hit);
        }

        let raw = self.parser.read_cluster(&self.header, number).await?;
        let cluster = Arc::new(Cluster::from_raw(&raw)?);
        tracing::trace!(cluster = number, blobs = cluster.blob_count(), "decoded cluster");

        self.cache().insert(number, cluster.clone());
        Ok(cluster)
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, ClusterCache> {
        self.clusters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Most-recently-used list of decoded clusters
struct ClusterCache {
    capacity: usize,
    entries: VecDeque<(u32, Arc<Cluster>)>,
}

impl ClusterCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    fn get(&mut self, number: u32) -> Option<Arc<Cluster>> {
        let pos = self.entries.iter().position(|(n, _)| *n == number)?;
        let hit = self.entries.remove(pos)?;
        let cluster = hit.1.clone();
        self.entries.push_front(hit);
        Some(cluster)
    }

    fn insert(&mut self, number: u32, cluster: Arc<Cluster>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front((number, cluster));
    }
}

//! Errors raised while reading a ZIM archive.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZimError {
    /// The archive path does not exist.
    #[error("ZIM file not found: {0}")]
    FileNotFound(String),

    /// The data is not a well-formed ZIM archive.
    #[error("Not a valid ZIM archive: {0}")]
    Format(String),

    /// No directory entry has this index.
    #[error("No entry with index {index} (archive has {count} entries)")]
    EntryNotFound { index: u32, count: u32 },

    /// The cluster uses a compression type this reader does not know.
    #[error("Unsupported cluster compression type: {0}")]
    UnsupportedCompression(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure in the underlying byte source (local file or HTTP).
    #[error(transparent)]
    Source(anyhow::Error),
}

impl From<anyhow::Error> for ZimError {
    fn from(err: anyhow::Error) -> Self {
        // Sources may already carry a ZimError (e.g. FileNotFound)
        match err.downcast::<ZimError>() {
            Ok(zim) => zim,
            Err(other) => Self::Source(other),
        }
    }
}

impl ZimError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ZimError>;

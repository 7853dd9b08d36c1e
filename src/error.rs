//! Errors from the explorer layer.
use thiserror::Error;

use crate::graph::ArticleId;
use crate::zim::ZimError;

#[derive(Debug, Error)]
pub enum ExploreError {
    /// No article has this ID.
    #[error("No article with ID {0}")]
    ArticleNotFound(ArticleId),

    /// Reading the archive failed.
    #[error(transparent)]
    Archive(#[from] ZimError),

    /// Writing output or reading user input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExploreError {
    /// Whether the interactive loop can report this error and carry on.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ArticleNotFound(_))
    }
}

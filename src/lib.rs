//! # explore-zim
//!
//! Explore the link graph embedded in a ZIM archive (the offline wiki
//! container used by Kiwix).
//!
//! The crate reads ZIM archives from the local filesystem or from HTTP/HTTPS
//! URLs using Range requests, extracts the `<a href>` links of every HTML
//! article and builds a directed graph over them. On top of that graph it
//! offers keyword search, ID lookup, forward/backward link enumeration and a
//! listing of all articles grouped by category.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use explore_zim::{Explorer, ExplorerOptions, LocalFileReader};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(LocalFileReader::new(Path::new("wikipedia_en_top.zim"))?);
//!     let explorer = Explorer::open(reader, &ExplorerOptions::default()).await?;
//!
//!     for article in explorer.search_by_keyword("rust") {
//!         let forward = explorer.forward_links(article);
//!         println!("{} links to {} articles", article.title, forward.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod explorer;
pub mod format;
pub mod graph;
pub mod io;
pub mod repl;
pub mod search;
pub mod zim;

pub use cli::{Cli, Mode};
pub use error::ExploreError;
pub use explorer::{Explorer, ExplorerOptions};
pub use graph::{Article, ArticleId, LinkGraph, Listing};
pub use io::{HttpRangeReader, LocalFileReader, ReadAt};
pub use zim::{Archive, ZimError};

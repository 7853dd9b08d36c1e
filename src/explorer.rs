//! Article access over an archive's link graph.

use std::sync::Arc;

use crate::error::ExploreError;
use crate::graph::{self, Article, ArticleId, LinkGraph, Listing};
use crate::io::ReadAt;
use crate::search::{self, SearchOptions};
use crate::zim::{Archive, DEFAULT_CLUSTER_CACHE};

/// Settings resolved from the command line
#[derive(Debug, Clone)]
pub struct ExplorerOptions {
    /// Keep only categories and the articles they link to
    pub exclude_related: bool,
    pub search: SearchOptions,
    /// Number of decompressed clusters kept while reading
    pub cluster_cache: usize,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            exclude_related: false,
            search: SearchOptions::default(),
            cluster_cache: DEFAULT_CLUSTER_CACHE,
        }
    }
}

/// Read-only explorer over one archive
pub struct Explorer {
    graph: LinkGraph,
    total_articles: usize,
    category_related: usize,
    search: SearchOptions,
}

impl Explorer {
    /// Open an archive and build its link graph.
    ///
    /// Fails with [`ZimError::FileNotFound`](crate::zim::ZimError) or
    /// [`ZimError::Format`](crate::zim::ZimError) wrapped in
    /// [`ExploreError::Archive`].
    pub async fn open(
        reader: Arc<dyn ReadAt>,
        options: &ExplorerOptions,
    ) -> Result<Self, ExploreError> {
        let archive = Archive::with_cluster_cache(reader, options.cluster_cache).await?;
        let graph = graph::build(&archive).await?;
        Ok(Self::from_graph(graph, options))
    }

    pub fn from_graph(graph: LinkGraph, options: &ExplorerOptions) -> Self {
        let total_articles = graph.len();
        let category_related = graph.category_related().len();
        let graph = if options.exclude_related {
            graph.restrict_to_category_related()
        } else {
            graph
        };

        Self {
            graph,
            total_articles,
            category_related,
            search: options.search.clone(),
        }
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    /// Number of articles in the whole archive
    pub fn total_articles(&self) -> usize {
        self.total_articles
    }

    /// Number of categories plus articles directly linked from a category
    pub fn category_related_articles(&self) -> usize {
        self.category_related
    }

    pub fn search_by_keyword(&self, text: &str) -> Vec<&Article> {
        search::search(self.graph.articles(), text, &self.search)
            .into_iter()
            .map(|hit| hit.article)
            .collect()
    }

    pub fn get_by_id(&self, id: ArticleId) -> Result<&Article, ExploreError> {
        self.graph
            .article(id)
            .ok_or(ExploreError::ArticleNotFound(id))
    }

    pub fn get_by_path(&self, path: &str) -> Option<&Article> {
        self.graph.by_path(path)
    }

    pub fn forward_links(&self, article: &Article) -> Vec<&Article> {
        self.graph.forward(article.id).collect()
    }

    pub fn backward_links(&self, article: &Article) -> Vec<&Article> {
        self.graph.backward(article.id).collect()
    }

    pub fn listing(&self) -> &Listing {
        self.graph.listing()
    }
}

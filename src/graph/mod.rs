//! The article link graph.
//!
//! Nodes are HTML articles of the archive, keyed by their directory index.
//! Edges are `<a href>` links between articles, with redirects resolved and
//! self-links, external links and links to missing entries dropped, so both
//! adjacency maps only ever mention articles of the graph.

mod builder;
mod links;
mod listing;

pub use builder::build;
pub use links::{extract_hrefs, internal_target, join_path};
pub use listing::{CategoryGroup, Listing};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Prefix that marks category articles
pub const CATEGORY_PREFIX: &str = "Category:";

/// Archive-assigned article identifier (the entry's directory index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArticleId(pub u32);

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArticleId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ArticleId)
    }
}

/// An HTML article of the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,
    /// URL inside the article's namespace
    pub url: String,
    /// User-facing path (`url` for the `C` namespace, `NS/url` otherwise)
    pub path: String,
    pub title: String,
    pub mime_type: String,
    /// Path of the category this article is listed under, if any
    pub category: Option<String>,
}

impl Article {
    pub fn new(
        id: ArticleId,
        namespace: char,
        url: impl Into<String>,
        title: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let path = if namespace == 'C' {
            url.clone()
        } else {
            format!("{}/{}", namespace, url)
        };
        let title = title.into();
        let title = if title.is_empty() { url.clone() } else { title };

        Self {
            id,
            url,
            path,
            title,
            mime_type: mime_type.into(),
            category: None,
        }
    }

    pub fn is_category(&self) -> bool {
        self.url.starts_with(CATEGORY_PREFIX)
    }
}

/// Directed link graph over the archive's articles
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    articles: BTreeMap<ArticleId, Article>,
    by_path: HashMap<String, ArticleId>,
    forward: BTreeMap<ArticleId, BTreeSet<ArticleId>>,
    backward: BTreeMap<ArticleId, BTreeSet<ArticleId>>,
    main_page: Option<ArticleId>,
    listing: Listing,
}

impl LinkGraph {
    /// Build a graph from articles and `(from, to)` links.
    ///
    /// Links touching unknown articles and self-links are ignored. The main
    /// page is kept only if it is one of the articles.
    pub fn new(
        articles: impl IntoIterator<Item = Article>,
        links: impl IntoIterator<Item = (ArticleId, ArticleId)>,
        main_page: Option<ArticleId>,
    ) -> Self {
        let mut graph = LinkGraph::default();

        for mut article in articles {
            article.category = None;
            graph.by_path.insert(article.path.clone(), article.id);
            graph.articles.insert(article.id, article);
        }

        for (from, to) in links {
            if from == to || !graph.contains(from) || !graph.contains(to) {
                continue;
            }
            graph.forward.entry(from).or_default().insert(to);
            graph.backward.entry(to).or_default().insert(from);
        }

        graph.main_page = main_page.filter(|id| graph.contains(*id));
        graph.listing = listing::group_by_category(&graph);

        for group in &graph.listing.groups {
            let Some(category) = graph.articles.get(&group.category).map(|c| c.path.clone())
            else {
                continue;
            };
            for member in &group.members {
                if let Some(article) = graph.articles.get_mut(member) {
                    article.category = Some(category.clone());
                }
            }
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn contains(&self, id: ArticleId) -> bool {
        self.articles.contains_key(&id)
    }

    pub fn article(&self, id: ArticleId) -> Option<&Article> {
        self.articles.get(&id)
    }

    pub fn by_path(&self, path: &str) -> Option<&Article> {
        self.by_path.get(path).and_then(|id| self.articles.get(id))
    }

    /// All articles in ID order
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.articles.values()
    }

    pub fn categories(&self) -> impl Iterator<Item = &Article> {
        self.articles.values().filter(|a| a.is_category())
    }

    pub fn main_page(&self) -> Option<ArticleId> {
        self.main_page
    }

    /// IDs of the articles `id` links to, in ID order
    pub fn forward_ids(&self, id: ArticleId) -> impl Iterator<Item = ArticleId> + '_ {
        self.forward.get(&id).into_iter().flatten().copied()
    }

    /// IDs of the articles linking to `id`, in ID order
    pub fn backward_ids(&self, id: ArticleId) -> impl Iterator<Item = ArticleId> + '_ {
        self.backward.get(&id).into_iter().flatten().copied()
    }

    pub fn forward(&self, id: ArticleId) -> impl Iterator<Item = &Article> {
        self.forward_ids(id).filter_map(|to| self.articles.get(&to))
    }

    pub fn backward(&self, id: ArticleId) -> impl Iterator<Item = &Article> {
        self.backward_ids(id).filter_map(|from| self.articles.get(&from))
    }

    pub fn link_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    /// Categories plus every article a category links to directly
    pub fn category_related(&self) -> BTreeSet<ArticleId> {
        let mut related = BTreeSet::new();
        for category in self.categories() {
            related.insert(category.id);
            related.extend(self.forward_ids(category.id));
        }
        related
    }

    /// The subgraph induced by the category-related articles
    pub fn restrict_to_category_related(&self) -> LinkGraph {
        let keep = self.category_related();
        let articles = keep.iter().filter_map(|id| self.articles.get(id)).cloned();
        let links = keep
            .iter()
            .flat_map(|&from| self.forward_ids(from).map(move |to| (from, to)))
            .filter(|(_, to)| keep.contains(to))
            .collect::<Vec<_>>();

        LinkGraph::new(articles, links, self.main_page)
    }
}

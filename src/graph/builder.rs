use std::collections::{HashMap, HashSet};

use crate::zim::{Archive, DirEntry, EntryKind, Result};

use super::links::{extract_hrefs, internal_target, join_path};
use super::{Article, ArticleId, LinkGraph};

/// MIME type of the entries that become articles
const HTML_MIME: &str = "text/html";

/// Redirect hops followed when resolving a link target
const MAX_REDIRECT_HOPS: usize = 32;

/// Log progress every this many articles
const PROGRESS_EVERY: usize = 500;

/// Directory data needed to resolve link targets
#[derive(Default)]
struct Directory {
    paths: HashMap<String, u32>,
    redirects: HashMap<u32, u32>,
    articles: HashSet<u32>,
}

impl Directory {
    /// Map an href found in `page` to the article it refers to.
    fn resolve(&self, page: &DirEntry, href: &str) -> Option<ArticleId> {
        let target = internal_target(href)?;
        let base = page.path();

        let joined = join_path(&base, &target);
        let stripped = target.trim_start_matches(['.', '/']);

        let index = [joined.as_str(), stripped]
            .into_iter()
            .find_map(|candidate| {
                self.paths.get(candidate).copied().or_else(|| {
                    // Old archives link within the page's namespace
                    if page.namespace == 'C' {
                        None
                    } else {
                        self.paths
                            .get(&format!("{}/{}", page.namespace, candidate))
                            .copied()
                    }
                })
            })?;

        let index = self.follow_redirects(index)?;
        self.articles.contains(&index).then_some(ArticleId(index))
    }

    fn follow_redirects(&self, mut index: u32) -> Option<u32> {
        for _ in 0..MAX_REDIRECT_HOPS {
            match self.redirects.get(&index) {
                Some(&target) => index = target,
                None => return Some(index),
            }
        }
        None
    }
}

/// Build the link graph of an archive.
///
/// Reads every directory entry, then the content of every HTML article in
/// cluster order so each cluster is decompressed once.
pub async fn build(archive: &Archive) -> Result<LinkGraph> {
    let count = archive.entry_count();
    tracing::info!(entries = count, "Reading archive directory");

    let mut directory = Directory::default();
    let mut pages: Vec<(DirEntry, String)> = Vec::new();

    for index in 0..count {
        let entry = archive.entry(index).await?;
        directory.paths.insert(entry.path(), index);

        match entry.kind {
            EntryKind::Redirect { target } => {
                directory.redirects.insert(index, target);
            }
            EntryKind::Content { .. } => {
                let Some(mime) = archive.mime_type(&entry) else {
                    continue;
                };
                if mime.starts_with(HTML_MIME) {
                    directory.articles.insert(index);
                    let mime = mime.to_string();
                    pages.push((entry, mime));
                }
            }
            EntryKind::LinkTarget | EntryKind::Deleted => {}
        }
    }

    pages.sort_by_key(|(entry, _)| match entry.kind {
        EntryKind::Content { cluster, blob, .. } => (cluster, blob),
        _ => (u32::MAX, u32::MAX),
    });

    tracing::info!(articles = pages.len(), "Reading articles");

    let mut links = Vec::new();
    for (n, (page, _)) in pages.iter().enumerate() {
        let html = archive.content(page).await?;
        let html = String::from_utf8_lossy(&html);
        let from = ArticleId(page.index);

        links.extend(
            extract_hrefs(&html)
                .iter()
                .filter_map(|href| directory.resolve(page, href))
                .map(|to| (from, to)),
        );

        if (n + 1) % PROGRESS_EVERY == 0 {
            tracing::debug!("Read {}/{} articles", n + 1, pages.len());
        }
    }

    let main_page = archive
        .main_entry()
        .await?
        .map(|entry| ArticleId(entry.index));

    let articles = pages.into_iter().map(|(entry, mime)| {
        Article::new(
            ArticleId(entry.index),
            entry.namespace,
            entry.url.clone(),
            entry.display_title(),
            mime,
        )
    });

    let graph = LinkGraph::new(articles, links, main_page);
    tracing::info!(
        articles = graph.len(),
        links = graph.link_count(),
        "Built link graph"
    );
    Ok(graph)
}

//! Plain-text rendering of articles, listings and search results.
//!
//! Every function here is pure: it builds a `String` and leaves writing it
//! to the caller.

use std::fmt::Write;

use crate::explorer::Explorer;
use crate::graph::{Article, LinkGraph, Listing};

/// `[id] path (title)`, the title omitted when it adds nothing
pub fn format_link(article: &Article) -> String {
    if article.title == article.path || article.title == article.url {
        format!("[{}] {}", article.id, article.path)
    } else {
        format!("[{}] {} ({})", article.id, article.path, article.title)
    }
}

/// Render an article's metadata followed by its forward and backward links.
pub fn format_article(article: &Article, forward: &[&Article], backward: &[&Article]) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", article.title);
    let _ = writeln!(out, "{}", article.mime_type);
    let _ = writeln!(out, "ID: {}", article.id);
    let _ = writeln!(out, "Path: {}", article.path);
    match &article.category {
        Some(category) => {
            let _ = writeln!(out, "Category: {}", category);
        }
        None => out.push_str("Category: (uncategorized)\n"),
    }
    out.push('\n');

    push_links(&mut out, "Forward links", "(No forward links)", forward);
    out.push('\n');
    push_links(&mut out, "Backward links", "(No backward links)", backward);

    out
}

fn push_links(out: &mut String, heading: &str, empty: &str, links: &[&Article]) {
    let mut links = links.to_vec();
    links.sort_by(|a, b| a.path.cmp(&b.path).then(a.id.cmp(&b.id)));

    out.push_str(heading);
    out.push_str(":\n");
    for link in &links {
        let _ = writeln!(out, " * {}", format_link(link));
    }
    if links.is_empty() {
        let _ = writeln!(out, "{}", empty);
    }
}

/// Render the category listing: one heading per category, then the
/// uncategorized articles.
pub fn format_listing(listing: &Listing, graph: &LinkGraph) -> String {
    let mut out = String::new();

    for group in &listing.groups {
        let Some(category) = graph.article(group.category) else {
            continue;
        };

        let mut heading: Vec<String> = group
            .breadcrumbs
            .iter()
            .filter_map(|id| graph.article(*id))
            .map(|a| a.path.clone())
            .collect();
        heading.push(format_link(category));
        let _ = writeln!(out, "{}:", heading.join(" / "));

        for member in group.members.iter().filter_map(|id| graph.article(*id)) {
            let _ = writeln!(out, " * {}", format_link(member));
        }
        if group.members.is_empty() {
            out.push_str("(No articles)\n");
        }
        out.push('\n');
    }

    out.push_str("Uncategorized articles:\n");
    for article in listing.uncategorized.iter().filter_map(|id| graph.article(*id)) {
        let _ = writeln!(out, " * {}", format_link(article));
    }
    if listing.uncategorized.is_empty() {
        out.push_str("(No uncategorized articles)\n");
    }

    out
}

/// Render keyword search candidates for the user to pick from.
pub fn format_candidates(hits: &[&Article]) -> String {
    let mut out = String::from("Search results:\n");
    for hit in hits {
        let _ = writeln!(out, " * {}", format_link(hit));
    }
    if hits.is_empty() {
        out.push_str("(No search results)\n");
    } else {
        out.push_str("Enter an ID to view an article.\n");
    }
    out
}

pub fn format_summary(total: usize, category_related: usize) -> String {
    format!(
        "Graph contains {} articles\n{} articles are directly related to categories\n",
        total, category_related
    )
}

/// Render the summary banner followed by every article with its links, in
/// ID order, each preceded by a blank line.
pub fn format_exploration(explorer: &Explorer) -> String {
    let mut out = format_summary(
        explorer.total_articles(),
        explorer.category_related_articles(),
    );
    for article in explorer.graph().articles() {
        let forward = explorer.forward_links(article);
        let backward = explorer.backward_links(article);
        out.push('\n');
        out.push_str(&format_article(article, &forward, &backward));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ArticleId;

    fn article(id: u32, url: &str, title: &str) -> Article {
        Article::new(ArticleId(id), 'C', url, title, "text/html")
    }

    #[test]
    fn link_omits_redundant_title() {
        assert_eq!(format_link(&article(3, "Dog", "")), "[3] Dog");
        assert_eq!(format_link(&article(4, "Canis_lupus", "Wolf")), "[4] Canis_lupus (Wolf)");
    }

    #[test]
    fn article_links_are_sorted_by_path() {
        let main = article(1, "Dog", "Dog");
        let wolf = article(4, "Wolf", "");
        let cat = article(2, "Cat", "");
        let text = format_article(&main, &[&wolf, &cat], &[]);

        let expected = "Dog\ntext/html\nID: 1\nPath: Dog\nCategory: (uncategorized)\n\n\
                        Forward links:\n * [2] Cat\n * [4] Wolf\n\n\
                        Backward links:\n(No backward links)\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn listing_shows_breadcrumbs_and_uncategorized() {
        let graph = LinkGraph::new(
            vec![
                article(0, "Category:Science", ""),
                article(1, "Category:Physics", ""),
                article(2, "Atom", ""),
                article(3, "Stray", ""),
            ],
            vec![(ArticleId(0), ArticleId(1)), (ArticleId(1), ArticleId(2))],
            None,
        );
        let text = format_listing(graph.listing(), &graph);

        assert!(text.starts_with("[0] Category:Science:\n * [1] Category:Physics\n\n"));
        assert!(text.contains("Category:Science / [1] Category:Physics:\n * [2] Atom\n"));
        assert!(text.ends_with("Uncategorized articles:\n * [0] Category:Science\n * [3] Stray\n"));
    }

    #[test]
    fn empty_candidates_say_so() {
        assert_eq!(format_candidates(&[]), "Search results:\n(No search results)\n");
    }
}

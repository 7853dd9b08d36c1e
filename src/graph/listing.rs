//! Grouping of articles by category.
//!
//! Categories are walked breadth-first along category-to-category links
//! (neighbours in ID order), seeded by every category in ID order. In that
//! walk order each category claims the articles it links to directly that no
//! earlier category has claimed. Articles no category links to are
//! uncategorized, so every article is listed exactly once.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{ArticleId, LinkGraph};

/// One category heading with its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: ArticleId,
    /// Category ancestors of `category` on the walk, outermost first
    pub breadcrumbs: Vec<ArticleId>,
    pub members: Vec<ArticleId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub groups: Vec<CategoryGroup>,
    pub uncategorized: Vec<ArticleId>,
}

impl Listing {
    /// Every listed article: group members followed by uncategorized ones
    pub fn items(&self) -> impl Iterator<Item = ArticleId> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter().copied())
            .chain(self.uncategorized.iter().copied())
    }
}

pub(super) fn group_by_category(graph: &LinkGraph) -> Listing {
    let is_category = |id: ArticleId| graph.article(id).is_some_and(|a| a.is_category());

    // Categories in walk order, each with the category it was reached from
    let mut order: Vec<ArticleId> = Vec::new();
    let mut parent: HashMap<ArticleId, ArticleId> = HashMap::new();
    let mut visited: HashSet<ArticleId> = HashSet::new();
    let mut queue = VecDeque::new();

    for seed in graph.categories().map(|c| c.id) {
        if !visited.insert(seed) {
            continue;
        }
        queue.push_back(seed);

        while let Some(category) = queue.pop_front() {
            order.push(category);
            for child in graph.forward_ids(category).filter(|id| is_category(*id)) {
                if visited.insert(child) {
                    parent.insert(child, category);
                    queue.push_back(child);
                }
            }
        }
    }

    let mut claimed: HashSet<ArticleId> = HashSet::new();
    let mut groups = Vec::with_capacity(order.len());

    for category in order {
        let mut breadcrumbs = Vec::new();
        let mut cursor = parent.get(&category);
        while let Some(&ancestor) = cursor {
            breadcrumbs.push(ancestor);
            cursor = parent.get(&ancestor);
        }
        breadcrumbs.reverse();

        let members = graph
            .forward_ids(category)
            .filter(|id| claimed.insert(*id))
            .collect();

        groups.push(CategoryGroup {
            category,
            breadcrumbs,
            members,
        });
    }

    let uncategorized = graph
        .articles()
        .map(|a| a.id)
        .filter(|id| !claimed.contains(id))
        .collect();

    Listing {
        groups,
        uncategorized,
    }
}

#[cfg(test)]
mod tests {
    use super::super::Article;
    use super::*;

    fn graph(urls: &[&str], links: &[(u32, u32)], main: Option<u32>) -> LinkGraph {
        LinkGraph::new(
            urls.iter()
                .enumerate()
                .map(|(i, url)| Article::new(ArticleId(i as u32), 'C', *url, "", "text/html")),
            links.iter().map(|&(a, b)| (ArticleId(a), ArticleId(b))),
            main.map(ArticleId),
        )
    }

    #[test]
    fn nested_categories_get_breadcrumbs() {
        // 0 main -> 1 Category:Science -> 2 Category:Physics -> 3 Atom
        let g = graph(
            &["Main", "Category:Science", "Category:Physics", "Atom", "Lonely"],
            &[(0, 1), (1, 2), (2, 3), (1, 3)],
            Some(0),
        );
        let listing = g.listing();

        assert_eq!(listing.groups.len(), 2);
        assert_eq!(listing.groups[0].category, ArticleId(1));
        assert!(listing.groups[0].breadcrumbs.is_empty());
        assert_eq!(listing.groups[0].members, vec![ArticleId(2), ArticleId(3)]);

        assert_eq!(listing.groups[1].category, ArticleId(2));
        assert_eq!(listing.groups[1].breadcrumbs, vec![ArticleId(1)]);
        assert!(listing.groups[1].members.is_empty());

        assert_eq!(listing.uncategorized, vec![ArticleId(0), ArticleId(1), ArticleId(4)]);
    }

    #[test]
    fn every_article_listed_exactly_once() {
        let g = graph(
            &["Category:A", "Category:B", "X", "Y", "Z", "Home"],
            &[(0, 2), (0, 3), (1, 3), (1, 4), (1, 0), (5, 2), (2, 4)],
            Some(5),
        );
        let mut items: Vec<_> = g.listing().items().collect();
        items.sort();
        let all: Vec<_> = g.articles().map(|a| a.id).collect();
        assert_eq!(items, all);
    }

    #[test]
    fn unreachable_categories_still_group_their_articles() {
        let g = graph(&["Start", "Category:Orphans", "Pip"], &[(1, 2)], Some(0));
        let listing = g.listing();
        assert_eq!(listing.groups.len(), 1);
        assert_eq!(listing.groups[0].members, vec![ArticleId(2)]);
        assert_eq!(
            g.article(ArticleId(2)).unwrap().category.as_deref(),
            Some("Category:Orphans")
        );
    }

    #[test]
    fn direct_category_links_win_over_other_paths() {
        // Main reaches Dog and Stray reaches Bone before either category
        let g = graph(
            &["Main", "Category:Animals", "Dog", "Stray", "Bone", "Category:Things"],
            &[(0, 2), (0, 3), (3, 4), (0, 1), (1, 2), (1, 3), (5, 4)],
            Some(0),
        );
        let listing = g.listing();

        assert_eq!(listing.groups[0].category, ArticleId(1));
        assert_eq!(listing.groups[0].members, vec![ArticleId(2), ArticleId(3)]);
        assert_eq!(listing.groups[1].category, ArticleId(5));
        assert_eq!(listing.groups[1].members, vec![ArticleId(4)]);
        assert_eq!(listing.uncategorized, vec![ArticleId(0), ArticleId(1), ArticleId(5)]);
        assert_eq!(
            g.article(ArticleId(2)).unwrap().category.as_deref(),
            Some("Category:Animals")
        );
    }
}

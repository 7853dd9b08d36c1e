//! Fuzzy and exact keyword search over article titles and paths.
use nucleo_matcher::{
    Matcher, Utf32Str,
    pattern::{CaseMatching, Normalization, Pattern},
};

use crate::graph::Article;

/// Default number of search results
pub const DEFAULT_LIMIT: usize = 10;

/// A search hit with its match score.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub article: &'a Article,
    /// Match score (higher = better match). 0 for exact search (unscored).
    pub score: u32,
}

/// Search options.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum number of results to return.
    pub limit: usize,
    /// Use exact substring match instead of fuzzy.
    pub exact: bool,
    /// Case-sensitive matching.
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            exact: false,
            case_sensitive: false,
        }
    }
}

/// Search articles by keyword.
///
/// Matches against both the title and the path; a fuzzy hit keeps the
/// better of the two scores. Results are sorted by score descending; equal
/// scores keep the input order. An empty query matches nothing.
#[must_use]
pub fn search<'a>(
    articles: impl IntoIterator<Item = &'a Article>,
    query: &str,
    opts: &SearchOptions,
) -> Vec<SearchHit<'a>> {
    let query = query.trim();
    if query.is_empty() || opts.limit == 0 {
        return Vec::new();
    }

    if opts.exact {
        return exact_search(articles, query, opts);
    }

    fuzzy_search(articles, query, opts)
}

fn exact_search<'a>(
    articles: impl IntoIterator<Item = &'a Article>,
    query: &str,
    opts: &SearchOptions,
) -> Vec<SearchHit<'a>> {
    let needle = if opts.case_sensitive {
        query.to_string()
    } else {
        query.to_lowercase()
    };

    articles
        .into_iter()
        .filter(|article| {
            [&article.title, &article.path].into_iter().any(|hay| {
                if opts.case_sensitive {
                    hay.contains(&needle)
                } else {
                    hay.to_lowercase().contains(&needle)
                }
            })
        })
        .take(opts.limit)
        .map(|article| SearchHit { article, score: 0 })
        .collect()
}

fn fuzzy_search<'a>(
    articles: impl IntoIterator<Item = &'a Article>,
    query: &str,
    opts: &SearchOptions,
) -> Vec<SearchHit<'a>> {
    let case_matching = if opts.case_sensitive {
        CaseMatching::Respect
    } else {
        CaseMatching::Smart
    };

    let pattern = Pattern::parse(query, case_matching, Normalization::Smart);
    let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
    let mut buf = Vec::new();

    let mut scored: Vec<SearchHit<'a>> = articles
        .into_iter()
        .filter_map(|article| {
            let mut best: Option<u32> = None;
            for hay in [&article.title, &article.path] {
                let haystack = Utf32Str::new(hay, &mut buf);
                if let Some(score) = pattern.score(haystack, &mut matcher) {
                    best = Some(best.map_or(score, |b| b.max(score)));
                }
            }
            best.map(|score| SearchHit { article, score })
        })
        .collect();

    // Stable: ties stay in ID order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(opts.limit);
    scored
}

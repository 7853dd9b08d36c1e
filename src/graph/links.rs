//! Link extraction from article HTML.

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\shref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("href regex did not compile")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex did not compile"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|(quot|apos|lt|gt|amp));")
        .expect("entity regex did not compile")
});

/// URL schemes that never point into the archive
const FOREIGN_SCHEMES: &[&str] = &["mailto:", "javascript:", "tel:", "data:"];

/// Collect the `href` attribute of every `<a>` element outside HTML
/// comments, entity-decoded.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let html = COMMENT.replace_all(html, "");
    HREF.captures_iter(&html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| decode_entities(m.as_str().trim()))
        .collect()
}

/// The in-archive path an href refers to, or `None` for external links,
/// fragment-only links and foreign schemes.
///
/// Query strings and fragments are dropped and the path is percent-decoded.
pub fn internal_target(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("//") || href.contains("://") {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if FOREIGN_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let end = href.find(['?', '#']).unwrap_or(href.len());
    let path = percent_decode_str(&href[..end]).decode_utf8_lossy();
    if path.is_empty() {
        return None;
    }
    Some(path.into_owned())
}

/// Resolve `target` relative to the directory of `base`, normalising
/// `.` and `..` segments. `..` never climbs above the archive root.
pub fn join_path(base: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        let mut dir: Vec<&str> = base.split('/').collect();
        dir.pop();
        dir
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Decode the named entities common in attribute values and every numeric
/// character reference. Unknown or invalid references are kept as written.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    ENTITY
        .replace_all(raw, |caps: &Captures| {
            let code = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok()
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else {
                None
            };

            match (code.and_then(char::from_u32), caps.get(3).map(|m| m.as_str())) {
                (Some(c), _) => c.to_string(),
                (None, Some("quot")) => "\"".to_string(),
                (None, Some("apos")) => "'".to_string(),
                (None, Some("lt")) => "<".to_string(),
                (None, Some("gt")) => ">".to_string(),
                (None, Some("amp")) => "&".to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

//! Interactive explorer loop.

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::ExploreError;
use crate::explorer::Explorer;
use crate::format;
use crate::graph::{Article, ArticleId};

const PROMPT: &str = "Enter an article: ";

/// One line of user input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Empty,
    /// Digits only; may still overflow an [`ArticleId`]
    Lookup(String),
    Search(String),
}

/// Classify a line. Anything made only of ASCII digits is an ID lookup.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        Command::Empty
    } else if line.bytes().all(|b| b.is_ascii_digit()) {
        Command::Lookup(line.to_string())
    } else if matches!(line, "exit" | "quit") {
        Command::Exit
    } else {
        Command::Search(line.to_string())
    }
}

/// Run the loop until end of input or an exit command.
///
/// Unknown IDs and empty searches are reported on `out` and the loop goes
/// on; any other error ends the session.
pub async fn run<R, W>(explorer: &Explorer, input: R, out: &mut W) -> Result<(), ExploreError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    write!(
        out,
        "{}",
        format::format_summary(
            explorer.total_articles(),
            explorer.category_related_articles()
        )
    )?;

    loop {
        write!(out, "\n{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            return Ok(());
        };

        match parse_command(&line) {
            Command::Exit => return Ok(()),
            Command::Empty => continue,
            Command::Lookup(digits) => lookup(explorer, &digits, out)?,
            Command::Search(query) => search(explorer, &query, out)?,
        }
    }
}

fn lookup<W: Write>(explorer: &Explorer, digits: &str, out: &mut W) -> Result<(), ExploreError> {
    let Ok(id) = digits.parse::<ArticleId>() else {
        writeln!(out, "No article with ID {}", digits)?;
        return Ok(());
    };

    match explorer.get_by_id(id) {
        Ok(article) => show(explorer, article, out),
        Err(err) if err.is_recoverable() => {
            writeln!(out, "{}", err)?;
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn search<W: Write>(explorer: &Explorer, query: &str, out: &mut W) -> Result<(), ExploreError> {
    if let Some(article) = explorer.get_by_path(query) {
        return show(explorer, article, out);
    }

    let hits = explorer.search_by_keyword(query);
    tracing::debug!(query, hits = hits.len(), "keyword search");

    match hits.as_slice() {
        [single] => show(explorer, single, out),
        _ => {
            write!(out, "{}", format::format_candidates(&hits))?;
            Ok(())
        }
    }
}

fn show<W: Write>(explorer: &Explorer, article: &Article, out: &mut W) -> Result<(), ExploreError> {
    let forward = explorer.forward_links(article);
    let backward = explorer.backward_links(article);
    writeln!(out)?;
    write!(out, "{}", format::format_article(article, &forward, &backward))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_input() {
        assert_eq!(parse_command("  42 "), Command::Lookup("42".into()));
        assert_eq!(parse_command("007"), Command::Lookup("007".into()));
        assert_eq!(parse_command("-3"), Command::Search("-3".into()));
        assert_eq!(parse_command("4 2"), Command::Search("4 2".into()));
        assert_eq!(parse_command("rust"), Command::Search("rust".into()));
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(parse_command("quit"), Command::Exit);
    }
}

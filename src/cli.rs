use clap::{Parser, Subcommand};

use crate::explorer::ExplorerOptions;
use crate::search::{DEFAULT_LIMIT, SearchOptions};
use crate::zim::DEFAULT_CLUSTER_CACHE;

#[derive(Parser, Debug)]
#[command(name = "explore-zim")]
#[command(version)]
#[command(about = "Explore the link graph of a ZIM archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  explore-zim wikipedia_en_top.zim              search and inspect articles interactively\n  \
  explore-zim wikipedia_en_top.zim list -x      list category articles grouped by category\n  \
  explore-zim https://example.com/wiki.zim explore | less   dump every article with its links")]
pub struct Cli {
    /// ZIM file path or HTTP URL
    #[arg(value_name = "ZIM", env = "EXPLORE_ZIM_PATH")]
    pub zim: String,

    /// Mode (default: interactive explorer)
    #[command(subcommand)]
    pub mode: Option<Mode>,

    /// Only show articles which are listed in category pages
    #[arg(short = 'x', long, global = true)]
    pub exclude_related: bool,

    /// Maximum number of keyword search results
    #[arg(
        short = 'n',
        long,
        value_name = "N",
        default_value_t = DEFAULT_LIMIT,
        env = "EXPLORE_ZIM_SEARCH_LIMIT",
        global = true
    )]
    pub limit: usize,

    /// Match keywords as plain substrings instead of fuzzily
    #[arg(long, global = true)]
    pub exact: bool,

    /// Case-sensitive matching (default: smart-case)
    #[arg(long, global = true)]
    pub case_sensitive: bool,

    /// Number of decompressed clusters kept in memory
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CLUSTER_CACHE, hide = true)]
    pub cluster_cache: usize,

    /// More log output on stderr (-vv for debug)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode: errors only
    #[arg(short = 'q', action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// List all articles grouped by category
    List,
    /// Print every article with its forward and backward links
    Explore,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        crate::io::is_http_url(&self.zim)
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.quiet > 0 {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub fn explorer_options(&self) -> ExplorerOptions {
        ExplorerOptions {
            exclude_related: self.exclude_related,
            search: SearchOptions {
                limit: self.limit,
                exact: self.exact,
                case_sensitive: self.case_sensitive,
            },
            cluster_cache: self.cluster_cache,
        }
    }
}

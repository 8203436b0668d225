//! CLI module - Command-line interface for siteseek
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

pub use commands::{cmd_init, cmd_keywords, cmd_results, cmd_run, cmd_serve};

use clap::{Parser, Subcommand};

/// siteseek - official site finder
/// Searches the web for each keyword of a CSV file and records the first result
#[derive(Parser)]
#[command(name = "siteseek")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "server")]
    Serve,

    /// Execute one search run over a keyword range
    Run {
        /// First keyword index (inclusive)
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Last keyword index (exclusive). Omit to run to the last keyword
        #[arg(long)]
        end: Option<usize>,
    },

    /// Print one page of stored results
    #[command(alias = "ls")]
    Results {
        #[arg(long, default_value_t = 1)]
        page: u64,

        #[arg(long, default_value_t = 10)]
        per_page: u64,

        /// id, keyword, url or created_at
        #[arg(long, default_value = "created_at")]
        sort_by: String,

        /// asc or desc
        #[arg(long, default_value = "desc")]
        order: String,
    },

    /// Print the keywords a range selects, without searching
    Keywords {
        #[arg(long, default_value_t = 0)]
        start: usize,

        #[arg(long)]
        end: Option<usize>,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["siteseek"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_with_open_end() {
        let cli = Cli::try_parse_from(["siteseek", "run", "--start", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Run { start: 4, end: None })
        ));
    }

    #[test]
    fn results_defaults() {
        let cli = Cli::try_parse_from(["siteseek", "results"]).unwrap();
        let Some(Commands::Results {
            page,
            per_page,
            sort_by,
            order,
        }) = cli.command
        else {
            panic!("expected results command");
        };
        assert_eq!((page, per_page), (1, 10));
        assert_eq!(sort_by, "created_at");
        assert_eq!(order, "desc");
    }
}

use crate::config::ClientConfig;
use crate::error::Result;
use crate::options::GetActivitiesOption;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "activity-feeds")]
#[command(version)]
#[command(about = "Read feeds and collections from a hosted activity-feed API")]
pub struct Args {
    /// TOML config file; STREAM_* environment variables are used when absent
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log every request and response status
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a feed's activities as JSON lines, following `next` cursors
    Read {
        /// Feed ID in slug:user form, e.g. timeline:jo
        feed: String,

        #[arg(long, value_enum, default_value = "flat")]
        kind: FeedKind,

        /// Activities (or groups) per page
        #[arg(long, default_value = "25")]
        limit: i64,

        /// Stop after this many pages
        #[arg(long, default_value = "1")]
        pages: u32,

        /// Ask the service to expand references and reactions
        #[arg(long)]
        enrich: bool,

        /// Ranking method configured on the feed group
        #[arg(long)]
        ranking: Option<String>,
    },

    /// Print collection objects by ID
    Collection {
        name: String,

        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Flat,
    Aggregated,
    Notification,
}

/// Options for the first page of a `read` command.
pub fn read_options(limit: i64, enrich: bool, ranking: Option<&str>) -> Vec<GetActivitiesOption> {
    let mut opts = vec![GetActivitiesOption::Limit(limit)];
    if let Some(r) = ranking {
        opts.push(GetActivitiesOption::Ranking(r.to_string()));
    }
    if enrich {
        opts.push(GetActivitiesOption::EnrichReactionCounts);
        opts.push(GetActivitiesOption::EnrichOwnReactions);
    }
    opts
}

/// Config file when given, otherwise the environment.
pub fn load_config(args: &Args) -> Result<ClientConfig> {
    match &args.config {
        Some(path) => ClientConfig::from_file(path),
        None => ClientConfig::from_env(),
    }
}

/// `tracing` filter directive for the chosen verbosity.
pub fn log_directive(verbose: bool) -> &'static str {
    if verbose {
        "activity_feeds=debug"
    } else {
        "activity_feeds=info"
    }
}

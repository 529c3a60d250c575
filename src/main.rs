use activity_feeds::cli::{self, Args, Command, FeedKind};
use activity_feeds::{Client, Error, FeedId};
use clap::Parser;
use colored::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn emit<T: Serialize>(items: &[T]) -> Result<(), Box<dyn std::error::Error>> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

/// Print the first page, then follow `next` cursors until `$pages` pages were
/// printed or the feed runs out. Evaluates to the number of pages printed.
macro_rules! read_pages {
    ($feed:expr, $get:ident, $next:ident, $opts:expr, $pages:expr) => {{
        let mut page = $feed.$get(&$opts).await?;
        let mut fetched = 1u32;
        loop {
            emit(&page.results)?;
            if fetched >= $pages {
                break;
            }
            match $feed.$next(&page).await {
                Ok(p) => {
                    page = p;
                    fetched += 1;
                }
                Err(Error::MissingNextPage) => break,
                Err(e) => return Err(e.into()),
            }
        }
        fetched
    }};
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli::load_config(&args)?;
    let client = Client::new(config)?;

    match args.command {
        Command::Read { feed, kind, limit, pages, enrich, ranking } => {
            let id: FeedId = feed.parse()?;
            let opts = cli::read_options(limit, enrich, ranking.as_deref());
            eprintln!(
                "{} {} ({:?}{})",
                "Reading".bright_cyan().bold(),
                id.to_string().bright_white(),
                kind,
                if enrich { ", enriched" } else { "" }
            );

            let fetched = match (kind, enrich) {
                (FeedKind::Flat, false) => {
                    let f = client.flat_feed(id.slug(), id.user_id())?;
                    read_pages!(f, get_activities, get_next_page_activities, opts, pages)
                }
                (FeedKind::Flat, true) => {
                    let f = client.flat_feed(id.slug(), id.user_id())?;
                    read_pages!(f, get_enriched_activities, get_next_page_enriched_activities, opts, pages)
                }
                (FeedKind::Aggregated, false) => {
                    let f = client.aggregated_feed(id.slug(), id.user_id())?;
                    read_pages!(f, get_activities, get_next_page_activities, opts, pages)
                }
                (FeedKind::Aggregated, true) => {
                    let f = client.aggregated_feed(id.slug(), id.user_id())?;
                    read_pages!(f, get_enriched_activities, get_next_page_enriched_activities, opts, pages)
                }
                (FeedKind::Notification, false) => {
                    let f = client.notification_feed(id.slug(), id.user_id())?;
                    read_pages!(f, get_activities, get_next_page_activities, opts, pages)
                }
                (FeedKind::Notification, true) => {
                    let f = client.notification_feed(id.slug(), id.user_id())?;
                    read_pages!(f, get_enriched_activities, get_next_page_enriched_activities, opts, pages)
                }
            };
            eprintln!("{} {} page(s)", "Done:".bright_green(), fetched);
        }

        Command::Collection { name, ids } => {
            let response = client.collections().get(&name, &ids).await?;
            eprintln!(
                "{} {} of {} object(s) from {}",
                "Fetched".bright_cyan().bold(),
                response.objects().len(),
                ids.len(),
                name.bright_white()
            );
            emit(response.objects())?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new(cli::log_directive(true))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli::log_directive(false)))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("{} {}", "error:".bright_red().bold(), e);
        std::process::exit(1);
    }
}

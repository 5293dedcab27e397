use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use wynd_core::Result;
use wynd_scrapers::{Fetcher, PipelineOptions, SourceManager};
use wynd_site::{write_gallery, ContentSet};
use wynd_storage::JsonStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "AI article aggregation pipeline", long_about = None)]
struct Cli {
    /// Persisted article store served to the front end.
    #[arg(long, default_value = "public/ai-articles.json")]
    store: PathBuf,

    /// Root-level copy of the store kept in sync for tooling.
    #[arg(long, default_value = "ai-articles.json")]
    mirror: PathBuf,

    /// Skip writing the mirror copy.
    #[arg(long)]
    no_mirror: bool,

    /// Generated gallery page.
    #[arg(long, default_value = "ai-articles.html")]
    page: PathBuf,

    /// Maximum number of records kept in the store.
    #[arg(long, default_value_t = 100)]
    limit: usize,

    /// Delay between successive requests, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,

    /// Save every fetched page body under this directory.
    #[arg(long)]
    dump_html: Option<PathBuf>,

    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one full aggregation pass and exit. An external scheduler is
    /// expected to re-invoke this on its own cadence.
    Run,
    /// List configured sources.
    List,
    /// Regenerate the gallery page from the persisted store, without fetching.
    Render,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let manager = SourceManager::new();
    let store = if cli.no_mirror {
        JsonStore::new(&cli.store)
    } else {
        JsonStore::new(&cli.store).with_mirror(&cli.mirror)
    };

    match cli.command {
        Command::Run => {
            let mut fetcher = Fetcher::new(Duration::from_millis(cli.delay_ms))?;
            if let Some(dir) = &cli.dump_html {
                fetcher = fetcher.with_dump_dir(dir);
            }
            let options = PipelineOptions {
                limit: cli.limit,
                page_path: Some(cli.page.clone()),
            };
            let records = manager.run(&fetcher, &store, &options).await?;
            info!(count = records.len(), "run complete");
        }
        Command::List => {
            for source in manager.sources() {
                println!("{} ({})", source.name(), source.url_rule().root());
            }
        }
        Command::Render => {
            let content = ContentSet::load(&cli.store);
            write_gallery(&cli.page, content.ai(), &manager.rule_book())?;
            info!(
                count = content.ai().len(),
                page = %cli.page.display(),
                "gallery page regenerated"
            );
        }
    }

    Ok(())
}

//! chainfeed CLI — translate event filters and replay block/log fixtures
//! through the same code paths the subscription layer uses.
//!
//! ```bash
//! chainfeed translate --filter filter.json
//! chainfeed events    --filter filter.json --logs logs.json
//! chainfeed blocks    --chain chain.json [--from 0x…]
//! chainfeed info
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use alloy_primitives::B256;
use chainfeed_core::{
    BlockMessage, BlockReader, ChainPosition, EventFilter, EventQueryService, FeedConfig, LogQuery,
    RawBlock, RawLog, ReaderConfig,
};
use chainfeed_storage::{InMemoryChain, InMemoryLogStore};

mod logging;

#[derive(Parser)]
#[command(
    name = "chainfeed",
    about = "Block streaming and event filtering over chain fixtures",
    version
)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the log query an event filter translates to
    Translate {
        /// Event filter JSON file
        #[arg(long)]
        filter: PathBuf,
    },

    /// Run an event filter against a log fixture
    Events {
        /// Event filter JSON file
        #[arg(long)]
        filter: PathBuf,
        /// JSON array of raw log records
        #[arg(long)]
        logs: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a chain fixture through a block reader
    Blocks {
        /// Chain fixture JSON file
        #[arg(long)]
        chain: PathBuf,
        /// Block id to start from (default: genesis)
        #[arg(long)]
        from: Option<B256>,
    },

    /// Show defaults and effective configuration
    Info,
}

/// A genesis block followed by steps; each step's blocks are pushed in order
/// (a block whose parent is not the head forks the chain), then the reader
/// is drained.
#[derive(Deserialize)]
struct ChainFixture {
    genesis: RawBlock,
    steps: Vec<Vec<RawBlock>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FeedConfig::load(path)?,
        None => FeedConfig::default(),
    };
    if cli.verbose {
        config.log.level = "debug".into();
    }
    logging::init_tracing(&config.log);

    match cli.command {
        Commands::Translate { filter } => cmd_translate(&filter),
        Commands::Events { filter, logs, json } => cmd_events(&config, &filter, &logs, json).await,
        Commands::Blocks { chain, from } => cmd_blocks(&config, &chain, from),
        Commands::Info => cmd_info(&config),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn cmd_translate(filter: &Path) -> Result<()> {
    let filter: EventFilter = read_json(filter)?;
    let query = LogQuery::from(&filter);
    println!("{}", serde_json::to_string_pretty(&query)?);
    Ok(())
}

async fn cmd_events(config: &FeedConfig, filter: &Path, logs: &Path, json: bool) -> Result<()> {
    let filter: EventFilter = read_json(filter)?;
    let logs: Vec<RawLog> = read_json(logs)?;

    let store = InMemoryLogStore::new();
    for log in logs {
        store.insert(log);
    }
    tracing::info!(logs = store.len(), "Loaded log fixture");

    let service = EventQueryService::new(store, config.query.clone());
    let events = service.filter(filter).await.context("filtering events")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        for event in &events {
            println!("{event}");
        }
        println!("{} event(s)", events.len());
    }
    Ok(())
}

fn cmd_blocks(config: &FeedConfig, chain: &Path, from: Option<B256>) -> Result<()> {
    let fixture: ChainFixture = read_json(chain)?;
    for msg in replay(fixture, &config.reader, from)? {
        println!("{}", serde_json::to_string(&msg)?);
    }
    Ok(())
}

/// Push each fixture step into a fresh chain and drain a reader after every
/// step, returning all messages in emission order.
fn replay(
    fixture: ChainFixture,
    config: &ReaderConfig,
    from: Option<B256>,
) -> Result<Vec<BlockMessage>> {
    let start = from.unwrap_or(fixture.genesis.id);

    let mut engine = InMemoryChain::new(fixture.genesis);
    if let Some(limit) = config.batch_limit {
        engine = engine.with_batch_limit(limit);
    }
    let mut reader = BlockReader::new(&engine, ChainPosition::Block(start));
    let mut emitted = Vec::new();

    for (step, blocks) in fixture.steps.into_iter().enumerate() {
        for block in blocks {
            let number = block.number;
            engine
                .push(block)
                .with_context(|| format!("step {step}: pushing block {number}"))?;
        }
        loop {
            let batch = reader.read()?;
            if !batch.has_more {
                break;
            }
            emitted.extend(batch.messages);
        }
        tracing::info!(step, best = engine.best().number, "Reader caught up");
    }
    Ok(emitted)
}

fn cmd_info(config: &FeedConfig) -> Result<()> {
    println!("ChainFeed v{}", env!("CARGO_PKG_VERSION"));
    println!("  Logs limit per request: {}", config.query.logs_limit);
    match config.reader.batch_limit {
        Some(limit) => println!("  Reader batch limit: {limit} blocks"),
        None => println!("  Reader batch limit: unlimited"),
    }
    println!("  Log directives: {}", config.log.directives());
    println!("  Backends: memory");
    Ok(())
}

//! Magpie main entry point
//!
//! This is the command-line interface for crawling a web origin into the
//! local document tree and querying it with retrieval-augmented generation.

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use magpie::config::{load_config_with_hash, Config};
use magpie::crawler::{build_http_client, CrawlConfig, CrawlEngine, StaticRenderer, WebDriverRenderer};
use magpie::llm::OllamaClient;
use magpie::query::QueryService;
use magpie::sink::FsDocumentSink;
use magpie::store::DEFAULT_COLLECTION;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Magpie: crawl a web origin and ask questions about it
///
/// The `crawl` subcommand ingests every same-origin page reachable from a
/// seed URL into the local document tree. The `query` subcommand embeds the
/// ingested documents and answers a question against them with a local
/// Ollama model.
#[derive(Parser, Debug)]
#[command(name = "magpie")]
#[command(version)]
#[command(about = "Web ingestion and retrieval-augmented query", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recursively ingest every same-origin page reachable from a seed URL
    Crawl {
        /// The URL to start crawling from (depth 0)
        seed_url: String,

        /// Substring pattern; URLs containing it are never fetched (repeatable)
        #[arg(long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,

        /// Traversal ceiling in link-hops from the seed
        #[arg(long)]
        max_depth: Option<u32>,

        /// Collection name (defaults to the seed's host)
        #[arg(long)]
        collection: Option<String>,

        /// Fetch raw HTML instead of rendering through the browser
        #[arg(long)]
        no_render: bool,
    },

    /// Answer a question against previously crawled documents
    Query {
        /// The natural-language question
        question: String,

        /// Collection to search (use "default" to search everything)
        #[arg(long, default_value = DEFAULT_COLLECTION)]
        collection: String,
    },

    /// Download a model onto the Ollama backend
    Pull {
        /// Model name, e.g. "llama3" or "all-minilm"
        model: String,
    },

    /// List the models installed on the Ollama backend
    Models,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration, falling back to defaults
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((config, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    config
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    match cli.command {
        Command::Crawl {
            seed_url,
            ignore,
            max_depth,
            collection,
            no_render,
        } => handle_crawl(&config, seed_url, ignore, max_depth, collection, no_render).await?,
        Command::Query {
            question,
            collection,
        } => handle_query(&config, &question, &collection).await?,
        Command::Pull { model } => handle_pull(&config, &model).await?,
        Command::Models => handle_models(&config).await?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("magpie=info,warn"),
            1 => EnvFilter::new("magpie=debug,info"),
            2 => EnvFilter::new("magpie=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the crawl subcommand
async fn handle_crawl(
    config: &Config,
    seed_url: String,
    ignore: Vec<String>,
    max_depth: Option<u32>,
    collection: Option<String>,
    no_render: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let max_depth = max_depth.unwrap_or(config.crawler.max_depth);

    let mut crawl_config = CrawlConfig::new(seed_url, ignore, max_depth)?
        .with_request_timeout(config.crawler.request_timeout_secs);

    if let Some(name) = collection {
        crawl_config = crawl_config.with_collection(name);
    }

    if let (Some(username), Some(password)) = (
        &config.crawler.basic_auth_username,
        &config.crawler.basic_auth_password,
    ) {
        crawl_config = crawl_config.with_basic_auth(username.as_str(), password.as_str());
    }

    let sink = FsDocumentSink::new(&config.output.root_path);

    println!("Starting crawl for: {}", crawl_config.origin());

    let report = if no_render {
        let renderer = StaticRenderer::new(build_http_client(config.crawler.request_timeout_secs)?);
        CrawlEngine::new(crawl_config, renderer, sink)?.run().await?
    } else {
        let renderer = WebDriverRenderer::connect(&config.crawler.webdriver_url).await?;
        CrawlEngine::new(crawl_config, renderer, sink)?.run().await?
    };

    println!("Crawled {} pages.", report.pages());
    println!(
        "Persisted {} documents ({} bytes).",
        report.non_empty_pages(),
        report.total_bytes()
    );
    println!("Elapsed time: {:.2} seconds.", report.elapsed.as_secs_f64());

    Ok(())
}

/// Handles the query subcommand
///
/// Reads every previously crawled document for the target collection back
/// from the output root, embeds them, then streams the generated answer to
/// stdout.
async fn handle_query(
    config: &Config,
    question: &str,
    collection: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = Arc::new(OllamaClient::new(&config.llm)?);
    let mut service = QueryService::new(Arc::clone(&client), &config.llm);

    let root = Path::new(&config.output.root_path);
    let ingested = ingest_documents(&mut service, root, collection).await?;

    if ingested == 0 {
        tracing::warn!(
            "No documents found under {} for collection '{}'",
            root.display(),
            collection
        );
    } else {
        tracing::info!("Embedded {} documents", ingested);
    }

    let mut stream = Box::pin(service.answer(question, collection).await?);
    let mut stdout = std::io::stdout();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        write!(stdout, "{}", chunk.response)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;

    Ok(())
}

/// Loads crawled documents from disk into the query service
///
/// Documents live under `<root>/<collection>/...`; each `.md` file becomes
/// one document in that collection. Querying `"default"` ingests every
/// collection (the store's mirroring makes them all searchable there).
async fn ingest_documents(
    service: &mut QueryService,
    root: &Path,
    collection: &str,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut ingested = 0;

    if !root.is_dir() {
        return Ok(0);
    }

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if collection != DEFAULT_COLLECTION && name != collection {
            continue;
        }

        let mut files = Vec::new();
        collect_md_files(&entry.path(), &mut files)?;

        let mut texts = Vec::with_capacity(files.len());
        for file in files {
            tracing::debug!("Reading {}", file.display());
            texts.push(std::fs::read_to_string(&file)?);
        }

        ingested += service.add_documents(&texts, &name).await?;
    }

    Ok(ingested)
}

/// Collects every `.md` file under a directory, recursively
fn collect_md_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            collect_md_files(&path, out)?;
        } else if path.extension().map_or(false, |ext| ext == "md") {
            out.push(path);
        }
    }

    Ok(())
}

/// Handles the pull subcommand: streams download progress to stdout
async fn handle_pull(config: &Config, model: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = OllamaClient::new(&config.llm)?;

    println!("Pulling model {}...", model);

    let mut stream = Box::pin(client.pull(model).await?);
    let mut last_status = String::new();

    while let Some(event) = stream.next().await {
        let event = event?;

        if let Some(percentage) = event.percentage() {
            print!("\rDownloading {}: {:.2}%  ", model, percentage);
            std::io::stdout().flush()?;
        } else if event.status != last_status {
            if !last_status.is_empty() {
                println!();
            }
            print!("{}", event.status);
            std::io::stdout().flush()?;
            last_status = event.status.clone();
        }
    }
    println!();

    Ok(())
}

/// Handles the models subcommand
async fn handle_models(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = OllamaClient::new(&config.llm)?;
    let models = client.list_models().await?;

    if models.is_empty() {
        println!("No models installed.");
        return Ok(());
    }

    println!("Installed models:");
    for model in models {
        println!("  - {} ({:.2} GB)", model.name, model.size as f64 / 1e9);
    }

    Ok(())
}

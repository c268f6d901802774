//! Wildscore command-line entrypoint.

use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use wildscore::chat::ProjectChat;
use wildscore::config::Config;
use wildscore::knowledge::{DiskKnowledgeCache, KnowledgeStore, SnippetMetadata};
use wildscore::pipeline::{Pipeline, open_knowledge, production_services, run_pipeline};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(name = "wildscore", version, about = "Score wildlife conservation project proposals")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a project description (stdin when neither TEXT nor --file is given).
    Score {
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        text: Option<String>,
    },
    /// Add evidence snippets to the knowledge cache.
    Seed {
        /// File of blank-line separated paragraphs, one snippet each.
        #[arg(long, conflicts_with = "texts")]
        file: Option<PathBuf>,
        texts: Vec<String>,
    },
    /// Print the cached snippets nearest to TEXT.
    Query {
        text: String,
        #[arg(short, default_value_t = wildscore::constants::DEFAULT_CACHE_TOP_K)]
        k: usize,
    },
    /// Interactive console: ask questions, `analyze` to score, `quit` to exit.
    Chat {
        #[arg(long)]
        project: Option<PathBuf>,
    },
    /// Knowledge cache size.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.validate()?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Score { file, text } => {
            let text = match (file, text) {
                (Some(path), _) => read_file(&path)?,
                (None, Some(text)) => text,
                (None, None) => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let pipeline = Pipeline::from_config(&config).await?;
            match run_pipeline(&pipeline, &text).await {
                Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                Err(e) => {
                    tracing::error!(error = %e, "Scoring failed");
                    println!("{}", e.to_value());
                    std::process::exit(if e.is_fatal() { 1 } else { 2 });
                }
            }
        }
        Command::Seed { file, texts } => {
            let texts = match file {
                Some(path) => paragraphs(&read_file(&path)?),
                None => texts,
            };
            let cache = open_knowledge(&config).await?;
            let metadata = vec![SnippetMetadata::default(); texts.len()];
            cache.add(&texts, Some(metadata.as_slice())).await?;
            tracing::info!(snippets = texts.len(), entries = cache.len(), "Knowledge cache seeded");
        }
        Command::Query { text, k } => {
            let cache = open_knowledge(&config).await?;
            for (rank, snippet) in cache.query_snippets(&text, k).await?.iter().enumerate() {
                println!("{}. [{}] {}", rank + 1, snippet.source, snippet.text);
            }
        }
        Command::Chat { project } => {
            let project = project.as_deref().map(read_file).transpose()?;
            run_console(&config, project.unwrap_or_default()).await?;
        }
        Command::Stats => {
            let cache = open_knowledge(&config).await?;
            println!("{}", serde_json::to_string_pretty(&cache.stats())?);
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Blank-line separated paragraphs, whitespace-trimmed, empties dropped.
fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

async fn run_console(config: &Config, mut project: String) -> anyhow::Result<()> {
    let knowledge: Arc<DiskKnowledgeCache> = open_knowledge(config).await?;
    let services = production_services(config, knowledge.clone())?;
    let chat = ProjectChat::with_top_k(
        Arc::clone(&services.reasoner),
        knowledge,
        config.cache_top_k,
    );
    let pipeline = Pipeline::new(
        services,
        config.resolver_config(),
        config.min_keyword_categories,
    );

    println!("Ask about the project, `analyze` to score a description, `quit` to exit.");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let input = line.trim();

        match input.to_ascii_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "analyze" => {
                print!("Project description: ");
                std::io::stdout().flush()?;
                let Some(description) = lines.next().transpose()? else {
                    break;
                };
                project = description;
                match run_pipeline(&pipeline, &project).await {
                    Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                    Err(e) => println!("{}", e.to_value()),
                }
            }
            _ => match chat.answer(&project, input).await {
                Ok(answer) => println!("{answer}"),
                Err(e) => println!("Error: {e}"),
            },
        }
    }

    Ok(())
}

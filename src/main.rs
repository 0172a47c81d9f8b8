use std::fmt::Write as _;
use std::io::{IsTerminal, Write as _};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use ragline_core::bootstrap::{
    AppPipeline, build_pipeline, create_provider, health_check, resolve_config_path,
};
use ragline_core::config::Config;
use ragline_rag::QueryResponse;
use tokio::io::{AsyncBufReadExt, BufReader};

const PREVIEW_CHARS: usize = 100;

/// Answer questions about local text files.
#[derive(Debug, Parser)]
#[command(name = "ragline", version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Text file to ingest; repeat to ingest several.
    #[arg(long, value_name = "PATH")]
    ingest: Vec<String>,

    /// Question to answer. Without it, questions are read from stdin line by line.
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,

    /// Number of chunks to retrieve per question.
    #[arg(long, value_name = "N")]
    top_k: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = Config::load(&config_path)?;
    config.validate()?;
    tracing::info!(
        config = %config_path.display(),
        provider = %config.llm.provider,
        model = config.llm.effective_model(),
        "configuration loaded"
    );

    let provider = create_provider(&config)?;
    health_check(&provider).await;
    let pipeline = build_pipeline(&config, provider)?;

    for path in &cli.ingest {
        println!("Ingesting document: {path}");
        let count = pipeline
            .ingest(path)
            .await
            .with_context(|| format!("failed to ingest {path}"))?;
        println!("Processed {count} chunks");
    }

    ensure_ingested(&pipeline)?;
    if let Some(query) = cli.query.as_deref() {
        answer(&pipeline, query, cli.top_k).await?;
    } else {
        interactive(&pipeline, cli.top_k).await?;
    }

    Ok(())
}

fn ensure_ingested(pipeline: &AppPipeline) -> anyhow::Result<()> {
    if pipeline.is_empty() {
        bail!("No documents ingested. Please ingest documents first with --ingest PATH.");
    }
    Ok(())
}

async fn answer(pipeline: &AppPipeline, query: &str, top_k: Option<usize>) -> anyhow::Result<()> {
    let response = pipeline
        .query_with_top_k(query, top_k)
        .await
        .context("query failed")?;
    println!("Query: {query}");
    print!("{}", render_response(&response));
    Ok(())
}

/// Read questions from stdin until EOF, `exit` or `quit`.
async fn interactive(pipeline: &AppPipeline, top_k: Option<usize>) -> anyhow::Result<()> {
    let prompt = std::io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if prompt {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query == "exit" || query == "quit" {
            break;
        }
        if query.is_empty() {
            continue;
        }
        answer(pipeline, query, top_k).await?;
    }
    Ok(())
}

fn render_response(response: &QueryResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nAnswer:\n{}", response.answer);
    let _ = writeln!(out, "\nSources:");
    for (i, chunk) in response.sources.iter().enumerate() {
        let _ = writeln!(out, "Source {}: {}", i + 1, chunk.source().unwrap_or("Unknown"));
        match (chunk.chunk_index(), chunk.total_chunks()) {
            (Some(idx), Some(total)) => {
                let _ = writeln!(out, "Chunk {} of {total}", idx + 1);
            }
            _ => {
                let _ = writeln!(out, "Chunk Unknown of Unknown");
            }
        }
        let _ = writeln!(out, "Text: {}\n", preview(chunk.text()));
    }
    out
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use ragline_rag::{Chunk, Metadata};
    use serde_json::json;

    use super::*;

    fn chunk(text: &str, index: usize, total: usize) -> Chunk {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), json!("notes.txt"));
        metadata.insert("chunk_index".into(), json!(index));
        metadata.insert("total_chunks".into(), json!(total));
        Chunk::new(text, metadata, "doc")
    }

    #[test]
    fn cli_parses_repeated_ingest() {
        let cli = Cli::try_parse_from([
            "ragline", "--ingest", "a.txt", "--ingest", "b.md", "--query", "why?", "--top-k", "3",
        ])
        .unwrap();
        assert_eq!(cli.ingest, ["a.txt", "b.md"]);
        assert_eq!(cli.query.as_deref(), Some("why?"));
        assert_eq!(cli.top_k, Some(3));
        assert!(cli.config.is_none());
    }

    #[test]
    fn cli_rejects_non_numeric_top_k() {
        assert!(Cli::try_parse_from(["ragline", "--top-k", "many"]).is_err());
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(150);
        let p = preview(&long);
        assert_eq!(p.len(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn render_lists_sources() {
        let response = QueryResponse {
            answer: "Forty-two.".into(),
            sources: vec![chunk("first chunk", 0, 2), chunk("second chunk", 1, 2)],
        };
        let out = render_response(&response);
        assert!(out.contains("Answer:\nForty-two."));
        assert!(out.contains("Source 1: notes.txt\nChunk 1 of 2\nText: first chunk"));
        assert!(out.contains("Source 2: notes.txt\nChunk 2 of 2\nText: second chunk"));
    }

    #[test]
    fn render_without_metadata() {
        let response = QueryResponse {
            answer: "a".into(),
            sources: vec![Chunk::new("t", Metadata::new(), "doc")],
        };
        let out = render_response(&response);
        assert!(out.contains("Source 1: Unknown"));
        assert!(out.contains("Chunk Unknown of Unknown"));
    }
}

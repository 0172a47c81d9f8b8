//! Turns a [`Config`] into a provider and a fully wired pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use ragline_llm::any::AnyProvider;
use ragline_llm::ollama::OllamaProvider;
use ragline_llm::openai::OpenAiProvider;
use ragline_rag::{
    CharacterSplitter, InMemoryVectorStore, ProviderEmbedder, ProviderGenerator, RagPipeline,
    RetrieverConfig, SimilarityRetriever, SplitterConfig, TextLoader,
};

use crate::config::{Config, ProviderKind};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Pipeline type produced by [`build_pipeline`].
pub type AppPipeline =
    RagPipeline<ProviderEmbedder<AnyProvider>, ProviderGenerator<AnyProvider>>;

/// Priority: CLI `--config` > `RAGLINE_CONFIG` env > `config/default.toml`.
#[must_use]
pub fn resolve_config_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("RAGLINE_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// # Errors
///
/// Returns an error if the selected provider is missing a required secret.
pub fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    let llm = &config.llm;
    match llm.provider {
        ProviderKind::Ollama => Ok(AnyProvider::Ollama(
            OllamaProvider::new(
                llm.effective_base_url(),
                llm.effective_model().to_owned(),
                llm.effective_embedding_model().to_owned(),
            )
            .with_temperature(llm.temperature),
        )),
        ProviderKind::OpenAi => {
            let api_key = config
                .secrets
                .openai_api_key
                .as_ref()
                .context("RAGLINE_OPENAI_API_KEY or OPENAI_API_KEY not set")?
                .expose()
                .to_owned();
            let provider = OpenAiProvider::new(
                api_key,
                llm.effective_base_url().to_owned(),
                llm.effective_model().to_owned(),
                llm.max_tokens,
                Some(llm.effective_embedding_model().to_owned()),
            )
            .with_temperature(llm.temperature)
            .with_max_retries(llm.max_retries);
            Ok(AnyProvider::OpenAi(provider))
        }
    }
}

/// Log whether the backend is reachable; never fails.
pub async fn health_check(provider: &AnyProvider) {
    if let AnyProvider::Ollama(ollama) = provider {
        match ollama.health_check().await {
            Ok(()) => tracing::info!("ollama health check passed"),
            Err(e) => tracing::warn!("ollama health check failed: {e:#}"),
        }
    }
}

/// Wire loader, splitter, embedder, store, retriever and generator from `config`.
///
/// # Errors
///
/// Returns an error if the splitter settings are invalid.
pub fn build_pipeline(config: &Config, provider: AnyProvider) -> anyhow::Result<AppPipeline> {
    let splitter = CharacterSplitter::new(SplitterConfig {
        chunk_size: config.splitter.chunk_size,
        chunk_overlap: config.splitter.chunk_overlap,
    })
    .context("invalid splitter configuration")?;

    let retriever = SimilarityRetriever::new(RetrieverConfig {
        top_k: config.retrieval.top_k,
        score_threshold: config.retrieval.score_threshold,
    });

    tracing::debug!(
        provider = ?config.llm.provider,
        chunk_size = config.splitter.chunk_size,
        chunk_overlap = config.splitter.chunk_overlap,
        top_k = config.retrieval.top_k,
        "building pipeline"
    );

    Ok(RagPipeline::new(
        Box::new(TextLoader::with_max_file_size(config.loader.max_file_size)),
        Box::new(splitter),
        ProviderEmbedder::new(provider.clone()).with_batch_size(config.embedding.batch_size),
        Arc::new(InMemoryVectorStore::new()),
        Box::new(retriever),
        ProviderGenerator::new(provider),
    ))
}

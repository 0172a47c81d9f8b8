use std::str::FromStr;

use super::Config;
use crate::secret::Secret;

/// Read and parse `key`, warning about values that do not parse.
fn parsed_var<T: FromStr>(key: &str) -> Option<T> {
    let v = std::env::var(key).ok()?;
    if let Ok(parsed) = v.trim().parse::<T>() {
        Some(parsed)
    } else {
        tracing::warn!("ignoring invalid {key} value: {v}");
        None
    }
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("RAGLINE_LLM_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.provider = kind;
            } else {
                tracing::warn!("ignoring invalid RAGLINE_LLM_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("RAGLINE_LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("RAGLINE_LLM_MODEL") {
            self.llm.model = Some(v);
        }
        if let Ok(v) = std::env::var("RAGLINE_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = Some(v);
        }
        if let Some(n) = parsed_var::<u32>("RAGLINE_LLM_MAX_TOKENS") {
            self.llm.max_tokens = n;
        }
        if let Some(t) = parsed_var::<f32>("RAGLINE_LLM_TEMPERATURE") {
            self.llm.temperature = t.clamp(0.0, 2.0);
        }
        if let Some(n) = parsed_var::<usize>("RAGLINE_EMBED_BATCH_SIZE") {
            self.embedding.batch_size = n;
        }
        if let Some(n) = parsed_var::<usize>("RAGLINE_CHUNK_SIZE") {
            self.splitter.chunk_size = n;
        }
        if let Some(n) = parsed_var::<usize>("RAGLINE_CHUNK_OVERLAP") {
            self.splitter.chunk_overlap = n;
        }
        if let Some(n) = parsed_var::<usize>("RAGLINE_RETRIEVAL_TOP_K") {
            self.retrieval.top_k = n;
        }
        if let Some(t) = parsed_var::<f32>("RAGLINE_RETRIEVAL_SCORE_THRESHOLD") {
            self.retrieval.score_threshold = Some(t.clamp(0.0, 1.0));
        }
        if let Some(n) = parsed_var::<u64>("RAGLINE_LOADER_MAX_FILE_SIZE") {
            self.loader.max_file_size = n;
        }
    }

    /// Pick up API keys; `RAGLINE_OPENAI_API_KEY` wins over `OPENAI_API_KEY`.
    pub(crate) fn resolve_secrets_from_env(&mut self) {
        let key = ["RAGLINE_OPENAI_API_KEY", "OPENAI_API_KEY"]
            .into_iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()));
        if let Some(key) = key {
            self.secrets.openai_api_key = Some(Secret::new(key));
        }
    }
}

//! Test-only mock LLM provider.

use std::sync::{Arc, Mutex};

use crate::provider::{LlmProvider, Message};

const DEFAULT_EMBEDDING_DIM: usize = 16;

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    chats: Arc<Mutex<Vec<Vec<Message>>>>,
    embed_batches: Arc<Mutex<Vec<usize>>>,
    pub default_response: String,
    /// When set, every text embeds to this vector.
    pub fixed_embedding: Option<Vec<f32>>,
    /// Dimension of the bag-of-words embedding used when `fixed_embedding` is unset.
    pub embedding_dim: usize,
    pub supports_embeddings: bool,
    pub fail_chat: bool,
    /// Fail every embedding call once this many batches have succeeded.
    pub fail_embed_after: Option<usize>,
    /// Milliseconds to sleep before returning a response.
    pub delay_ms: u64,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            chats: Arc::new(Mutex::new(Vec::new())),
            embed_batches: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            fixed_embedding: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            supports_embeddings: true,
            fail_chat: false,
            fail_embed_after: None,
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            fail_embed_after: Some(0),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_fixed_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.fixed_embedding = Some(embedding);
        self
    }

    #[must_use]
    pub fn with_embed_failure_after(mut self, batches: usize) -> Self {
        self.fail_embed_after = Some(batches);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Every message list passed to `chat`, oldest first.
    #[must_use]
    pub fn recorded_chats(&self) -> Vec<Vec<Message>> {
        self.chats.lock().unwrap().clone()
    }

    /// Sizes of the embedding batches received, oldest first.
    #[must_use]
    pub fn recorded_embed_batches(&self) -> Vec<usize> {
        self.embed_batches.lock().unwrap().clone()
    }

    fn embedding_for(&self, text: &str) -> Vec<f32> {
        match &self.fixed_embedding {
            Some(v) => v.clone(),
            None => bag_of_words(text, self.embedding_dim),
        }
    }
}

/// Deterministic word-hashing embedding: texts sharing words point the same way.
#[must_use]
pub fn bag_of_words(text: &str, dim: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim.max(1)];
    let len = v.len();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for b in word.to_lowercase().bytes() {
            hash ^= u64::from(b);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        #[allow(clippy::cast_possible_truncation)]
        let slot = (hash % len as u64) as usize;
        v[slot] += 1.0;
    }
    v
}

impl LlmProvider for MockProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        self.chats.lock().unwrap().push(messages.to_vec());
        if self.fail_chat {
            return Err(crate::LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, crate::LlmError> {
        let mut vectors = self.embed_batch(&[text.to_owned()]).await?;
        vectors.pop().ok_or(crate::LlmError::EmptyResponse {
            provider: "mock".into(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, crate::LlmError> {
        if !self.supports_embeddings {
            return Err(crate::LlmError::EmbedUnsupported {
                provider: "mock".into(),
            });
        }
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        {
            let mut batches = self.embed_batches.lock().unwrap();
            if self
                .fail_embed_after
                .is_some_and(|limit| batches.len() >= limit)
            {
                return Err(crate::LlmError::Other("mock embedding error".into()));
            }
            batches.push(texts.len());
        }
        Ok(texts.iter().map(|t| self.embedding_for(t)).collect())
    }

    fn supports_embeddings(&self) -> bool {
        self.supports_embeddings
    }
}

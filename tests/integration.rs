use std::path::Path;

use ragline_core::bootstrap::{build_pipeline, create_provider};
use ragline_core::config::{Config, ProviderKind};
use ragline_llm::any::AnyProvider;
use ragline_llm::mock::MockProvider;
use ragline_rag::RagError;
use ragline_rag::generator::NO_CONTEXT_ANSWER;
use serial_test::serial;

const ENV_KEYS: [&str; 4] = [
    "RAGLINE_CHUNK_SIZE",
    "RAGLINE_CHUNK_OVERLAP",
    "RAGLINE_RETRIEVAL_TOP_K",
    "RAGLINE_LLM_PROVIDER",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

fn wide_mock(responses: Vec<String>) -> MockProvider {
    let mut mock = MockProvider::with_responses(responses);
    mock.embedding_dim = 256;
    mock
}

fn write(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
#[serial]
async fn config_file_drives_the_pipeline() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("ragline.toml");
    std::fs::write(
        &config_path,
        "[splitter]\nchunk_size = 120\nchunk_overlap = 20\n\n[retrieval]\ntop_k = 2\n",
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    assert_eq!(config.splitter.chunk_size, 120);

    let mock = wide_mock(vec!["Rust guarantees memory safety.".into()]);
    let pipeline = build_pipeline(&config, AnyProvider::Mock(mock.clone())).unwrap();

    let rust = write(
        dir.path(),
        "rust.txt",
        &"rust ownership borrowing lifetimes memory safety ".repeat(6),
    );
    let cooking = write(dir.path(), "cooking.md", "bake bread with flour water yeast salt");

    let rust_chunks = pipeline.ingest(&rust).await.unwrap();
    assert!(rust_chunks > 1);
    assert_eq!(pipeline.ingest(&cooking).await.unwrap(), 1);
    assert_eq!(pipeline.indexed_chunks(), rust_chunks + 1);

    let response = pipeline.query("rust memory safety").await.unwrap();
    assert_eq!(response.answer, "Rust guarantees memory safety.");
    assert_eq!(response.sources.len(), 2);
    for source in &response.sources {
        assert_eq!(source.source(), Some(rust.as_str()));
        assert_eq!(source.total_chunks(), Some(rust_chunks));
    }

    let chats = mock.recorded_chats();
    assert_eq!(chats.len(), 1);
    assert!(chats[0][1].content.contains("Question: rust memory safety"));
}

#[tokio::test]
#[serial]
async fn env_overrides_reach_the_pipeline() {
    clear_env();
    unsafe {
        std::env::set_var("RAGLINE_CHUNK_SIZE", "40");
        std::env::set_var("RAGLINE_CHUNK_OVERLAP", "0");
        std::env::set_var("RAGLINE_RETRIEVAL_TOP_K", "1");
    }
    let config = Config::load(Path::new("/nonexistent/ragline.toml")).unwrap();
    clear_env();

    let pipeline = build_pipeline(&config, AnyProvider::Mock(wide_mock(Vec::new()))).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.txt", &"alpha beta gamma delta ".repeat(10));

    let count = pipeline.ingest(&path).await.unwrap();
    assert!(count >= 5);
    let response = pipeline.query("gamma").await.unwrap();
    assert_eq!(response.sources.len(), 1);
    assert!(response.sources[0].text().chars().count() <= 40);
}

#[tokio::test]
async fn empty_pipeline_answers_without_calling_the_model() {
    let mock = wide_mock(Vec::new());
    let pipeline = build_pipeline(&Config::default(), AnyProvider::Mock(mock.clone())).unwrap();

    let response = pipeline.query("is anything indexed?").await.unwrap();
    assert_eq!(response.answer, NO_CONTEXT_ANSWER);
    assert!(response.sources.is_empty());
    assert!(mock.recorded_chats().is_empty());
}

#[tokio::test]
async fn failed_ingest_keeps_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.txt", "indexed first");
    let bad = write(dir.path(), "bad.txt", "never indexed");

    let mock = wide_mock(Vec::new()).with_embed_failure_after(1);
    let pipeline = build_pipeline(&Config::default(), AnyProvider::Mock(mock)).unwrap();

    assert_eq!(pipeline.ingest(&good).await.unwrap(), 1);
    let err = pipeline.ingest(&bad).await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingService(_)));
    assert_eq!(pipeline.indexed_chunks(), 1);

    let err = pipeline
        .ingest(&dir.path().join("missing.txt").to_string_lossy())
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::NotFound(_)));
}

#[test]
#[serial]
fn ollama_config_builds_ollama_provider() {
    clear_env();
    unsafe { std::env::set_var("RAGLINE_LLM_PROVIDER", "ollama") };
    let config = Config::load(Path::new("/nonexistent/ragline.toml")).unwrap();
    clear_env();

    assert_eq!(config.llm.provider, ProviderKind::Ollama);
    config.validate().unwrap();
    let provider = create_provider(&config).unwrap();
    assert!(matches!(provider, AnyProvider::Ollama(_)));
}

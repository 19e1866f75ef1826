//! End-to-end pipeline tests over mocked translation backends.

use std::path::{Path, PathBuf};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tabtrans::cli::{LlmArgs, MtArgs};
use tabtrans::config::AppConfig;
use tabtrans::dataset::Table;
use tabtrans::error::TabError;
use tabtrans::pipeline;

fn write_dataset(dir: &Path, sentences: &[&str]) -> PathBuf {
    let path = dir.join("input.tsv");
    let table = Table::new(
        vec!["id".to_string(), "source_sentences".to_string()],
        sentences
            .iter()
            .enumerate()
            .map(|(i, s)| vec![(i + 1).to_string(), s.to_string()])
            .collect(),
    );
    table.to_tsv(&path).unwrap();
    path
}

fn llm_args(dataset_file: PathBuf, output_file: PathBuf, model: &str) -> LlmArgs {
    LlmArgs {
        dataset_file,
        model_name_or_path: model.to_string(),
        output_file,
        dry_run: false,
        prompt_template: None,
        temperature: 0.0,
        max_tokens: 512,
        config: None,
        verbose: false,
    }
}

fn mt_args(dataset_file: PathBuf, output_file: PathBuf, model: &str, target: &str) -> MtArgs {
    MtArgs {
        dataset_file,
        model_name_or_path: model.to_string(),
        output_file,
        target_language: target.to_string(),
        auth_key: Some("test-auth-key".to_string()),
        dry_run: false,
        max_tokens: 512,
        config: None,
        verbose: false,
    }
}

#[tokio::test]
async fn open_weight_pipeline_cleans_and_preserves_order() {
    let server = MockServer::start().await;
    // Choices come back out of order; the translator restores input order.
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                {"index": 2, "text": " Dutch: Hallo drie"},
                {"index": 0, "text": "'Hallo een'"},
                {"index": 1, "text": "  Hallo   twee  "},
            ]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["one", "two", "three"]);
    let output = dir.path().join("out").join("result.tsv");

    let mut config = AppConfig::default();
    config.engine.endpoint = server.uri();

    let args = llm_args(dataset, output.clone(), "acme/test-model-7b");
    pipeline::run_llm(&args, &config).await.unwrap();

    let result = Table::from_tsv(&output).unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(
        result.headers(),
        &["id", "source_sentences", "translation"]
    );
    assert_eq!(
        result.column("translation").unwrap(),
        vec!["Hallo een", "Hallo twee", "Hallo drie"]
    );
    // Pass-through columns untouched
    assert_eq!(result.column("id").unwrap(), vec!["1", "2", "3"]);
    assert_eq!(
        result.column("source_sentences").unwrap(),
        vec!["one", "two", "three"]
    );
}

#[tokio::test]
async fn open_weight_under_delivery_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"index": 0, "text": "only one"}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["one", "two", "three"]);
    let output = dir.path().join("result.tsv");

    let mut config = AppConfig::default();
    config.engine.endpoint = server.uri();

    let args = llm_args(dataset, output.clone(), "acme/test-model-7b");
    let err = pipeline::run_llm(&args, &config).await.unwrap_err();
    assert!(matches!(err, TabError::Translation(_)));
    assert!(!output.exists(), "no partial output on abort");
}

#[tokio::test]
async fn dry_run_truncates_to_ten_rows() {
    let server = MockServer::start().await;
    let choices: Vec<_> = (0..10)
        .map(|i| serde_json::json!({"index": i, "text": format!("t{}", i)}))
        .collect();
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"choices": choices})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let sentences: Vec<String> = (0..25).map(|i| format!("sentence {}", i)).collect();
    let refs: Vec<&str> = sentences.iter().map(|s| s.as_str()).collect();
    let dataset = write_dataset(dir.path(), &refs);
    let output = dir.path().join("result.tsv");

    let mut config = AppConfig::default();
    config.engine.endpoint = server.uri();

    let mut args = llm_args(dataset, output.clone(), "acme/test-model-7b");
    args.dry_run = true;
    pipeline::run_llm(&args, &config).await.unwrap();

    let result = Table::from_tsv(&output).unwrap();
    assert_eq!(result.len(), 10);
}

#[tokio::test]
async fn prompt_template_is_applied_to_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_string_contains(
            "Can you translate the following sentence into Dutch",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"index": 0, "text": "Hallo daar"}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["Hello there"]);
    let output = dir.path().join("result.tsv");

    let mut config = AppConfig::default();
    config.engine.endpoint = server.uri();

    let mut args = llm_args(dataset, output.clone(), "acme/test-model-7b");
    args.prompt_template = Some("prompt1_NL".to_string());
    pipeline::run_llm(&args, &config).await.unwrap();

    let result = Table::from_tsv(&output).unwrap();
    assert_eq!(result.column("translation").unwrap(), vec!["Hallo daar"]);
}

#[tokio::test]
async fn unknown_prompt_template_fails() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["Hello there"]);
    let output = dir.path().join("result.tsv");

    let config = AppConfig::default();
    let mut args = llm_args(dataset, output, "acme/test-model-7b");
    args.prompt_template = Some("bogus".to_string());

    let err = pipeline::run_llm(&args, &config).await.unwrap_err();
    assert!(matches!(err, TabError::UnsupportedTemplate(ref id) if id == "bogus"));
}

#[tokio::test]
async fn missing_source_column_lists_available_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.tsv");
    Table::new(
        vec!["id".to_string(), "sentence".to_string()],
        vec![vec!["1".to_string(), "Hello".to_string()]],
    )
    .to_tsv(&path)
    .unwrap();

    let config = AppConfig::default();
    let args = llm_args(path, dir.path().join("out.tsv"), "acme/test-model-7b");

    let err = pipeline::run_llm(&args, &config).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("source_sentences"));
    assert!(msg.contains("Available columns"));
    assert!(msg.contains("sentence"));
    assert!(msg.contains("id"));
}

#[tokio::test]
async fn unknown_model_identifier_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["Hello"]);
    let output = dir.path().join("out.tsv");

    let config = AppConfig::default();
    let args = llm_args(dataset, output, "mystery-model");

    let err = pipeline::run_llm(&args, &config).await.unwrap_err();
    assert!(matches!(err, TabError::UnsupportedBackend(_)));
}

#[tokio::test]
async fn chat_pipeline_is_sequential_and_retries_transient_failures() {
    let server = MockServer::start().await;
    // First request fails once, then the endpoint recovers.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream hiccup"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Hallo"}}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["one", "two"]);
    let output = dir.path().join("result.tsv");

    let mut config = AppConfig::default();
    config.chat.endpoint = format!("{}/v1/chat/completions", server.uri());
    config.chat.api_key = Some("test-key".to_string());

    let args = llm_args(dataset, output.clone(), "gpt-4o-mini");
    pipeline::run_llm(&args, &config).await.unwrap();

    let result = Table::from_tsv(&output).unwrap();
    assert_eq!(result.column("translation").unwrap(), vec!["Hallo", "Hallo"]);
    // One failed attempt plus one request per row
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn chat_backend_requires_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["one"]);
    let output = dir.path().join("result.tsv");

    let mut config = AppConfig::default();
    config.chat.api_key = None;

    let args = llm_args(dataset, output, "gpt-4o-mini");
    let err = pipeline::run_llm(&args, &config).await.unwrap_err();
    assert!(matches!(err, TabError::BackendConstruction(_)));
}

#[tokio::test]
async fn vendor_mt_records_per_item_failures_inline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_string_contains("uno"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translations": [{"text": "een"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_string_contains("dos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("quota exceeded"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_string_contains("tres"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translations": [{"text": "drie"}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["uno", "dos", "tres"]);
    let output = dir.path().join("result.tsv");

    let mut config = AppConfig::default();
    config.mt.vendor_endpoint = format!("{}/v2/translate", server.uri());

    let args = mt_args(dataset, output.clone(), "deepl", "NL");
    pipeline::run_mt(&args, &config).await.unwrap();

    let result = Table::from_tsv(&output).unwrap();
    let translations = result.column("translation").unwrap();
    assert_eq!(translations.len(), 3);
    assert_eq!(translations[0], "een");
    assert!(translations[1].contains("[TRANSLATION_ERROR: "));
    assert!(translations[1].contains("500"));
    assert_eq!(translations[2], "drie");
}

#[tokio::test]
async fn vendor_mt_sends_uppercase_language_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_string_contains("target_lang=EL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translations": [{"text": "Γεια σου"}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["hello"]);
    let output = dir.path().join("result.tsv");

    let mut config = AppConfig::default();
    config.mt.vendor_endpoint = format!("{}/v2/translate", server.uri());

    let args = mt_args(dataset, output.clone(), "deepl", "EL");
    pipeline::run_mt(&args, &config).await.unwrap();

    let result = Table::from_tsv(&output).unwrap();
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn web_endpoint_translates_whole_batch_in_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"translations": [
                {"translatedText": "een"},
                {"translatedText": "twee"},
            ]}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["one", "two"]);
    let output = dir.path().join("result.tsv");

    let mut config = AppConfig::default();
    config.mt.web_endpoint = format!("{}/translate", server.uri());

    let args = mt_args(dataset, output.clone(), "google-translate", "NL");
    pipeline::run_mt(&args, &config).await.unwrap();

    let result = Table::from_tsv(&output).unwrap();
    assert_eq!(result.column("translation").unwrap(), vec!["een", "twee"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn web_endpoint_failure_yields_no_result_for_every_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["one", "two", "three"]);
    let output = dir.path().join("result.tsv");

    let mut config = AppConfig::default();
    config.mt.web_endpoint = format!("{}/translate", server.uri());

    let args = mt_args(dataset, output.clone(), "google-translate", "NL");
    pipeline::run_mt(&args, &config).await.unwrap();

    let result = Table::from_tsv(&output).unwrap();
    assert_eq!(
        result.column("translation").unwrap(),
        vec!["[NO_RESULT]", "[NO_RESULT]", "[NO_RESULT]"]
    );
}

#[tokio::test]
async fn chat_retry_exhaustion_aborts_the_batch() {
    use std::time::Duration;
    use tabtrans::config::ChatConfig;
    use tabtrans::retry::RetryPolicy;
    use tabtrans::translate::chat::ChatTranslator;
    use tabtrans::translate::{GenerationOptions, Translator};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let config = ChatConfig {
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        api_key: Some("test-key".to_string()),
        requests_per_window: 60,
        window_pause_secs: 65,
    };
    let mut translator = ChatTranslator::new("gpt-4o-mini", &config)
        .unwrap()
        .with_retry_policy(RetryPolicy::new(
            3,
            Duration::from_millis(1),
            Duration::from_millis(4),
        ));

    let texts = vec!["one".to_string(), "two".to_string()];
    let opts = GenerationOptions {
        temperature: 0.0,
        max_tokens: 512,
    };
    let err = translator.translate(&texts, &opts).await.unwrap_err();
    assert!(matches!(err, TabError::TransientRequest(_)));
    // Three attempts for the first input, then the batch aborts; the second
    // input is never sent.
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn mt_pipeline_rejects_unknown_language() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["one"]);
    let output = dir.path().join("result.tsv");

    let config = AppConfig::default();
    let args = mt_args(dataset, output, "deepl", "FR");

    let err = pipeline::run_mt(&args, &config).await.unwrap_err();
    assert!(matches!(err, TabError::UnsupportedLanguage(ref l) if l == "FR"));
}

#[tokio::test]
async fn mt_pipeline_rejects_unknown_backend() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), &["one"]);
    let output = dir.path().join("result.tsv");

    let config = AppConfig::default();
    let args = mt_args(dataset, output, "yandex", "NL");

    let err = pipeline::run_mt(&args, &config).await.unwrap_err();
    assert!(matches!(err, TabError::UnsupportedBackend(ref b) if b == "yandex"));
}

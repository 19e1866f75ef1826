use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use super::{GenerationOptions, Translator};
use crate::config::EngineConfig;
use crate::error::{Result, TabError};
use async_trait::async_trait;

#[derive(Debug, Clone, Serialize)]
struct CompletionRequest {
    model: String,
    prompt: Vec<String>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionChoice {
    index: usize,
    text: String,
}

/// Translator backed by a locally hosted open-weight engine behind an
/// OpenAI-compatible serve endpoint. The whole input list goes out in one
/// batched completions request; scheduling across the batch is the engine's
/// concern. Engine resources persist for the process lifetime; there is no
/// release step.
pub struct OpenWeightTranslator {
    client: Client,
    config: EngineConfig,
    model: String,
}

impl OpenWeightTranslator {
    pub fn new(model: &str, config: EngineConfig, cache_home: Option<PathBuf>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .expect("HTTP client creation should not fail");

        info!(
            "Using open-weight engine at {} (model {}, max context {}, dtype {}, prefix caching {})",
            config.endpoint, model, config.max_model_len, config.dtype, config.enable_prefix_caching
        );
        if let Some(dir) = &cache_home {
            info!("Engine model cache home: {}", dir.display());
        }

        Self {
            client,
            config,
            model: model.to_string(),
        }
    }

    /// Wrap a source text in a single-turn user conversation, ChatML format.
    fn apply_chat_template(text: &str) -> String {
        format!(
            "<|im_start|>user\n{}<|im_end|>\n<|im_start|>assistant\n",
            text
        )
    }
}

#[async_trait]
impl Translator for OpenWeightTranslator {
    async fn translate(
        &mut self,
        texts: &[String],
        opts: &GenerationOptions,
    ) -> Result<Vec<String>> {
        let prompts: Vec<String> = if self.config.apply_chat_template {
            texts.iter().map(|t| Self::apply_chat_template(t)).collect()
        } else {
            texts.to_vec()
        };

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: prompts,
            temperature: opts.temperature,
            max_tokens: opts.max_tokens,
        };

        let url = format!("{}/v1/completions", self.config.endpoint);
        info!("Submitting batch of {} prompts to {}", texts.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TabError::Translation(format!("Engine request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TabError::Translation(format!(
                "Engine API error {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| TabError::Translation(format!("Failed to parse engine response: {}", e)))?;

        if completion.choices.len() != texts.len() {
            return Err(TabError::Translation(format!(
                "Engine returned {} completions for {} prompts",
                completion.choices.len(),
                texts.len()
            )));
        }

        // The engine reports choices with their prompt index; restore input order.
        let mut choices = completion.choices;
        choices.sort_by_key(|c| c.index);
        debug!("Received {} completions", choices.len());

        Ok(choices.into_iter().map(|c| c.text).collect())
    }
}

use indicatif::ProgressBar;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::{GenerationOptions, Translator};
use crate::config::ChatConfig;
use crate::error::{Result, TabError};
use crate::ratelimit::FixedWindowLimiter;
use crate::retry::{RetryPolicy, with_retry};
use async_trait::async_trait;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Translator backed by a hosted chat-completion API. Strictly sequential:
/// one request per input, bounded retry per request, and a fixed-window
/// pause to stay under the vendor rate limit. Retry exhaustion aborts the
/// whole batch.
pub struct ChatTranslator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    retry: RetryPolicy,
    limiter: FixedWindowLimiter,
}

impl ChatTranslator {
    pub fn new(model: &str, config: &ChatConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TabError::BackendConstruction(
                "Chat API key missing: set CHAT_API_KEY or the settings file".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("HTTP client creation should not fail");

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: model.to_string(),
            api_key,
            retry: RetryPolicy::api_call(),
            limiter: FixedWindowLimiter::new(
                config.requests_per_window,
                Duration::from_secs(config.window_pause_secs),
            ),
        })
    }

    /// Override the retry policy. The default is the api_call preset.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One chat request with a single user turn.
    async fn complete_one(&self, prompt: &str, opts: &GenerationOptions) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: opts.max_tokens,
            temperature: opts.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TabError::TransientRequest(format!(
                "Chat API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| TabError::Translation(format!("Failed to parse chat response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TabError::Translation("Chat response contained no choices".to_string()))
    }
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(
        &mut self,
        texts: &[String],
        opts: &GenerationOptions,
    ) -> Result<Vec<String>> {
        info!(
            "Translating {} inputs via chat API (model {})",
            texts.len(),
            self.model
        );

        let pb = ProgressBar::new(texts.len() as u64);
        let mut completions = Vec::with_capacity(texts.len());

        for prompt in texts {
            let content = with_retry(
                &self.retry,
                "chat completion",
                || self.complete_one(prompt, opts),
                TabError::is_transient,
            )
            .await?;

            completions.push(content);
            pb.inc(1);
            self.limiter.tick().await;
        }

        pb.finish_and_clear();
        Ok(completions)
    }
}

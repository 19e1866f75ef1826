use indicatif::ProgressBar;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{GenerationOptions, Translator};
use crate::error::{Result, TabError};
use crate::language::TargetLanguage;
use async_trait::async_trait;

/// Sentinel written for every row when the web endpoint's whole-batch
/// request fails. Keeps output-length parity without fabricating partial
/// data.
pub const NO_RESULT: &str = "[NO_RESULT]";

fn error_marker(e: &TabError) -> String {
    format!("[TRANSLATION_ERROR: {}]", e)
}

/// Whether a result slot holds a failure marker rather than a translation.
pub fn is_failure_marker(s: &str) -> bool {
    s == NO_RESULT || (s.starts_with("[TRANSLATION_ERROR: ") && s.ends_with(']'))
}

#[derive(Debug, Deserialize)]
struct VendorResponse {
    translations: Vec<VendorTranslation>,
}

#[derive(Debug, Deserialize)]
struct VendorTranslation {
    text: String,
}

/// Vendor MT translator: one request per input. A failed item is recorded
/// inline as an error marker and the loop continues, so the output always
/// has one entry per input even under partial failure. This is deliberately
/// different from the batch-abort policy of the LLM backends.
pub struct VendorMtTranslator {
    client: Client,
    endpoint: String,
    auth_key: String,
    target: TargetLanguage,
}

impl VendorMtTranslator {
    pub fn new(endpoint: String, auth_key: String, target: TargetLanguage) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            endpoint,
            auth_key,
            target,
        }
    }

    async fn translate_one(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(
                "Authorization",
                format!("DeepL-Auth-Key {}", self.auth_key),
            )
            .form(&[
                ("text", text),
                ("target_lang", self.target.vendor_code()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TabError::Translation(format!(
                "MT API error {}: {}",
                status, body
            )));
        }

        let vendor_response: VendorResponse = response
            .json()
            .await
            .map_err(|e| TabError::Translation(format!("Failed to parse MT response: {}", e)))?;

        vendor_response
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| TabError::Translation("MT response contained no translations".to_string()))
    }
}

#[async_trait]
impl Translator for VendorMtTranslator {
    async fn translate(
        &mut self,
        texts: &[String],
        _opts: &GenerationOptions,
    ) -> Result<Vec<String>> {
        info!(
            "Translating {} inputs via vendor MT API into {}",
            texts.len(),
            self.target
        );

        let pb = ProgressBar::new(texts.len() as u64);
        let mut results = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            match self.translate_one(text).await {
                Ok(translation) => {
                    info!("Translated {}/{}", i + 1, texts.len());
                    results.push(translation);
                }
                Err(e) => {
                    error!("Translation failed for row {}: {}", i, e);
                    results.push(error_marker(&e));
                }
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
struct WebResponse {
    data: WebData,
}

#[derive(Debug, Deserialize)]
struct WebData {
    translations: Vec<WebTranslation>,
}

#[derive(Debug, Deserialize)]
struct WebTranslation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Web translation endpoint: the entire batch goes out as one request. On
/// non-success status or an unexpected response shape the whole call yields
/// the no-result sentinel for every row rather than partial data. The
/// asymmetry with the per-item vendor mode is intentional and documented,
/// not unified.
pub struct WebEndpointTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
    target: TargetLanguage,
}

impl WebEndpointTranslator {
    pub fn new(endpoint: String, api_key: String, target: TargetLanguage) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            endpoint,
            api_key,
            target,
        }
    }
}

#[async_trait]
impl Translator for WebEndpointTranslator {
    async fn translate(
        &mut self,
        texts: &[String],
        _opts: &GenerationOptions,
    ) -> Result<Vec<String>> {
        info!(
            "Translating {} inputs via web endpoint into {}",
            texts.len(),
            self.target
        );

        let mut params: Vec<(&str, &str)> = vec![("key", self.api_key.as_str())];
        for text in texts {
            params.push(("q", text.as_str()));
        }
        params.push(("target", self.target.code()));

        let no_result = || vec![NO_RESULT.to_string(); texts.len()];

        let response = match self.client.get(&self.endpoint).query(&params).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Web endpoint request failed: {}", e);
                return Ok(no_result());
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Web endpoint error {}: {}", status, body);
            return Ok(no_result());
        }

        let web_response: WebResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Unexpected web endpoint response format: {}", e);
                return Ok(no_result());
            }
        };

        if web_response.data.translations.len() != texts.len() {
            warn!(
                "Web endpoint returned {} translations for {} inputs",
                web_response.data.translations.len(),
                texts.len()
            );
            return Ok(no_result());
        }

        Ok(web_response
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}

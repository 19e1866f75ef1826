// Modular translation backends
//
// Each backend implements the same batch-level Translator contract:
// - OpenWeight: locally hosted engine, one batched generation call
// - CommercialChat: hosted chat API, sequential with retry and throttling
// - DedicatedMt: vendor MT API, sequential with per-item error capture
// - WebEndpoint: web translation API, whole batch in one request

pub mod chat;
pub mod mt;
pub mod openweight;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::{Result, TabError};
use crate::language::TargetLanguage;

/// Generation parameters shared across backends. MT backends ignore them.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Batch translation contract. Implementations must return exactly one
/// result per input, in input order.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &mut self,
        texts: &[String],
        opts: &GenerationOptions,
    ) -> Result<Vec<String>>;
}

/// The translation backend, resolved once from the model identifier.
/// Unknown identifiers fail closed; there is no default backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    OpenWeight,
    CommercialChat,
    DedicatedMt,
    WebEndpoint,
}

impl BackendKind {
    /// Resolve a model identifier to a backend:
    /// - commercial chat family marker (`gpt`) anywhere in the id
    /// - literal `deepl` / `google-translate` for the MT backends
    /// - hub-path shape (`org/model`) for the open-weight engine
    pub fn resolve(model_id: &str) -> Result<Self> {
        if model_id == "deepl" {
            Ok(Self::DedicatedMt)
        } else if model_id == "google-translate" {
            Ok(Self::WebEndpoint)
        } else if model_id.contains("gpt") {
            Ok(Self::CommercialChat)
        } else if model_id.contains('/') {
            Ok(Self::OpenWeight)
        } else {
            Err(TabError::UnsupportedBackend(model_id.to_string()))
        }
    }
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the LLM-backed translator for `translate-llm`. MT backends are
    /// served by their own entry point and are rejected here.
    pub fn create_llm(model_id: &str, config: &AppConfig) -> Result<Box<dyn Translator>> {
        match BackendKind::resolve(model_id)? {
            BackendKind::OpenWeight => Ok(Box::new(openweight::OpenWeightTranslator::new(
                model_id,
                config.engine.clone(),
                config.cache.model_cache_home.clone(),
            ))),
            BackendKind::CommercialChat => Ok(Box::new(chat::ChatTranslator::new(
                model_id,
                &config.chat,
            )?)),
            BackendKind::DedicatedMt | BackendKind::WebEndpoint => {
                Err(TabError::UnsupportedBackend(format!(
                    "{} is a dedicated MT backend; use translate-mt",
                    model_id
                )))
            }
        }
    }

    /// Create the MT-backed translator for `translate-mt`. Dispatches by
    /// literal backend name; anything else fails closed.
    pub fn create_mt(
        model_id: &str,
        target: TargetLanguage,
        auth_key: Option<&str>,
        config: &AppConfig,
    ) -> Result<Box<dyn Translator>> {
        let auth_key = auth_key
            .map(|k| k.to_string())
            .or_else(|| config.mt.auth_key.clone())
            .ok_or_else(|| {
                TabError::BackendConstruction(
                    "MT auth key missing: pass --auth-key or set MT_AUTH_KEY".to_string(),
                )
            })?;

        match model_id {
            "deepl" => Ok(Box::new(mt::VendorMtTranslator::new(
                config.mt.vendor_endpoint.clone(),
                auth_key,
                target,
            ))),
            "google-translate" => Ok(Box::new(mt::WebEndpointTranslator::new(
                config.mt.web_endpoint.clone(),
                auth_key,
                target,
            ))),
            other => Err(TabError::UnsupportedBackend(other.to_string())),
        }
    }
}

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use rexchat_core::config::AppConfig;
use rexchat_core::errors::{ApplicationError, DomainError};
use rexchat_core::knowledge::prompt::resolve_system_prompt;
use rexchat_core::{Intent, IntentExtractor, KnowledgeBase, KnowledgeFacts, ResponderSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::gateway::{GatewayError, ModelGateway};
use crate::llm::{GeminiClient, ProviderError};
use crate::rate_limit::{RateLimiter, RateUsage};

pub const MESSAGE_REQUIRED: &str = "Message is required";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseSource {
    #[serde(rename = "simulated")]
    Simulated,
    #[serde(rename = "gemini", alias = "gemini_equivalent")]
    Model,
    #[serde(rename = "fallback")]
    Fallback,
}

impl ResponseSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Model => "gemini",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseResult {
    pub response: String,
    pub source: ResponseSource,
    pub intent: Intent,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(DomainError),
    #[error(transparent)]
    Provider(ProviderError),
}

impl From<PipelineError> for ApplicationError {
    fn from(value: PipelineError) -> Self {
        match value {
            PipelineError::Validation(error) => ApplicationError::Domain(error),
            PipelineError::Provider(error) => ApplicationError::Integration(error.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineBuildError {
    #[error("could not read system prompt `{path}`: {source}")]
    SystemPrompt { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Routes a chat message: canned answer first, then the model, then the
/// high-demand fallback once the daily ceiling is spent. The chosen raw text
/// is always run through the intent extractor except on fallback.
pub struct ResponsePipeline {
    knowledge: KnowledgeBase,
    gateway: ModelGateway,
    extractor: IntentExtractor,
}

impl ResponsePipeline {
    pub fn new(knowledge: KnowledgeBase, gateway: ModelGateway) -> Self {
        Self { knowledge, gateway, extractor: IntentExtractor::new() }
    }

    /// Production wiring: Rex Security facts, Gemini client, configured ceiling.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineBuildError> {
        let knowledge = KnowledgeBase::new(
            KnowledgeFacts::rex_security(),
            ResponderSettings { contact_max_tokens: config.responder.contact_max_tokens },
        );
        let system_prompt =
            resolve_system_prompt(&config.llm, knowledge.facts()).map_err(|source| {
                PipelineBuildError::SystemPrompt {
                    path: config.llm.system_prompt_path.clone().unwrap_or_default(),
                    source,
                }
            })?;

        let client = GeminiClient::from_config(&config.llm)?;
        let limiter = Arc::new(RateLimiter::new(config.llm.daily_limit));

        info!(
            event_name = "chat.pipeline.ready",
            model = %config.llm.model,
            daily_limit = config.llm.daily_limit,
            custom_prompt = config.llm.system_prompt_path.is_some(),
            "response pipeline initialized"
        );

        Ok(Self::new(knowledge, ModelGateway::new(Arc::new(client), limiter, system_prompt)))
    }

    pub fn quota(&self) -> RateUsage {
        self.gateway.limiter().usage()
    }

    pub async fn respond(&self, message: &str) -> Result<ResponseResult, PipelineError> {
        if message.trim().is_empty() {
            return Err(PipelineError::Validation(DomainError::Validation(
                MESSAGE_REQUIRED.to_string(),
            )));
        }

        let (raw, source) = match self.knowledge.respond(message) {
            Some(canned) => {
                info!(event_name = "chat.pipeline.simulated", "answered from knowledge base");
                (canned, ResponseSource::Simulated)
            }
            None => match self.gateway.complete(message).await {
                Ok(text) => {
                    info!(event_name = "chat.pipeline.model", "answered by model");
                    (text, ResponseSource::Model)
                }
                Err(GatewayError::RateLimitExceeded) => {
                    info!(event_name = "chat.pipeline.fallback", "model quota exhausted");
                    return Ok(ResponseResult {
                        response: self.knowledge.facts().high_demand_fallback(),
                        source: ResponseSource::Fallback,
                        intent: Intent::None,
                    });
                }
                Err(GatewayError::Provider(error)) => return Err(PipelineError::Provider(error)),
            },
        };

        let extracted = self.extractor.extract(&raw);
        if extracted.intent.is_actionable() {
            info!(
                event_name = "chat.pipeline.intent_detected",
                intent = %extracted.intent,
                source = source.as_str(),
                "intent marker found in response"
            );
        }

        Ok(ResponseResult { response: extracted.clean_text, source, intent: extracted.intent })
    }
}

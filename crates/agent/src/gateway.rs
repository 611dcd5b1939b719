use std::sync::Arc;

use rexchat_core::knowledge::prompt::ASSISTANT_ACKNOWLEDGMENT;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::{LlmClient, PromptTurn, ProviderError};
use crate::rate_limit::RateLimiter;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("model call limit exceeded")]
    RateLimitExceeded,
    #[error(transparent)]
    Provider(ProviderError),
}

/// Single-turn access to the hosted model, gated by the daily call ceiling.
pub struct ModelGateway {
    client: Arc<dyn LlmClient>,
    limiter: Arc<RateLimiter>,
    system_prompt: String,
}

impl ModelGateway {
    pub fn new(
        client: Arc<dyn LlmClient>,
        limiter: Arc<RateLimiter>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self { client, limiter, system_prompt: system_prompt.into() }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Persona turn, canned acknowledgment, then the live message.
    pub fn seeded_turns(&self, user_message: &str) -> Vec<PromptTurn> {
        vec![
            PromptTurn::user(self.system_prompt.clone()),
            PromptTurn::model(ASSISTANT_ACKNOWLEDGMENT),
            PromptTurn::user(user_message),
        ]
    }

    pub async fn complete(&self, user_message: &str) -> Result<String, GatewayError> {
        if !self.limiter.try_admit() {
            return Err(GatewayError::RateLimitExceeded);
        }

        match self.client.complete(&self.seeded_turns(user_message)).await {
            Ok(text) => {
                info!(
                    event_name = "llm.gateway.completed",
                    response_chars = text.chars().count(),
                    "model call completed"
                );
                Ok(text)
            }
            Err(ProviderError::Throttled) => {
                warn!(event_name = "llm.gateway.throttled", "model provider throttled the call");
                Err(GatewayError::RateLimitExceeded)
            }
            Err(error) => {
                warn!(event_name = "llm.gateway.failed", error = %error, "model call failed");
                Err(GatewayError::Provider(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{GatewayError, ModelGateway};
    use crate::llm::{LlmClient, PromptTurn, ProviderError, TurnRole};
    use crate::rate_limit::RateLimiter;

    struct ScriptedClient {
        reply: Result<String, ProviderError>,
        calls: AtomicUsize,
        last_turns: Mutex<Vec<PromptTurn>>,
    }

    impl ScriptedClient {
        fn replying(reply: Result<String, ProviderError>) -> Arc<Self> {
            Arc::new(Self { reply, calls: AtomicUsize::new(0), last_turns: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, turns: &[PromptTurn]) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_turns.lock().expect("turns lock") = turns.to_vec();
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn raw_model_text_is_returned_unmodified() {
        let client = ScriptedClient::replying(Ok("Sure. [INTENT:HIGH_INTEREST]".to_string()));
        let gateway =
            ModelGateway::new(client.clone(), Arc::new(RateLimiter::new(5)), "persona prompt");

        let text = gateway.complete("can you start friday?").await.expect("call should succeed");

        assert_eq!(text, "Sure. [INTENT:HIGH_INTEREST]");
        let turns = client.last_turns.lock().expect("turns lock").clone();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0], PromptTurn::user("persona prompt"));
        assert_eq!(turns[1].role, TurnRole::Model);
        assert_eq!(turns[2], PromptTurn::user("can you start friday?"));
    }

    #[tokio::test]
    async fn denied_admission_never_contacts_provider() {
        let client = ScriptedClient::replying(Ok("unused".to_string()));
        let gateway = ModelGateway::new(client.clone(), Arc::new(RateLimiter::new(0)), "persona");

        let result = gateway.complete("hello").await;

        assert_eq!(result, Err(GatewayError::RateLimitExceeded));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_throttling_maps_to_rate_limit() {
        let client = ScriptedClient::replying(Err(ProviderError::Throttled));
        let gateway = ModelGateway::new(client, Arc::new(RateLimiter::new(5)), "persona");

        assert_eq!(gateway.complete("hello").await, Err(GatewayError::RateLimitExceeded));
    }

    #[tokio::test]
    async fn provider_failures_are_propagated() {
        let client = ScriptedClient::replying(Err(ProviderError::Transport("timeout".to_string())));
        let limiter = Arc::new(RateLimiter::new(5));
        let gateway = ModelGateway::new(client, Arc::clone(&limiter), "persona");

        let result = gateway.complete("hello").await;

        assert!(matches!(result, Err(GatewayError::Provider(ProviderError::Transport(_)))));
        assert_eq!(limiter.usage().used, 1, "failed calls still count against the ceiling");
    }
}

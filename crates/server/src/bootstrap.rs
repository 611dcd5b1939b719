use std::sync::Arc;

use rexchat_agent::runtime::{PipelineBuildError, ResponsePipeline};
use rexchat_core::config::AppConfig;
use rexchat_notify::{
    transport_from_config, NotificationDispatcher, NotificationError, TransportError,
};
use thiserror::Error;
use tracing::info;

/// Shared handles for every route. The rate limiter lives inside the pipeline
/// and is the only mutable state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResponsePipeline>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

impl AppState {
    pub fn new(pipeline: ResponsePipeline, dispatcher: NotificationDispatcher) -> Self {
        Self { pipeline: Arc::new(pipeline), dispatcher: Arc::new(dispatcher) }
    }
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Pipeline(#[from] PipelineBuildError),
    #[error("mail transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("notification setup failed: {0}")]
    Notification(#[from] NotificationError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let pipeline = ResponsePipeline::from_config(&config)?;

    let transport = transport_from_config(&config.notifications)?;
    let dispatcher = NotificationDispatcher::from_config(transport, &config.notifications)?;
    info!(
        event_name = "system.bootstrap.notifications_ready",
        correlation_id = "bootstrap",
        relay = config.notifications.relay_url.is_some(),
        "staff notification transport initialized"
    );

    Ok(Application { state: AppState::new(pipeline, dispatcher), config })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use rexchat_agent::llm::{LlmClient, PromptTurn, ProviderError};
    use rexchat_agent::{ModelGateway, RateLimiter, ResponsePipeline};
    use rexchat_core::KnowledgeBase;
    use rexchat_notify::{MailTransport, NotificationDispatcher, OutboundEmail, TransportError};

    use super::AppState;

    pub struct ScriptedModel(pub Result<String, ProviderError>);

    #[async_trait]
    impl LlmClient for ScriptedModel {
        async fn complete(&self, _turns: &[PromptTurn]) -> Result<String, ProviderError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<OutboundEmail>>,
        pub fail: bool,
    }

    impl RecordingTransport {
        pub fn sent(&self) -> Vec<OutboundEmail> {
            self.sent.lock().expect("sent lock").clone()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, email: &OutboundEmail) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Connect("relay offline".to_string()));
            }
            self.sent.lock().expect("sent lock").push(email.clone());
            Ok(())
        }
    }

    pub fn state_with(
        reply: Result<String, ProviderError>,
        daily_limit: u32,
        transport: Arc<RecordingTransport>,
    ) -> AppState {
        let gateway = ModelGateway::new(
            Arc::new(ScriptedModel(reply)),
            Arc::new(RateLimiter::new(daily_limit)),
            "persona",
        );
        let dispatcher =
            NotificationDispatcher::new(transport, "hr@example.test", "bot@example.test")
                .expect("templates should load");
        AppState::new(ResponsePipeline::new(KnowledgeBase::default(), gateway), dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use rexchat_core::config::AppConfig;

    use super::{bootstrap_with_config, BootstrapError};

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("test-key".to_string().into());
        config.notifications.staff_email = "hr@example.test".to_string();
        config
    }

    #[test]
    fn bootstrap_wires_pipeline_with_configured_limit() {
        let mut config = valid_config();
        config.llm.daily_limit = 12;

        let app = bootstrap_with_config(config).expect("bootstrap should succeed");

        assert_eq!(app.state.pipeline.quota().limit, 12);
        assert_eq!(app.config.notifications.staff_email, "hr@example.test");
    }

    #[test]
    fn bootstrap_fails_without_model_credentials() {
        let mut config = valid_config();
        config.llm.api_key = None;

        let result = bootstrap_with_config(config);

        assert!(matches!(result, Err(BootstrapError::Pipeline(_))));
    }

    #[test]
    fn bootstrap_fails_on_missing_prompt_file() {
        let mut config = valid_config();
        config.llm.system_prompt_path = Some("/nonexistent/rexchat/prompt.txt".into());

        let message = bootstrap_with_config(config).err().expect("error").to_string();

        assert!(message.contains("/nonexistent/rexchat/prompt.txt"));
    }
}

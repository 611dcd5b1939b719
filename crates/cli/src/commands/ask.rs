use rexchat_agent::runtime::{PipelineError, ResponsePipeline};
use rexchat_core::config::{AppConfig, LoadOptions};

use super::CommandResult;

const COMMAND: &str = "ask";

pub fn run(message: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2);
        }
    };

    let pipeline = match ResponsePipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(error) => {
            return CommandResult::failure(COMMAND, "pipeline_init", error.to_string(), 3);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(pipeline.respond(message)) {
        Ok(result) => {
            let summary = format!("answered from {}", result.source.as_str());
            match serde_json::to_value(&result) {
                Ok(value) => CommandResult::success(COMMAND, summary, Some(value)),
                Err(error) => {
                    CommandResult::failure(COMMAND, "serialization", error.to_string(), 5)
                }
            }
        }
        Err(PipelineError::Validation(error)) => {
            CommandResult::failure(COMMAND, "invalid_input", error.to_string(), 4)
        }
        Err(PipelineError::Provider(error)) => {
            CommandResult::failure(COMMAND, "model_provider", error.to_string(), 5)
        }
    }
}

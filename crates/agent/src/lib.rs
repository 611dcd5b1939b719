//! Agent Runtime - response routing for the Rex Security chat assistant
//!
//! This crate turns one customer message into a reply:
//! - Answers common questions from the static knowledge base
//! - Escalates everything else to a hosted model (`llm`, `gateway`)
//! - Caps model usage per local day (`rate_limit`)
//! - Strips intent markers and classifies the reply (`runtime`)
//!
//! # Key Types
//!
//! - `ResponsePipeline` - Main orchestrator (see `runtime` module)
//! - `LlmClient` - Pluggable trait for the hosted model
//! - `RateLimiter` - Shared daily call ceiling
//!
//! # Safety Principle
//!
//! The model never sees staff contact addresses beyond the published company
//! facts, and nothing it returns is executed. Intent markers are the only
//! structured signal read from its output.

pub mod gateway;
pub mod llm;
pub mod rate_limit;
pub mod runtime;

pub use gateway::{GatewayError, ModelGateway};
pub use llm::{GeminiClient, LlmClient, PromptTurn, ProviderError};
pub use rate_limit::{RateLimiter, RateUsage};
pub use runtime::{
    PipelineBuildError, PipelineError, ResponsePipeline, ResponseResult, ResponseSource,
};

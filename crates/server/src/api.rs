//! Chat widget JSON API.
//!
//! - `POST /api/chat`          - route one message through the response pipeline
//! - `POST /api/auto-contact`  - alert staff about a detected intent
//! - `POST /api/contact`       - contact form (email, or call-back with confirmation)

use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use rexchat_agent::runtime::{ResponseResult, MESSAGE_REQUIRED};
use rexchat_core::errors::{ApplicationError, InterfaceError};
use rexchat_core::{ContactRequest, ConversationTurn, NotificationKind};
use rexchat_notify::ContactOutcome;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::bootstrap::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AutoContactRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "conversationHistory", default)]
    pub conversation_history: Vec<ConversationTurn>,
    #[serde(rename = "userPhone", default)]
    pub user_phone: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ContactResponse {
    #[serde(rename = "needsConfirmation", skip_serializing_if = "Option::is_none")]
    pub needs_confirmation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub message: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
}

type Rejection<T = ApiError> = (StatusCode, Json<T>);

const INVALID_BODY: &str = "Invalid request body";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/auto-contact", post(auto_contact))
        .route("/api/contact", post(contact))
        .with_state(state)
}

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn api_error(status: StatusCode, error: &str) -> Rejection {
    (status, Json(ApiError { error: error.to_string() }))
}

/// Keeps extractor failures in the `{error}` JSON shape the widget expects.
fn unreadable_body(
    route: &'static str,
    correlation_id: &str,
    rejection: &JsonRejection,
) -> StatusCode {
    warn!(
        event_name = "http.request.unreadable",
        correlation_id = %correlation_id,
        route,
        error = %rejection.body_text(),
        "request body rejected"
    );
    rejection.status()
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ResponseResult>, Rejection> {
    let correlation_id = new_correlation_id();
    let span = info_span!("http.chat", correlation_id = %correlation_id);

    async move {
        let Json(body) = match payload {
            Ok(body) => body,
            Err(rejection) => {
                let status = unreadable_body("/api/chat", &correlation_id, &rejection);
                return Err(api_error(status, INVALID_BODY));
            }
        };
        let message = body.message.unwrap_or_default();
        match state.pipeline.respond(&message).await {
            Ok(result) => {
                info!(
                    event_name = "http.chat.answered",
                    correlation_id = %correlation_id,
                    source = result.source.as_str(),
                    intent = %result.intent,
                    "chat message answered"
                );
                Ok(Json(result))
            }
            Err(failure) => match ApplicationError::from(failure).into_interface(&correlation_id) {
                InterfaceError::BadRequest { .. } => {
                    Err(api_error(StatusCode::BAD_REQUEST, MESSAGE_REQUIRED))
                }
                other => {
                    error!(
                        event_name = "http.chat.failed",
                        correlation_id = %other.correlation_id(),
                        error = %other,
                        "chat pipeline failed"
                    );
                    Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process request"))
                }
            },
        }
    }
    .instrument(span)
    .await
}

pub async fn auto_contact(
    State(state): State<AppState>,
    payload: Result<Json<AutoContactRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, Rejection<Value>> {
    let correlation_id = new_correlation_id();
    let span = info_span!("http.auto_contact", correlation_id = %correlation_id);

    async move {
        let Json(body) = match payload {
            Ok(body) => body,
            Err(rejection) => {
                let status = unreadable_body("/api/auto-contact", &correlation_id, &rejection);
                return Err((status, Json(json!({ "error": INVALID_BODY }))));
            }
        };
        let kind = match NotificationKind::from_str(&body.kind) {
            Ok(kind) => kind,
            Err(rejected) => {
                warn!(
                    event_name = "http.auto_contact.rejected",
                    correlation_id = %correlation_id,
                    error = %rejected,
                    "unknown notification kind"
                );
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "success": false, "message": "Invalid contact type" })),
                ));
            }
        };

        match state
            .dispatcher
            .notify(kind, &body.conversation_history, body.user_phone.as_deref())
            .await
        {
            Ok(receipt) => Ok(Json(AckResponse { success: true, message: receipt.message })),
            Err(failure) => {
                let failure = ApplicationError::from(failure).into_interface(&correlation_id);
                error!(
                    event_name = "http.auto_contact.failed",
                    correlation_id = %failure.correlation_id(),
                    kind = kind.as_str(),
                    error = %failure,
                    "staff notification failed"
                );
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to send notification" })),
                ))
            }
        }
    }
    .instrument(span)
    .await
}

pub async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, Rejection> {
    let correlation_id = new_correlation_id();
    let span = info_span!("http.contact", correlation_id = %correlation_id);

    async move {
        let Json(body) = match payload {
            Ok(body) => body,
            Err(rejection) => {
                let status = unreadable_body("/api/contact", &correlation_id, &rejection);
                return Err(api_error(status, INVALID_BODY));
            }
        };
        match state.dispatcher.submit_contact(&body).await {
            Ok(ContactOutcome::NeedsConfirmation { message }) => Ok(Json(ContactResponse {
                needs_confirmation: Some(true),
                success: None,
                message,
            })),
            Ok(ContactOutcome::Sent { message }) => {
                Ok(Json(ContactResponse { needs_confirmation: None, success: Some(true), message }))
            }
            Err(failure) => match ApplicationError::from(failure).into_interface(&correlation_id) {
                InterfaceError::BadRequest { message, .. } => {
                    Err(api_error(StatusCode::BAD_REQUEST, &message))
                }
                other => {
                    error!(
                        event_name = "http.contact.failed",
                        correlation_id = %other.correlation_id(),
                        error = %other,
                        "contact form delivery failed"
                    );
                    Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send message"))
                }
            },
        }
    }
    .instrument(span)
    .await
}

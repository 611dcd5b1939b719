//! Domain core for the Rex Security chat assistant: company knowledge, the
//! canned-answer responder, intent markers, configuration and error types.

pub mod config;
pub mod domain;
pub mod errors;
pub mod intent;
pub mod knowledge;

pub use domain::contact::{ContactChannel, ContactRequest};
pub use domain::conversation::{ConversationTurn, Role};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use intent::{ExtractedIntent, Intent, IntentExtractor, NotificationKind};
pub use knowledge::{KnowledgeBase, KnowledgeFacts, ResponderSettings};

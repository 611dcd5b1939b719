//! Staff Notifications - email alerts for the operations and HR teams
//!
//! - **Dispatcher** (`dispatcher`) - renders intent alerts and contact-form
//!   submissions from tera templates and hands them to a transport
//! - **Transport** (`transport`) - HTTP mail relay, or log-only in development
//!
//! # Key Types
//!
//! - `NotificationDispatcher` - builds and sends staff email
//! - `MailTransport` - Trait for outbound delivery

pub mod dispatcher;
pub mod transport;

pub use dispatcher::{
    ContactOutcome, NotificationDispatcher, NotificationError, NotificationReceipt,
};
pub use transport::{
    transport_from_config, HttpRelayTransport, LogOnlyTransport, MailTransport, OutboundEmail,
    TransportError,
};

use std::sync::Arc;

use chrono::{DateTime, Local};
use rexchat_core::config::NotificationConfig;
use rexchat_core::domain::conversation::{find_phone_number, transcript};
use rexchat_core::errors::{ApplicationError, DomainError};
use rexchat_core::{ContactChannel, ContactRequest, ConversationTurn, NotificationKind};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::{info, warn};

use crate::transport::{MailTransport, OutboundEmail, TransportError};

const HIGH_INTEREST_TEMPLATE: &str = "high_interest.html";
const HR_CONTACT_TEMPLATE: &str = "hr_contact.html";
const CONTACT_FORM_TEMPLATE: &str = "contact_form.html";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("could not render notification body: {0}")]
    Render(String),
    #[error(transparent)]
    Delivery(#[from] TransportError),
    #[error(transparent)]
    Validation(#[from] DomainError),
}

impl From<NotificationError> for ApplicationError {
    fn from(value: NotificationError) -> Self {
        match value {
            NotificationError::Validation(error) => ApplicationError::Domain(error),
            other => ApplicationError::Notification(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NotificationReceipt {
    pub kind: NotificationKind,
    pub subject: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContactOutcome {
    NeedsConfirmation { message: String },
    Sent { message: String },
}

impl ContactOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::NeedsConfirmation { message } | Self::Sent { message } => message,
        }
    }
}

/// Formats and sends staff-facing email for detected intents and contact-form
/// submissions. All mail goes to the single configured staff address.
pub struct NotificationDispatcher {
    transport: Arc<dyn MailTransport>,
    templates: Tera,
    staff_email: String,
    from_address: String,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        staff_email: impl Into<String>,
        from_address: impl Into<String>,
    ) -> Result<Self, NotificationError> {
        Ok(Self {
            transport,
            templates: init_templates()?,
            staff_email: staff_email.into(),
            from_address: from_address.into(),
        })
    }

    pub fn from_config(
        transport: Arc<dyn MailTransport>,
        config: &NotificationConfig,
    ) -> Result<Self, NotificationError> {
        Self::new(transport, config.staff_email.clone(), config.from_address.clone())
    }

    pub async fn notify(
        &self,
        kind: NotificationKind,
        history: &[ConversationTurn],
        phone: Option<&str>,
    ) -> Result<NotificationReceipt, NotificationError> {
        self.notify_at(kind, history, phone, Local::now()).await
    }

    pub async fn notify_at(
        &self,
        kind: NotificationKind,
        history: &[ConversationTurn],
        phone: Option<&str>,
        sent_at: DateTime<Local>,
    ) -> Result<NotificationReceipt, NotificationError> {
        let phone = phone
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .or_else(|| find_phone_number(history));

        let mut context = Context::new();
        context.insert("phone", &phone);
        context.insert("transcript", &transcript(history));
        context.insert("sent_at", &footer_timestamp(sent_at));

        let (template, subject, message) = match kind {
            NotificationKind::HighInterest => (
                HIGH_INTEREST_TEMPLATE,
                "🔥 HIGH INTEREST LEAD - Immediate Follow-up Required",
                "High interest alert sent to operations team",
            ),
            NotificationKind::HrContact => (
                HR_CONTACT_TEMPLATE,
                "📧 HR Inquiry from Website Chat",
                "HR inquiry forwarded",
            ),
        };

        let html = self.render(template, &context)?;
        self.deliver(subject.to_string(), html).await?;

        info!(
            event_name = "notify.intent.sent",
            kind = kind.as_str(),
            turns = history.len(),
            phone_present = phone.is_some(),
            "staff notification sent"
        );

        Ok(NotificationReceipt { kind, subject: subject.to_string(), message: message.to_string() })
    }

    pub async fn submit_contact(
        &self,
        request: &ContactRequest,
    ) -> Result<ContactOutcome, NotificationError> {
        self.submit_contact_at(request, Local::now()).await
    }

    pub async fn submit_contact_at(
        &self,
        request: &ContactRequest,
        sent_at: DateTime<Local>,
    ) -> Result<ContactOutcome, NotificationError> {
        request.validate()?;

        let phone = request.phone_display();
        if request.needs_confirmation() {
            return Ok(ContactOutcome::NeedsConfirmation {
                message: format!(
                    "Are you sure you want us to call you at {phone}? We'll reach out during \
                     business hours (Mon-Fri, 9 AM - 5 PM)."
                ),
            });
        }

        let is_call = request.channel == ContactChannel::Call;
        let mut context = Context::new();
        context.insert("is_call", &is_call);
        context.insert("name", request.name.trim());
        context.insert("email", &request.email);
        context.insert("phone", &request.phone);
        context.insert("message", &request.message);
        context.insert("sent_at", &footer_timestamp(sent_at));

        let subject = if is_call {
            format!("🔔 CALL REQUEST from {}", request.name.trim())
        } else {
            format!("📧 Contact Form Submission from {}", request.name.trim())
        };

        let html = self.render(CONTACT_FORM_TEMPLATE, &context)?;
        self.deliver(subject, html).await?;

        info!(event_name = "notify.contact.sent", call_requested = is_call, "contact form relayed");

        let message = if is_call {
            format!("Thank you! Our HR team will call you at {phone} during business hours.")
        } else {
            "Thank you! Your message has been sent to our HR team. We'll respond within 1 \
             business hour."
                .to_string()
        };
        Ok(ContactOutcome::Sent { message })
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, NotificationError> {
        self.templates
            .render(template, context)
            .map_err(|error| NotificationError::Render(error.to_string()))
    }

    async fn deliver(&self, subject: String, html: String) -> Result<(), NotificationError> {
        let email = OutboundEmail {
            from: self.from_address.clone(),
            to: self.staff_email.clone(),
            subject,
            html,
        };

        self.transport.send(&email).await.map_err(|error| {
            warn!(
                event_name = "notify.delivery.failed",
                subject = %email.subject,
                error = %error,
                "staff email delivery failed"
            );
            NotificationError::Delivery(error)
        })
    }
}

fn init_templates() -> Result<Tera, NotificationError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (HIGH_INTEREST_TEMPLATE, include_str!("../templates/high_interest.html")),
        (HR_CONTACT_TEMPLATE, include_str!("../templates/hr_contact.html")),
        (CONTACT_FORM_TEMPLATE, include_str!("../templates/contact_form.html")),
    ])
    .map_err(|error| NotificationError::Render(error.to_string()))?;
    Ok(tera)
}

fn footer_timestamp(sent_at: DateTime<Local>) -> String {
    sent_at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

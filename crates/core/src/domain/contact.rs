use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    Call,
    /// Anything other than `call` is delivered as an email.
    #[default]
    #[serde(other)]
    Email,
}

/// A contact-form submission from the widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(rename = "type", default)]
    pub channel: ContactChannel,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub confirmed: bool,
}

impl ContactRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() || self.message.trim().is_empty() {
            return Err(DomainError::Validation("Name and message are required".to_string()));
        }
        Ok(())
    }

    /// Call-back requests need an explicit second submission before anything is sent.
    pub fn needs_confirmation(&self) -> bool {
        self.channel == ContactChannel::Call && !self.confirmed
    }

    pub fn phone_display(&self) -> &str {
        self.phone.as_deref().map(str::trim).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactChannel, ContactRequest};

    fn request(channel: ContactChannel, confirmed: bool) -> ContactRequest {
        ContactRequest {
            channel,
            name: "Jane".to_string(),
            email: None,
            phone: Some("555-0100".to_string()),
            message: "please call".to_string(),
            confirmed,
        }
    }

    #[test]
    fn unconfirmed_call_needs_confirmation() {
        assert!(request(ContactChannel::Call, false).needs_confirmation());
        assert!(!request(ContactChannel::Call, true).needs_confirmation());
        assert!(!request(ContactChannel::Email, false).needs_confirmation());
    }

    #[test]
    fn blank_name_fails_validation() {
        let mut blank = request(ContactChannel::Email, false);
        blank.name = "   ".to_string();

        let error = blank.validate().expect_err("blank name should be rejected");
        assert!(error.to_string().contains("Name and message are required"));
    }

    #[test]
    fn wire_format_uses_type_field() {
        let parsed: ContactRequest = serde_json::from_str(
            r#"{"type":"call","name":"Jane","phone":"555-0100","message":"hi","confirmed":false}"#,
        )
        .expect("contact request should parse");

        assert_eq!(parsed.channel, ContactChannel::Call);
        assert_eq!(parsed.phone_display(), "555-0100");
    }

    #[test]
    fn unrecognized_or_missing_type_is_treated_as_email() {
        let unrecognized: ContactRequest =
            serde_json::from_str(r#"{"type":"sms","name":"Jane","message":"hi"}"#)
                .expect("unknown type should still parse");
        let missing: ContactRequest = serde_json::from_str(r#"{"name":"Jane","message":"hi"}"#)
            .expect("missing type should parse");

        assert_eq!(unrecognized.channel, ContactChannel::Email);
        assert_eq!(missing.channel, ContactChannel::Email);
    }
}

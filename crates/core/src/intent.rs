//! Out-of-band intent markers carried inside response text.
//!
//! Canned answers and model replies tag themselves with a literal marker such
//! as `[INTENT:HIGH_INTEREST]`. Only this module knows the literals; callers
//! work with [`Intent`] and the cleaned text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const HIGH_INTEREST_MARKER: &str = "[INTENT:HIGH_INTEREST]";
const HR_CONTACT_MARKER: &str = "[INTENT:HR_CONTACT]";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    HighInterest,
    HrContact,
    #[default]
    None,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighInterest => "high_interest",
            Self::HrContact => "hr_contact",
            Self::None => "none",
        }
    }

    /// The literal appended to a response to signal this intent.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Self::HighInterest => Some(HIGH_INTEREST_MARKER),
            Self::HrContact => Some(HR_CONTACT_MARKER),
            Self::None => None,
        }
    }

    pub fn is_actionable(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An intent that warrants a staff notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    HighInterest,
    HrContact,
}

impl NotificationKind {
    pub fn from_intent(intent: Intent) -> Option<Self> {
        match intent {
            Intent::HighInterest => Some(Self::HighInterest),
            Intent::HrContact => Some(Self::HrContact),
            Intent::None => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighInterest => "high_interest",
            Self::HrContact => "hr_contact",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "high_interest" => Ok(Self::HighInterest),
            "hr_contact" => Ok(Self::HrContact),
            other => Err(DomainError::UnsupportedNotificationKind(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedIntent {
    pub intent: Intent,
    pub clean_text: String,
}

#[derive(Clone, Debug, Default)]
pub struct IntentExtractor;

impl IntentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// High interest is checked before HR contact; if both markers are present
    /// only the high-interest one is removed and reported.
    pub fn extract(&self, text: &str) -> ExtractedIntent {
        for intent in [Intent::HighInterest, Intent::HrContact] {
            let Some(marker) = intent.marker() else {
                continue;
            };
            if text.contains(marker) {
                return ExtractedIntent {
                    intent,
                    clean_text: text.replacen(marker, "", 1).trim().to_string(),
                };
            }
        }

        ExtractedIntent { intent: Intent::None, clean_text: text.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::{Intent, IntentExtractor, NotificationKind};

    #[test]
    fn high_interest_marker_is_stripped_and_trimmed() {
        let extracted = IntentExtractor::new()
            .extract("We can start Monday.\n\n[INTENT:HIGH_INTEREST]\n");

        assert_eq!(extracted.intent, Intent::HighInterest);
        assert_eq!(extracted.clean_text, "We can start Monday.");
    }

    #[test]
    fn hr_marker_is_detected() {
        let extracted = IntentExtractor::new().extract("Please reach HR. [INTENT:HR_CONTACT]");

        assert_eq!(extracted.intent, Intent::HrContact);
        assert_eq!(extracted.clean_text, "Please reach HR.");
    }

    #[test]
    fn text_without_markers_is_returned_unchanged() {
        let raw = "  We cover Katy and Cypress.  ";
        let extracted = IntentExtractor::new().extract(raw);

        assert_eq!(extracted.intent, Intent::None);
        assert_eq!(extracted.clean_text, raw);
    }

    #[test]
    fn high_interest_wins_when_both_markers_are_present() {
        let extracted = IntentExtractor::new()
            .extract("[INTENT:HR_CONTACT] Let's book it. [INTENT:HIGH_INTEREST]");

        assert_eq!(extracted.intent, Intent::HighInterest);
        assert_eq!(extracted.clean_text, "[INTENT:HR_CONTACT] Let's book it.");
    }

    #[test]
    fn only_one_occurrence_of_a_marker_is_removed() {
        let extracted = IntentExtractor::new()
            .extract("[INTENT:HIGH_INTEREST] ready [INTENT:HIGH_INTEREST]");

        assert_eq!(extracted.intent, Intent::HighInterest);
        assert_eq!(extracted.clean_text, "ready [INTENT:HIGH_INTEREST]");
    }

    #[test]
    fn extraction_is_idempotent_on_clean_text() {
        let extractor = IntentExtractor::new();
        for raw in [
            "Rates start at $20. [INTENT:HIGH_INTEREST]",
            "Contact HR. [INTENT:HR_CONTACT]",
            "We serve Sugar Land.",
        ] {
            let first = extractor.extract(raw);
            assert_eq!(extractor.extract(&first.clean_text).intent, Intent::None, "{raw}");
        }
    }

    #[test]
    fn notification_kind_parses_wire_names() {
        assert_eq!("high_interest".parse::<NotificationKind>(), Ok(NotificationKind::HighInterest));
        assert_eq!("hr_contact".parse::<NotificationKind>(), Ok(NotificationKind::HrContact));
        assert!("none".parse::<NotificationKind>().is_err());
        assert_eq!(NotificationKind::from_intent(Intent::None), None);
    }

    #[test]
    fn intent_serializes_snake_case() {
        let json = serde_json::to_string(&Intent::HighInterest).expect("serialize");
        assert_eq!(json, "\"high_interest\"");
    }
}

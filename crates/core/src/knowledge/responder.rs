use crate::intent::Intent;
use crate::knowledge::{KnowledgeFacts, ServiceCategory};

const HR_KEYWORDS: &[&str] = &["job", "hire", "apply", "employment", "hr"];
const PRICING_KEYWORDS: &[&str] = &["quote", "price", "cost", "rate"];
const COVERAGE_KEYWORDS: &[&str] = &["area", "location", "cover", "where"];
const CONTACT_KEYWORDS: &[&str] = &["contact", "phone", "call"];

const HIGH_INTENT_PHRASES: &[&str] = &[
    "need security now",
    "urgent",
    "emergency",
    "asap",
    "immediately",
    "when can you start",
    "how do i get started",
    "send proposal",
    "formal quote",
    "i want to hire",
    "book",
    "schedule",
    "reserve",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponderSettings {
    /// Contact questions are only answered from the knowledge base when the
    /// message has fewer tokens than this.
    pub contact_max_tokens: usize,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self { contact_max_tokens: 5 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCategory {
    HrContact,
    Pricing,
    Coverage,
    Contact,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    AnyKeyword(&'static [&'static str]),
    ShortMessageWithKeyword { keywords: &'static [&'static str], max_tokens: usize },
}

impl Predicate {
    /// `normalized` must already be lower-cased.
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Self::AnyKeyword(keywords) => contains_any(normalized, keywords),
            Self::ShortMessageWithKeyword { keywords, max_tokens } => {
                contains_any(normalized, keywords)
                    && normalized.split_whitespace().count() < *max_tokens
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseRule {
    pub category: RuleCategory,
    pub predicate: Predicate,
}

impl ResponseRule {
    pub fn respond(&self, facts: &KnowledgeFacts, normalized: &str) -> String {
        match self.category {
            RuleCategory::HrContact => hr_contact_block(facts),
            RuleCategory::Pricing => {
                pricing_block(facts, contains_any(normalized, HIGH_INTENT_PHRASES))
            }
            RuleCategory::Coverage => coverage_block(facts),
            RuleCategory::Contact => contact_block(facts),
        }
    }
}

/// Canned answers for the common questions, evaluated first-match-wins.
#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    facts: KnowledgeFacts,
    rules: Vec<ResponseRule>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(KnowledgeFacts::rex_security(), ResponderSettings::default())
    }
}

impl KnowledgeBase {
    pub fn new(facts: KnowledgeFacts, settings: ResponderSettings) -> Self {
        let rules = vec![
            ResponseRule {
                category: RuleCategory::HrContact,
                predicate: Predicate::AnyKeyword(HR_KEYWORDS),
            },
            ResponseRule {
                category: RuleCategory::Pricing,
                predicate: Predicate::AnyKeyword(PRICING_KEYWORDS),
            },
            ResponseRule {
                category: RuleCategory::Coverage,
                predicate: Predicate::AnyKeyword(COVERAGE_KEYWORDS),
            },
            ResponseRule {
                category: RuleCategory::Contact,
                predicate: Predicate::ShortMessageWithKeyword {
                    keywords: CONTACT_KEYWORDS,
                    max_tokens: settings.contact_max_tokens,
                },
            },
        ];

        Self { facts, rules }
    }

    pub fn facts(&self) -> &KnowledgeFacts {
        &self.facts
    }

    pub fn rules(&self) -> &[ResponseRule] {
        &self.rules
    }

    /// Returns the first matching rule, if any.
    pub fn classify(&self, message: &str) -> Option<RuleCategory> {
        let normalized = message.to_lowercase();
        self.rules.iter().find(|rule| rule.predicate.matches(&normalized)).map(|rule| rule.category)
    }

    /// `None` means no canned answer applies and the model should be asked.
    pub fn respond(&self, message: &str) -> Option<String> {
        let normalized = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(&normalized))
            .map(|rule| rule.respond(&self.facts, &normalized))
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn with_marker(body: String, intent: Intent) -> String {
    match intent.marker() {
        Some(marker) => format!("{body}\n\n{marker}"),
        None => body,
    }
}

fn hr_contact_block(facts: &KnowledgeFacts) -> String {
    let body = format!(
        "For hiring or employment verification, you may contact our HR department:\n\n📞 Phone: {}\n📧 Email: {}\n\nHR Manager: {}\nOffice Hours: {}",
        facts.company.hr_phone, facts.company.email, facts.company.hr, facts.hours.office
    );
    with_marker(body, Intent::HrContact)
}

fn pricing_block(facts: &KnowledgeFacts, high_intent: bool) -> String {
    let rates = [
        ServiceCategory::Unarmed,
        ServiceCategory::Armed,
        ServiceCategory::MobilePatrol,
        ServiceCategory::Event,
    ]
    .into_iter()
    .map(|category| format!("• {}: {}", category.display_name(), facts.price_for(category)))
    .collect::<Vec<_>>()
    .join("\n");

    let body = format!(
        "**Security Service Rates (Indicative):**\n\n{rates}\n\nWould you like me to connect you with our operations team for a formal proposal?"
    );
    if high_intent {
        with_marker(body, Intent::HighInterest)
    } else {
        body
    }
}

fn coverage_block(facts: &KnowledgeFacts) -> String {
    let areas =
        facts.coverage.iter().map(|area| format!("• {area}")).collect::<Vec<_>>().join("\n");
    format!(
        "**Coverage Areas:**\n\n{areas}\n\nWe also serve surrounding suburbs upon request. Available 24/7 across all locations."
    )
}

fn contact_block(facts: &KnowledgeFacts) -> String {
    format!(
        "**Contact {}:**\n\n📍 {}\n\n📞 Operations: {}\n📞 HR: {}\n📧 {}\n\n🕐 Office Hours: {}\n🕐 Security Operations: {}",
        facts.company.name,
        facts.company.address,
        facts.company.office_phone,
        facts.company.hr_phone,
        facts.company.email,
        facts.hours.office,
        facts.hours.operations
    )
}

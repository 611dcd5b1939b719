//! Static company facts and the deterministic keyword responder built on them.

pub mod prompt;
pub mod responder;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use responder::{KnowledgeBase, Predicate, ResponderSettings, ResponseRule, RuleCategory};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub president: String,
    pub hr: String,
    pub hr_phone: String,
    pub office_phone: String,
    pub email: String,
    pub alt_email: String,
    pub website: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Unarmed,
    Armed,
    MobilePatrol,
    Event,
}

impl ServiceCategory {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Unarmed => "Unarmed Guard",
            Self::Armed => "Armed Guard",
            Self::MobilePatrol => "Mobile Patrol",
            Self::Event => "Event Security",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub office: String,
    pub operations: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeFacts {
    pub company: CompanyProfile,
    pub services: Vec<String>,
    pub pricing: BTreeMap<ServiceCategory, String>,
    pub coverage: Vec<String>,
    pub hours: OperatingHours,
}

impl KnowledgeFacts {
    pub fn rex_security() -> Self {
        let pricing = BTreeMap::from([
            (ServiceCategory::Unarmed, "starting at $20 per officer/hour".to_string()),
            (ServiceCategory::Armed, "starting at $20 per officer/hour".to_string()),
            (ServiceCategory::MobilePatrol, "mobile patrol rental options; $600 monthly".to_string()),
            (
                ServiceCategory::Event,
                "$350 per officer up to 5hrs (overtime rate applies)".to_string(),
            ),
        ]);

        Self {
            company: CompanyProfile {
                name: "Rex Security Patrol Inc".to_string(),
                address: "2500 Wilcrest Drive, Suite 371, Houston, TX 77042".to_string(),
                president: "Yusuf Abu".to_string(),
                hr: "Tyra Salisbury".to_string(),
                hr_phone: "832-684-3621".to_string(),
                office_phone: "832-690-5813".to_string(),
                email: "rexllc24@gmail.com".to_string(),
                alt_email: "rexllc24@yahoo.com".to_string(),
                website: "https://Rexsecuritypatrols.com".to_string(),
            },
            services: [
                "Unarmed Security Guards",
                "Armed Security Guards",
                "Mobile Patrol Services",
                "Residential & HOA Security",
                "Commercial Property Security",
                "Construction Site Security",
                "Event & Crowd Control Security",
                "Access Control / Front Desk Security",
                "Parking Lot & Perimeter Patrol",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            pricing,
            coverage: [
                "Houston Metro Area",
                "Westchase",
                "Katy",
                "Sugar Land",
                "Cypress",
                "Downtown Houston",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            hours: OperatingHours {
                office: "Monday–Friday | 9:00 AM – 5:00 PM".to_string(),
                operations: "24 Hours / 7 Days a Week".to_string(),
            },
        }
    }

    pub fn price_for(&self, category: ServiceCategory) -> &str {
        self.pricing.get(&category).map(String::as_str).unwrap_or("available on request")
    }

    /// Shown instead of a model answer when the daily model quota is spent.
    pub fn high_demand_fallback(&self) -> String {
        format!(
            "I'm currently experiencing high demand. Please contact our operations team directly at {} or email {} for immediate assistance.",
            self.company.office_phone, self.company.email
        )
    }
}

impl Default for KnowledgeFacts {
    fn default() -> Self {
        Self::rex_security()
    }
}

#[cfg(test)]
mod tests {
    use super::{KnowledgeFacts, ServiceCategory};

    #[test]
    fn fallback_mentions_operations_phone_and_email() {
        let fallback = KnowledgeFacts::rex_security().high_demand_fallback();

        assert!(fallback.contains("832-690-5813"));
        assert!(fallback.contains("rexllc24@gmail.com"));
    }

    #[test]
    fn pricing_is_keyed_by_category() {
        let facts = KnowledgeFacts::rex_security();

        assert_eq!(facts.price_for(ServiceCategory::Unarmed), "starting at $20 per officer/hour");
        assert!(facts.price_for(ServiceCategory::MobilePatrol).contains("$600 monthly"));
    }

    #[test]
    fn facts_serialize_for_prompt_embedding() {
        let json = serde_json::to_value(KnowledgeFacts::rex_security()).expect("serialize");

        assert_eq!(json["company"]["hr_phone"], "832-684-3621");
        assert_eq!(json["pricing"]["mobile_patrol"], "mobile patrol rental options; $600 monthly");
        assert_eq!(json["coverage"][0], "Houston Metro Area");
    }
}

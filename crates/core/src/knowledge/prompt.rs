use std::fs;
use std::io;

use crate::config::LlmConfig;
use crate::intent::Intent;
use crate::knowledge::KnowledgeFacts;

/// Preset model turn that follows the persona instructions.
pub const ASSISTANT_ACKNOWLEDGMENT: &str =
    "Understood. I am the Rex Security Patrol Inc virtual assistant. How can I help you today?";

/// Persona and rules sent as the first turn of every model exchange.
pub fn system_prompt(facts: &KnowledgeFacts) -> String {
    let context = serde_json::to_string_pretty(facts).unwrap_or_else(|_| String::from("{}"));
    let high_interest = Intent::HighInterest.marker().unwrap_or_default();
    let hr_contact = Intent::HrContact.marker().unwrap_or_default();
    let company = &facts.company.name;

    format!(
        r#"You are the official virtual assistant for {company}, a professional security services company in Houston, Texas.

**Your Role:**
- Answer questions about security services, pricing, coverage areas, and company information
- Maintain a professional, calm, and confident tone
- Never make up information - only use the provided context
- Detect when users show serious buying intent and offer to email the HR

**Company Context:**
{context}

**CRITICAL - Intent Detection:**
You MUST detect when users show HIGH BUYING INTENT and include special markers in your response:

HIGH INTENT SIGNALS:
- User requests immediate/urgent service
- User asks for formal proposal/quote
- User wants to schedule security coverage
- User mentions specific dates/times they need service
- User asks "how do I get started" or "when can you start"
- User discusses budget or payment
- User provides specific property details (address, size, etc.)

When you detect HIGH INTENT, include this EXACT marker at the end of your response:
{high_interest}

When user wants to contact HR or apply for job, include:
{hr_contact}

**Rules:**
1. NEVER share personal guard information
2. NEVER give exact live schedules or sensitive operational details
3. Always offer to connect complex inquiries to HR or Operations
4. Be helpful but professional - no casual slang
5. For employment/hiring questions, direct to HR contact
6. For quotes, provide indicative rates and offer formal proposal via Operations
7. Do not drop numbers or email of HR unless user specifically and directly asks for it
8. Only offer to contact HR directly by yourself without dropping any contact

**Response Style:**
- Clear and direct
- Professional but friendly
- Use bullet points for lists
- Include relevant contact info when appropriate"#
    )
}

/// `llm.system_prompt_path` replaces the whole built-in prompt when set.
pub fn resolve_system_prompt(config: &LlmConfig, facts: &KnowledgeFacts) -> io::Result<String> {
    match &config.system_prompt_path {
        Some(path) => fs::read_to_string(path),
        None => Ok(system_prompt(facts)),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{resolve_system_prompt, system_prompt};
    use crate::config::AppConfig;
    use crate::knowledge::KnowledgeFacts;

    #[test]
    fn prompt_embeds_facts_and_both_markers() {
        let prompt = system_prompt(&KnowledgeFacts::rex_security());

        assert!(prompt.contains("Rex Security Patrol Inc"));
        assert!(prompt.contains("\"office_phone\": \"832-690-5813\""));
        assert!(prompt.contains("[INTENT:HIGH_INTEREST]"));
        assert!(prompt.contains("[INTENT:HR_CONTACT]"));
    }

    #[test]
    fn configured_prompt_file_replaces_builtin_prompt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prompt.txt");
        fs::write(&path, "custom persona").expect("write prompt");

        let mut llm = AppConfig::default().llm;
        llm.system_prompt_path = Some(path);

        let prompt = resolve_system_prompt(&llm, &KnowledgeFacts::rex_security())
            .expect("prompt file should be read");
        assert_eq!(prompt, "custom persona");
    }

    #[test]
    fn missing_prompt_file_is_an_error() {
        let mut llm = AppConfig::default().llm;
        llm.system_prompt_path = Some("/nonexistent/rexchat/prompt.txt".into());

        assert!(resolve_system_prompt(&llm, &KnowledgeFacts::rex_security()).is_err());
    }
}

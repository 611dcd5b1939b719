use rexchat_agent::runtime::ResponsePipeline;
use rexchat_core::config::{AppConfig, LoadOptions};
use rexchat_core::knowledge::prompt::resolve_system_prompt;
use rexchat_core::knowledge::RuleCategory;
use rexchat_core::{Intent, IntentExtractor, KnowledgeBase, KnowledgeFacts, ResponderSettings};
use serde::Serialize;

use super::CommandResult;

const KNOWLEDGE_PROBES: [(&str, RuleCategory); 4] = [
    ("looking for a job", RuleCategory::HrContact),
    ("what are your rates", RuleCategory::Pricing),
    ("which areas do you serve", RuleCategory::Coverage),
    ("contact", RuleCategory::Contact),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_knowledge_base(&config));
            checks.push(check_system_prompt(&config));
            checks.push(check_model_quota(&config));
            checks.push(check_mail_transport(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["knowledge_base", "system_prompt", "model_quota", "mail_transport"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_knowledge_base(config: &AppConfig) -> DoctorCheck {
    let knowledge = KnowledgeBase::new(
        KnowledgeFacts::rex_security(),
        ResponderSettings { contact_max_tokens: config.responder.contact_max_tokens },
    );

    let misses: Vec<String> = KNOWLEDGE_PROBES
        .iter()
        .filter(|(probe, expected)| knowledge.classify(probe) != Some(*expected))
        .map(|(probe, expected)| format!("`{probe}` did not route to {expected:?}"))
        .collect();
    if !misses.is_empty() {
        return DoctorCheck {
            name: "knowledge_base",
            status: CheckStatus::Fail,
            details: misses.join("; "),
        };
    }

    let hr_intent = knowledge
        .respond(KNOWLEDGE_PROBES[0].0)
        .map(|answer| IntentExtractor::new().extract(&answer).intent);
    if hr_intent != Some(Intent::HrContact) {
        return DoctorCheck {
            name: "knowledge_base",
            status: CheckStatus::Fail,
            details: "HR answer is not tagged with the hr_contact intent".to_string(),
        };
    }

    DoctorCheck {
        name: "knowledge_base",
        status: CheckStatus::Pass,
        details: format!("{} canned-answer rules respond to their probes", knowledge.rules().len()),
    }
}

fn check_system_prompt(config: &AppConfig) -> DoctorCheck {
    match resolve_system_prompt(&config.llm, &KnowledgeFacts::rex_security()) {
        Ok(prompt) if prompt.trim().is_empty() => DoctorCheck {
            name: "system_prompt",
            status: CheckStatus::Fail,
            details: "system prompt is empty".to_string(),
        },
        Ok(prompt) => DoctorCheck {
            name: "system_prompt",
            status: CheckStatus::Pass,
            details: match &config.llm.system_prompt_path {
                Some(path) => format!("loaded {} chars from `{}`", prompt.len(), path.display()),
                None => format!("built-in prompt ({} chars)", prompt.len()),
            },
        },
        Err(error) => DoctorCheck {
            name: "system_prompt",
            status: CheckStatus::Fail,
            details: format!("could not read system prompt: {error}"),
        },
    }
}

fn check_model_quota(config: &AppConfig) -> DoctorCheck {
    match ResponsePipeline::from_config(config) {
        Ok(pipeline) => {
            let usage = pipeline.quota();
            let details = if usage.limit == 0 {
                "daily limit is 0; every model escalation serves the fallback answer".to_string()
            } else {
                format!(
                    "{} of {} model calls used today (counter is per server process)",
                    usage.used, usage.limit
                )
            };
            DoctorCheck { name: "model_quota", status: CheckStatus::Pass, details }
        }
        Err(error) => DoctorCheck {
            name: "model_quota",
            status: CheckStatus::Fail,
            details: format!("model client could not be initialized: {error}"),
        },
    }
}

fn check_mail_transport(config: &AppConfig) -> DoctorCheck {
    let details = match &config.notifications.relay_url {
        Some(url) => {
            format!("relaying staff email to `{url}` for {}", config.notifications.staff_email)
        }
        None => format!(
            "no relay configured; staff email for {} is logged only",
            config.notifications.staff_email
        ),
    };
    DoctorCheck { name: "mail_transport", status: CheckStatus::Pass, details }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

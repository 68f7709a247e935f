use serde::Serialize;
use slashgate_core::config::{AppConfig, LoadOptions};
use slashgate_discord::SignatureVerifier;

use super::{CommandResult, EXIT_CONFIG_FAILURE};

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
    commands: Vec<&'static str>,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_CONFIG_FAILURE };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();
    let mut commands = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_public_key(&config));
            checks.push(check_task_notification(&config));
            commands = config.enabled_commands();
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["public_key", "task_notification"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail)
        && checks.iter().any(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, commands, checks }
}

fn check_public_key(config: &AppConfig) -> DoctorCheck {
    match SignatureVerifier::from_hex(&config.discord.public_key) {
        Ok(_) => DoctorCheck {
            name: "public_key",
            status: CheckStatus::Pass,
            details: "public key decodes to a valid Ed25519 point".to_string(),
        },
        Err(error) => {
            DoctorCheck { name: "public_key", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_task_notification(config: &AppConfig) -> DoctorCheck {
    match (&config.discord.notify_channel_id, config.notion_enabled()) {
        (Some(channel_id), true) => DoctorCheck {
            name: "task_notification",
            status: CheckStatus::Pass,
            details: format!("registered tasks are posted to channel {channel_id}"),
        },
        (Some(_), false) => DoctorCheck {
            name: "task_notification",
            status: CheckStatus::Skipped,
            details: "notify channel is set but the task store is not configured".to_string(),
        },
        (None, _) => DoctorCheck {
            name: "task_notification",
            status: CheckStatus::Skipped,
            details: "no notify channel configured".to_string(),
        },
    }
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
    if !report.commands.is_empty() {
        lines.push(format!("commands: {}", report.commands.join(", ")));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

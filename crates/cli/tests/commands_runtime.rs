use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use ed25519_dalek::{Signer, SigningKey};
use serde_json::Value;
use slashgate_cli::commands::{config, doctor, verify};

const TIMESTAMP: &str = "1700000000";
const BODY: &str = r#"{"type":1}"#;

fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[3u8; 32])
}

fn public_key_hex() -> String {
    hex::encode(signing_key().verifying_key().to_bytes())
}

fn sign(timestamp: &str, body: &[u8]) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(signing_key().sign(&message).to_bytes())
}

#[test]
fn config_redacts_secrets_and_attributes_sources() {
    let public_key = public_key_hex();
    with_env(
        &[
            ("SLASHGATE_DISCORD_APPLICATION_ID", "900"),
            ("APPLICATION_PUBLIC_KEY", public_key.as_str()),
            ("DISCORD_TOKEN", "bot-secret-value"),
        ],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "config");
            assert_eq!(payload["status"], "ok");

            let message = payload["message"].as_str().unwrap_or("");
            assert!(message.contains(
                "- discord.application_id = 900 (source: env (SLASHGATE_DISCORD_APPLICATION_ID))"
            ));
            assert!(message.contains("(source: env (APPLICATION_PUBLIC_KEY))"));
            assert!(message.contains("- discord.bot_token = <redacted> (source: env (DISCORD_TOKEN))"));
            assert!(message.contains("- server.port = 8080 (source: default)"));
            assert!(!message.contains("bot-secret-value"));
        },
    );
}

#[test]
fn config_returns_config_failure_without_required_values() {
    with_env(&[], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_json_reports_enabled_commands() {
    let public_key = public_key_hex();
    with_env(
        &[
            ("SLASHGATE_DISCORD_APPLICATION_ID", "900"),
            ("SLASHGATE_DISCORD_PUBLIC_KEY", public_key.as_str()),
            ("NOTION_TOKEN", "secret_abc"),
            ("NOTION_DATABASE_ID", "db-1"),
        ],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 0);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["overall_status"], "pass");
            assert_eq!(payload["commands"], serde_json::json!(["hello", "point", "task"]));
            let checks = payload["checks"].as_array().expect("checks array");
            assert!(checks
                .iter()
                .any(|check| check["name"] == "public_key" && check["status"] == "pass"));
        },
    );
}

#[test]
fn doctor_human_output_reports_config_failure() {
    with_env(&[], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 2);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] public_key:"));
    });
}

#[test]
fn verify_accepts_a_matching_signature() {
    let public_key = public_key_hex();
    let dir = tempfile::tempdir().expect("tempdir");
    let body_file = dir.path().join("body.json");
    fs::write(&body_file, BODY).expect("write body");
    let signature = sign(TIMESTAMP, BODY.as_bytes());

    with_env(
        &[("APPLICATION_ID", "900"), ("APPLICATION_PUBLIC_KEY", public_key.as_str())],
        || {
            let result = verify::run(&signature, TIMESTAMP, &body_file);
            assert_eq!(result.exit_code, 0);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "verify");
            assert_eq!(payload["status"], "ok");
        },
    );
}

#[test]
fn verify_rejects_a_different_timestamp() {
    let public_key = public_key_hex();
    let dir = tempfile::tempdir().expect("tempdir");
    let body_file = dir.path().join("body.json");
    fs::write(&body_file, BODY).expect("write body");
    let signature = sign(TIMESTAMP, BODY.as_bytes());

    with_env(
        &[("APPLICATION_ID", "900"), ("APPLICATION_PUBLIC_KEY", public_key.as_str())],
        || {
            let result = verify::run(&signature, "1700000001", &body_file);
            assert_eq!(result.exit_code, 1);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["error_class"], "signature_invalid");
        },
    );
}

#[test]
fn verify_reports_unreadable_body_file() {
    let public_key = public_key_hex();
    let dir = tempfile::tempdir().expect("tempdir");

    with_env(
        &[("APPLICATION_ID", "900"), ("APPLICATION_PUBLIC_KEY", public_key.as_str())],
        || {
            let result = verify::run("00", TIMESTAMP, &dir.path().join("missing.json"));
            assert_eq!(result.exit_code, 1);
            assert_eq!(parse_payload(&result.output)["error_class"], "body_file");
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SLASHGATE_DISCORD_APPLICATION_ID",
        "SLASHGATE_DISCORD_PUBLIC_KEY",
        "SLASHGATE_DISCORD_BOT_TOKEN",
        "SLASHGATE_DISCORD_API_BASE_URL",
        "SLASHGATE_DISCORD_DISPLAY_NAME",
        "SLASHGATE_DISCORD_NOTIFY_CHANNEL_ID",
        "SLASHGATE_NOTION_TOKEN",
        "SLASHGATE_NOTION_DATABASE_ID",
        "SLASHGATE_NOTION_API_BASE_URL",
        "SLASHGATE_NOTION_API_VERSION",
        "SLASHGATE_SHEETS_CREDENTIAL",
        "SLASHGATE_SHEETS_SPREADSHEET_ID",
        "SLASHGATE_SHEETS_RANGE",
        "SLASHGATE_SHEETS_API_BASE_URL",
        "SLASHGATE_SERVER_BIND_ADDRESS",
        "SLASHGATE_SERVER_PORT",
        "SLASHGATE_HTTP_TIMEOUT_MS",
        "SLASHGATE_HTTP_USER_AGENT",
        "SLASHGATE_LOGGING_LEVEL",
        "SLASHGATE_LOGGING_FORMAT",
        "SLASHGATE_LOG_LEVEL",
        "SLASHGATE_LOG_FORMAT",
        "APPLICATION_ID",
        "APPLICATION_PUBLIC_KEY",
        "DISCORD_TOKEN",
        "NOTION_TOKEN",
        "NOTION_DATABASE_ID",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}

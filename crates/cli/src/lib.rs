pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "slashgate",
    about = "Slashgate operator CLI",
    long_about = "Inspect configuration, check deployment readiness, and verify signed interaction payloads.",
    after_help = "Examples:\n  slashgate doctor --json\n  slashgate config\n  slashgate verify --signature <hex> --timestamp 1700000000 --body-file body.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Show effective configuration values with source attribution and redaction")]
    Config,
    #[command(about = "Validate config, the interaction public key, and the enabled commands")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Check a captured request signature against the configured public key")]
    Verify {
        #[arg(long, help = "Hex value of the X-Signature-Ed25519 header")]
        signature: String,
        #[arg(long, help = "Value of the X-Signature-Timestamp header")]
        timestamp: String,
        #[arg(long, help = "File holding the exact raw request body")]
        body_file: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Verify { signature, timestamp, body_file } => {
            commands::verify::run(&signature, &timestamp, &body_file)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

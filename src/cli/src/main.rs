//! Pathwarden CLI - offline tooling for RBAC policy files.
//!
//! Provides check, roles, rules, and validate commands.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{check, roles, rules, validate};
use output::OutputFormat;
use pathwarden_core::rbac::PolicyFormat;

/// Exit code for a denied `check`.
const EXIT_DENIED: u8 = 2;

/// Pathwarden - RBAC policy tooling
#[derive(Parser)]
#[command(
    name = "pathwarden",
    version,
    about = "Pathwarden - RBAC policy tooling",
    long_about = "Check requests against, inspect, and validate Pathwarden policy files.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Policy file
    #[arg(
        short,
        long,
        global = true,
        env = "PATHWARDEN_POLICY",
        default_value = "config/policy.csv"
    )]
    policy: PathBuf,

    /// Policy format (toml or csv); inferred from the extension by default
    #[arg(long, global = true)]
    format: Option<PolicyFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether a request would be allowed (exit 0 allow, 2 deny)
    Check(check::CheckArgs),

    /// Expand roles through the inheritance graph
    Roles(roles::RolesArgs),

    /// List rules, optionally those available to given roles
    Rules(rules::RulesArgs),

    /// Load the policy and report any error
    Validate(validate::ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let format = cli.output;
    let policy = cli.policy.as_path();
    let policy_format = cli.format;

    let result = match cli.command {
        Commands::Check(args) => check::execute(args, policy, policy_format, format).map(|allowed| {
            if allowed {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_DENIED)
            }
        }),
        Commands::Roles(args) => {
            roles::execute(args, policy, policy_format, format).map(|_| ExitCode::SUCCESS)
        }
        Commands::Rules(args) => {
            rules::execute(args, policy, policy_format, format).map(|_| ExitCode::SUCCESS)
        }
        Commands::Validate(args) => {
            validate::execute(args, policy, policy_format, format).map(|_| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

//! Policy validation command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::Path;

use pathwarden_core::rbac::PolicyFormat;

use super::load_engine;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ValidateArgs {}

#[derive(Debug, Serialize)]
struct ValidationReport {
    path: String,
    valid: bool,
    roles: usize,
    rules: usize,
    edges: usize,
}

pub fn execute(
    _args: ValidateArgs,
    policy: &Path,
    policy_format: Option<PolicyFormat>,
    format: OutputFormat,
) -> Result<()> {
    let engine = load_engine(policy, policy_format)?;
    let store = engine.store();

    let report = ValidationReport {
        path: policy.display().to_string(),
        valid: true,
        roles: store.role_count(),
        rules: store.rule_count(),
        edges: store.edge_count(),
    };

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("{} is valid", report.path));
            output::print_detail("Roles", &report.roles.to_string());
            output::print_detail("Rules", &report.rules.to_string());
            output::print_detail("Inheritance edges", &report.edges.to_string());
            Ok(())
        }
        _ => output::print_item(&report, format),
    }
}

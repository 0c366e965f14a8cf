//! Rule listing command.

use anyhow::Result;
use clap::Args;
use std::path::Path;

use pathwarden_core::rbac::{PolicyFormat, RoleId};

use super::{load_engine, RuleRow};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct RulesArgs {
    /// Only rules available to these roles, including inherited ones
    #[arg(short, long = "role")]
    roles: Vec<String>,
}

pub fn execute(
    args: RulesArgs,
    policy: &Path,
    policy_format: Option<PolicyFormat>,
    format: OutputFormat,
) -> Result<()> {
    let engine = load_engine(policy, policy_format)?;

    let mut rows: Vec<RuleRow> = if args.roles.is_empty() {
        engine.store().rules().map(RuleRow::from).collect()
    } else {
        let roles: Vec<RoleId> = args.roles.into_iter().map(RoleId::new).collect();
        engine
            .effective_rules(&roles)?
            .into_iter()
            .map(RuleRow::from)
            .collect()
    };
    rows.sort();

    output::print_list(&rows, format)
}

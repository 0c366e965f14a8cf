//! Role closure command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use pathwarden_core::rbac::{PolicyFormat, RoleId};

use super::load_engine;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct RolesArgs {
    /// Roles to expand
    #[arg(required = true)]
    roles: Vec<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Membership")]
    membership: &'static str,
    #[tabled(rename = "Rules")]
    rules: usize,
}

pub fn execute(
    args: RolesArgs,
    policy: &Path,
    policy_format: Option<PolicyFormat>,
    format: OutputFormat,
) -> Result<()> {
    let engine = load_engine(policy, policy_format)?;
    let direct: Vec<RoleId> = args.roles.into_iter().map(RoleId::new).collect();

    let mut closure: Vec<RoleId> = engine.resolver().closure(&direct)?.into_iter().collect();
    closure.sort();

    let rows: Vec<RoleRow> = closure
        .into_iter()
        .map(|role| RoleRow {
            membership: if direct.contains(&role) { "direct" } else { "inherited" },
            rules: engine.store().rules_for_role(&role).len(),
            role: role.to_string(),
        })
        .collect();

    output::print_list(&rows, format)
}

//! CLI subcommands. Each works offline against a policy file.

pub mod check;
pub mod roles;
pub mod rules;
pub mod validate;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use pathwarden_core::rbac::{PolicyEngine, PolicyFormat, Rule};

/// Load and validate a policy file.
pub fn load_engine(path: &Path, format: Option<PolicyFormat>) -> Result<PolicyEngine> {
    PolicyEngine::from_file(path, format)
        .with_context(|| format!("Failed to load policy {}", path.display()))
}

/// One rule, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Tabled)]
pub struct RuleRow {
    #[tabled(rename = "Role")]
    pub role: String,
    #[tabled(rename = "Resource")]
    pub resource: String,
    #[tabled(rename = "Action")]
    pub action: String,
}

impl From<&Rule> for RuleRow {
    fn from(rule: &Rule) -> Self {
        Self {
            role: rule.role.to_string(),
            resource: rule.pattern.to_string(),
            action: rule.action.to_string(),
        }
    }
}

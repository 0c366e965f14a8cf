//! Offline access check: would this request be allowed?

use anyhow::Result;
use clap::Args;
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use pathwarden_core::rbac::{PolicyFormat, Subject};

use super::{load_engine, RuleRow};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct CheckArgs {
    /// Role held by the subject (repeatable)
    #[arg(short, long = "role")]
    roles: Vec<String>,

    /// Username, for display only
    #[arg(short, long, default_value = "anonymous")]
    user: String,

    /// Show the granting rule, captured parameters and the role closure
    #[arg(long)]
    explain: bool,

    /// HTTP method, e.g. GET (case-sensitive)
    method: String,

    /// Request path, e.g. /v1/projects
    path: String,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    user: String,
    roles: Vec<String>,
    method: String,
    path: String,
    decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    granted_by: Option<RuleRow>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    captures: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    closure: Vec<String>,
}

/// Returns whether the request is allowed.
pub fn execute(
    args: CheckArgs,
    policy: &Path,
    policy_format: Option<PolicyFormat>,
    format: OutputFormat,
) -> Result<bool> {
    let engine = load_engine(policy, policy_format)?;
    let subject = Subject::new(args.user.as_str(), args.roles.iter().map(String::as_str));
    let evaluation = engine.evaluate(&subject, &args.path, &args.method)?;

    let mut report = CheckReport {
        user: subject.username.to_string(),
        roles: subject.roles.iter().map(ToString::to_string).collect(),
        method: args.method.clone(),
        path: args.path.clone(),
        decision: evaluation.decision.as_str(),
        granted_by: None,
        captures: BTreeMap::new(),
        closure: Vec::new(),
    };

    if args.explain {
        if let Some(rule) = evaluation.granted_by {
            report.granted_by = Some(RuleRow::from(rule));
            report.captures = rule
                .pattern
                .captures(&args.path)
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
        }
        let mut closure: Vec<String> = engine
            .resolver()
            .closure(&subject.roles)?
            .iter()
            .map(ToString::to_string)
            .collect();
        closure.sort();
        report.closure = closure;
    }

    match format {
        OutputFormat::Table => print_report(&report, args.explain),
        _ => output::print_item(&report, format)?,
    }

    Ok(evaluation.decision.is_allowed())
}

fn print_report(report: &CheckReport, explain: bool) {
    let verdict = if report.decision == "allow" {
        "ALLOW".green().bold()
    } else {
        "DENY".red().bold()
    };
    println!("{} {} {}", verdict, report.method, report.path);

    if !explain {
        return;
    }

    output::print_header("Explanation");
    output::print_detail("User", &report.user);
    output::print_detail("Roles", &report.roles.join(", "));
    output::print_detail("Closure", &report.closure.join(", "));
    match &report.granted_by {
        Some(rule) => {
            output::print_detail(
                "Granted by",
                &format!("{}, {}, {}", rule.role, rule.resource, rule.action),
            );
            for (name, value) in &report.captures {
                output::print_detail(&format!("  {}", name), value);
            }
        }
        None => output::print_detail("Granted by", "no matching rule"),
    }
}

//! Policy document loaders.
//!
//! Two formats are understood. TOML:
//!
//! ```toml
//! [[rules]]
//! role = "free"
//! resource = "/v1/projects"
//! action = "GET"
//!
//! [[inherits]]
//! role = "unlimited"
//! parent = "free"
//! ```
//!
//! and Casbin-style CSV rows, one per line:
//!
//! ```text
//! p, free, /v1/projects, GET
//! g, unlimited, free
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::error::ConfigError;
use super::models::{RoleEdge, RuleSpec};
use super::store::PolicyStore;

/// On-disk policy format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyFormat {
    Toml,
    Csv,
}

impl PolicyFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for PolicyFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "csv" => Ok(Self::Csv),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for PolicyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => write!(f, "toml"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// A parsed but not yet validated policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySource {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub inherits: Vec<RoleEdge>,
}

impl PolicySource {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Parse `p`/`g` rows. Blank lines and `#` comments are skipped.
    pub fn from_csv_str(input: &str) -> Result<Self, ConfigError> {
        let mut source = Self::default();

        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let fields: Vec<&str> = content.split(',').map(str::trim).collect();
            match fields.as_slice() {
                ["p", role, resource, action] => {
                    source.rules.push(RuleSpec::new(*role, *resource, *action));
                }
                ["g", child, parent] => {
                    source.inherits.push(RoleEdge::new(*child, *parent));
                }
                ["p", ..] => {
                    return Err(ConfigError::Parse {
                        line,
                        reason: format!(
                            "policy rows take 3 fields after 'p', found {}",
                            fields.len() - 1
                        ),
                    });
                }
                ["g", ..] => {
                    return Err(ConfigError::Parse {
                        line,
                        reason: format!(
                            "grouping rows take 2 fields after 'g', found {}",
                            fields.len() - 1
                        ),
                    });
                }
                [kind, ..] => {
                    return Err(ConfigError::Parse {
                        line,
                        reason: format!("unknown row kind '{}'", kind),
                    });
                }
                [] => {}
            }
        }

        Ok(source)
    }

    pub fn parse(input: &str, format: PolicyFormat) -> Result<Self, ConfigError> {
        match format {
            PolicyFormat::Toml => Self::from_toml_str(input),
            PolicyFormat::Csv => Self::from_csv_str(input),
        }
    }

    /// Read a policy file. Without an explicit format, the extension decides.
    pub fn from_file(path: &Path, format: Option<PolicyFormat>) -> Result<Self, ConfigError> {
        let format = match format {
            Some(format) => format,
            None => PolicyFormat::from_path(path)?,
        };
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&input, format)
    }

    pub fn into_store(self) -> Result<PolicyStore, ConfigError> {
        PolicyStore::load(self.rules, self.inherits)
    }
}

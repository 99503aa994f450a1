//! Spam rule configuration.
//!
//! Rules live in JSON files: a base set shipped with the deployment and
//! an optional local file for hot-edited additions. Local rules are
//! appended after the base set — strictly additive, there is no
//! override-by-id. The store is path-based and stateless; callers load
//! on every classification so edits take effect without a restart.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::RuleError;

/// Rule kind. Unrecognized kinds are tolerated and never match, so a
/// newer rule file does not break an older deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RuleKind {
    #[default]
    Keyword,
    Regex,
    Author,
    Unknown,
}

impl From<String> for RuleKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "keyword" => Self::Keyword,
            "regex" => Self::Regex,
            "author" => Self::Author,
            _ => Self::Unknown,
        }
    }
}

/// A single spam rule.
#[derive(Debug, Clone, Deserialize)]
pub struct SpamRule {
    /// Rule id, reported in verdicts and the re-scan output.
    #[serde(default = "default_rule_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: RuleKind,
    /// Field to match against. Defaults per kind, see `target_field`.
    #[serde(default)]
    pub field: Option<String>,
    /// Substring patterns (keyword) or exact names (author).
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Regular expression (regex rules).
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_rule_id() -> String {
    "unknown".to_string()
}

fn default_enabled() -> bool {
    true
}

impl SpamRule {
    /// The field this rule reads: an explicit `field`, else `title` for
    /// keyword/regex rules and `author_alias` for author rules.
    pub fn target_field(&self) -> &str {
        match self.field.as_deref() {
            Some(f) => f,
            None => match self.kind {
                RuleKind::Author => "author_alias",
                _ => "title",
            },
        }
    }
}

/// On-disk file format: `{"rules": [...]}`.
#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<SpamRule>,
}

/// Loads spam rules from the base file plus an optional local file.
#[derive(Debug, Clone)]
pub struct RuleStore {
    base_path: PathBuf,
    local_path: PathBuf,
}

impl RuleStore {
    pub fn new(base_path: PathBuf, local_path: PathBuf) -> Self {
        Self {
            base_path,
            local_path,
        }
    }

    /// Load and merge enabled rules, preserving file order.
    ///
    /// A missing file contributes nothing; a file that exists but fails
    /// to parse is an error.
    pub fn load(&self) -> Result<Vec<SpamRule>, RuleError> {
        let mut rules = read_rule_file(&self.base_path)?;
        rules.extend(read_rule_file(&self.local_path)?);
        rules.retain(|r| r.enabled);
        Ok(rules)
    }
}

fn read_rule_file(path: &Path) -> Result<Vec<SpamRule>, RuleError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(RuleError::Io(e)),
    };

    let file: RuleFile = serde_json::from_str(&contents).map_err(|e| RuleError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(file.rules)
}

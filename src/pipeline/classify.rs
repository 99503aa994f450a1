//! Spam classification.
//!
//! `evaluate` is a pure function over (article, rule set): every rule is
//! checked and matches are collected in order, no short-circuit, so a
//! verdict always names everything that fired. The `Classifier` wrapper
//! reloads the rule files on each call.

use regex::Regex;
use tracing::{debug, warn};

use crate::error::RuleError;
use crate::pipeline::rules::{RuleKind, RuleStore, SpamRule};
use crate::pipeline::types::RuleTarget;

/// Outcome of classifying one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_spam: bool,
    /// Ids of every rule that matched, in evaluation order.
    pub matched_rules: Vec<String>,
}

/// Classifier over the configured rule files.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleStore,
}

impl Classifier {
    pub fn new(rules: RuleStore) -> Self {
        Self { rules }
    }

    /// Classify one article against the current rule files.
    pub fn classify(&self, article: &impl RuleTarget) -> Result<Verdict, RuleError> {
        let rules = self.rules.load()?;
        Ok(evaluate(article, &rules))
    }
}

/// Evaluate an article against a rule set.
pub fn evaluate(article: &impl RuleTarget, rules: &[SpamRule]) -> Verdict {
    let mut matched_rules = Vec::new();

    for rule in rules {
        let text = article.field(rule.target_field());
        let matched = match rule.kind {
            RuleKind::Keyword => keyword_match(text, &rule.patterns, rule.case_sensitive),
            RuleKind::Regex => regex_match(text, rule.pattern.as_deref().unwrap_or("")),
            RuleKind::Author => author_match(text, &rule.patterns, rule.case_sensitive),
            RuleKind::Unknown => false,
        };
        if matched {
            debug!(rule_id = %rule.id, "Article matched spam rule");
            matched_rules.push(rule.id.clone());
        }
    }

    Verdict {
        is_spam: !matched_rules.is_empty(),
        matched_rules,
    }
}

/// Substring match against any of the patterns.
fn keyword_match(text: &str, patterns: &[String], case_sensitive: bool) -> bool {
    if case_sensitive {
        patterns.iter().any(|p| text.contains(p.as_str()))
    } else {
        let text = text.to_lowercase();
        patterns.iter().any(|p| text.contains(&p.to_lowercase()))
    }
}

/// Regex search. A pattern that fails to compile is a non-match for this
/// rule only, never an error for the article.
fn regex_match(text: &str, pattern: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!(pattern, error = %e, "Invalid regex in spam rule, treating as non-match");
            false
        }
    }
}

/// Exact equality against the pattern set — an author pattern never
/// matches a superstring of itself.
fn author_match(author: &str, patterns: &[String], case_sensitive: bool) -> bool {
    if case_sensitive {
        patterns.iter().any(|p| p == author)
    } else {
        let author = author.to_lowercase();
        patterns.iter().any(|p| p.to_lowercase() == author)
    }
}

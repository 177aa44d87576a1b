use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::models::{Category, RawEntry};

/// Keyword set for one category. Matching is case-insensitive substring search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl Rule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, text_lower: &str) -> bool {
        self.keywords.iter().any(|k| text_lower.contains(k.as_str()))
    }
}

/// Ordered rule table. The first rule with any matching keyword decides the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: vec![
                Rule::new(
                    Category::BreakingChange,
                    &[
                        "breaking change",
                        "breaking:",
                        "backward incompatible",
                        "backwards incompatible",
                        "incompatible change",
                        "migration required",
                        "major version update",
                    ],
                ),
                Rule::new(
                    Category::Security,
                    &[
                        "security",
                        "vulnerability",
                        "vulnerabilities",
                        "cve-",
                        "security patch",
                        "exploit",
                    ],
                ),
                Rule::new(
                    Category::Deprecation,
                    &[
                        "deprecat",
                        "obsolete",
                        "discontinued",
                        "end of life",
                        "end-of-life",
                        "no longer supported",
                        "will be removed",
                        "sunset",
                    ],
                ),
                Rule::new(
                    Category::KnownIssue,
                    &["known issue", "known limitation", "workaround"],
                ),
                Rule::new(
                    Category::BugFix,
                    &["fixed", "fixes", "fix:", "bug", "resolved", "regression"],
                ),
                Rule::new(
                    Category::Preview,
                    &[
                        "preview",
                        "beta",
                        "early access",
                        "experimental",
                        "pre-ga",
                    ],
                ),
                Rule::new(
                    Category::NewFeature,
                    &[
                        "new feature",
                        "generally available",
                        "general availability",
                        "(ga)",
                        "is now ga",
                        "now available",
                        "introducing",
                        "introduces",
                        "launched",
                        "added",
                        "adds support",
                        "you can now",
                        "new ",
                    ],
                ),
            ],
        }
    }
}

impl RuleSet {
    /// Loads a custom rule table from JSON, e.g.
    /// `{"rules": [{"category": "Security", "keywords": ["cve"]}]}`
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::RulesIo {
            path: path.display().to_string(),
            source,
        })?;
        let rules: RuleSet =
            serde_json::from_str(&content).map_err(|source| ConfigError::RulesFormat {
                path: path.display().to_string(),
                source,
            })?;
        rules.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::InvalidRules("rule table is empty".to_string()));
        }
        for rule in &self.rules {
            if rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::InvalidRules(format!(
                    "{} has an empty keyword",
                    rule.category
                )));
            }
        }
        let rules = self
            .rules
            .into_iter()
            .map(|rule| Rule {
                category: rule.category,
                keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Ok(Self { rules })
    }

    pub fn classify(&self, body_text: &str) -> Category {
        let text_lower = body_text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&text_lower))
            .map(|rule| rule.category)
            .unwrap_or(Category::Other)
    }

    /// Structural hints from the page outrank keyword rules
    pub fn classify_entry(&self, entry: &RawEntry) -> Category {
        entry
            .category_hint
            .unwrap_or_else(|| self.classify(&entry.body_text))
    }
}

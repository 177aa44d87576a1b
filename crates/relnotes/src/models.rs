use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Update category assigned to a single release-note entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    NewFeature,
    Preview,
    BugFix,
    BreakingChange,
    Security,
    Deprecation,
    KnownIssue,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::NewFeature,
        Category::Preview,
        Category::BugFix,
        Category::BreakingChange,
        Category::Security,
        Category::Deprecation,
        Category::KnownIssue,
        Category::Other,
    ];

    /// Short lowercase label used as a badge and CSS class
    pub fn slug(&self) -> &'static str {
        match self {
            Category::NewFeature => "feature",
            Category::Preview => "preview",
            Category::BugFix => "fixed",
            Category::BreakingChange => "breaking",
            Category::Security => "security",
            Category::Deprecation => "deprecated",
            Category::KnownIssue => "issue",
            Category::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::NewFeature => "New Feature",
            Category::Preview => "Preview",
            Category::BugFix => "Bug Fix",
            Category::BreakingChange => "Breaking Change",
            Category::Security => "Security",
            Category::Deprecation => "Deprecation",
            Category::KnownIssue => "Known Issue",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A candidate release-note block as found on the page, before enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub anchor_date_text: String,
    pub body_text: String,
    pub links: Vec<String>,
    pub source_offset: usize,
    /// Category implied by page structure (e.g. a `release-fixed` block)
    pub category_hint: Option<Category>,
}

/// A dated, categorized entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedEntry {
    pub date: NaiveDate,
    pub date_text: String,
    pub category: Category,
    pub body_text: String,
    pub links: Vec<String>,
    pub source_offset: usize,
}

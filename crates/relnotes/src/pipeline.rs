use chrono::NaiveDate;
use tracing::{debug, info};
use url::Url;

use crate::aggregate::{aggregate, Summary};
use crate::classifier::RuleSet;
use crate::dates::parse_date;
use crate::extractor::{EntryExtractor, SiteProfile};
use crate::models::{ClassifiedEntry, RawEntry};
use crate::window::TimeWindow;

/// Per-stage counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub extracted: usize,
    pub undated: usize,
    pub outside_window: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub entries: Vec<ClassifiedEntry>,
    pub summary: Summary,
    pub stats: RunStats,
}

/// Markup in, filtered entries and summary out. Pure given `today`.
pub struct Pipeline {
    extractor: EntryExtractor,
    profile: &'static dyn SiteProfile,
    rules: RuleSet,
    window: TimeWindow,
}

impl Pipeline {
    pub fn new(
        base_url: Url,
        profile: &'static dyn SiteProfile,
        rules: RuleSet,
        window: TimeWindow,
    ) -> Self {
        Self {
            extractor: EntryExtractor::new(base_url),
            profile,
            rules,
            window,
        }
    }

    pub fn profile_name(&self) -> &'static str {
        self.profile.name()
    }

    pub fn run(&self, markup: &str, today: NaiveDate) -> PipelineOutput {
        let raw = self.extractor.extract(markup, self.profile);
        let extracted = raw.len();

        let classified = classify_entries(raw, &self.rules);
        let undated = extracted - classified.len();
        if undated > 0 {
            info!(undated, "dropped entries with unparseable dates");
        }

        let dated = classified.len();
        let entries = self.window.filter(classified, today);
        let outside_window = dated - entries.len();

        let summary = aggregate(&entries);
        info!(
            extracted,
            kept = entries.len(),
            outside_window,
            releases = summary.total_releases,
            "pipeline finished"
        );

        PipelineOutput {
            entries,
            summary,
            stats: RunStats {
                extracted,
                undated,
                outside_window,
            },
        }
    }
}

/// Dates and categorizes raw entries; entries without a parseable date are dropped
pub fn classify_entries(raw: Vec<RawEntry>, rules: &RuleSet) -> Vec<ClassifiedEntry> {
    raw.into_iter()
        .filter_map(|entry| {
            let Some(date) = parse_date(&entry.anchor_date_text) else {
                debug!(text = %entry.anchor_date_text, "unparseable date, dropping entry");
                return None;
            };
            let category = rules.classify_entry(&entry);
            Some(ClassifiedEntry {
                date,
                date_text: entry.anchor_date_text,
                category,
                body_text: entry.body_text,
                links: entry.links,
                source_offset: entry.source_offset,
            })
        })
        .collect()
}

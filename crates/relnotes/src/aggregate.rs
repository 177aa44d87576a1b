use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Category, ClassifiedEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

/// Statistics over the filtered entry set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Distinct release dates
    pub total_releases: usize,
    pub total_items: usize,
    /// Every category is present, zero-filled
    pub by_category: BTreeMap<Category, usize>,
    pub date_range: Option<DateRange>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    /// Non-zero categories, largest first (ties in category order)
    pub fn ranked_categories(&self) -> Vec<(Category, usize)> {
        let mut ranked: Vec<(Category, usize)> = self
            .by_category
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(category, count)| (*category, *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

pub fn aggregate(entries: &[ClassifiedEntry]) -> Summary {
    let mut by_category: BTreeMap<Category, usize> =
        Category::ALL.iter().map(|c| (*c, 0)).collect();
    let mut dates = BTreeSet::new();

    for entry in entries {
        *by_category.entry(entry.category).or_insert(0) += 1;
        dates.insert(entry.date);
    }

    let date_range = match (dates.first(), dates.last()) {
        (Some(earliest), Some(latest)) => Some(DateRange {
            earliest: *earliest,
            latest: *latest,
        }),
        _ => None,
    };

    Summary {
        total_releases: dates.len(),
        total_items: entries.len(),
        by_category,
        date_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, category: Category) -> ClassifiedEntry {
        ClassifiedEntry {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            date_text: date.to_string(),
            category,
            body_text: String::new(),
            links: vec![],
            source_offset: 0,
        }
    }

    #[test]
    fn test_empty_input_is_zero_summary() {
        let summary = aggregate(&[]);
        assert_eq!(summary.total_releases, 0);
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.by_category.len(), 8);
        assert!(summary.by_category.values().all(|count| *count == 0));
        assert_eq!(summary.date_range, None);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_counts_distinct_dates_and_items() {
        let entries = vec![
            entry("2025-06-01", Category::NewFeature),
            entry("2025-06-01", Category::BugFix),
            entry("2025-05-20", Category::BugFix),
            entry("2025-03-02", Category::Security),
        ];
        let summary = aggregate(&entries);

        assert_eq!(summary.total_releases, 3);
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.by_category[&Category::BugFix], 2);
        assert_eq!(summary.by_category[&Category::NewFeature], 1);
        assert_eq!(summary.by_category[&Category::Security], 1);
        assert_eq!(summary.by_category[&Category::Preview], 0);
        assert_eq!(summary.by_category.len(), 8);
        assert_eq!(
            summary.date_range,
            Some(DateRange {
                earliest: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                latest: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            })
        );
    }

    #[test]
    fn test_ranked_categories() {
        let entries = vec![
            entry("2025-06-01", Category::Security),
            entry("2025-06-01", Category::BugFix),
            entry("2025-05-20", Category::BugFix),
        ];
        assert_eq!(
            aggregate(&entries).ranked_categories(),
            vec![(Category::BugFix, 2), (Category::Security, 1)]
        );
    }
}
